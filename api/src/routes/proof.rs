//! Proof Endpoints
//!
//! EncodedValue에 붙는 64-byte attestation 생성/검증.
//! 검증 실패는 에러가 아니라 `valid: false`.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::WireValue;
use crate::{error::ApiError, types::decode_hex, AppState};

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct GenerateProofRequest {
    pub value: WireValue,
}

#[derive(Debug, Serialize)]
pub struct GenerateProofResponse {
    /// 64-byte proof (hex)
    pub proof: String,
    /// 새 proof가 붙은 값
    pub value: WireValue,
}

#[derive(Debug, Deserialize)]
pub struct VerifyProofRequest {
    pub value: WireValue,
    /// 생략하면 value.proof를 검증
    #[serde(default)]
    pub proof: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyProofResponse {
    pub valid: bool,
    pub scheme: &'static str,
}

// ============ Handlers ============

/// POST /proof/generate
///
/// 기존 proof가 검증되는 값만 새 proof를 받음 (아니면 422)
pub async fn generate_proof(
    State(state): State<AppState>,
    Json(req): Json<GenerateProofRequest>,
) -> Result<Json<GenerateProofResponse>, ApiError> {
    let value = req.value.decode()?;
    let reproved = state.engine.attach_proof(&value).await?;

    Ok(Json(GenerateProofResponse {
        proof: format!("0x{}", hex::encode(reproved.proof())),
        value: WireValue::from(&reproved),
    }))
}

/// POST /proof/verify
///
/// proof 길이가 64가 아니어도 400이 아니라 `valid: false`
pub async fn verify_proof(
    State(state): State<AppState>,
    Json(req): Json<VerifyProofRequest>,
) -> Result<Json<VerifyProofResponse>, ApiError> {
    let value = req.value.decode()?;

    let proof = match &req.proof {
        Some(hex) => decode_hex(hex)
            .map_err(|e| ApiError::BadRequest(format!("proof is not hex: {}", e)))?,
        None => value.proof().to_vec(),
    };

    let valid = state.engine.verify_proof(&value, &proof).await;
    tracing::info!(valid, "Proof verification requested");

    Ok(Json(VerifyProofResponse {
        valid,
        scheme: state.engine.info().proof,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;

    #[tokio::test]
    async fn test_generate_then_verify() {
        let (state, _) = test_support::state();
        let encoded = state.engine.encrypt(500.0).await.unwrap();

        let Json(generated) = generate_proof(
            State(state.clone()),
            Json(GenerateProofRequest { value: WireValue::from(&encoded) }),
        )
        .await
        .unwrap();
        assert_eq!(generated.proof.len(), 2 + 128);
        assert_eq!(generated.value.payload, WireValue::from(&encoded).payload);

        let Json(verified) = verify_proof(
            State(state),
            Json(VerifyProofRequest {
                value: WireValue::from(&encoded),
                proof: Some(generated.proof),
            }),
        )
        .await
        .unwrap();
        assert!(verified.valid);
    }

    #[tokio::test]
    async fn test_generate_refuses_unattested_value() {
        let (state, _) = test_support::state();
        let forged = WireValue {
            payload: format!("0x{}", "13".repeat(32)),
            proof: format!("0x{}", "00".repeat(64)),
        };

        let err = generate_proof(State(state), Json(GenerateProofRequest { value: forged }))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ProofRejected));
    }

    #[tokio::test]
    async fn test_short_proof_is_invalid_not_error() {
        let (state, _) = test_support::state();
        let encoded = state.engine.encrypt(1.0).await.unwrap();

        let Json(resp) = verify_proof(
            State(state),
            Json(VerifyProofRequest {
                value: WireValue::from(&encoded),
                proof: Some("0x0011".into()),
            }),
        )
        .await
        .unwrap();
        assert!(!resp.valid);
    }

    #[tokio::test]
    async fn test_verify_embedded_proof() {
        let (state, _) = test_support::state();
        let encoded = state.engine.encrypt(7.0).await.unwrap();

        let Json(resp) = verify_proof(
            State(state),
            Json(VerifyProofRequest { value: WireValue::from(&encoded), proof: None }),
        )
        .await
        .unwrap();
        assert!(resp.valid);
    }
}
