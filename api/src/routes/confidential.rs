//! Confidential Value Endpoints
//!
//! 평문 금액을 암호화하고, 암호화된 상태로 연산함.
//! 응답은 항상 새 EncodedValue (입력 값은 변경되지 않음).
//! 연산 입력은 proof가 검증된 값만 받음 (결과에 새 proof가 붙기 때문)
//!
//! # Security Note
//!
//! - 요청 로그에 평문 금액을 남기지 않음
//! - decrypt는 프로덕션에서 평문을 반환하지 않음 (`reveal` 무시)

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::WireValue;
use crate::{error::ApiError, AppState};

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct EncryptRequest {
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct DecryptRequest {
    pub value: WireValue,
    /// 평문 반환 여부 (개발 환경에서만 적용)
    #[serde(default)]
    pub reveal: bool,
}

#[derive(Debug, Serialize)]
pub struct DecryptResponse {
    /// 마스킹된 경우 None
    pub value: Option<f64>,
    pub masked: bool,
}

#[derive(Debug, Deserialize)]
pub struct BinaryOpRequest {
    pub a: WireValue,
    pub b: WireValue,
}

#[derive(Debug, Deserialize)]
pub struct MultiplyRequest {
    pub value: WireValue,
    pub scalar: f64,
}

// ============ Handlers ============

/// POST /confidential/encrypt
pub async fn encrypt(
    State(state): State<AppState>,
    Json(req): Json<EncryptRequest>,
) -> Result<Json<WireValue>, ApiError> {
    tracing::info!("Encrypting value");
    let encoded = state.engine.encrypt(req.value).await?;
    Ok(Json(WireValue::from(&encoded)))
}

/// POST /confidential/decrypt
///
/// proof는 검사하지 않음 (검증은 /proof/verify)
pub async fn decrypt(
    State(state): State<AppState>,
    Json(req): Json<DecryptRequest>,
) -> Result<Json<DecryptResponse>, ApiError> {
    let value = req.value.decode()?;
    let plain = state.engine.decrypt(&value).await?;

    let reveal = req.reveal && !state.config.is_production();
    Ok(Json(DecryptResponse {
        value: reveal.then_some(plain),
        masked: !reveal,
    }))
}

/// POST /confidential/add
pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<BinaryOpRequest>,
) -> Result<Json<WireValue>, ApiError> {
    let a = req.a.decode_verified(&state.engine).await?;
    let b = req.b.decode_verified(&state.engine).await?;
    let sum = state.engine.add(&a, &b).await?;
    Ok(Json(WireValue::from(&sum)))
}

/// POST /confidential/multiply
pub async fn multiply(
    State(state): State<AppState>,
    Json(req): Json<MultiplyRequest>,
) -> Result<Json<WireValue>, ApiError> {
    let value = req.value.decode_verified(&state.engine).await?;
    let product = state.engine.multiply(&value, req.scalar).await?;
    Ok(Json(WireValue::from(&product)))
}

/// POST /confidential/compare
///
/// 결과는 암호화된 1.0 (a > b) 또는 0.0
pub async fn compare(
    State(state): State<AppState>,
    Json(req): Json<BinaryOpRequest>,
) -> Result<Json<WireValue>, ApiError> {
    let a = req.a.decode_verified(&state.engine).await?;
    let b = req.b.decode_verified(&state.engine).await?;
    let flag = state.engine.compare(&a, &b).await?;
    Ok(Json(WireValue::from(&flag)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;

    async fn encrypt_wire(state: &AppState, value: f64) -> WireValue {
        let Json(wire) = encrypt(State(state.clone()), Json(EncryptRequest { value }))
            .await
            .unwrap();
        wire
    }

    async fn reveal(state: &AppState, value: WireValue) -> Option<f64> {
        let Json(resp) = decrypt(
            State(state.clone()),
            Json(DecryptRequest { value, reveal: true }),
        )
        .await
        .unwrap();
        resp.value
    }

    #[tokio::test]
    async fn test_encrypt_decrypt_roundtrip() {
        let (state, _) = test_support::state();
        let wire = encrypt_wire(&state, 1000.0).await;

        assert_eq!(reveal(&state, wire).await, Some(1000.0));
    }

    #[tokio::test]
    async fn test_decrypt_masked_without_reveal() {
        let (state, _) = test_support::state();
        let wire = encrypt_wire(&state, 42.0).await;

        let Json(resp) = decrypt(State(state), Json(DecryptRequest { value: wire, reveal: false }))
            .await
            .unwrap();
        assert!(resp.masked);
        assert!(resp.value.is_none());
    }

    #[tokio::test]
    async fn test_add_multiply_compare() {
        let (state, _) = test_support::state();
        let a = encrypt_wire(&state, 1000.0).await;
        let b = encrypt_wire(&state, 250.0).await;

        let Json(sum) = add(
            State(state.clone()),
            Json(BinaryOpRequest { a: a.clone(), b: b.clone() }),
        )
        .await
        .unwrap();
        assert_eq!(reveal(&state, sum).await, Some(1250.0));

        let Json(fee) = multiply(
            State(state.clone()),
            Json(MultiplyRequest { value: a.clone(), scalar: 0.01 }),
        )
        .await
        .unwrap();
        assert_eq!(reveal(&state, fee).await, Some(10.0));

        let Json(flag) = compare(State(state.clone()), Json(BinaryOpRequest { a: b, b: a }))
            .await
            .unwrap();
        assert_eq!(reveal(&state, flag).await, Some(0.0));
    }

    #[tokio::test]
    async fn test_operations_reject_unattested_inputs() {
        let (state, _) = test_support::state();
        let genuine = encrypt_wire(&state, 1.0).await;
        let forged = WireValue {
            payload: format!("0x{}", "13".repeat(32)),
            proof: format!("0x{}", "00".repeat(64)),
        };

        let err = add(
            State(state.clone()),
            Json(BinaryOpRequest { a: forged.clone(), b: genuine }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::ProofRejected));

        let err = multiply(State(state), Json(MultiplyRequest { value: forged, scalar: 1.0 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ProofRejected));
    }

    #[tokio::test]
    async fn test_malformed_value_is_bad_request() {
        let (state, _) = test_support::state();
        let short = WireValue {
            payload: "0x00".into(),
            proof: format!("0x{}", "00".repeat(64)),
        };

        let err = decrypt(State(state), Json(DecryptRequest { value: short, reveal: true }))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
