//! Marketplace Submission Endpoints
//!
//! 금액 → 암호화 → proof 검증(attest) → ChainCall → 전송
//!
//! # Flow
//!
//! ```text
//! AmountInput ──┬── Plain(f64)          ─▶ engine.encrypt ─┐
//!               └── Encrypted(WireValue) ─▶ decode ─────────┤
//!                                                          ▼
//!                                                   engine.attest
//!                                                          │ VerifiedValue
//!                                                          ▼
//!                                        marketplace::* builder → submitter
//! ```
//!
//! 검증에 실패한 값은 트랜잭션 요청까지 가지 않음 (422 PROOF_REJECTED)

use axum::{
    extract::{Path, State},
    Json,
};
use ethers::types::H256;
use serde::{Deserialize, Serialize};

use super::WireValue;
use crate::{
    chain::{marketplace, PendingTransaction, TransactionStatus},
    error::ApiError,
    types::VerifiedValue,
    AppState,
};

// ============ Request/Response Types ============

/// 평문 금액 또는 이미 암호화된 값
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Plain(f64),
    Encrypted(WireValue),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub asset_type: String,
    pub total_value: AmountInput,
    pub price_per_share: AmountInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestRequest {
    pub amount: AmountInput,
    /// 함께 보낼 ETH. 생략하면 평문 amount 사용
    #[serde(default)]
    pub amount_eth: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolRequest {
    pub total_liquidity: AmountInput,
    pub interest_rate: AmountInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub amount: AmountInput,
    pub collateral_value: AmountInput,
    /// 대출 기간 (일)
    pub term: u64,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub transaction: PendingTransaction,
    pub sender: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TransactionStatusResponse {
    pub hash: H256,
    pub status: TransactionStatus,
}

// ============ Helpers ============

/// 금액 입력을 제출 가능한 값으로 변환
///
/// 평문도 encrypt 후 반드시 attest를 거침
async fn verified_amount(state: &AppState, input: &AmountInput) -> Result<VerifiedValue, ApiError> {
    let encoded = match input {
        AmountInput::Plain(value) => state.engine.encrypt(*value).await?,
        AmountInput::Encrypted(wire) => wire.decode()?,
    };

    state
        .engine
        .attest(&encoded)
        .await
        .ok_or(ApiError::ProofRejected)
}

async fn submit(
    state: &AppState,
    call: crate::chain::ChainCall,
) -> Result<Json<SubmitResponse>, ApiError> {
    let transaction = state.submitter.submit(call).await?;
    Ok(Json(SubmitResponse {
        transaction,
        sender: state.submitter.sender_name(),
    }))
}

// ============ Handlers ============

/// POST /marketplace/assets
pub async fn create_asset(
    State(state): State<AppState>,
    Json(req): Json<CreateAssetRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    tracing::info!(asset_type = %req.asset_type, "Creating asset");

    let total_value = verified_amount(&state, &req.total_value).await?;
    let price_per_share = verified_amount(&state, &req.price_per_share).await?;

    let call = marketplace::create_asset(
        &req.name,
        &req.description,
        &req.asset_type,
        total_value,
        price_per_share,
    )?;
    submit(&state, call).await
}

/// POST /marketplace/assets/:id/invest
pub async fn invest_in_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<u64>,
    Json(req): Json<InvestRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    tracing::info!(asset_id, "Investing in asset");

    let amount_eth = match (&req.amount, req.amount_eth) {
        (_, Some(eth)) => eth,
        (AmountInput::Plain(value), None) => *value,
        (AmountInput::Encrypted(_), None) => {
            return Err(ApiError::ValidationError(
                "amountEth is required when amount is already encrypted".to_string(),
            ))
        }
    };

    let amount = verified_amount(&state, &req.amount).await?;
    let call = marketplace::invest_in_asset(asset_id, amount, amount_eth)?;
    submit(&state, call).await
}

/// POST /marketplace/pools
pub async fn create_lending_pool(
    State(state): State<AppState>,
    Json(req): Json<CreatePoolRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    tracing::info!("Creating lending pool");

    let total_liquidity = verified_amount(&state, &req.total_liquidity).await?;
    let interest_rate = verified_amount(&state, &req.interest_rate).await?;

    submit(&state, marketplace::create_lending_pool(total_liquidity, interest_rate)).await
}

/// POST /marketplace/pools/:id/borrow
pub async fn borrow_from_pool(
    State(state): State<AppState>,
    Path(pool_id): Path<u64>,
    Json(req): Json<BorrowRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    tracing::info!(pool_id, term = req.term, "Borrowing from pool");

    let amount = verified_amount(&state, &req.amount).await?;
    let collateral_value = verified_amount(&state, &req.collateral_value).await?;

    submit(
        &state,
        marketplace::borrow_from_pool(pool_id, amount, collateral_value, req.term),
    )
    .await
}

/// GET /marketplace/tx/:hash
pub async fn transaction_status(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<TransactionStatusResponse>, ApiError> {
    let hash: H256 = hash
        .parse()
        .map_err(|_| ApiError::BadRequest("transaction hash must be 32-byte hex".to_string()))?;

    let status = state.submitter.status(hash).await?;
    Ok(Json(TransactionStatusResponse { hash, status }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;
    use ethers::types::U256;

    #[test]
    fn test_amount_input_untagged() {
        let plain: AmountInput = serde_json::from_str("1000.5").unwrap();
        assert!(matches!(plain, AmountInput::Plain(v) if v == 1000.5));

        let encrypted: AmountInput =
            serde_json::from_str(r#"{"payload":"0x00","proof":"0x00"}"#).unwrap();
        assert!(matches!(encrypted, AmountInput::Encrypted(_)));
    }

    #[tokio::test]
    async fn test_create_asset_submits() {
        let (state, sender) = test_support::state();

        let Json(resp) = create_asset(
            State(state),
            Json(CreateAssetRequest {
                name: "Test Asset".into(),
                description: "A test asset created with encrypted data".into(),
                asset_type: "EQUITY".into(),
                total_value: AmountInput::Plain(1000.0),
                price_per_share: AmountInput::Plain(10.0),
            }),
        )
        .await
        .unwrap();

        assert_eq!(resp.transaction.function, "createAsset");
        assert_eq!(resp.sender, "in-memory");
        assert!(sender.request(resp.transaction.hash).await.is_some());
    }

    #[tokio::test]
    async fn test_invest_uses_plain_amount_as_value() {
        let (state, sender) = test_support::state();

        let Json(resp) = invest_in_asset(
            State(state),
            Path(0),
            Json(InvestRequest {
                amount: AmountInput::Plain(1.0),
                amount_eth: None,
            }),
        )
        .await
        .unwrap();

        let request = sender.request(resp.transaction.hash).await.unwrap();
        assert_eq!(request.value, Some(U256::exp10(18)));
    }

    #[tokio::test]
    async fn test_invest_encrypted_requires_eth_amount() {
        let (state, sender) = test_support::state();
        let encoded = state.engine.encrypt(1.0).await.unwrap();

        let err = invest_in_asset(
            State(state),
            Path(0),
            Json(InvestRequest {
                amount: AmountInput::Encrypted(WireValue::from(&encoded)),
                amount_eth: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(sender.len().await, 0);
    }

    #[tokio::test]
    async fn test_forged_proof_never_reaches_sender() {
        let (state, sender) = test_support::state();
        let encoded = state.engine.encrypt(5000.0).await.unwrap();
        let forged = encoded.with_proof([0x42; 64]);

        let err = borrow_from_pool(
            State(state.clone()),
            Path(1),
            Json(BorrowRequest {
                amount: AmountInput::Encrypted(WireValue::from(&forged)),
                collateral_value: AmountInput::Plain(8000.0),
                term: 30,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::ProofRejected));
        assert_eq!(sender.len().await, 0);
    }

    #[tokio::test]
    async fn test_transaction_status_lookup() {
        let (state, _) = test_support::state();

        let Json(resp) = create_lending_pool(
            State(state.clone()),
            Json(CreatePoolRequest {
                total_liquidity: AmountInput::Plain(1_000_000.0),
                interest_rate: AmountInput::Plain(5.5),
            }),
        )
        .await
        .unwrap();

        let hash = format!("{:?}", resp.transaction.hash);
        let Json(status) = transaction_status(State(state.clone()), Path(hash)).await.unwrap();
        assert_eq!(status.status, TransactionStatus::Pending);

        let err = transaction_status(State(state), Path("0x1234".into())).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
