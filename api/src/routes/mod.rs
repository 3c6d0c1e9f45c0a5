//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health` - 헬스 체크
//! - `/confidential/*` - 암호화/복호화/암호화 연산
//! - `/proof/*` - attestation 생성/검증
//! - `/marketplace/*` - 컨트랙트 호출 제출

pub mod confidential;
pub mod health;
pub mod marketplace;
pub mod proof;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{
    engine::ConfidentialEngine,
    error::ApiError,
    types::{decode_hex, EncodedValue},
    AppState,
};

/// JSON으로 주고받는 암호화 값 (`0x` hex)
///
/// 길이 검증은 `EncodedValue::from_parts`에서 → 잘못되면 400
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireValue {
    pub payload: String,
    pub proof: String,
}

impl WireValue {
    pub fn decode(&self) -> Result<EncodedValue, ApiError> {
        let payload = decode_hex(&self.payload)
            .map_err(|e| ApiError::BadRequest(format!("payload is not hex: {}", e)))?;
        let proof = decode_hex(&self.proof)
            .map_err(|e| ApiError::BadRequest(format!("proof is not hex: {}", e)))?;

        Ok(EncodedValue::from_parts(&payload, &proof)?)
    }

    /// decode + 붙어 있는 proof 검증
    ///
    /// 연산 결과에는 새 proof가 찍히므로 입력이 엔진 출력인지 먼저 확인
    pub async fn decode_verified(&self, engine: &ConfidentialEngine) -> Result<EncodedValue, ApiError> {
        let value = self.decode()?;
        if !engine.verify_proof(&value, value.proof()).await {
            return Err(ApiError::ProofRejected);
        }
        Ok(value)
    }
}

impl From<&EncodedValue> for WireValue {
    fn from(value: &EncodedValue) -> Self {
        Self {
            payload: format!("0x{}", hex::encode(value.payload())),
            proof: format!("0x{}", hex::encode(value.proof())),
        }
    }
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET  /health                          - 서버/엔진 상태
///
/// POST /confidential/encrypt            - 평문 → EncodedValue
/// POST /confidential/decrypt            - EncodedValue → 평문 (개발 환경만 노출)
/// POST /confidential/add                - 암호화 덧셈
/// POST /confidential/multiply           - 암호화 스칼라 곱
/// POST /confidential/compare            - 암호화 비교 (a > b)
///
/// POST /proof/generate                  - 새 proof 생성
/// POST /proof/verify                    - proof 검증
///
/// POST /marketplace/assets              - createAsset
/// POST /marketplace/assets/:id/invest   - investInAsset (payable)
/// POST /marketplace/pools               - createLendingPool
/// POST /marketplace/pools/:id/borrow    - borrowFromPool
/// GET  /marketplace/tx/:hash            - 트랜잭션 상태
/// ```
pub fn create_router(state: AppState) -> Router {
    // CORS 설정
    // 프로덕션에서는 ALLOWED_ORIGINS만 허용
    // 개발 환경에서는 localhost 허용
    let cors = if state.config.is_production() {
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = [
            "http://localhost:5173", // Vite dev server
            "http://localhost:3000",
            "http://127.0.0.1:5173",
        ]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // Confidential values
        .route("/confidential/encrypt", post(confidential::encrypt))
        .route("/confidential/decrypt", post(confidential::decrypt))
        .route("/confidential/add", post(confidential::add))
        .route("/confidential/multiply", post(confidential::multiply))
        .route("/confidential/compare", post(confidential::compare))

        // Proofs
        .route("/proof/generate", post(proof::generate_proof))
        .route("/proof/verify", post(proof::verify_proof))

        // Marketplace
        .route("/marketplace/assets", post(marketplace::create_asset))
        .route("/marketplace/assets/:id/invest", post(marketplace::invest_in_asset))
        .route("/marketplace/pools", post(marketplace::create_lending_pool))
        .route("/marketplace/pools/:id/borrow", post(marketplace::borrow_from_pool))
        .route("/marketplace/tx/:hash", get(marketplace::transaction_status))

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}
