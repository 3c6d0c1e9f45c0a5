//! Secure Equity Vault API Library
//!
//! # Overview
//!
//! 마켓플레이스에 제출되는 금융 값(자산 가치, 주당 가격, 투자/대출 금액)을
//! 암호화하고 proof를 붙여 컨트랙트 호출로 전송하는 백엔드.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────────────┐  ┌─────────┐          │
//! │  │ Routes  │─▶│ConfidentialEngine│  │  Types  │          │
//! │  └────┬────┘  └────────┬────────┘  └─────────┘          │
//! │       │                │ VerifiedValue                   │
//! │       │                ▼                                 │
//! │       └──────▶ ┌─────────────────┐                      │
//! │                │ContractSubmitter│                      │
//! │                └────────┬────────┘                      │
//! └─────────────────────────┼────────────────────────────────┘
//!                           │
//!                           ▼
//!                  ┌────────────────┐
//!                  │  Marketplace   │
//!                  │   Contract     │
//!                  └────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: HTTP 에러 매핑
//! - `engine`: 암호화/복호화/동형 연산/proof
//! - `chain`: 컨트랙트 호출 인코딩 및 전송
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `types`: EncodedValue / VerifiedValue
//!
//! ## Usage
//!
//! ```rust,ignore
//! use equity_vault_api::{config::Config, engine::ConfidentialEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let engine = ConfidentialEngine::new(&config.engine_config());
//!
//!     let price = engine.encrypt(1000.0).await?;
//!     let verified = engine.attest(&price).await;
//!     // ... ChainCall 구성 후 제출
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod routes;
pub mod types;

// Re-exports for convenience
pub use chain::ContractSubmitter;
pub use config::Config;
pub use engine::ConfidentialEngine;
pub use error::ApiError;

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConfidentialEngine>,
    pub submitter: Arc<ContractSubmitter>,
    pub config: Arc<Config>,
}
