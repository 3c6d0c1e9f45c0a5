//! Secure Equity Vault API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client (Frontend)                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /health  /confidential/*  /proof/*  /marketplace/*     ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Engine Layer                          ││
//! │  │  ConfidentialEngine (CipherBackend + ProofSystem)       ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                  Submission Layer                        ││
//! │  │  ContractSubmitter → RpcSender | InMemorySender         ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Secure Equity Vault Contract (Ethereum)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equity_vault_api::{
    chain::{InMemorySender, RpcSender, TransactionSender},
    routes, AppState, Config, ConfidentialEngine, ContractSubmitter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=debug,hyper=warn 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "equity_vault_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Secure Equity Vault API Server");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("📋 Configuration loaded ({:?})", config.environment);

    // 엔진 생성. 초기화 실패해도 서버는 시작하고 첫 요청에서 재시도
    let engine = ConfidentialEngine::new(&config.engine_config());
    match engine.initialize().await {
        Ok(()) => tracing::info!("🔐 Confidential engine initialized"),
        Err(e) => tracing::warn!("⚠️  Confidential engine not ready: {}", e),
    }

    // 전송 방식 선택
    let sender: Arc<dyn TransactionSender> = match config.sender_address {
        Some(from) => Arc::new(RpcSender::new(&config.eth_rpc_url, from, config.chain_id)?),
        None => {
            tracing::warn!("SENDER_ADDRESS not set, transactions are recorded in memory only");
            Arc::new(InMemorySender::new())
        }
    };
    let submitter = ContractSubmitter::new(config.contract_address, sender);
    tracing::info!(
        "⛓️  Submitter ready: {} → {:?}",
        submitter.sender_name(),
        submitter.contract()
    );

    // 앱 상태 구성
    let state = AppState {
        engine: Arc::new(engine),
        submitter: Arc::new(submitter),
        config: Arc::new(config.clone()),
    };

    // 라우터 구성
    let app = routes::create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🌐 Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
