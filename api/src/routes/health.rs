//! Health Check Endpoint
//!
//! # Interview Q&A
//!
//! Q: Health check 엔드포인트는 왜 필요한가?
//! A: 3가지 용도
//!    1. 로드밸런서 헬스체크 (ALB, nginx)
//!    2. Kubernetes liveness/readiness probe
//!    3. 모니터링 시스템 연동 (Prometheus, Datadog)
//!
//! Q: 엔진 초기화 상태도 체크하는 이유는?
//! A: "깊은 헬스체크"(deep health check) 패턴
//!    - 단순 200 OK: 프로세스 살아있음
//!    - 엔진 초기화 여부: 실제로 암호화 요청을 처리할 수 있는 상태
//!    - 헬스체크가 초기화를 한 번 더 시도 → 일시 장애 후 자동 회복

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{engine::EngineInfo, AppState};

/// Health check 응답
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: EngineInfo,
    pub submitter: SubmitterStatus,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct SubmitterStatus {
    pub sender: &'static str,
    pub contract: String,
}

/// GET /health
///
/// 서버 및 엔진 상태 확인
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ready = state.engine.initialize().await.is_ok();

    Json(HealthResponse {
        status: if ready { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.engine.info(),
        submitter: SubmitterStatus {
            sender: state.submitter.sender_name(),
            contract: format!("{:?}", state.submitter.contract()),
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
