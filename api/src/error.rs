//! Error Handling Module
//!
//! Provides type-safe error handling with proper HTTP status code mapping.
//! Domain errors (`EngineError`, `SubmissionError`) are converted here so
//! handlers can use `?` directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::chain::SubmissionError;
use crate::engine::EngineError;

/// API 에러 타입
///
/// # Design Decision
///
/// 각 에러 variant는 적절한 HTTP 상태 코드에 매핑됨
/// - 입력 형식 오류: 400
/// - 암호화 연산 실패 / proof 거부: 422
/// - 엔진 초기화 실패 / 전송 노드 장애: 503
///
/// 평문 금액이나 key material은 응답에 넣지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ============ 404 Not Found ============
    #[error("Resource not found: {0}")]
    NotFound(String),

    // ============ 422 Unprocessable Entity ============
    #[error("Proof rejected")]
    ProofRejected,

    #[error("Confidential operation failed: {0}")]
    EngineFailure(String),

    // ============ 503 Service Unavailable ============
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ProofRejected | ApiError::EngineFailure(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, details) = match &self {
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg.clone(), None),
            ApiError::ValidationError(msg) => (
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(msg.clone()),
            ),
            ApiError::NotFound(resource) => {
                ("NOT_FOUND", format!("{} not found", resource), None)
            }
            ApiError::ProofRejected => (
                "PROOF_REJECTED",
                "Proof verification failed".to_string(),
                None,
            ),
            ApiError::EngineFailure(msg) => (
                "CONFIDENTIAL_OPERATION_FAILED",
                "Confidential operation failed".to_string(),
                Some(msg.clone()),
            ),
            ApiError::ServiceUnavailable(service) => (
                "SERVICE_UNAVAILABLE",
                format!("{} is currently unavailable", service),
                None,
            ),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Initialization(msg) => {
                tracing::error!("Confidential engine unavailable: {}", msg);
                ApiError::ServiceUnavailable("Confidential engine".to_string())
            }
            EngineError::Malformed { .. } => ApiError::ValidationError(err.to_string()),
            EngineError::ProofRejected => ApiError::ProofRejected,
            other => {
                tracing::warn!("Engine error: {}", other);
                ApiError::EngineFailure(other.to_string())
            }
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::InvalidCall(msg) => ApiError::BadRequest(msg),
            SubmissionError::UnknownTransaction(hash) => {
                ApiError::NotFound(format!("Transaction {}", hash))
            }
            SubmissionError::Transport(msg) => {
                tracing::error!("Transaction sender error: {}", msg);
                ApiError::ServiceUnavailable("Transaction sender".to_string())
            }
        }
    }
}
