//! Submission error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// 호출 descriptor가 잘못됨 (인자 구성, 금액 변환 등)
    #[error("Invalid contract call: {0}")]
    InvalidCall(String),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    /// RPC 전송/조회 실패
    #[error("Transport error: {0}")]
    Transport(String),
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;
