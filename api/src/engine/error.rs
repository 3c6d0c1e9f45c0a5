//! Engine error types
//!
//! Verification is not an error channel: `verify_proof` returns `bool`.

use thiserror::Error;

/// Confidential engine 에러
///
/// 모든 연산은 원자적: 완전한 EncodedValue를 반환하거나 에러를 반환.
/// 에러 메시지에는 평문 값을 넣지 않음.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// 백엔드 셋업(키/파라미터 로딩) 실패. 다음 호출에서 재시도됨
    #[error("Engine initialization failed: {0}")]
    Initialization(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Proof generation failed: {0}")]
    ProofGeneration(String),

    /// 붙어 있는 proof가 검증되지 않아 재발급 거부
    #[error("Attached proof does not verify")]
    ProofRejected,

    /// wire에서 받은 값의 길이가 맞지 않음
    #[error("Malformed {field}: expected {expected} bytes, got {actual}")]
    Malformed {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl EngineError {
    /// 초기화 실패를 호출한 연산의 에러 종류로 감싸기
    pub(crate) fn wrap_init(self, wrap: fn(String) -> EngineError) -> EngineError {
        match self {
            EngineError::Initialization(msg) => wrap(format!("initialization failed: {}", msg)),
            other => other,
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_init_maps_initialization_only() {
        let wrapped = EngineError::Initialization("no params".into()).wrap_init(EngineError::Encryption);
        assert_eq!(
            wrapped,
            EngineError::Encryption("initialization failed: no params".into())
        );

        let untouched = EngineError::Decryption("bad".into()).wrap_init(EngineError::Encryption);
        assert_eq!(untouched, EngineError::Decryption("bad".into()));
    }

    #[test]
    fn test_malformed_message() {
        let err = EngineError::Malformed { field: "payload", expected: 32, actual: 8 };
        assert_eq!(err.to_string(), "Malformed payload: expected 32 bytes, got 8");
    }
}
