//! Chain Call Descriptor
//!
//! 함수 이름 + 순서 있는 인자 목록 → ABI calldata
//!
//! # Encoding
//!
//! ```text
//! calldata = keccak256("fn(type,...)")[0..4] || abi.encode(args...)
//!
//! Confidential(v) → bytes  (v.payload, 32 bytes)
//! InputProof      → bytes  (모든 Confidential 인자의 proof를 순서대로 이어붙임, 64 * n bytes)
//! ```

use ethers::abi::{self, Token};
use ethers::types::U256;

use super::error::{SubmissionError, SubmissionResult};
use crate::types::VerifiedValue;

/// 컨트랙트 호출 인자
#[derive(Debug)]
pub enum CallArg {
    Uint(U256),
    Str(String),
    /// 검증된 암호화 값 (payload만 인자로 들어감)
    Confidential(VerifiedValue),
    /// Confidential 인자들의 proof 묶음
    InputProof,
}

impl CallArg {
    fn abi_type(&self) -> &'static str {
        match self {
            CallArg::Uint(_) => "uint256",
            CallArg::Str(_) => "string",
            CallArg::Confidential(_) | CallArg::InputProof => "bytes",
        }
    }
}

/// 컨트랙트 호출 descriptor
///
/// `VerifiedValue`를 소비하므로 같은 검증 결과로 두 번 제출할 수 없음
#[derive(Debug)]
pub struct ChainCall {
    pub function: String,
    pub args: Vec<CallArg>,
    /// payable 호출 금액 (wei)
    pub value: Option<U256>,
    pub gas_limit: Option<u64>,
}

impl ChainCall {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: Vec::new(),
            value: None,
            gas_limit: None,
        }
    }

    pub fn uint(mut self, value: impl Into<U256>) -> Self {
        self.args.push(CallArg::Uint(value.into()));
        self
    }

    pub fn string(mut self, value: impl Into<String>) -> Self {
        self.args.push(CallArg::Str(value.into()));
        self
    }

    pub fn confidential(mut self, value: VerifiedValue) -> Self {
        self.args.push(CallArg::Confidential(value));
        self
    }

    pub fn input_proof(mut self) -> Self {
        self.args.push(CallArg::InputProof);
        self
    }

    pub fn payable(mut self, wei: U256) -> Self {
        self.value = Some(wei);
        self
    }

    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.gas_limit = Some(gas);
        self
    }

    /// Canonical signature, e.g. `investInAsset(uint256,bytes,bytes)`
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.args.iter().map(CallArg::abi_type).collect();
        format!("{}({})", self.function, types.join(","))
    }

    pub fn selector(&self) -> [u8; 4] {
        ethers::utils::id(self.signature())
    }

    /// Confidential 인자 proof들을 인자 순서대로 연결
    pub fn input_proof_bytes(&self) -> Vec<u8> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                CallArg::Confidential(v) => Some(v.proof().as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    fn validate(&self) -> SubmissionResult<()> {
        if self.function.is_empty() {
            return Err(SubmissionError::InvalidCall("function name is empty".to_string()));
        }

        let confidential = self
            .args
            .iter()
            .filter(|a| matches!(a, CallArg::Confidential(_)))
            .count();
        let proofs = self
            .args
            .iter()
            .filter(|a| matches!(a, CallArg::InputProof))
            .count();

        match (confidential, proofs) {
            (0, 0) => Ok(()),
            (c, 1) if c > 0 => Ok(()),
            (0, _) => Err(SubmissionError::InvalidCall(
                "input proof without confidential arguments".to_string(),
            )),
            _ => Err(SubmissionError::InvalidCall(format!(
                "expected exactly one input proof for {} confidential argument(s), got {}",
                confidential, proofs
            ))),
        }
    }

    /// selector || ABI-encoded arguments
    pub fn encode(&self) -> SubmissionResult<Vec<u8>> {
        self.validate()?;

        let proof_bytes = self.input_proof_bytes();
        let tokens: Vec<Token> = self
            .args
            .iter()
            .map(|arg| match arg {
                CallArg::Uint(v) => Token::Uint(*v),
                CallArg::Str(s) => Token::String(s.clone()),
                CallArg::Confidential(v) => Token::Bytes(v.payload().to_vec()),
                CallArg::InputProof => Token::Bytes(proof_bytes.clone()),
            })
            .collect();

        let mut data = self.selector().to_vec();
        data.extend(abi::encode(&tokens));
        Ok(data)
    }
}
