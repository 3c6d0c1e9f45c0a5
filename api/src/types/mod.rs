//! Common Types Module
//!
//! 엔진과 컨트랙트 제출 어댑터가 공유하는 wire 타입 정의
//!
//! # Types
//! - `EncodedValue`: 암호화된 숫자 하나 (payload 32B + proof 64B)
//! - `VerifiedValue`: proof 검증을 통과한 EncodedValue (제출 전용, 1회성)

use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, EngineResult};

/// Payload 길이 (bytes)
pub const PAYLOAD_LEN: usize = 32;

/// Proof 길이 (bytes)
pub const PROOF_LEN: usize = 64;

/// 암호화된 숫자 값
///
/// # Wire Format
///
/// ```text
/// ┌──────────────────────────┬──────────────────────────────────────────┐
/// │   payload (32 bytes)     │            proof (64 bytes)              │
/// └──────────────────────────┴──────────────────────────────────────────┘
/// ```
///
/// 길이는 타입에 고정되어 있음. 검증되지 않은 바이트에서 만드는 경로는
/// `from_parts` 하나뿐이고, 길이가 다르면 거부함.
///
/// 생성 후 불변. 연산(add/multiply/compare)은 항상 새 인스턴스를 반환.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedValue {
    #[serde(with = "hex_array")]
    payload: [u8; PAYLOAD_LEN],
    #[serde(with = "hex_array")]
    proof: [u8; PROOF_LEN],
}

impl EncodedValue {
    pub(crate) fn new(payload: [u8; PAYLOAD_LEN], proof: [u8; PROOF_LEN]) -> Self {
        Self { payload, proof }
    }

    /// 외부(wire)에서 받은 바이트로 생성
    ///
    /// 길이가 맞지 않으면 `EngineError::Malformed`
    pub fn from_parts(payload: &[u8], proof: &[u8]) -> EngineResult<Self> {
        let payload: [u8; PAYLOAD_LEN] = payload.try_into().map_err(|_| EngineError::Malformed {
            field: "payload",
            expected: PAYLOAD_LEN,
            actual: payload.len(),
        })?;
        let proof: [u8; PROOF_LEN] = proof.try_into().map_err(|_| EngineError::Malformed {
            field: "proof",
            expected: PROOF_LEN,
            actual: proof.len(),
        })?;

        Ok(Self { payload, proof })
    }

    pub fn payload(&self) -> &[u8; PAYLOAD_LEN] {
        &self.payload
    }

    pub fn proof(&self) -> &[u8; PROOF_LEN] {
        &self.proof
    }

    /// 같은 payload에 다른 proof를 붙인 새 값
    pub fn with_proof(&self, proof: [u8; PROOF_LEN]) -> Self {
        Self {
            payload: self.payload,
            proof,
        }
    }
}

// payload/proof 내용은 로그에 남기지 않음
impl std::fmt::Debug for EncodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedValue")
            .field("payload_len", &PAYLOAD_LEN)
            .field("proof_len", &PROOF_LEN)
            .finish()
    }
}

/// Proof 검증을 통과한 값
///
/// `ConfidentialEngine::attest`로만 생성 가능. Clone 불가 → 제출 어댑터가
/// 소비(move)하면 끝. 다시 제출하려면 다시 검증해야 함.
#[derive(Debug, PartialEq, Eq)]
pub struct VerifiedValue(EncodedValue);

impl VerifiedValue {
    pub(crate) fn new(value: EncodedValue) -> Self {
        Self(value)
    }

    pub fn payload(&self) -> &[u8; PAYLOAD_LEN] {
        self.0.payload()
    }

    pub fn proof(&self) -> &[u8; PROOF_LEN] {
        self.0.proof()
    }
}

/// `0x` 접두사 hex 문자열 <-> 고정 길이 바이트 배열
pub mod hex_array {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(D::Error::custom)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected {} bytes, got {}", N, len)))
    }
}

/// `0x` 접두사 hex 문자열 파싱 (길이 제한 없음)
pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s.trim_start_matches("0x"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_accepts_exact_lengths() {
        let value = EncodedValue::from_parts(&[1u8; 32], &[2u8; 64]).unwrap();
        assert_eq!(value.payload(), &[1u8; 32]);
        assert_eq!(value.proof(), &[2u8; 64]);
    }

    #[test]
    fn test_from_parts_rejects_short_payload() {
        let err = EncodedValue::from_parts(&[1u8; 31], &[2u8; 64]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Malformed { field: "payload", expected: 32, actual: 31 }
        ));
    }

    #[test]
    fn test_from_parts_rejects_long_proof() {
        let err = EncodedValue::from_parts(&[1u8; 32], &[2u8; 65]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Malformed { field: "proof", expected: 64, actual: 65 }
        ));
    }

    #[test]
    fn test_json_is_prefixed_hex() {
        let value = EncodedValue::from_parts(&[0xAB; 32], &[0x01; 64]).unwrap();
        let json = serde_json::to_value(&value).unwrap();

        let payload = json["payload"].as_str().unwrap();
        assert!(payload.starts_with("0xabab"));
        assert_eq!(payload.len(), 2 + 64);

        let back: EncodedValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_json_rejects_wrong_length() {
        let json = serde_json::json!({
            "payload": format!("0x{}", "00".repeat(8)),
            "proof": format!("0x{}", "00".repeat(64)),
        });
        assert!(serde_json::from_value::<EncodedValue>(json).is_err());
    }

    #[test]
    fn test_debug_hides_bytes() {
        let value = EncodedValue::from_parts(&[0xAB; 32], &[0x01; 64]).unwrap();
        let debug = format!("{:?}", value);
        assert!(!debug.contains("171"));
        assert!(debug.contains("payload_len"));
    }
}
