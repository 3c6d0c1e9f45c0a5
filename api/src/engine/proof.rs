//! Proof Subsystem
//!
//! EncodedValue에 붙는 64-byte attestation 생성/검증
//!
//! # Interview Q&A
//!
//! Q: placeholder proof의 문제는?
//! A: 랜덤 64 bytes는 payload와 아무 관련이 없음
//!    - verify는 길이만 확인 → payload를 바꿔치기해도 통과
//!    - "verified == authentic" 가정을 할 수 없음
//!
//! Q: KeccakAttestation은 무엇을 보장하는가?
//! A: proof = nonce || Keccak256(domain || key || payload || nonce)
//!    - 같은 key를 가진 엔진이 만든 payload에만 유효
//!    - payload 1 bit만 바뀌어도 검증 실패
//!    - 값의 범위(range)는 증명하지 않음 (ZK range proof 아님)

use rand::{rngs::OsRng, RngCore};
use sha3::{Digest, Keccak256};

use super::error::{EngineError, EngineResult};
use crate::types::{PAYLOAD_LEN, PROOF_LEN};

/// Keccak 태그 도메인 분리 상수
const ATTESTATION_DOMAIN: &[u8] = b"equity-vault/attestation/v1";

const NONCE_LEN: usize = 32;

/// Proof 시스템 인터페이스
pub trait ProofSystem: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(&self, payload: &[u8; PAYLOAD_LEN]) -> EngineResult<[u8; PROOF_LEN]>;

    /// 절대 에러를 던지지 않음. 길이가 64가 아니면 false
    fn verify(&self, payload: &[u8; PAYLOAD_LEN], proof: &[u8]) -> bool;
}

/// 설정으로 선택하는 proof 스킴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofScheme {
    /// payload에 바인딩된 Keccak attestation (기본값)
    Keccak,
    /// 랜덤 bytes, 길이만 검증
    Random,
}

impl std::str::FromStr for ProofScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keccak" | "bound" => Ok(ProofScheme::Keccak),
            "random" | "placeholder" => Ok(ProofScheme::Random),
            other => Err(format!("Unknown proof scheme: {}", other)),
        }
    }
}

impl std::fmt::Display for ProofScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofScheme::Keccak => write!(f, "keccak"),
            ProofScheme::Random => write!(f, "random"),
        }
    }
}

/// Placeholder: 균등 랜덤 64 bytes
#[derive(Debug, Default, Clone)]
pub struct RandomAttestation;

impl ProofSystem for RandomAttestation {
    fn name(&self) -> &'static str {
        "random (unbound)"
    }

    fn generate(&self, _payload: &[u8; PAYLOAD_LEN]) -> EngineResult<[u8; PROOF_LEN]> {
        let mut proof = [0u8; PROOF_LEN];
        OsRng
            .try_fill_bytes(&mut proof)
            .map_err(|e| EngineError::ProofGeneration(e.to_string()))?;
        Ok(proof)
    }

    fn verify(&self, _payload: &[u8; PAYLOAD_LEN], proof: &[u8]) -> bool {
        proof.len() == PROOF_LEN
    }
}

/// Payload 바인딩 attestation
///
/// ```text
/// proof[0..32]  = nonce (OsRng)
/// proof[32..64] = Keccak256(domain || key || payload || nonce)
/// ```
#[derive(Clone)]
pub struct KeccakAttestation {
    key: [u8; 32],
}

impl KeccakAttestation {
    /// 임의 길이 key material → 32-byte key
    pub fn new(key_material: &[u8]) -> Self {
        Self {
            key: Keccak256::digest(key_material).into(),
        }
    }

    fn tag(&self, payload: &[u8; PAYLOAD_LEN], nonce: &[u8]) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(ATTESTATION_DOMAIN);
        hasher.update(self.key);
        hasher.update(payload);
        hasher.update(nonce);
        hasher.finalize().into()
    }
}

impl std::fmt::Debug for KeccakAttestation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeccakAttestation").finish_non_exhaustive()
    }
}

impl ProofSystem for KeccakAttestation {
    fn name(&self) -> &'static str {
        "keccak (payload-bound)"
    }

    fn generate(&self, payload: &[u8; PAYLOAD_LEN]) -> EngineResult<[u8; PROOF_LEN]> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| EngineError::ProofGeneration(e.to_string()))?;

        let mut proof = [0u8; PROOF_LEN];
        proof[..NONCE_LEN].copy_from_slice(&nonce);
        proof[NONCE_LEN..].copy_from_slice(&self.tag(payload, &nonce));
        Ok(proof)
    }

    fn verify(&self, payload: &[u8; PAYLOAD_LEN], proof: &[u8]) -> bool {
        if proof.len() != PROOF_LEN {
            return false;
        }
        let (nonce, tag) = proof.split_at(NONCE_LEN);
        let expected = self.tag(payload, nonce);

        // 바이트 단위 early-return 없이 비교
        expected
            .iter()
            .zip(tag)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
