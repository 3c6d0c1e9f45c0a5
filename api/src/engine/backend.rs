//! Cipher Backend
//!
//! 평문 f64 <-> 32-byte payload 변환을 담당하는 교체 가능한 레이어
//!
//! # Interview Q&A
//!
//! Q: 왜 trait으로 분리했는가?
//! A: 현재 스킴은 XOR 마스킹 placeholder
//!    - 실제 FHE(예: lattice 기반) 라이브러리로 교체해도 호출자는 그대로
//!    - add/scale/greater_than 기본 구현은 decrypt → 연산 → encrypt
//!    - 실제 스킴은 override해서 평문 노출 없이 계산
//!
//! Q: decrypt-then-reencrypt 방식의 한계는?
//! A: 엔진이 신뢰 환경에서 돌아갈 때만 허용 가능
//!    - 서버가 중간 평문을 보게 됨
//!    - 진짜 동형 연산은 훨씬 비싸지만 외부 계약(입출력)은 동일

use async_trait::async_trait;

use super::error::{EngineError, EngineResult};
use crate::types::PAYLOAD_LEN;

/// 의미 있는 payload 바이트 수 (f64 하나)
pub const VALUE_BYTES: usize = 8;

/// 기본 마스크 바이트
pub const DEFAULT_MASK: u8 = 0xAA;

/// 암호화 백엔드 인터페이스
#[async_trait]
pub trait CipherBackend: Send + Sync {
    /// 스킴 이름 (로그/health 용)
    fn scheme(&self) -> &'static str;

    /// 키/파라미터 로딩. 엔진이 성공할 때까지 한 번만 실행을 보장
    async fn setup(&self) -> EngineResult<()>;

    fn encode(&self, value: f64) -> EngineResult<[u8; PAYLOAD_LEN]>;

    fn decode(&self, payload: &[u8; PAYLOAD_LEN]) -> EngineResult<f64>;

    fn add(
        &self,
        a: &[u8; PAYLOAD_LEN],
        b: &[u8; PAYLOAD_LEN],
    ) -> EngineResult<[u8; PAYLOAD_LEN]> {
        self.encode(self.decode(a)? + self.decode(b)?)
    }

    fn scale(&self, a: &[u8; PAYLOAD_LEN], scalar: f64) -> EngineResult<[u8; PAYLOAD_LEN]> {
        self.encode(self.decode(a)? * scalar)
    }

    /// a > b 이면 1.0, 아니면 0.0 (동점은 0.0)
    fn greater_than(
        &self,
        a: &[u8; PAYLOAD_LEN],
        b: &[u8; PAYLOAD_LEN],
    ) -> EngineResult<[u8; PAYLOAD_LEN]> {
        let flag = if self.decode(a)? > self.decode(b)? { 1.0 } else { 0.0 };
        self.encode(flag)
    }
}

/// XOR 마스킹 placeholder 스킴
///
/// # Layout
///
/// ```text
/// payload[0..8]   = f64 little-endian bytes ^ mask
/// payload[8..32]  = 0x00 (unused)
/// ```
///
/// NOT SECURE. 마스크 바이트가 곧 키. 32 byte 중 8 byte만 의미 있음.
#[derive(Debug, Clone)]
pub struct XorMaskBackend {
    mask: u8,
}

impl XorMaskBackend {
    pub fn new(mask: u8) -> Self {
        Self { mask }
    }
}

impl Default for XorMaskBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MASK)
    }
}

#[async_trait]
impl CipherBackend for XorMaskBackend {
    fn scheme(&self) -> &'static str {
        "xor-mask (placeholder)"
    }

    async fn setup(&self) -> EngineResult<()> {
        // 0x00 마스크 = 평문 그대로 노출
        if self.mask == 0 {
            return Err(EngineError::Initialization(
                "mask byte must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    fn encode(&self, value: f64) -> EngineResult<[u8; PAYLOAD_LEN]> {
        let mut payload = [0u8; PAYLOAD_LEN];
        for (slot, byte) in payload.iter_mut().zip(value.to_le_bytes()) {
            *slot = byte ^ self.mask;
        }
        Ok(payload)
    }

    fn decode(&self, payload: &[u8; PAYLOAD_LEN]) -> EngineResult<f64> {
        let mut bytes = [0u8; VALUE_BYTES];
        for (slot, byte) in bytes.iter_mut().zip(payload.iter()) {
            *slot = byte ^ self.mask;
        }
        Ok(f64::from_le_bytes(bytes))
    }
}
