//! Confidential Value Engine
//!
//! 숫자 금융 값(자산 가치, 투자 금액, 대출 금액 등)을 온체인 제출 전에
//! 암호화하고, 표시용으로 복호화하고, 암호화된 상태에서 연산/비교함.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ConfidentialEngine                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  encrypt / decrypt / add / multiply / compare               │
//! │         │                                                   │
//! │         v                                                   │
//! │  ┌──────────────────┐        ┌────────────────────────┐    │
//! │  │  CipherBackend   │        │      ProofSystem       │    │
//! │  │  (XorMask, ...)  │        │  (Keccak / Random)     │    │
//! │  └──────────────────┘        └────────────────────────┘    │
//! │                                                             │
//! │  ready: OnceCell<()>  ← initialize() 한 번만 성공            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Interview Q&A
//!
//! Q: 왜 전역 싱글톤이 아니라 핸들인가?
//! A: main에서 생성해서 AppState로 주입 (Arc)
//!    - 테스트마다 독립된 엔진 (다른 키 material)
//!    - 숨겨진 전역 상태 없음
//!
//! Q: 동시에 initialize()가 여러 번 호출되면?
//! A: 진행 중인 시도 하나(`Shared` future)에 모두 합류
//!    - setup은 시도당 한 번만 실행, 합류한 호출자는 같은 결과를 받음
//!    - 성공하면 `ready` 셀이 채워지고 이후 호출은 즉시 반환
//!    - 실패하면 슬롯을 비움 → 시도가 끝난 뒤 들어온 호출자가 재시도

mod backend;
mod error;
mod proof;

pub use backend::{CipherBackend, XorMaskBackend, DEFAULT_MASK, VALUE_BYTES};
pub use error::{EngineError, EngineResult};
pub use proof::{KeccakAttestation, ProofScheme, ProofSystem, RandomAttestation};

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};

use crate::types::{EncodedValue, VerifiedValue, PAYLOAD_LEN, PROOF_LEN};

/// 개발용 attestation key (프로덕션에서는 ATTESTATION_KEY 필수)
pub const DEV_ATTESTATION_KEY: &str = "equity-vault-dev-attestation-key";

/// 엔진 설정 (키 material)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// XOR 마스크 바이트
    pub mask: u8,
    pub proof_scheme: ProofScheme,
    /// Keccak attestation에 섞이는 key
    pub attestation_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mask: DEFAULT_MASK,
            proof_scheme: ProofScheme::Keccak,
            attestation_key: DEV_ATTESTATION_KEY.to_string(),
        }
    }
}

/// 엔진 상태 요약 (health check 용)
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub cipher: &'static str,
    pub proof: &'static str,
    pub initialized: bool,
}

/// Confidential Value Engine 핸들
///
/// # Example
/// ```ignore
/// let engine = ConfidentialEngine::new(&EngineConfig::default());
/// let price = engine.encrypt(1000.0).await?;
/// let fee = engine.multiply(&price, 0.01).await?;
/// assert_eq!(engine.decrypt(&fee).await?, 10.0);
/// ```
pub struct ConfidentialEngine {
    backend: Arc<dyn CipherBackend>,
    proofs: Arc<dyn ProofSystem>,
    ready: OnceCell<()>,
    in_flight: Mutex<Option<InitAttempt>>,
}

/// 진행 중인 초기화 시도 (모든 합류자가 같은 결과를 관찰)
type InitAttempt = Shared<BoxFuture<'static, EngineResult<()>>>;

impl ConfidentialEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let proofs: Arc<dyn ProofSystem> = match config.proof_scheme {
            ProofScheme::Keccak => {
                Arc::new(KeccakAttestation::new(config.attestation_key.as_bytes()))
            }
            ProofScheme::Random => Arc::new(RandomAttestation),
        };

        Self::with_parts(Arc::new(XorMaskBackend::new(config.mask)), proofs)
    }

    /// 임의의 백엔드/proof 시스템 조합으로 생성
    pub fn with_parts(backend: Arc<dyn CipherBackend>, proofs: Arc<dyn ProofSystem>) -> Self {
        Self {
            backend,
            proofs,
            ready: OnceCell::new(),
            in_flight: Mutex::new(None),
        }
    }

    /// 백엔드 초기화 (idempotent)
    ///
    /// 동시에 호출되면 하나의 시도를 공유. 실패는 캐시하지 않음
    pub async fn initialize(&self) -> EngineResult<()> {
        if self.ready.initialized() {
            return Ok(());
        }

        let attempt = {
            let mut slot = self.in_flight.lock().await;
            if self.ready.initialized() {
                return Ok(());
            }
            match slot.as_ref() {
                Some(attempt) => attempt.clone(),
                None => {
                    let attempt = self.start_attempt();
                    *slot = Some(attempt.clone());
                    attempt
                }
            }
        };

        let result = attempt.clone().await;

        let mut slot = self.in_flight.lock().await;
        if result.is_ok() {
            // 이미 채워져 있으면 무시
            let _ = self.ready.set(());
        }
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&attempt)) {
            *slot = None;
        }

        result
    }

    fn start_attempt(&self) -> InitAttempt {
        let backend = Arc::clone(&self.backend);
        let proof = self.proofs.name();

        async move {
            tracing::info!(
                cipher = backend.scheme(),
                proof,
                "Initializing confidential engine..."
            );

            backend.setup().await.map_err(|e| {
                tracing::warn!("Confidential engine setup failed: {}", e);
                match e {
                    EngineError::Initialization(_) => e,
                    other => EngineError::Initialization(other.to_string()),
                }
            })?;

            tracing::info!("Confidential engine initialized");
            Ok::<(), EngineError>(())
        }
        .boxed()
        .shared()
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.initialized()
    }

    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            cipher: self.backend.scheme(),
            proof: self.proofs.name(),
            initialized: self.is_initialized(),
        }
    }

    /// Lazy self-init. 초기화 실패는 호출한 연산의 에러 종류로 보고
    async fn ensure_ready(&self, wrap: fn(String) -> EngineError) -> EngineResult<()> {
        if self.ready.initialized() {
            return Ok(());
        }
        self.initialize().await.map_err(|e| e.wrap_init(wrap))
    }

    fn seal(&self, payload: [u8; PAYLOAD_LEN]) -> EngineResult<EncodedValue> {
        let proof = self.proofs.generate(&payload)?;
        Ok(EncodedValue::new(payload, proof))
    }

    /// f64 → EncodedValue (proof는 매번 새로 생성)
    pub async fn encrypt(&self, value: f64) -> EngineResult<EncodedValue> {
        self.ensure_ready(EngineError::Encryption).await?;

        let payload = self.backend.encode(value)?;
        tracing::debug!(payload_len = PAYLOAD_LEN, "Value encrypted");
        self.seal(payload)
    }

    /// EncodedValue → f64
    ///
    /// proof는 검사하지 않음. 진위가 필요하면 먼저 `verify_proof`
    pub async fn decrypt(&self, value: &EncodedValue) -> EngineResult<f64> {
        self.ensure_ready(EngineError::Decryption).await?;
        self.backend.decode(value.payload())
    }

    /// 길이 검증되지 않은 payload 복호화
    pub async fn decrypt_payload(&self, payload: &[u8]) -> EngineResult<f64> {
        let payload: &[u8; PAYLOAD_LEN] = payload.try_into().map_err(|_| {
            EngineError::Decryption(format!(
                "payload must be {} bytes, got {}",
                PAYLOAD_LEN,
                payload.len()
            ))
        })?;

        self.ensure_ready(EngineError::Decryption).await?;
        self.backend.decode(payload)
    }

    /// decrypt(a) + decrypt(b) 의 암호화
    pub async fn add(&self, a: &EncodedValue, b: &EncodedValue) -> EngineResult<EncodedValue> {
        self.ensure_ready(EngineError::Encryption).await?;

        let payload = self.backend.add(a.payload(), b.payload())?;
        tracing::debug!("Encrypted add");
        self.seal(payload)
    }

    /// decrypt(a) * scalar 의 암호화 (scalar는 평문)
    pub async fn multiply(&self, a: &EncodedValue, scalar: f64) -> EngineResult<EncodedValue> {
        self.ensure_ready(EngineError::Encryption).await?;

        let payload = self.backend.scale(a.payload(), scalar)?;
        tracing::debug!("Encrypted scalar multiply");
        self.seal(payload)
    }

    /// decrypt(a) > decrypt(b) 이면 1.0, 아니면 0.0 (결과도 암호화 상태)
    pub async fn compare(&self, a: &EncodedValue, b: &EncodedValue) -> EngineResult<EncodedValue> {
        self.ensure_ready(EngineError::Encryption).await?;

        let payload = self.backend.greater_than(a.payload(), b.payload())?;
        tracing::debug!("Encrypted compare");
        self.seal(payload)
    }

    /// 새 attestation 생성
    pub async fn generate_proof(&self, value: &EncodedValue) -> EngineResult<[u8; PROOF_LEN]> {
        self.ensure_ready(EngineError::ProofGeneration).await?;
        self.proofs.generate(value.payload())
    }

    /// 같은 payload에 새 proof를 붙인 값
    ///
    /// 현재 proof가 검증되는 값만 재발급. 외부에서 만든 payload에
    /// attestation을 찍어주지 않음
    pub async fn attach_proof(&self, value: &EncodedValue) -> EngineResult<EncodedValue> {
        let proof = self.generate_proof(value).await?;
        if !self.proofs.verify(value.payload(), value.proof()) {
            tracing::warn!("Refusing to re-attest a value whose proof does not verify");
            return Err(EngineError::ProofRejected);
        }
        Ok(value.with_proof(proof))
    }

    /// Proof 검증. 에러 없이 bool만 반환
    pub async fn verify_proof(&self, value: &EncodedValue, proof: &[u8]) -> bool {
        if let Err(e) = self.initialize().await {
            tracing::warn!("Proof verification skipped: {}", e);
            return false;
        }

        let valid = self.proofs.verify(value.payload(), proof);
        if !valid {
            tracing::warn!(proof_len = proof.len(), "Proof verification failed");
        }
        valid
    }

    /// 값에 붙어 있는 proof를 검증하고 제출 가능한 `VerifiedValue`로 변환
    ///
    /// 검증은 매번 다시 수행. 결과는 값에 캐시되지 않음
    pub async fn attest(&self, value: &EncodedValue) -> Option<VerifiedValue> {
        if self.verify_proof(value, value.proof()).await {
            Some(VerifiedValue::new(value.clone()))
        } else {
            None
        }
    }
}
