//! Configuration Module
//!
//! # Interview Q&A
//!
//! Q: 환경변수 vs 설정 파일, 어떤 방식을 선택했고 왜인가?
//! A: 환경변수를 선택
//!    - 12-Factor App 원칙 준수
//!    - Docker/K8s 배포 시 환경별 설정 분리 용이
//!    - attestation key 같은 비밀 값을 코드에 포함하지 않음
//!
//! Q: 설정 검증은 어떻게 하는가?
//! A: from_env()에서 형식 검증 → 잘못되면 즉시 실패 (fail-fast)
//!    - 주소/숫자 파싱 에러는 시작 시점에 발견
//!    - 단, mask 0은 엔진 초기화 단계에서 거부 (InitializationError)

use std::env;

use anyhow::{bail, Context, Result};
use ethers::types::Address;

use crate::engine::{EngineConfig, ProofScheme, DEFAULT_MASK, DEV_ATTESTATION_KEY};

/// 기본 체인: Sepolia
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트 (기본값: 3001)
    pub port: u16,

    /// 환경 (development, staging, production)
    pub environment: Environment,

    /// Ethereum RPC URL (RpcSender 용)
    pub eth_rpc_url: String,

    pub chain_id: u64,

    /// Secure Equity Vault 마켓플레이스 컨트랙트
    pub contract_address: Address,

    /// 노드의 unlocked 계정. 없으면 InMemorySender 사용
    pub sender_address: Option<Address>,

    /// XOR 마스크 (placeholder key material)
    pub mask_byte: u8,

    pub proof_scheme: ProofScheme,

    pub attestation_key: String,

    /// 프로덕션 CORS origin 목록
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// 개발용 기본값 (환경변수 없이 `from_env()`가 돌려주는 것과 같음)
///
/// 테스트 fixture는 이걸 씀 → 셸의 `ENVIRONMENT` 등에 영향받지 않음
impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3001,
            environment: Environment::Development,
            eth_rpc_url: "http://localhost:8545".to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            contract_address: Address::zero(),
            sender_address: None,
            mask_byte: DEFAULT_MASK,
            proof_scheme: ProofScheme::Keccak,
            attestation_key: DEV_ATTESTATION_KEY.to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Optional Environment Variables
    ///
    /// - `PORT`: 서버 포트 (기본값: 3001)
    /// - `ENVIRONMENT`: development | staging | production
    /// - `ETH_RPC_URL`: Ethereum RPC URL
    /// - `CHAIN_ID`: 기본값 11155111 (Sepolia)
    /// - `CONTRACT_ADDRESS`: 마켓플레이스 컨트랙트 (기본값: zero address)
    /// - `SENDER_ADDRESS`: RPC 전송 계정
    /// - `MASK_BYTE`: `0xAA` 또는 `170` 형식
    /// - `PROOF_SCHEME`: keccak | random
    /// - `ATTESTATION_KEY`: 프로덕션에서는 필수
    /// - `ALLOWED_ORIGINS`: 콤마 구분
    pub fn from_env() -> Result<Self> {
        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let attestation_key = match env::var("ATTESTATION_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ if environment == Environment::Production => {
                bail!("ATTESTATION_KEY must be set in production")
            }
            _ => DEV_ATTESTATION_KEY.to_string(),
        };

        let contract_address = match env::var("CONTRACT_ADDRESS") {
            Ok(addr) => addr
                .parse()
                .context("CONTRACT_ADDRESS must be a 20-byte hex address")?,
            Err(_) => Address::zero(),
        };

        let sender_address = env::var("SENDER_ADDRESS")
            .ok()
            .map(|addr| addr.parse::<Address>())
            .transpose()
            .context("SENDER_ADDRESS must be a 20-byte hex address")?;

        let mask_byte = match env::var("MASK_BYTE") {
            Ok(raw) => parse_mask_byte(&raw).context("MASK_BYTE must be a byte (e.g. 0xAA)")?,
            Err(_) => DEFAULT_MASK,
        };

        let proof_scheme = env::var("PROOF_SCHEME")
            .unwrap_or_else(|_| "keccak".to_string())
            .parse::<ProofScheme>()
            .map_err(anyhow::Error::msg)
            .context("PROOF_SCHEME must be keccak or random")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            environment,

            eth_rpc_url: env::var("ETH_RPC_URL")
                .unwrap_or_else(|_| "http://localhost:8545".to_string()),

            chain_id: env::var("CHAIN_ID")
                .unwrap_or_else(|_| DEFAULT_CHAIN_ID.to_string())
                .parse()
                .context("CHAIN_ID must be a valid number")?,

            contract_address,
            sender_address,
            mask_byte,
            proof_scheme,
            attestation_key,
            allowed_origins,
        })
    }

    /// 엔진 핸들 생성용 설정
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            mask: self.mask_byte,
            proof_scheme: self.proof_scheme,
            attestation_key: self.attestation_key.clone(),
        }
    }

    /// 프로덕션 환경인지 확인
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_mask_byte(raw: &str) -> Result<u8> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => raw.parse()?,
    };
    Ok(parsed)
}
