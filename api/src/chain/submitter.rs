//! Contract Submitter
//!
//! ChainCall → 트랜잭션 요청 → 전송 → PendingTransaction 핸들
//!
//! # Interview Q&A
//!
//! Q: 왜 TransactionSender를 trait으로 분리했는가?
//! A: 서명/브로드캐스트/영수증 조회는 외부 관심사
//!    - RpcSender: 노드의 unlocked 계정으로 eth_sendTransaction
//!    - InMemorySender: 개발/테스트용 (체인 없이 기록만)
//!    - 지갑 서명 방식으로 바꿔도 submitter는 그대로

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{
    Address, TransactionRequest as EthTransactionRequest, H256, U256, U64,
};
use serde::Serialize;
use tokio::sync::RwLock;

use super::call::ChainCall;
use super::error::{SubmissionError, SubmissionResult};

/// 트랜잭션 요청
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub to: Address,
    pub data: Vec<u8>,
    pub value: Option<U256>,
    pub gas_limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

/// 제출된 트랜잭션 핸들
#[derive(Debug, Clone, Serialize)]
pub struct PendingTransaction {
    pub hash: H256,
    pub function: String,
    pub status: TransactionStatus,
    pub submitted_at: DateTime<Utc>,
}

/// 트랜잭션 전송 인터페이스
#[async_trait]
pub trait TransactionSender: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, request: &TransactionRequest) -> SubmissionResult<H256>;

    async fn status(&self, hash: H256) -> SubmissionResult<TransactionStatus>;
}

/// JSON-RPC 노드로 전송 (unlocked sender 계정 필요)
pub struct RpcSender {
    provider: Provider<Http>,
    from: Address,
    chain_id: u64,
}

impl RpcSender {
    pub fn new(rpc_url: &str, from: Address, chain_id: u64) -> SubmissionResult<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| SubmissionError::Transport(format!("invalid RPC URL: {}", e)))?;

        Ok(Self {
            provider,
            from,
            chain_id,
        })
    }
}

#[async_trait]
impl TransactionSender for RpcSender {
    fn name(&self) -> &'static str {
        "json-rpc"
    }

    async fn send(&self, request: &TransactionRequest) -> SubmissionResult<H256> {
        let mut tx = EthTransactionRequest::new()
            .from(self.from)
            .to(request.to)
            .data(request.data.clone())
            .chain_id(self.chain_id);

        if let Some(value) = request.value {
            tx = tx.value(value);
        }
        if let Some(gas) = request.gas_limit {
            tx = tx.gas(gas);
        }

        let pending = self
            .provider
            .send_transaction(tx, None)
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        Ok(pending.tx_hash())
    }

    async fn status(&self, hash: H256) -> SubmissionResult<TransactionStatus> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        Ok(match receipt {
            None => TransactionStatus::Pending,
            Some(r) => match r.status {
                Some(s) if s == U64::from(0) => TransactionStatus::Failed,
                _ => TransactionStatus::Confirmed,
            },
        })
    }
}

/// InMemorySender 기본 보관 개수
pub const DEFAULT_CAPACITY: usize = 10_000;

/// 메모리에 기록만 하는 sender (개발/테스트)
///
/// 최대 `capacity`개까지만 보관. 넘치면 가장 오래된 트랜잭션부터 삭제되고
/// 삭제된 hash 조회는 UnknownTransaction (404)
pub struct InMemorySender {
    capacity: usize,
    ledger: RwLock<Ledger>,
}

#[derive(Default)]
struct Ledger {
    transactions: HashMap<H256, (TransactionRequest, TransactionStatus)>,
    /// 제출 순서 (eviction 용)
    order: VecDeque<H256>,
}

impl Default for InMemorySender {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InMemorySender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ledger: RwLock::new(Ledger::default()),
        }
    }

    /// 상태 변경 (체인 확정/실패 시뮬레이션)
    pub async fn set_status(&self, hash: H256, status: TransactionStatus) -> SubmissionResult<()> {
        let mut ledger = self.ledger.write().await;
        let entry = ledger
            .transactions
            .get_mut(&hash)
            .ok_or_else(|| SubmissionError::UnknownTransaction(format!("{:?}", hash)))?;
        entry.1 = status;
        Ok(())
    }

    pub async fn request(&self, hash: H256) -> Option<TransactionRequest> {
        let ledger = self.ledger.read().await;
        ledger.transactions.get(&hash).map(|(req, _)| req.clone())
    }

    pub async fn len(&self) -> usize {
        self.ledger.read().await.transactions.len()
    }
}

#[async_trait]
impl TransactionSender for InMemorySender {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn send(&self, request: &TransactionRequest) -> SubmissionResult<H256> {
        let nonce: [u8; 32] = rand::random();
        let mut preimage = request.data.clone();
        preimage.extend_from_slice(&nonce);
        let hash = H256::from(ethers::utils::keccak256(preimage));

        let mut ledger = self.ledger.write().await;
        while ledger.order.len() >= self.capacity {
            let Some(oldest) = ledger.order.pop_front() else { break };
            ledger.transactions.remove(&oldest);
            tracing::debug!(hash = ?oldest, "Evicted oldest in-memory transaction");
        }
        ledger.order.push_back(hash);
        ledger
            .transactions
            .insert(hash, (request.clone(), TransactionStatus::Pending));
        Ok(hash)
    }

    async fn status(&self, hash: H256) -> SubmissionResult<TransactionStatus> {
        let ledger = self.ledger.read().await;
        ledger
            .transactions
            .get(&hash)
            .map(|(_, status)| *status)
            .ok_or_else(|| SubmissionError::UnknownTransaction(format!("{:?}", hash)))
    }
}

/// 마켓플레이스 컨트랙트 제출 서비스
pub struct ContractSubmitter {
    contract: Address,
    sender: Arc<dyn TransactionSender>,
}

impl ContractSubmitter {
    pub fn new(contract: Address, sender: Arc<dyn TransactionSender>) -> Self {
        Self { contract, sender }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn sender_name(&self) -> &'static str {
        self.sender.name()
    }

    /// 호출 인코딩 후 전송
    pub async fn submit(&self, call: ChainCall) -> SubmissionResult<PendingTransaction> {
        let data = call.encode()?;

        let request = TransactionRequest {
            to: self.contract,
            data,
            value: call.value,
            gas_limit: call.gas_limit,
        };

        tracing::info!(
            function = %call.function,
            sender = self.sender.name(),
            calldata_len = request.data.len(),
            "Submitting contract call"
        );

        let hash = self.sender.send(&request).await.map_err(|e| {
            tracing::error!("Contract call {} failed: {}", call.function, e);
            e
        })?;

        tracing::info!("Contract call {} submitted: {:?}", call.function, hash);

        Ok(PendingTransaction {
            hash,
            function: call.function,
            status: TransactionStatus::Pending,
            submitted_at: Utc::now(),
        })
    }

    pub async fn status(&self, hash: H256) -> SubmissionResult<TransactionStatus> {
        self.sender.status(hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::marketplace;
    use crate::engine::{ConfidentialEngine, EngineConfig};

    fn contract() -> Address {
        "0x1234567890123456789012345678901234567890".parse().unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_sender_evicts_oldest() {
        let sender = InMemorySender::with_capacity(2);
        let request = |byte: u8| TransactionRequest {
            to: contract(),
            data: vec![byte; 4],
            value: None,
            gas_limit: None,
        };

        let first = sender.send(&request(1)).await.unwrap();
        let second = sender.send(&request(2)).await.unwrap();
        let third = sender.send(&request(3)).await.unwrap();

        assert_eq!(sender.len().await, 2);
        assert!(matches!(
            sender.status(first).await,
            Err(SubmissionError::UnknownTransaction(_))
        ));
        assert_eq!(sender.status(second).await.unwrap(), TransactionStatus::Pending);
        assert_eq!(sender.request(third).await.unwrap().data, vec![3; 4]);
    }

    #[tokio::test]
    async fn test_submit_records_request() {
        let sender = Arc::new(InMemorySender::new());
        let submitter = ContractSubmitter::new(contract(), sender.clone());
        let engine = ConfidentialEngine::new(&EngineConfig::default());

        let amount = engine.encrypt(1.0).await.unwrap();
        let call = marketplace::invest_in_asset(0, engine.attest(&amount).await.unwrap(), 1.0).unwrap();
        let expected_data = call.encode().unwrap();

        let pending = submitter.submit(call).await.unwrap();
        assert_eq!(pending.function, "investInAsset");
        assert_eq!(pending.status, TransactionStatus::Pending);

        let recorded = sender.request(pending.hash).await.unwrap();
        assert_eq!(recorded.to, contract());
        assert_eq!(recorded.data, expected_data);
        assert_eq!(recorded.value, Some(U256::exp10(18)));
        assert_eq!(sender.len().await, 1);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let sender = Arc::new(InMemorySender::new());
        let submitter = ContractSubmitter::new(contract(), sender.clone());

        let pending = submitter
            .submit(ChainCall::new("getAssetInfo").uint(1u64))
            .await
            .unwrap();
        assert_eq!(submitter.status(pending.hash).await.unwrap(), TransactionStatus::Pending);

        sender.set_status(pending.hash, TransactionStatus::Confirmed).await.unwrap();
        assert_eq!(submitter.status(pending.hash).await.unwrap(), TransactionStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let submitter = ContractSubmitter::new(contract(), Arc::new(InMemorySender::new()));
        let result = submitter.status(H256::zero()).await;
        assert!(matches!(result, Err(SubmissionError::UnknownTransaction(_))));
    }

    #[tokio::test]
    async fn test_invalid_call_is_not_sent() {
        let sender = Arc::new(InMemorySender::new());
        let submitter = ContractSubmitter::new(contract(), sender.clone());

        let result = submitter.submit(ChainCall::new("noop").input_proof()).await;
        assert!(matches!(result, Err(SubmissionError::InvalidCall(_))));
        assert_eq!(sender.len().await, 0);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TransactionStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
    }

    #[test]
    fn test_rpc_sender_rejects_bad_url() {
        assert!(RpcSender::new("not a url", Address::zero(), 1).is_err());
    }
}
