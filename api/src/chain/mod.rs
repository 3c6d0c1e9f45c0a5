//! Contract Submission Adapter
//!
//! 검증된 EncodedValue를 마켓플레이스 컨트랙트 호출로 변환하고 전송
//!
//! # Flow
//!
//! ```text
//! VerifiedValue ──▶ ChainCall (function + ordered args) ──▶ ABI calldata
//!                                                              │
//!                                                              ▼
//!                   PendingTransaction ◀── TransactionSender (RPC / in-memory)
//! ```
//!
//! 엔진은 트랜잭션 상태를 보지 않음. 상태는 호출자가 조회해서 표시.

mod call;
mod error;
pub mod marketplace;
mod submitter;

pub use call::{CallArg, ChainCall};
pub use error::{SubmissionError, SubmissionResult};
pub use submitter::{
    ContractSubmitter, InMemorySender, PendingTransaction, RpcSender, TransactionRequest,
    TransactionSender, TransactionStatus,
};
