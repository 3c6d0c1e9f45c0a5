//! Marketplace Contract Calls
//!
//! Secure Equity Vault 컨트랙트의 쓰기 함수 호출 빌더
//!
//! ```text
//! createAsset(string name, string description, string assetType,
//!             bytes totalValue, bytes pricePerShare, bytes inputProof)
//! investInAsset(uint256 assetId, bytes amount, bytes inputProof)      payable
//! createLendingPool(bytes totalLiquidity, bytes interestRate, bytes inputProof)
//! borrowFromPool(uint256 poolId, bytes amount, bytes collateralValue,
//!                uint256 term, bytes inputProof)
//! ```
//!
//! 금액 인자는 모두 `VerifiedValue`로만 받음 → 검증 없이 제출 불가

use ethers::types::U256;
use ethers::utils::parse_ether;

use super::call::ChainCall;
use super::error::{SubmissionError, SubmissionResult};
use crate::types::VerifiedValue;

// 함수별 gas limit (예시 값, 컨트랙트 배포 후 측정값으로 조정)
const CREATE_ASSET_GAS: u64 = 500_000;
const INVEST_GAS: u64 = 300_000;
const CREATE_POOL_GAS: u64 = 400_000;
const BORROW_GAS: u64 = 500_000;

/// 자산 등록
pub fn create_asset(
    name: &str,
    description: &str,
    asset_type: &str,
    total_value: VerifiedValue,
    price_per_share: VerifiedValue,
) -> SubmissionResult<ChainCall> {
    if name.trim().is_empty() {
        return Err(SubmissionError::InvalidCall("asset name is required".to_string()));
    }

    Ok(ChainCall::new("createAsset")
        .string(name)
        .string(description)
        .string(asset_type)
        .confidential(total_value)
        .confidential(price_per_share)
        .input_proof()
        .gas_limit(CREATE_ASSET_GAS))
}

/// 자산 투자 (payable)
///
/// `amount`는 암호화된 투자 금액, `amount_eth`는 함께 전송할 ETH
pub fn invest_in_asset(
    asset_id: u64,
    amount: VerifiedValue,
    amount_eth: f64,
) -> SubmissionResult<ChainCall> {
    Ok(ChainCall::new("investInAsset")
        .uint(asset_id)
        .confidential(amount)
        .input_proof()
        .payable(eth_to_wei(amount_eth)?)
        .gas_limit(INVEST_GAS))
}

/// 대출 풀 생성
pub fn create_lending_pool(
    total_liquidity: VerifiedValue,
    interest_rate: VerifiedValue,
) -> ChainCall {
    ChainCall::new("createLendingPool")
        .confidential(total_liquidity)
        .confidential(interest_rate)
        .input_proof()
        .gas_limit(CREATE_POOL_GAS)
}

/// 풀에서 대출
pub fn borrow_from_pool(
    pool_id: u64,
    amount: VerifiedValue,
    collateral_value: VerifiedValue,
    term: u64,
) -> ChainCall {
    ChainCall::new("borrowFromPool")
        .uint(pool_id)
        .confidential(amount)
        .confidential(collateral_value)
        .uint(term)
        .input_proof()
        .gas_limit(BORROW_GAS)
}

/// ETH → wei (18 decimals)
///
/// 음수, NaN, Infinity, 18자리 넘는 소수는 거부
pub fn eth_to_wei(amount: f64) -> SubmissionResult<U256> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SubmissionError::InvalidCall(
            "ETH amount must be a finite, non-negative number".to_string(),
        ));
    }

    parse_ether(amount).map_err(|e| SubmissionError::InvalidCall(format!("ETH amount: {}", e)))
}
