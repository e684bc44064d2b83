// 合约访问抽象
// 钱包与传输层对上层是不透明能力：当前账户、提交交易、等待确认

use crate::error::ChainResult;
use crate::types::{Loan, LoanCall, TxOutcome};
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};

/// EduLoan 合约网关
///
/// 读操作全部幂等、无副作用，可按需重发；
/// 写操作拆成提交与等待确认两步，生命周期由上层管理
#[async_trait]
pub trait LoanGateway: Send + Sync {
    /// 当前连接的账户，未连接钱包时为 None
    fn account(&self) -> Option<Address>;

    /// 查询单笔贷款
    async fn get_loan_details(&self, loan_id: u64) -> ChainResult<Loan>;

    /// 查询某账户名下的贷款 ID 列表
    ///
    /// 合约按调用方返回，账户作为调用方传入
    async fn get_my_loans(&self, account: Address) -> ChainResult<Vec<u64>>;

    /// 贷款总数
    async fn get_total_loans(&self) -> ChainResult<u64>;

    /// 资金池余额（最小单位）
    async fn get_contract_balance(&self) -> ChainResult<U256>;

    /// 剩余应还金额，由合约权威计算
    async fn get_remaining_amount(&self, loan_id: u64) -> ChainResult<U256>;

    /// 审批时间，0 表示尚未审批
    async fn get_approval_time(&self, loan_id: u64) -> ChainResult<u64>;

    /// 按合约利率计算利息
    async fn calculate_interest(&self, amount: U256) -> ChainResult<U256>;

    /// 管理员地址
    async fn admin(&self) -> ChainResult<Address>;

    /// 提交写交易，返回交易哈希
    async fn submit(&self, call: LoanCall) -> ChainResult<H256>;

    /// 等待交易确认并返回回执摘要
    async fn wait_for_receipt(&self, tx_hash: H256) -> ChainResult<TxOutcome>;
}
