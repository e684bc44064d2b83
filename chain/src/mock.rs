// 测试用内存网关
// 按合约的可观察行为模拟状态迁移，时钟可手动拨动

use crate::error::{ChainError, ChainResult};
use crate::gateway::LoanGateway;
use crate::types::{Loan, LoanCall, LoanStatus, TxOutcome};
use async_trait::async_trait;
use common::constants::{LOAN_DURATION_DAYS, SECONDS_PER_DAY};
use ethers::types::{Address, H256, U256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

struct MockState {
    now: u64,
    admin: Address,
    contract_balance: U256,
    next_id: u64,
    loans: BTreeMap<u64, Loan>,
    /// 注入的单笔贷款读取失败
    failing_reads: HashSet<u64>,
    /// 注入的下一次提交失败（如用户拒签）
    next_submit_error: Option<ChainError>,
    /// 已提交未确认的交易
    pending: HashMap<H256, (LoanCall, Option<Address>)>,
    tx_counter: u64,
}

/// 内存合约网关
///
/// 通过 with_account 共享同一份合约状态、切换调用账户
#[derive(Clone)]
pub struct MockGateway {
    account: Option<Address>,
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    pub fn new(admin: Address, account: Option<Address>) -> Self {
        Self {
            account,
            state: Arc::new(Mutex::new(MockState {
                now: 1_700_000_000,
                admin,
                contract_balance: U256::zero(),
                next_id: 1,
                loans: BTreeMap::new(),
                failing_reads: HashSet::new(),
                next_submit_error: None,
                pending: HashMap::new(),
                tx_counter: 0,
            })),
        }
    }

    /// 同一份合约状态下切换调用账户
    pub fn with_account(&self, account: Option<Address>) -> Self {
        Self {
            account,
            state: self.state.clone(),
        }
    }

    pub fn set_now(&self, now: u64) {
        self.state.lock().unwrap().now = now;
    }

    pub fn advance(&self, seconds: u64) {
        self.state.lock().unwrap().now += seconds;
    }

    pub fn set_contract_balance(&self, balance: U256) {
        self.state.lock().unwrap().contract_balance = balance;
    }

    /// 注入某笔贷款的读取失败
    pub fn fail_loan_read(&self, loan_id: u64) {
        self.state.lock().unwrap().failing_reads.insert(loan_id);
    }

    pub fn clear_failing_reads(&self) {
        self.state.lock().unwrap().failing_reads.clear();
    }

    /// 注入下一次提交失败
    pub fn fail_next_submit(&self, err: ChainError) {
        self.state.lock().unwrap().next_submit_error = Some(err);
    }

    /// 直接塞入一笔贷款，用于构造测试场景
    pub fn seed_loan(&self, loan: Loan) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(loan.loan_id + 1);
        state.loans.insert(loan.loan_id, loan);
    }
}

/// 管理员入口的调用方检查
fn require_admin(state: &MockState, from: Option<Address>) -> ChainResult<()> {
    if from != Some(state.admin) {
        return Err(ChainError::Reverted(
            "Only admin can perform this action".to_string(),
        ));
    }
    Ok(())
}

/// 取出处于指定状态的贷款，否则模拟回滚
fn loan_in_status(state: &MockState, loan_id: u64, status: LoanStatus) -> ChainResult<&Loan> {
    let loan = state
        .loans
        .get(&loan_id)
        .ok_or_else(|| ChainError::Reverted("Invalid loan ID".to_string()))?;
    if loan.status != status {
        return Err(ChainError::Reverted(format!(
            "Loan is not {}",
            status.label().to_lowercase()
        )));
    }
    Ok(loan)
}

/// 合约入口的前置条件检查，违反时模拟链上回滚
fn check_preconditions(state: &MockState, call: &LoanCall, from: Option<Address>) -> ChainResult<()> {
    match call {
        LoanCall::Apply { amount, .. } => {
            if amount.is_zero() {
                return Err(ChainError::Reverted("Amount must be positive".to_string()));
            }
        }
        LoanCall::Pay { loan_id, value } => {
            let loan = loan_in_status(state, *loan_id, LoanStatus::Active)?;
            if from != Some(loan.borrower) {
                return Err(ChainError::Reverted(
                    "Only borrower can make payments".to_string(),
                ));
            }
            let remaining = loan.total_amount - loan.amount_repaid;
            if *value > remaining {
                return Err(ChainError::Reverted(
                    "Payment exceeds remaining amount".to_string(),
                ));
            }
        }
        LoanCall::Approve { loan_id } => {
            require_admin(state, from)?;
            loan_in_status(state, *loan_id, LoanStatus::Pending)?;
        }
        LoanCall::Reject { loan_id, .. } => {
            require_admin(state, from)?;
            loan_in_status(state, *loan_id, LoanStatus::Pending)?;
        }
        LoanCall::Disburse { loan_id } => {
            require_admin(state, from)?;
            let loan = loan_in_status(state, *loan_id, LoanStatus::Approved)?;
            if state.contract_balance < loan.principal_amount {
                return Err(ChainError::Reverted(
                    "Insufficient contract balance".to_string(),
                ));
            }
        }
        LoanCall::Deposit { value } => {
            if value.is_zero() {
                return Err(ChainError::Reverted("Amount must be positive".to_string()));
            }
        }
        LoanCall::Withdraw { amount } => {
            require_admin(state, from)?;
            if *amount > state.contract_balance {
                return Err(ChainError::Reverted(
                    "Insufficient contract balance".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// 确认时应用状态迁移
fn apply_call(state: &mut MockState, call: LoanCall, from: Option<Address>) {
    match call {
        LoanCall::Apply { amount, purpose } => {
            let loan_id = state.next_id;
            state.next_id += 1;
            let interest = amount * U256::from(5u64) / U256::from(100u64);
            state.loans.insert(
                loan_id,
                Loan {
                    loan_id,
                    borrower: from.unwrap_or_else(Address::zero),
                    principal_amount: amount,
                    interest_rate: U256::from(5u64),
                    total_amount: amount + interest,
                    amount_repaid: U256::zero(),
                    application_time: state.now,
                    approval_time: 0,
                    deadline: 0,
                    status: LoanStatus::Pending,
                    purpose,
                },
            );
        }
        LoanCall::Pay { loan_id, value } => {
            state.contract_balance += value;
            if let Some(loan) = state.loans.get_mut(&loan_id) {
                loan.amount_repaid += value;
                if loan.amount_repaid == loan.total_amount {
                    loan.status = LoanStatus::Repaid;
                }
            }
        }
        LoanCall::Approve { loan_id } => {
            let now = state.now;
            if let Some(loan) = state.loans.get_mut(&loan_id) {
                loan.status = LoanStatus::Approved;
                loan.approval_time = now;
            }
        }
        LoanCall::Reject { loan_id, .. } => {
            if let Some(loan) = state.loans.get_mut(&loan_id) {
                loan.status = LoanStatus::Rejected;
            }
        }
        LoanCall::Disburse { loan_id } => {
            let now = state.now;
            if let Some(loan) = state.loans.get_mut(&loan_id) {
                state.contract_balance -= loan.principal_amount;
                loan.status = LoanStatus::Active;
                loan.deadline = now + LOAN_DURATION_DAYS * SECONDS_PER_DAY;
            }
        }
        LoanCall::Deposit { value } => {
            state.contract_balance += value;
        }
        LoanCall::Withdraw { amount } => {
            state.contract_balance -= amount;
        }
    }
}

#[async_trait]
impl LoanGateway for MockGateway {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn get_loan_details(&self, loan_id: u64) -> ChainResult<Loan> {
        let state = self.state.lock().unwrap();
        if state.failing_reads.contains(&loan_id) {
            return Err(ChainError::Transport(format!(
                "模拟读取失败: loan_id={}",
                loan_id
            )));
        }
        state
            .loans
            .get(&loan_id)
            .cloned()
            .ok_or_else(|| ChainError::Reverted("Invalid loan ID".to_string()))
    }

    async fn get_my_loans(&self, account: Address) -> ChainResult<Vec<u64>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .loans
            .values()
            .filter(|loan| loan.borrower == account)
            .map(|loan| loan.loan_id)
            .collect())
    }

    async fn get_total_loans(&self) -> ChainResult<u64> {
        Ok(self.state.lock().unwrap().next_id - 1)
    }

    async fn get_contract_balance(&self) -> ChainResult<U256> {
        Ok(self.state.lock().unwrap().contract_balance)
    }

    async fn get_remaining_amount(&self, loan_id: u64) -> ChainResult<U256> {
        let loan = self.get_loan_details(loan_id).await?;
        Ok(loan.total_amount - loan.amount_repaid)
    }

    async fn get_approval_time(&self, loan_id: u64) -> ChainResult<u64> {
        let loan = self.get_loan_details(loan_id).await?;
        Ok(loan.approval_time)
    }

    async fn calculate_interest(&self, amount: U256) -> ChainResult<U256> {
        Ok(amount * U256::from(5u64) / U256::from(100u64))
    }

    async fn admin(&self) -> ChainResult<Address> {
        Ok(self.state.lock().unwrap().admin)
    }

    async fn submit(&self, call: LoanCall) -> ChainResult<H256> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.next_submit_error.take() {
            return Err(err);
        }
        // 链上回滚在提交（gas 预估）阶段暴露，带合约原因
        check_preconditions(&state, &call, self.account)?;

        state.tx_counter += 1;
        let tx_hash = H256::from_low_u64_be(state.tx_counter);
        state.pending.insert(tx_hash, (call, self.account));
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> ChainResult<TxOutcome> {
        let mut state = self.state.lock().unwrap();
        let (call, from) = state
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| ChainError::Transport(format!("未知交易: {:?}", tx_hash)))?;

        apply_call(&mut state, call, from);
        let block_number = state.tx_counter;
        Ok(TxOutcome {
            tx_hash,
            block_number: Some(block_number),
            success: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    async fn submit_and_confirm(gateway: &MockGateway, call: LoanCall) -> ChainResult<TxOutcome> {
        let hash = gateway.submit(call).await?;
        gateway.wait_for_receipt(hash).await
    }

    #[tokio::test]
    async fn test_full_loan_lifecycle() {
        let admin = addr(1);
        let borrower = addr(2);
        let admin_gw = MockGateway::new(admin, Some(admin));
        let borrower_gw = admin_gw.with_account(Some(borrower));

        admin_gw.set_contract_balance(ether(100));
        admin_gw.set_now(1_000_000);

        // 申请
        submit_and_confirm(
            &borrower_gw,
            LoanCall::Apply {
                amount: ether(2),
                purpose: "Tuition".to_string(),
            },
        )
        .await
        .unwrap();

        let loan = borrower_gw.get_loan_details(1).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Pending);
        assert_eq!(loan.application_time, 1_000_000);
        assert_eq!(loan.total_amount, ether(2) + ether(2) / U256::from(20u64)); // 2 + 5%
        assert_eq!(
            admin_gw.calculate_interest(ether(2)).await.unwrap(),
            ether(2) / U256::from(20u64)
        );

        // 审批、放款
        admin_gw.advance(100);
        submit_and_confirm(&admin_gw, LoanCall::Approve { loan_id: 1 })
            .await
            .unwrap();
        assert_eq!(admin_gw.get_approval_time(1).await.unwrap(), 1_000_100);

        submit_and_confirm(&admin_gw, LoanCall::Disburse { loan_id: 1 })
            .await
            .unwrap();

        let loan = borrower_gw.get_loan_details(1).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Active);
        // 截止日 = 放款时间 + 365 天
        assert_eq!(loan.deadline, 1_000_100 + LOAN_DURATION_DAYS * SECONDS_PER_DAY);
        assert_eq!(admin_gw.get_contract_balance().await.unwrap(), ether(98));

        // 全额还款
        let remaining = borrower_gw.get_remaining_amount(1).await.unwrap();
        submit_and_confirm(
            &borrower_gw,
            LoanCall::Pay {
                loan_id: 1,
                value: remaining,
            },
        )
        .await
        .unwrap();

        let loan = borrower_gw.get_loan_details(1).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Repaid);
        assert_eq!(borrower_gw.get_remaining_amount(1).await.unwrap(), U256::zero());
    }

    #[tokio::test]
    async fn test_non_admin_approve_reverts() {
        let admin = addr(1);
        let borrower = addr(2);
        let gw = MockGateway::new(admin, Some(borrower));

        submit_and_confirm(
            &gw,
            LoanCall::Apply {
                amount: ether(1),
                purpose: "Books".to_string(),
            },
        )
        .await
        .unwrap();

        let err = gw.submit(LoanCall::Approve { loan_id: 1 }).await.unwrap_err();
        assert_eq!(
            err,
            ChainError::Reverted("Only admin can perform this action".to_string())
        );
    }

    #[tokio::test]
    async fn test_overpayment_reverts_and_state_unchanged() {
        let admin = addr(1);
        let borrower = addr(2);
        let admin_gw = MockGateway::new(admin, Some(admin));
        let borrower_gw = admin_gw.with_account(Some(borrower));

        admin_gw.set_contract_balance(ether(10));
        submit_and_confirm(
            &borrower_gw,
            LoanCall::Apply {
                amount: ether(2),
                purpose: "Rent".to_string(),
            },
        )
        .await
        .unwrap();
        submit_and_confirm(&admin_gw, LoanCall::Approve { loan_id: 1 })
            .await
            .unwrap();
        submit_and_confirm(&admin_gw, LoanCall::Disburse { loan_id: 1 })
            .await
            .unwrap();

        let before = borrower_gw.get_remaining_amount(1).await.unwrap();
        let err = borrower_gw
            .submit(LoanCall::Pay {
                loan_id: 1,
                value: before + U256::one(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Reverted(_)));
        assert_eq!(borrower_gw.get_remaining_amount(1).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_injected_read_failure() {
        let gw = MockGateway::new(addr(1), None);
        gw.seed_loan(Loan {
            loan_id: 3,
            borrower: addr(2),
            principal_amount: ether(1),
            interest_rate: U256::from(5u64),
            total_amount: ether(1),
            amount_repaid: U256::zero(),
            application_time: 1,
            approval_time: 0,
            deadline: 0,
            status: LoanStatus::Pending,
            purpose: String::new(),
        });

        gw.fail_loan_read(3);
        assert!(gw.get_loan_details(3).await.is_err());

        gw.clear_failing_reads();
        assert!(gw.get_loan_details(3).await.is_ok());
    }
}
