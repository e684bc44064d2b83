//! 派生视图层
//!
//! 只组合读层的输出，不额外发起网络调用；
//! 角色判定是 (当前账户, 管理员地址) 的纯函数，每次调用重新计算

use crate::reads::LoanReader;
use chain::{Loan, LoanGateway, LoanStatus};
use common::AppResult;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// 管理员看板视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_loans: u64,
    pub contract_balance: U256,
    /// 待审批，按 loan_id 降序
    pub pending: Vec<Loan>,
    /// 已批准待放款，按 loan_id 降序
    pub approved: Vec<Loan>,
    /// 还款中，按 loan_id 降序
    pub active: Vec<Loan>,
}

/// 单笔贷款详情视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetailView {
    pub loan: Loan,
    /// 剩余应还金额（合约权威值）
    pub remaining_amount: U256,
    pub is_owner: bool,
    /// 是否展示还款入口：本人 + 还款中 + 尚有欠款
    pub can_make_payment: bool,
}

/// 账户与管理员地址是否指向同一账户
///
/// 地址按字节比较，十六进制大小写差异不影响结果；
/// 任一方缺失视为非管理员
pub fn is_admin_account(account: Option<Address>, admin: Option<Address>) -> bool {
    match (account, admin) {
        (Some(account), Some(admin)) => account == admin,
        _ => false,
    }
}

/// 已批准的贷款当前是否可放款（资金池余额足够）
pub fn can_disburse(loan: &Loan, contract_balance: U256) -> bool {
    loan.status == LoanStatus::Approved && contract_balance >= loan.principal_amount
}

/// 按页面组织的派生视图
pub struct LoanViews<G> {
    reader: LoanReader<G>,
}

impl<G> Clone for LoanViews<G> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
        }
    }
}

impl<G: LoanGateway> LoanViews<G> {
    pub fn new(reader: LoanReader<G>) -> Self {
        Self { reader }
    }

    /// 当前账户是否为管理员
    ///
    /// 查询失败或未连接钱包一律按非管理员处理，从不报错
    pub async fn is_admin(&self) -> bool {
        let account = self.reader.gateway().account();
        if account.is_none() {
            return false;
        }
        match self.reader.admin().await {
            Ok(admin) => is_admin_account(account, Some(admin)),
            Err(e) => {
                log::warn!("管理员地址查询失败，按非管理员处理: {}", e);
                false
            }
        }
    }

    /// 我的贷款列表：成功项按 loan_id 降序（最新在前）
    ///
    /// 未连接钱包时返回空列表
    pub async fn my_loans(&self) -> AppResult<Vec<Loan>> {
        let Some(account) = self.reader.gateway().account() else {
            return Ok(Vec::new());
        };
        let ids = self.reader.loans_by_owner(account).await?;
        Ok(self.resolve_sorted(&ids).await)
    }

    /// 管理员看板：全量贷款按状态分桶
    pub async fn admin_dashboard(&self) -> AppResult<AdminDashboard> {
        let total_loans = self.reader.total_loans().await?;
        let contract_balance = self.reader.contract_balance().await?;

        let ids: Vec<u64> = (1..=total_loans).collect();
        let all = self.resolve_sorted(&ids).await;

        let mut pending = Vec::new();
        let mut approved = Vec::new();
        let mut active = Vec::new();
        for loan in all {
            match loan.status {
                LoanStatus::Pending => pending.push(loan),
                LoanStatus::Approved => approved.push(loan),
                LoanStatus::Active => active.push(loan),
                // 终态不进看板
                _ => {}
            }
        }

        Ok(AdminDashboard {
            total_loans,
            contract_balance,
            pending,
            approved,
            active,
        })
    }

    /// 单笔贷款详情与还款入口判定
    pub async fn loan_detail(&self, loan_id: u64) -> AppResult<LoanDetailView> {
        let loan = self.reader.loan(loan_id).await?;
        let remaining_amount = self.reader.remaining_amount(loan_id).await?;

        let viewer = self.reader.gateway().account();
        let is_owner = viewer.map(|account| account == loan.borrower).unwrap_or(false);
        let can_make_payment =
            is_owner && loan.status == LoanStatus::Active && remaining_amount > U256::zero();

        Ok(LoanDetailView {
            loan,
            remaining_amount,
            is_owner,
            can_make_payment,
        })
    }

    /// 批量解析并过滤失败项，按 loan_id 降序
    async fn resolve_sorted(&self, ids: &[u64]) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .reader
            .many_loans(ids)
            .await
            .into_iter()
            .filter_map(|result| result.ok())
            .collect();
        loans.sort_by(|a, b| b.loan_id.cmp(&a.loan_id));
        loans
    }
}
