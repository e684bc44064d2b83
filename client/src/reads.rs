//! 读访问层
//!
//! 每个查询对应一个合约只读入口，结果进查询缓存；
//! 刷新 = 显式失效后重新发起

use crate::cache::{QueryCache, QueryKey};
use chain::{Loan, LoanGateway};
use common::{AppError, AppResult};
use ethers::types::{Address, U256};
use futures::future::join_all;
use std::sync::Arc;

/// 贷款合约的类型化查询入口
pub struct LoanReader<G> {
    gateway: Arc<G>,
    cache: Arc<QueryCache>,
}

impl<G> Clone for LoanReader<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<G: LoanGateway> LoanReader<G> {
    pub fn new(gateway: Arc<G>, cache: Arc<QueryCache>) -> Self {
        Self { gateway, cache }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// 单笔贷款详情
    pub async fn loan(&self, loan_id: u64) -> AppResult<Loan> {
        let key = QueryKey::Loan(loan_id);
        if let Some(loan) = self.cache.get::<Loan>(&key).await {
            return Ok(loan);
        }
        let loan = self.gateway.get_loan_details(loan_id).await?;
        self.cache.put(key, &loan).await;
        Ok(loan)
    }

    /// 当前账户名下的贷款 ID 列表
    ///
    /// 未连接钱包时不发起查询
    pub async fn my_loans(&self) -> AppResult<Vec<u64>> {
        let account = self
            .gateway
            .account()
            .ok_or_else(|| AppError::validation("未连接钱包"))?;
        self.loans_by_owner(account).await
    }

    /// 指定账户名下的贷款 ID 列表
    pub async fn loans_by_owner(&self, account: Address) -> AppResult<Vec<u64>> {
        let key = QueryKey::MyLoans(account);
        if let Some(ids) = self.cache.get::<Vec<u64>>(&key).await {
            return Ok(ids);
        }
        let ids = self.gateway.get_my_loans(account).await?;
        self.cache.put(key, &ids).await;
        Ok(ids)
    }

    /// 批量查询贷款详情
    ///
    /// 结果与传入 ID 一一对应、顺序一致；单笔失败不影响其余，
    /// 失败项不进缓存，由调用方过滤
    pub async fn many_loans(&self, loan_ids: &[u64]) -> Vec<AppResult<Loan>> {
        join_all(loan_ids.iter().map(|id| self.loan(*id))).await
    }

    /// 贷款总数
    pub async fn total_loans(&self) -> AppResult<u64> {
        let key = QueryKey::TotalLoans;
        if let Some(total) = self.cache.get::<u64>(&key).await {
            return Ok(total);
        }
        let total = self.gateway.get_total_loans().await?;
        self.cache.put(key, &total).await;
        Ok(total)
    }

    /// 资金池余额
    pub async fn contract_balance(&self) -> AppResult<U256> {
        let key = QueryKey::ContractBalance;
        if let Some(balance) = self.cache.get::<U256>(&key).await {
            return Ok(balance);
        }
        let balance = self.gateway.get_contract_balance().await?;
        self.cache.put(key, &balance).await;
        Ok(balance)
    }

    /// 剩余应还金额（合约权威值，客户端不自行计算）
    pub async fn remaining_amount(&self, loan_id: u64) -> AppResult<U256> {
        let key = QueryKey::RemainingAmount(loan_id);
        if let Some(remaining) = self.cache.get::<U256>(&key).await {
            return Ok(remaining);
        }
        let remaining = self.gateway.get_remaining_amount(loan_id).await?;
        self.cache.put(key, &remaining).await;
        Ok(remaining)
    }

    /// 管理员地址
    pub async fn admin(&self) -> AppResult<Address> {
        let key = QueryKey::Admin;
        if let Some(admin) = self.cache.get::<Address>(&key).await {
            return Ok(admin);
        }
        let admin = self.gateway.admin().await?;
        self.cache.put(key, &admin).await;
        Ok(admin)
    }

    /// 强制刷新单笔贷款
    pub async fn refetch_loan(&self, loan_id: u64) -> AppResult<Loan> {
        self.cache.invalidate_loan(loan_id).await;
        self.loan(loan_id).await
    }

    /// 强制刷新当前账户的贷款列表
    pub async fn refetch_my_loans(&self) -> AppResult<Vec<u64>> {
        if let Some(account) = self.gateway.account() {
            self.cache.invalidate(&[QueryKey::MyLoans(account)]).await;
        }
        self.my_loans().await
    }
}
