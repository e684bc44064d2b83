//! 查询缓存
//!
//! 每个查询键对应一份序列化后的结果，写交易确认后由写层
//! 显式失效，不做自动过期

use ethers::types::Address;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;

/// 缓存键，一个变体对应一类查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// 单笔贷款详情
    Loan(u64),
    /// 某账户名下的贷款 ID 列表
    MyLoans(Address),
    /// 贷款总数
    TotalLoans,
    /// 资金池余额
    ContractBalance,
    /// 单笔贷款的剩余应还金额
    RemainingAmount(u64),
    /// 管理员地址
    Admin,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Loan(id) => write!(f, "loan:{}", id),
            QueryKey::MyLoans(account) => write!(f, "my_loans:{:?}", account),
            QueryKey::TotalLoans => write!(f, "total_loans"),
            QueryKey::ContractBalance => write!(f, "contract_balance"),
            QueryKey::RemainingAmount(id) => write!(f, "remaining:{}", id),
            QueryKey::Admin => write!(f, "admin"),
        }
    }
}

/// 进程内查询缓存
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, String>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 读取缓存，未命中或反序列化失败返回 None
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().await;
        let value = entries.get(key).and_then(|json| serde_json::from_str(json).ok());
        if value.is_some() {
            log::debug!("📦 缓存命中: {}", key);
        }
        value
    }

    /// 写入缓存
    pub async fn put<T: Serialize>(&self, key: QueryKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                self.entries.write().await.insert(key, json);
                log::debug!("💾 已缓存: {}", key);
            }
            Err(e) => log::warn!("缓存序列化失败: {} - {}", key, e),
        }
    }

    /// 显式失效一组键
    pub async fn invalidate(&self, keys: &[QueryKey]) {
        let mut entries = self.entries.write().await;
        let mut removed = 0;
        for key in keys {
            if entries.remove(key).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            log::debug!("🗑️  缓存已失效: {} 个键", removed);
        }
    }

    /// 失效某笔贷款关联的全部键
    pub async fn invalidate_loan(&self, loan_id: u64) {
        self.invalidate(&[QueryKey::Loan(loan_id), QueryKey::RemainingAmount(loan_id)])
            .await;
    }

    /// 清空缓存
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
