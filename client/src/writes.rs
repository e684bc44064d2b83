//! 写访问层
//!
//! 每次派发产生一个独立的 ManagedTx 生命周期：
//! Idle -> Submitted -> Confirming -> Success / Failed。
//! 并发命令互不共享状态；确认成功后由本层显式失效受影响的缓存键

use crate::cache::{QueryCache, QueryKey};
use chain::{units, LoanCall, LoanGateway};
use common::constants::{MAX_LOAN_AMOUNT, MIN_LOAN_AMOUNT, TOKEN_SYMBOL};
use common::utils::amount_util;
use common::{AppError, AppResult};
use ethers::types::{H256, U256};
use std::sync::Arc;
use tokio::sync::watch;

/// 交易生命周期阶段
#[derive(Debug, Clone, PartialEq)]
pub enum TxPhase {
    /// 尚未发起
    Idle,
    /// 已派发给钱包/网络，等待打包
    Submitted,
    /// 已进入网络，等待确认
    Confirming,
    /// 已确认
    Success { tx_hash: H256 },
    /// 已失败（提交失败、用户拒签或链上回滚）
    Failed { error: AppError },
}

impl TxPhase {
    /// 等待打包中
    pub fn is_pending(&self) -> bool {
        matches!(self, TxPhase::Submitted)
    }

    /// 等待确认中
    pub fn is_confirming(&self) -> bool {
        matches!(self, TxPhase::Confirming)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TxPhase::Success { .. })
    }

    /// 是否已结算（成功或失败）
    pub fn is_settled(&self) -> bool {
        matches!(self, TxPhase::Success { .. } | TxPhase::Failed { .. })
    }

    /// 失败原因，未失败时为 None
    pub fn error(&self) -> Option<&AppError> {
        match self {
            TxPhase::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// 单次写命令的生命周期句柄
///
/// 每个调用点拿到各自独立的实例，reset 只影响自身
#[derive(Debug)]
pub struct ManagedTx {
    sender: Arc<watch::Sender<TxPhase>>,
}

impl ManagedTx {
    fn new() -> (Self, Arc<watch::Sender<TxPhase>>) {
        let (sender, _receiver) = watch::channel(TxPhase::Idle);
        let sender = Arc::new(sender);
        (
            Self {
                sender: sender.clone(),
            },
            sender,
        )
    }

    /// 当前阶段
    pub fn phase(&self) -> TxPhase {
        self.sender.borrow().clone()
    }

    /// 订阅阶段变化
    pub fn subscribe(&self) -> watch::Receiver<TxPhase> {
        self.sender.subscribe()
    }

    /// 回到 Idle 以便重试，对其他在途命令无影响
    pub fn reset(&self) {
        self.sender.send_replace(TxPhase::Idle);
    }

    /// 等待结算，成功返回交易哈希
    pub async fn wait(&self) -> AppResult<H256> {
        let mut receiver = self.sender.subscribe();
        loop {
            match &*receiver.borrow_and_update() {
                TxPhase::Success { tx_hash } => return Ok(*tx_hash),
                TxPhase::Failed { error } => return Err(error.clone()),
                _ => {}
            }
            if receiver.changed().await.is_err() {
                return Err(AppError::transport("交易生命周期已中止"));
            }
        }
    }
}

/// 贷款合约的写命令入口
///
/// 输入校验不通过的命令不会产生交易，错误直接返回；
/// 通过校验的命令在后台驱动生命周期
pub struct LoanCommands<G> {
    gateway: Arc<G>,
    cache: Arc<QueryCache>,
}

impl<G> Clone for LoanCommands<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<G: LoanGateway + 'static> LoanCommands<G> {
    pub fn new(gateway: Arc<G>, cache: Arc<QueryCache>) -> Self {
        Self { gateway, cache }
    }

    /// 申请贷款
    pub fn apply_loan(&self, amount: &str, purpose: &str) -> AppResult<ManagedTx> {
        if !amount_util::is_valid_loan_amount(amount) {
            return Err(AppError::validation(format!(
                "金额必须在 {} 到 {} {} 之间",
                *MIN_LOAN_AMOUNT, *MAX_LOAN_AMOUNT, TOKEN_SYMBOL
            )));
        }
        let purpose = purpose.trim();
        if purpose.is_empty() {
            return Err(AppError::validation("请填写贷款用途"));
        }
        let amount = units::parse_mnt(amount)?;

        let mut keys = vec![QueryKey::TotalLoans];
        if let Some(account) = self.gateway.account() {
            keys.push(QueryKey::MyLoans(account));
        }
        Ok(self.dispatch(
            LoanCall::Apply {
                amount,
                purpose: purpose.to_string(),
            },
            keys,
        ))
    }

    /// 还款，金额随交易转账
    ///
    /// 剩余应还金额由调用方从读层取得，这里只做提示性校验，
    /// 权威校验在链上
    pub fn make_payment(&self, loan_id: u64, amount: &str, remaining: U256) -> AppResult<ManagedTx> {
        let value = units::parse_mnt(amount)?;
        if value.is_zero() {
            return Err(AppError::validation("请输入有效的还款金额"));
        }
        if value > remaining {
            return Err(AppError::validation(format!(
                "最多可还 {}",
                units::format_mnt(remaining)
            )));
        }

        let mut keys = vec![
            QueryKey::Loan(loan_id),
            QueryKey::RemainingAmount(loan_id),
            QueryKey::ContractBalance,
        ];
        if let Some(account) = self.gateway.account() {
            keys.push(QueryKey::MyLoans(account));
        }
        Ok(self.dispatch(LoanCall::Pay { loan_id, value }, keys))
    }

    /// 批准申请（仅管理员，链上鉴权）
    pub fn approve_loan(&self, loan_id: u64) -> ManagedTx {
        self.dispatch(LoanCall::Approve { loan_id }, vec![QueryKey::Loan(loan_id)])
    }

    /// 驳回申请（仅管理员，链上鉴权）
    pub fn reject_loan(&self, loan_id: u64, reason: &str) -> ManagedTx {
        self.dispatch(
            LoanCall::Reject {
                loan_id,
                reason: reason.trim().to_string(),
            },
            vec![QueryKey::Loan(loan_id)],
        )
    }

    /// 放款（仅管理员，链上鉴权）
    pub fn disburse_loan(&self, loan_id: u64) -> ManagedTx {
        self.dispatch(
            LoanCall::Disburse { loan_id },
            vec![
                QueryKey::Loan(loan_id),
                QueryKey::RemainingAmount(loan_id),
                QueryKey::ContractBalance,
            ],
        )
    }

    /// 注入资金池
    pub fn deposit_funds(&self, amount: &str) -> AppResult<ManagedTx> {
        let value = units::parse_mnt(amount)?;
        if value.is_zero() {
            return Err(AppError::validation("金额必须大于 0"));
        }
        Ok(self.dispatch(LoanCall::Deposit { value }, vec![QueryKey::ContractBalance]))
    }

    /// 提取资金池
    pub fn withdraw_funds(&self, amount: &str) -> AppResult<ManagedTx> {
        let value = units::parse_mnt(amount)?;
        if value.is_zero() {
            return Err(AppError::validation("金额必须大于 0"));
        }
        Ok(self.dispatch(
            LoanCall::Withdraw { amount: value },
            vec![QueryKey::ContractBalance],
        ))
    }

    /// 派发命令并在后台驱动生命周期
    fn dispatch(&self, call: LoanCall, invalidate: Vec<QueryKey>) -> ManagedTx {
        let (managed, sender) = ManagedTx::new();
        let gateway = self.gateway.clone();
        let cache = self.cache.clone();
        let name = call.name();

        tokio::spawn(async move {
            sender.send_replace(TxPhase::Submitted);

            let tx_hash = match gateway.submit(call).await {
                Ok(hash) => hash,
                Err(e) => {
                    let error = AppError::from(e);
                    log::warn!("交易提交失败: {} - {}", name, error);
                    sender.send_replace(TxPhase::Failed { error });
                    return;
                }
            };

            sender.send_replace(TxPhase::Confirming);

            match gateway.wait_for_receipt(tx_hash).await {
                Ok(outcome) if outcome.success => {
                    // 确认成功后失效受影响的读缓存
                    cache.invalidate(&invalidate).await;
                    log::info!("交易已确认: {} block={:?}", name, outcome.block_number);
                    sender.send_replace(TxPhase::Success { tx_hash });
                }
                Ok(_) => {
                    log::warn!("交易执行回滚: {}", name);
                    sender.send_replace(TxPhase::Failed {
                        error: AppError::reverted("交易执行失败"),
                    });
                }
                Err(e) => {
                    let error = AppError::from(e);
                    log::warn!("交易确认失败: {} - {}", name, error);
                    sender.send_replace(TxPhase::Failed { error });
                }
            }
        });

        managed
    }
}
