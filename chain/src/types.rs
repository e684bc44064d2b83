// 贷款领域类型
// 所有状态均为合约状态的只读投影，客户端从不在本地修改

use crate::error::{ChainError, ChainResult};
use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 贷款状态，取值与合约枚举一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LoanStatus {
    /// 已提交，等待管理员审批
    Pending = 0,
    /// 已批准，等待放款
    Approved = 1,
    /// 已放款，还款中
    Active = 2,
    /// 已结清
    Repaid = 3,
    /// 逾期未结清
    Defaulted = 4,
    /// 已驳回
    Rejected = 5,
}

impl LoanStatus {
    /// 展示用标签
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "Pending",
            LoanStatus::Approved => "Approved",
            LoanStatus::Active => "Active",
            LoanStatus::Repaid => "Repaid",
            LoanStatus::Defaulted => "Defaulted",
            LoanStatus::Rejected => "Rejected",
        }
    }

    /// 是否为终态（不再发生状态迁移）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::Repaid | LoanStatus::Defaulted | LoanStatus::Rejected
        )
    }

    /// 获取所有状态
    pub const fn all() -> [Self; 6] {
        [
            Self::Pending,
            Self::Approved,
            Self::Active,
            Self::Repaid,
            Self::Defaulted,
            Self::Rejected,
        ]
    }
}

impl TryFrom<u8> for LoanStatus {
    type Error = ChainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LoanStatus::Pending),
            1 => Ok(LoanStatus::Approved),
            2 => Ok(LoanStatus::Active),
            3 => Ok(LoanStatus::Repaid),
            4 => Ok(LoanStatus::Defaulted),
            5 => Ok(LoanStatus::Rejected),
            other => Err(ChainError::Decode(format!("未知的贷款状态: {}", other))),
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// getLoanDetails 返回的原始字段序列
pub type LoanParts = (
    U256,    // loanId
    Address, // borrower
    U256,    // principalAmount
    U256,    // interestRate
    U256,    // totalAmount
    U256,    // amountRepaid
    U256,    // applicationTime
    U256,    // approvalTime
    U256,    // deadline
    u8,      // status
    String,  // purpose
);

/// 贷款信息（合约状态投影）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: u64,
    pub borrower: Address,
    /// 本金（最小单位）
    pub principal_amount: U256,
    /// 合约年利率
    pub interest_rate: U256,
    /// 本金 + 利息，由合约计算
    pub total_amount: U256,
    /// 已还金额，单调不减
    pub amount_repaid: U256,
    pub application_time: u64,
    /// 审批时间，0 表示尚未审批
    pub approval_time: u64,
    /// 还款截止时间，0 表示尚未放款
    pub deadline: u64,
    pub status: LoanStatus,
    pub purpose: String,
}

impl Loan {
    /// 从合约返回的字段序列构建
    pub fn from_parts(parts: LoanParts) -> ChainResult<Self> {
        let (
            loan_id,
            borrower,
            principal_amount,
            interest_rate,
            total_amount,
            amount_repaid,
            application_time,
            approval_time,
            deadline,
            status,
            purpose,
        ) = parts;

        Ok(Loan {
            loan_id: loan_id.low_u64(),
            borrower,
            principal_amount,
            interest_rate,
            total_amount,
            amount_repaid,
            application_time: application_time.low_u64(),
            approval_time: approval_time.low_u64(),
            deadline: deadline.low_u64(),
            status: LoanStatus::try_from(status)?,
            purpose,
        })
    }

    /// 还款进度百分比（截断取整）
    pub fn progress_percent(&self) -> u64 {
        crate::units::progress_percent(self.amount_repaid, self.total_amount)
    }
}

/// 写入合约的命令，一个变体对应一个入口
#[derive(Debug, Clone, PartialEq)]
pub enum LoanCall {
    /// 申请贷款
    Apply { amount: U256, purpose: String },
    /// 还款，金额随交易转账
    Pay { loan_id: u64, value: U256 },
    /// 批准申请（仅管理员）
    Approve { loan_id: u64 },
    /// 驳回申请（仅管理员）
    Reject { loan_id: u64, reason: String },
    /// 放款（仅管理员）
    Disburse { loan_id: u64 },
    /// 注入资金池，金额随交易转账（仅管理员）
    Deposit { value: U256 },
    /// 提取资金池（仅管理员）
    Withdraw { amount: U256 },
}

impl LoanCall {
    /// 对应的合约入口名，用于日志
    pub fn name(&self) -> &'static str {
        match self {
            LoanCall::Apply { .. } => "applyLoan",
            LoanCall::Pay { .. } => "makePayment",
            LoanCall::Approve { .. } => "approveLoan",
            LoanCall::Reject { .. } => "rejectLoan",
            LoanCall::Disburse { .. } => "disburseLoan",
            LoanCall::Deposit { .. } => "depositFunds",
            LoanCall::Withdraw { .. } => "withdrawFunds",
        }
    }
}

/// 已确认交易的回执摘要
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    /// 回执状态，false 表示链上执行回滚
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_try_from() {
        assert_eq!(LoanStatus::try_from(0).unwrap(), LoanStatus::Pending);
        assert_eq!(LoanStatus::try_from(5).unwrap(), LoanStatus::Rejected);
        assert!(LoanStatus::try_from(6).is_err());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(LoanStatus::Active.to_string(), "Active");
        assert_eq!(LoanStatus::all().len(), 6);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!LoanStatus::Pending.is_terminal());
        assert!(!LoanStatus::Active.is_terminal());
        assert!(LoanStatus::Repaid.is_terminal());
        assert!(LoanStatus::Defaulted.is_terminal());
        assert!(LoanStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_loan_from_parts() {
        let borrower = Address::from_low_u64_be(0xBEEF);
        let parts: LoanParts = (
            U256::from(7u64),
            borrower,
            U256::from(1_000u64),
            U256::from(5u64),
            U256::from(1_050u64),
            U256::from(100u64),
            U256::from(1_700_000_000u64),
            U256::zero(),
            U256::zero(),
            2,
            "Tuition".to_string(),
        );
        let loan = Loan::from_parts(parts).unwrap();
        assert_eq!(loan.loan_id, 7);
        assert_eq!(loan.borrower, borrower);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.approval_time, 0);
    }

    #[test]
    fn test_loan_from_parts_bad_status() {
        let parts: LoanParts = (
            U256::one(),
            Address::zero(),
            U256::one(),
            U256::from(5u64),
            U256::one(),
            U256::zero(),
            U256::zero(),
            U256::zero(),
            U256::zero(),
            9,
            String::new(),
        );
        assert!(matches!(
            Loan::from_parts(parts),
            Err(ChainError::Decode(_))
        ));
    }

    #[test]
    fn test_loan_serde_roundtrip() {
        let loan = Loan {
            loan_id: 1,
            borrower: Address::from_low_u64_be(1),
            principal_amount: U256::from(10u64).pow(U256::from(18u64)),
            interest_rate: U256::from(5u64),
            total_amount: U256::from(105u64) * U256::from(10u64).pow(U256::from(16u64)),
            amount_repaid: U256::zero(),
            application_time: 1_700_000_000,
            approval_time: 0,
            deadline: 0,
            status: LoanStatus::Pending,
            purpose: "Books".to_string(),
        };
        let json = serde_json::to_string(&loan).unwrap();
        let back: Loan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loan);
    }
}
