// 全局常量定义
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

/// 代币符号
pub const TOKEN_SYMBOL: &str = "MNT";

/// 代币精度（最小单位的小数位数）
pub const TOKEN_DECIMALS: u32 = 18;

/// 单笔贷款的最小金额（整币单位）
pub static MIN_LOAN_AMOUNT: Lazy<Decimal> = Lazy::new(|| Decimal::new(1, 2)); // 0.01

/// 单笔贷款的最大金额（整币单位）
pub static MAX_LOAN_AMOUNT: Lazy<Decimal> = Lazy::new(|| Decimal::new(10, 0)); // 10

/// 客户端预估用的年利率（5%）
///
/// 仅用于提交前的预览展示，权威利息由合约计算
pub static ADVISORY_INTEREST_RATE: Lazy<Decimal> = Lazy::new(|| Decimal::new(5, 2)); // 0.05

/// 放款后还款期限（天）
pub const LOAN_DURATION_DAYS: u64 = 365;

/// 一天的秒数
pub const SECONDS_PER_DAY: u64 = 86_400;
