//! 金额输入校验与客户端预估工具
//!
//! 所有函数只处理用户输入的十进制字符串，解析失败一律返回
//! 校验失败/预估为 "0"，不会向上抛出异常

use crate::constants::{ADVISORY_INTEREST_RATE, MAX_LOAN_AMOUNT, MIN_LOAN_AMOUNT};
use rust_decimal::Decimal;
use std::str::FromStr;

/// 校验金额字符串是否落在 [min, max] 闭区间内
///
/// 空串、非数字输入返回 false
pub fn is_amount_in_range(input: &str, min: Decimal, max: Decimal) -> bool {
    match Decimal::from_str(input.trim()) {
        Ok(value) => value >= min && value <= max,
        Err(_) => false,
    }
}

/// 校验贷款申请金额（0.01 ~ 10 整币）
pub fn is_valid_loan_amount(input: &str) -> bool {
    is_amount_in_range(input, *MIN_LOAN_AMOUNT, *MAX_LOAN_AMOUNT)
}

/// 预估利息（本金 × 5%）
///
/// 仅用于提交前展示，权威利息由合约计算，二者可能在最小单位上
/// 存在舍入差异
pub fn preview_interest(input: &str) -> String {
    match parse_positive(input) {
        Some(amount) => {
            let mut interest = amount * *ADVISORY_INTEREST_RATE;
            interest.rescale(4);
            interest.to_string()
        }
        None => "0".to_string(),
    }
}

/// 预估应还总额（本金 + 5% 利息）
pub fn preview_total(input: &str) -> String {
    match parse_positive(input) {
        Some(amount) => {
            let mut total = amount * (Decimal::ONE + *ADVISORY_INTEREST_RATE);
            total.rescale(4);
            total.to_string()
        }
        None => "0".to_string(),
    }
}

/// 解析正数金额，非法或 <= 0 返回 None
fn parse_positive(input: &str) -> Option<Decimal> {
    match Decimal::from_str(input.trim()) {
        Ok(value) if value > Decimal::ZERO => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_range_boundaries() {
        let min = Decimal::new(1, 2); // 0.01
        let max = Decimal::new(10, 0); // 10

        // 边界内外
        assert!(!is_amount_in_range("0.009", min, max));
        assert!(is_amount_in_range("0.01", min, max));
        assert!(is_amount_in_range("10", min, max));
        assert!(!is_amount_in_range("10.01", min, max));
    }

    #[test]
    fn test_amount_range_invalid_input() {
        let min = Decimal::new(1, 2);
        let max = Decimal::new(10, 0);

        assert!(!is_amount_in_range("abc", min, max));
        assert!(!is_amount_in_range("", min, max));
        assert!(!is_amount_in_range("NaN", min, max));
        assert!(!is_amount_in_range("1.2.3", min, max));
    }

    #[test]
    fn test_valid_loan_amount() {
        assert!(is_valid_loan_amount("5.5"));
        assert!(is_valid_loan_amount(" 0.01 "));
        assert!(!is_valid_loan_amount("0"));
        assert!(!is_valid_loan_amount("-1"));
        assert!(!is_valid_loan_amount("11"));
    }

    #[test]
    fn test_preview_interest() {
        assert_eq!(preview_interest("5.5"), "0.2750");
        assert_eq!(preview_interest("1"), "0.0500");
        // 非法输入与非正数都返回 "0"
        assert_eq!(preview_interest("abc"), "0");
        assert_eq!(preview_interest("0"), "0");
        assert_eq!(preview_interest("-3"), "0");
    }

    #[test]
    fn test_preview_total() {
        assert_eq!(preview_total("5.5"), "5.7750");
        assert_eq!(preview_total("1"), "1.0500");
        assert_eq!(preview_total(""), "0");
    }
}
