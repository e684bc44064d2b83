//! 链上时间戳的展示工具
//!
//! 合约用 0 表示"未设置"的时间字段，展示为占位符 "-"

use crate::constants::SECONDS_PER_DAY;
use chrono::{DateTime, Utc};

/// 未设置时间的占位符
pub const UNSET_DATE: &str = "-";

/// 格式化 UNIX 时间戳为日期，如 "Mar 5, 2026"
///
/// 0 表示未设置，返回 "-"
pub fn format_date(timestamp: u64) -> String {
    if timestamp == 0 {
        return UNSET_DATE.to_string();
    }
    match DateTime::<Utc>::from_timestamp(timestamp as i64, 0) {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => UNSET_DATE.to_string(),
    }
}

/// 格式化 UNIX 时间戳为日期加时间，如 "Mar 5, 2026, 02:30 PM"
pub fn format_date_time(timestamp: u64) -> String {
    if timestamp == 0 {
        return UNSET_DATE.to_string();
    }
    match DateTime::<Utc>::from_timestamp(timestamp as i64, 0) {
        Some(dt) => dt.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => UNSET_DATE.to_string(),
    }
}

/// 距还款截止日剩余的天数（向上取整）
///
/// 截止日未设置或已过期返回 0
pub fn days_remaining_at(deadline: u64, now: u64) -> u64 {
    if deadline == 0 {
        return 0;
    }
    let remaining = deadline.saturating_sub(now);
    remaining.div_ceil(SECONDS_PER_DAY)
}

/// 按当前墙上时钟计算剩余天数
pub fn days_remaining(deadline: u64) -> u64 {
    days_remaining_at(deadline, Utc::now().timestamp() as u64)
}

/// 是否已超过还款截止日
///
/// 截止日未设置视为未逾期
pub fn is_overdue_at(deadline: u64, now: u64) -> bool {
    deadline != 0 && deadline < now
}

/// 按当前墙上时钟判断是否逾期
pub fn is_overdue(deadline: u64) -> bool {
    is_overdue_at(deadline, Utc::now().timestamp() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_date_unset() {
        assert_eq!(format_date(0), "-");
        assert_eq!(format_date_time(0), "-");
    }

    #[test]
    fn test_format_date_roundtrip() {
        // 2026-03-05 12:00:00 UTC
        let ts: u64 = 1_772_712_000;
        let formatted = format_date(ts);
        assert_eq!(formatted, "Mar 5, 2026");

        // 重新解析应得到同一天
        let parsed = NaiveDate::parse_from_str(&formatted, "%b %d, %Y").expect("日期解析失败");
        let expected = DateTime::<Utc>::from_timestamp(ts as i64, 0).unwrap().date_naive();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_format_date_time() {
        // 2026-03-05 14:30:00 UTC
        let ts: u64 = 1_772_721_000;
        assert_eq!(format_date_time(ts), "Mar 5, 2026, 02:30 PM");
    }

    #[test]
    fn test_days_remaining() {
        let now = 1_700_000_000;
        assert_eq!(days_remaining_at(0, now), 0);
        // 已过期
        assert_eq!(days_remaining_at(now - 100, now), 0);
        // 不足一天向上取整
        assert_eq!(days_remaining_at(now + 1, now), 1);
        assert_eq!(days_remaining_at(now + SECONDS_PER_DAY, now), 1);
        assert_eq!(days_remaining_at(now + SECONDS_PER_DAY + 1, now), 2);
    }

    #[test]
    fn test_is_overdue() {
        let now = 1_700_000_000;
        assert!(!is_overdue_at(0, now));
        assert!(is_overdue_at(now - 1, now));
        assert!(!is_overdue_at(now + 1, now));
    }
}
