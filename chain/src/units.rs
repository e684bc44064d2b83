//! 代币金额的解析与展示
//!
//! 金额一律以最小单位（18 位小数）的 U256 表示，
//! 展示时做整数运算，不经过浮点数

use crate::error::{ChainError, ChainResult};
use common::constants::{TOKEN_DECIMALS, TOKEN_SYMBOL};
use ethers::types::{Address, U256};
use ethers::utils::parse_ether;

/// 解析用户输入的十进制金额为最小单位
pub fn parse_mnt(input: &str) -> ChainResult<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ChainError::InvalidAmount("金额不能为空".to_string()));
    }
    parse_ether(trimmed).map_err(|_| ChainError::InvalidAmount(format!("无法解析金额: {}", trimmed)))
}

/// 格式化为固定 4 位小数，如 "5.5000 MNT"
pub fn format_mnt(value: U256) -> String {
    let base = U256::exp10(TOKEN_DECIMALS as usize);
    let quantum = U256::exp10((TOKEN_DECIMALS - 4) as usize);

    // 在第 4 位小数上四舍五入
    let rounded = value + quantum / U256::from(2u64);
    let whole = rounded / base;
    let frac = (rounded % base) / quantum;
    format!("{}.{:04} {}", whole, frac.low_u64(), TOKEN_SYMBOL)
}

/// 摘要场景用的缩写格式：>= 1000 整币时以 K 为单位，保留 2 位小数
pub fn format_mnt_short(value: U256) -> String {
    let base = U256::exp10(TOKEN_DECIMALS as usize);

    if value >= base * U256::from(1_000u64) {
        // 0.01K 对应 10 整币
        let quantum = base * U256::from(10u64);
        let rounded = value + quantum / U256::from(2u64);
        let hundredths = rounded / quantum;
        let whole = hundredths / U256::from(100u64);
        let frac = (hundredths % U256::from(100u64)).low_u64();
        format!("{}.{:02}K {}", whole, frac, TOKEN_SYMBOL)
    } else {
        let quantum = U256::exp10((TOKEN_DECIMALS - 2) as usize);
        let rounded = value + quantum / U256::from(2u64);
        let hundredths = rounded / quantum;
        let whole = hundredths / U256::from(100u64);
        let frac = (hundredths % U256::from(100u64)).low_u64();
        format!("{}.{:02} {}", whole, frac, TOKEN_SYMBOL)
    }
}

/// 还款进度百分比
///
/// 总额为 0 时返回 0，否则截断取整，不四舍五入
pub fn progress_percent(repaid: U256, total: U256) -> u64 {
    if total.is_zero() {
        return 0;
    }
    (repaid.saturating_mul(U256::from(100u64)) / total).low_u64()
}

/// 地址缩写展示，如 "0x1234...cdef"
pub fn shorten_address(address: &Address) -> String {
    let hex = format!("{:?}", address);
    format!("{}...{}", &hex[..6], &hex[hex.len() - 4..])
}
