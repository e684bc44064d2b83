// 链层错误定义
use common::AppError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("非法地址: {0}")]
    InvalidAddress(String),

    #[error("非法金额: {0}")]
    InvalidAmount(String),

    #[error("交易被拒绝: {0}")]
    Rejected(String),

    #[error("交易回滚: {0}")]
    Reverted(String),

    #[error("网络错误: {0}")]
    Transport(String),

    #[error("数据解析失败: {0}")]
    Decode(String),
}

pub type ChainResult<T> = Result<T, ChainError>;

impl ChainError {
    /// 根据节点/钱包返回的错误文本归类
    ///
    /// 节点对回滚原因没有统一格式，这里按惯用关键字匹配：
    /// 用户拒签 -> Rejected，执行回滚 -> Reverted（尽量剥出原因），
    /// 其余一律视为网络错误
    pub fn classify(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        let lower = msg.to_lowercase();

        if lower.contains("user rejected") || lower.contains("user denied") {
            return ChainError::Rejected(msg);
        }
        if let Some(reason) = extract_revert_reason(&msg) {
            return ChainError::Reverted(reason);
        }
        if lower.contains("revert") {
            return ChainError::Reverted(msg);
        }
        ChainError::Transport(msg)
    }
}

/// 从错误文本中剥出 "execution reverted: xxx" 的原因部分
fn extract_revert_reason(msg: &str) -> Option<String> {
    let lower = msg.to_lowercase();
    let pos = lower.find("execution reverted:")?;
    let reason = &msg[pos + "execution reverted:".len()..];

    // 去掉 JSON-RPC 错误里跟在原因后面的附加字段
    let mut end = reason.len();
    for pat in ["\n", "\"", ", data:", ")"] {
        if let Some(i) = reason.find(pat) {
            end = end.min(i);
        }
    }
    let reason = reason[..end].trim();
    if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    }
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Config(msg) => AppError::ConfigError(msg),
            ChainError::InvalidAddress(msg) => AppError::ConfigError(msg),
            ChainError::InvalidAmount(msg) => AppError::ValidationError(msg),
            ChainError::Rejected(msg) => AppError::TxRejected(msg),
            ChainError::Reverted(msg) => AppError::TxReverted(msg),
            ChainError::Transport(msg) => AppError::TransportError(msg),
            ChainError::Decode(msg) => AppError::TransportError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_user_rejection() {
        let err = ChainError::classify("MetaMask Tx Signature: User denied transaction signature.");
        assert!(matches!(err, ChainError::Rejected(_)));
    }

    #[test]
    fn test_classify_revert_with_reason() {
        let err = ChainError::classify(
            "(code: 3, message: execution reverted: Payment exceeds remaining amount, data: ...)",
        );
        assert_eq!(
            err,
            ChainError::Reverted("Payment exceeds remaining amount".to_string())
        );
    }

    #[test]
    fn test_classify_transport() {
        let err = ChainError::classify("connection refused");
        assert!(matches!(err, ChainError::Transport(_)));
    }
}
