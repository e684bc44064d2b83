// 错误处理模块
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("验证错误: {0}")]
    ValidationError(String),

    #[error("交易被拒绝: {0}")]
    TxRejected(String),

    #[error("交易回滚: {0}")]
    TxReverted(String),

    #[error("网络错误: {0}")]
    TransportError(String),

    #[error("未找到: {0}")]
    NotFound(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::ConfigError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        AppError::TxRejected(msg.into())
    }

    pub fn reverted(msg: impl Into<String>) -> Self {
        AppError::TxReverted(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        AppError::TransportError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// 是否属于提交前就被拦截的输入错误
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::ValidationError(_))
    }
}

// 从 config 错误转换
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

// 从 serde_json 错误转换
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::TransportError(format!("序列化失败: {}", err))
    }
}
