// 公共模块
// 提供配置、日志、错误处理、常量与纯工具函数

pub mod config;
pub mod constants;
pub mod error;
pub mod logger;
pub mod utils;

// 重新导出常用类型和函数
pub use config::{AppConfig, ChainConfig, LogConfig};
pub use error::{AppError, AppResult};
pub use logger::{init_logger, init_logger_with_level};

/// 初始化公共模块
///
/// 这个函数可以用来初始化日志系统
pub fn init() {
    logger::init_logger();
    log::info!("✅ 公共模块初始化完成");
}
