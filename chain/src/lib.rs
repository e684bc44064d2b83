// 链集成模块
// 封装 EduLoan 合约的读写访问，上层只依赖 LoanGateway 抽象

pub mod abi;
pub mod error;
pub mod eth;
pub mod gateway;
pub mod types;
pub mod units;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// 重新导出常用类型
pub use error::{ChainError, ChainResult};
pub use eth::EthGateway;
pub use gateway::LoanGateway;
pub use types::{Loan, LoanCall, LoanStatus, TxOutcome};
