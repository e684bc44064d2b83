// 应用层
// 把网关、查询缓存、读写层与派生视图装配成一个客户端实例

pub mod cache;
pub mod reads;
pub mod views;
pub mod writes;

// 重新导出常用类型
pub use cache::{QueryCache, QueryKey};
pub use reads::LoanReader;
pub use views::{can_disburse, is_admin_account, AdminDashboard, LoanDetailView, LoanViews};
pub use writes::{LoanCommands, ManagedTx, TxPhase};

use chain::{EthGateway, LoanGateway};
use common::{AppConfig, AppResult};
use ethers::types::Address;
use std::sync::Arc;

/// EduLoan 客户端
///
/// 读层、写层与视图层共享同一个网关与查询缓存
pub struct EduLoanClient<G> {
    gateway: Arc<G>,
    pub cache: Arc<QueryCache>,
    pub reader: LoanReader<G>,
    pub commands: LoanCommands<G>,
    pub views: LoanViews<G>,
}

impl<G: LoanGateway + 'static> EduLoanClient<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let cache = Arc::new(QueryCache::new());
        let reader = LoanReader::new(gateway.clone(), cache.clone());
        let commands = LoanCommands::new(gateway.clone(), cache.clone());
        let views = LoanViews::new(reader.clone());
        Self {
            gateway,
            cache,
            reader,
            commands,
            views,
        }
    }

    /// 当前连接的账户
    pub fn account(&self) -> Option<Address> {
        self.gateway.account()
    }
}

impl EduLoanClient<EthGateway> {
    /// 按配置连接节点并装配客户端
    pub fn connect(config: &AppConfig) -> AppResult<Self> {
        let gateway = EthGateway::connect(&config.chain)?;
        Ok(Self::new(Arc::new(gateway)))
    }
}
