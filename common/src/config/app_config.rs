use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub log: LogConfig,
}

/// 链节点与合约配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// RPC 节点地址
    pub rpc_url: String,
    /// 链 ID（Mantle Sepolia 为 5003）
    pub chain_id: u64,
    /// EduLoan 合约地址
    pub contract_address: String,
    /// 签名钱包私钥，缺省时只读
    #[serde(default)]
    pub wallet_key: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.sepolia.mantle.xyz".to_string(),
            chain_id: 5003,
            contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            wallet_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 从配置文件加载配置
    pub fn from_file(config_path: &str) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // 加载默认配置
            .add_source(File::with_name(config_path).required(false))
            // 加载环境特定配置
            .add_source(File::with_name(&format!("{}.{}", config_path, run_mode)).required(false))
            // 从环境变量加载配置（前缀为 APP_）
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// 从嵌入的配置内容加载（支持编译时嵌入）
    pub fn from_embedded(default_config: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(default_config, FileFormat::Toml))
            // 从环境变量加载配置（优先级最高）
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Ok(AppConfig {
            chain: ChainConfig {
                rpc_url: env::var("RPC_URL")
                    .unwrap_or_else(|_| "https://rpc.sepolia.mantle.xyz".to_string()),
                chain_id: env::var("CHAIN_ID")
                    .unwrap_or_else(|_| "5003".to_string())
                    .parse()
                    .unwrap_or(5003),
                contract_address: env::var("CONTRACT_ADDRESS")
                    .unwrap_or_else(|_| ChainConfig::default().contract_address),
                wallet_key: env::var("WALLET_KEY").ok(),
            },
            log: LogConfig {
                level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            chain: ChainConfig::default(),
            log: LogConfig::default(),
        }
    }
}
