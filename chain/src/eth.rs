// 以太坊网关实现
// Provider + 本地钱包签名，合约调用走 abigen 绑定

use crate::abi::EduLoan;
use crate::error::{ChainError, ChainResult};
use crate::gateway::LoanGateway;
use crate::types::{Loan, LoanCall, TxOutcome};
use async_trait::async_trait;
use common::config::ChainConfig;
use ethers::contract::ContractError;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, U256};
use std::sync::Arc;

type EthClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// 基于 JSON-RPC 节点的合约网关
pub struct EthGateway {
    client: Arc<EthClient>,
    contract: EduLoan<EthClient>,
    account: Option<Address>,
}

impl EthGateway {
    /// 按配置连接节点与合约
    ///
    /// 未配置钱包私钥时以只读模式运行：读操作正常，
    /// 提交交易在本地直接被拒绝
    pub fn connect(config: &ChainConfig) -> ChainResult<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ChainError::Config(format!("RPC 地址无效: {}", e)))?;

        let contract_address: Address = config
            .contract_address
            .parse()
            .map_err(|_| ChainError::InvalidAddress(config.contract_address.clone()))?;

        let (wallet, account) = match &config.wallet_key {
            Some(key) => {
                let wallet = key
                    .parse::<LocalWallet>()
                    .map_err(|e| ChainError::Config(format!("钱包私钥无效: {}", e)))?
                    .with_chain_id(config.chain_id);
                let address = wallet.address();
                (wallet, Some(address))
            }
            None => {
                log::warn!("未配置钱包私钥，链网关以只读模式运行");
                let wallet = LocalWallet::new(&mut ethers::core::rand::thread_rng())
                    .with_chain_id(config.chain_id);
                (wallet, None)
            }
        };

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let contract = EduLoan::new(contract_address, client.clone());

        log::info!(
            "链网关已连接: chain_id={} contract={:?}",
            config.chain_id,
            contract_address
        );

        Ok(Self {
            client,
            contract,
            account,
        })
    }
}

/// 合约调用错误统一归类
fn from_contract_err<M: Middleware>(err: ContractError<M>) -> ChainError {
    ChainError::classify(err.to_string())
}

#[async_trait]
impl LoanGateway for EthGateway {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn get_loan_details(&self, loan_id: u64) -> ChainResult<Loan> {
        let parts = self
            .contract
            .get_loan_details(U256::from(loan_id))
            .call()
            .await
            .map_err(from_contract_err)?;
        Loan::from_parts(parts)
    }

    async fn get_my_loans(&self, account: Address) -> ChainResult<Vec<u64>> {
        let ids = self
            .contract
            .get_my_loans()
            .from(account)
            .call()
            .await
            .map_err(from_contract_err)?;
        Ok(ids.into_iter().map(|id| id.low_u64()).collect())
    }

    async fn get_total_loans(&self) -> ChainResult<u64> {
        let total = self
            .contract
            .get_total_loans()
            .call()
            .await
            .map_err(from_contract_err)?;
        Ok(total.low_u64())
    }

    async fn get_contract_balance(&self) -> ChainResult<U256> {
        self.contract
            .get_contract_balance()
            .call()
            .await
            .map_err(from_contract_err)
    }

    async fn get_remaining_amount(&self, loan_id: u64) -> ChainResult<U256> {
        self.contract
            .get_remaining_amount(U256::from(loan_id))
            .call()
            .await
            .map_err(from_contract_err)
    }

    async fn get_approval_time(&self, loan_id: u64) -> ChainResult<u64> {
        let time = self
            .contract
            .get_approval_time(U256::from(loan_id))
            .call()
            .await
            .map_err(from_contract_err)?;
        Ok(time.low_u64())
    }

    async fn calculate_interest(&self, amount: U256) -> ChainResult<U256> {
        self.contract
            .calculate_interest(amount)
            .call()
            .await
            .map_err(from_contract_err)
    }

    async fn admin(&self) -> ChainResult<Address> {
        self.contract.admin().call().await.map_err(from_contract_err)
    }

    async fn submit(&self, call: LoanCall) -> ChainResult<H256> {
        if self.account.is_none() {
            return Err(ChainError::Rejected("未连接钱包，无法提交交易".to_string()));
        }

        let name = call.name();
        let builder = match call {
            LoanCall::Apply { amount, purpose } => self.contract.apply_loan(amount, purpose),
            LoanCall::Pay { loan_id, value } => self
                .contract
                .make_payment(U256::from(loan_id))
                .value(value),
            LoanCall::Approve { loan_id } => self.contract.approve_loan(U256::from(loan_id)),
            LoanCall::Reject { loan_id, reason } => {
                self.contract.reject_loan(U256::from(loan_id), reason)
            }
            LoanCall::Disburse { loan_id } => self.contract.disburse_loan(U256::from(loan_id)),
            LoanCall::Deposit { value } => self.contract.deposit_funds().value(value),
            LoanCall::Withdraw { amount } => self.contract.withdraw_funds(amount),
        };

        let pending = builder.send().await.map_err(from_contract_err)?;
        let tx_hash = *pending;
        log::info!("交易已提交: {} hash={:?}", name, tx_hash);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> ChainResult<TxOutcome> {
        let pending = PendingTransaction::new(tx_hash, self.client.provider());
        let receipt = pending
            .await
            .map_err(|e| ChainError::classify(e.to_string()))?
            .ok_or_else(|| ChainError::Transport(format!("交易未被打包: {:?}", tx_hash)))?;

        let success = receipt.status.map(|s| s.low_u64() == 1).unwrap_or(false);
        if success {
            log::info!(
                "交易已确认: hash={:?} block={:?}",
                tx_hash,
                receipt.block_number
            );
        } else {
            log::warn!("交易回执状态为失败: hash={:?}", tx_hash);
        }

        Ok(TxOutcome {
            tx_hash,
            block_number: receipt.block_number.map(|b| b.low_u64()),
            success,
        })
    }
}
