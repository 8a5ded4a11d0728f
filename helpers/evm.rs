//! Alloy-backed implementation of the contract handles.

use std::{path::PathBuf, sync::Arc};

use alloy_network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, B256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    artifact::ContractArtifact,
    config::Config,
    contract::{ContractBackend, ContractFactory, ContractInstance, PendingTransaction, TxOutcome},
    error::{Error, Result},
};

/// Parses a hex private key, with or without the `0x` prefix.
pub fn signer_from_key(key: &str) -> Result<PrivateKeySigner> {
    let key = key.trim();
    key.strip_prefix("0x")
        .unwrap_or(key)
        .parse::<PrivateKeySigner>()
        .map_err(|e| Error::InvalidConfig(format!("invalid private key: {e}")))
}

/// Connection to one EVM node with one signing account.
#[derive(Clone)]
pub struct EvmBackend {
    provider: DynProvider,
    sender: Address,
    artifacts_dir: PathBuf,
    confirmations: u64,
}

impl std::fmt::Debug for EvmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmBackend")
            .field("sender", &self.sender)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("confirmations", &self.confirmations)
            .finish()
    }
}

impl EvmBackend {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let signer = signer_from_key(config.private_key()?)?;
        let sender = signer.address();

        let url = config.network.rpc_url.parse().map_err(|e| {
            Error::InvalidConfig(format!("invalid RPC URL {}: {e}", config.network.rpc_url))
        })?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Self::connect(provider, sender, config).await
    }

    /// Wraps an already built provider, checking the chain id when one is
    /// pinned in `config`.
    pub async fn connect(provider: DynProvider, sender: Address, config: &Config) -> Result<Self> {
        let chain_id = provider.get_chain_id().await?;
        if let Some(expected) = config.network.chain_id {
            if expected != chain_id {
                return Err(Error::ChainMismatch {
                    expected,
                    actual: chain_id,
                });
            }
        }
        info!(chain_id, sender = %sender, rpc_url = %config.network.rpc_url, "connected to node");

        Ok(Self {
            provider,
            sender,
            artifacts_dir: config.contract.artifacts_dir.clone(),
            confirmations: config.network.confirmations,
        })
    }

    pub fn sender(&self) -> Address {
        self.sender
    }
}

#[async_trait]
impl ContractBackend for EvmBackend {
    type Factory = EvmFactory;

    async fn contract_factory(&self, name: &str) -> Result<EvmFactory> {
        let artifact = ContractArtifact::load(&self.artifacts_dir, name)?;
        artifact.ensure_plain_constructor()?;
        debug!(
            contract = name,
            bytecode_len = artifact.bytecode.len(),
            "factory ready"
        );

        Ok(EvmFactory {
            backend: self.clone(),
            artifact: Arc::new(artifact),
        })
    }
}

pub struct EvmFactory {
    backend: EvmBackend,
    artifact: Arc<ContractArtifact>,
}

impl EvmFactory {
    /// Next nonce of the sender, counting its transactions still in the pool.
    async fn next_nonce(&self) -> Result<u64> {
        let sender = self.backend.sender;
        Ok(self
            .backend
            .provider
            .get_transaction_count(sender)
            .pending()
            .await?)
    }
}

#[async_trait]
impl ContractFactory for EvmFactory {
    type Contract = EvmContract;

    async fn deploy(&self) -> Result<EvmContract> {
        let sender = self.backend.sender;
        let provider = &self.backend.provider;

        // Nonce is pinned so the address is known before the receipt arrives.
        let nonce = self.next_nonce().await?;
        let predicted = sender.create(nonce);

        let tx = TransactionRequest::default()
            .with_from(sender)
            .with_nonce(nonce)
            .with_deploy_code(self.artifact.bytecode.clone());
        let pending = provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();

        info!(
            contract = %self.artifact.name,
            address = %predicted,
            nonce,
            tx_hash = ?tx_hash,
            "deployment submitted"
        );

        Ok(EvmContract {
            backend: self.backend.clone(),
            artifact: self.artifact.clone(),
            address: predicted,
            deploy_tx: Some(tx_hash),
            deployment: None,
        })
    }
}

pub struct EvmContract {
    backend: EvmBackend,
    artifact: Arc<ContractArtifact>,
    address: Address,
    deploy_tx: Option<B256>,
    deployment: Option<TxOutcome>,
}

impl EvmContract {
    /// Applies the deployment receipt. The receipt's contract address wins
    /// over the predicted one.
    fn settle(&mut self, receipt: &TransactionReceipt) -> Result<TxOutcome> {
        let outcome = receipt_outcome(receipt)?;
        if let Some(address) = receipt.contract_address {
            if address != self.address {
                warn!(predicted = %self.address, actual = %address, "deployed address differs from prediction");
                self.address = address;
            }
        }
        Ok(outcome)
    }

    async fn ensure_code(&self) -> Result<()> {
        let code = self.backend.provider.get_code_at(self.address).await?;
        if code.is_empty() {
            return Err(Error::MissingCode(self.address));
        }
        Ok(())
    }
}

#[async_trait]
impl ContractInstance for EvmContract {
    type Address = Address;
    type Pending = EvmPendingTx;

    fn address(&self) -> &Address {
        &self.address
    }

    async fn deployed(&mut self) -> Result<TxOutcome> {
        let Some(tx_hash) = self.deploy_tx else {
            return Ok(self.deployment.clone().unwrap_or_default());
        };

        let provider = &self.backend.provider;
        let receipt = PendingTransactionBuilder::<Ethereum>::new(provider.root().clone(), tx_hash)
            .with_required_confirmations(self.backend.confirmations)
            .get_receipt()
            .await?;
        let outcome = self.settle(&receipt)?;
        self.ensure_code().await?;

        info!(
            contract = %self.artifact.name,
            address = %self.address,
            block = ?outcome.block_number,
            gas_used = ?outcome.gas_used,
            "deployment confirmed"
        );
        self.deploy_tx = None;
        self.deployment = Some(outcome.clone());
        Ok(outcome)
    }

    async fn invoke(&self, method: &str) -> Result<EvmPendingTx> {
        let calldata = self.artifact.zero_arg_calldata(method)?;
        let tx = TransactionRequest::default()
            .with_from(self.backend.sender)
            .with_to(self.address)
            .with_input(calldata);

        let pending = self.backend.provider.send_transaction(tx).await?;
        debug!(method, tx_hash = ?pending.tx_hash(), "invocation submitted");

        Ok(EvmPendingTx {
            inner: pending.with_required_confirmations(self.backend.confirmations),
        })
    }
}

pub struct EvmPendingTx {
    inner: PendingTransactionBuilder<Ethereum>,
}

#[async_trait]
impl PendingTransaction for EvmPendingTx {
    fn tx_hash(&self) -> String {
        format!("{:?}", self.inner.tx_hash())
    }

    async fn wait(self) -> Result<TxOutcome> {
        let receipt = self.inner.get_receipt().await?;
        receipt_outcome(&receipt)
    }
}

fn receipt_outcome(receipt: &TransactionReceipt) -> Result<TxOutcome> {
    if !receipt.status() {
        return Err(Error::Reverted(receipt.transaction_hash));
    }
    Ok(TxOutcome {
        tx_hash: format!("{:?}", receipt.transaction_hash),
        block_number: receipt.block_number,
        gas_used: Some(receipt.gas_used),
    })
}
