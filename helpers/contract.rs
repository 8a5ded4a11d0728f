//! Backend-neutral handles used by the runner.
//!
//! The EVM implementation lives in [`crate::evm`]. With the `testing`
//! feature each trait also gets a mockall double (`MockContractBackend` and
//! friends).

use std::fmt::Display;

use async_trait::async_trait;

use crate::error::Result;

/// Resolves contract factories by artifact name.
#[cfg_attr(feature = "testing", mockall::automock(type Factory = MockContractFactory;))]
#[async_trait]
pub trait ContractBackend: Send + Sync {
    type Factory: ContractFactory;

    async fn contract_factory(&self, name: &str) -> Result<Self::Factory>;
}

/// Builds deployment transactions for one contract.
#[cfg_attr(feature = "testing", mockall::automock(type Contract = MockContractInstance;))]
#[async_trait]
pub trait ContractFactory: Send + Sync {
    type Contract: ContractInstance;

    /// Submits the deployment. The returned instance is not confirmed yet.
    async fn deploy(&self) -> Result<Self::Contract>;
}

/// A deployed (or deploying) contract.
#[cfg_attr(
    feature = "testing",
    mockall::automock(type Address = String; type Pending = MockPendingTransaction;)
)]
#[async_trait]
pub trait ContractInstance: Send + Sync {
    type Address: Display + Send + Sync;
    type Pending: PendingTransaction;

    fn address(&self) -> &Self::Address;

    /// Waits until the deployment transaction is confirmed.
    /// Calling it again after success is a no-op.
    async fn deployed(&mut self) -> Result<TxOutcome>;

    /// Submits a call to a zero-argument state-mutating method.
    async fn invoke(&self, method: &str) -> Result<Self::Pending>;
}

/// A submitted transaction awaiting confirmation.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait PendingTransaction: Send {
    fn tx_hash(&self) -> String;

    async fn wait(self) -> Result<TxOutcome>;
}

/// Receipt details kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}
