//! Error type shared by the deployment helpers.

use std::path::PathBuf;

use alloy_primitives::{Address, B256};

/// Result alias used across the helpers crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a deployment run.
///
/// Variants only exist to make log lines readable. The runner never branches
/// on them: any error ends the run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Artifact for contract {name} not found under {dir}")]
    ArtifactNotFound { name: String, dir: PathBuf },

    #[error("Invalid artifact {path}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("Contract {contract} has no zero-argument method named {method}")]
    MethodNotFound { contract: String, method: String },

    #[error("Constructor of {0} requires arguments")]
    ConstructorArguments(String),

    #[error("RPC request failed: {0}")]
    Rpc(#[from] alloy_transport::TransportError),

    #[error("Waiting for transaction failed: {0}")]
    Pending(#[from] alloy_provider::PendingTransactionError),

    #[error("Chain id mismatch: configured {expected}, node reports {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("Transaction {0} reverted")]
    Reverted(B256),

    #[error("No contract code at {0} after deployment")]
    MissingCode(Address),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Free-form failure returned by test doubles.
    #[error("{0}")]
    Scripted(String),
}
