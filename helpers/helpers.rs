//! Helpers for deploying a contract and invoking it from scripts and tests.
//!
//! [`runner::run`] drives any [`contract::ContractBackend`]; scripts use the
//! alloy-backed [`evm::EvmBackend`], tests the mockall doubles exported with
//! the `testing` feature.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod contract;
pub mod error;
pub mod evm;
pub mod runner;
pub mod wrapper;

pub use cli::{run_script, ScriptArgs};
pub use config::Config;
pub use contract::{
    ContractBackend, ContractFactory, ContractInstance, PendingTransaction, TxOutcome,
};
#[cfg(feature = "testing")]
pub use contract::{
    MockContractBackend, MockContractFactory, MockContractInstance, MockPendingTransaction,
};
pub use error::{Error, Result};
pub use runner::{run, RunFailure, RunPlan, RunReport, RunStage};
pub use wrapper::{run_main, RunStatus};
