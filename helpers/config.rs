//! Script configuration.
//!
//! Values come from a TOML file (`deploy.toml` by default), then from the
//! environment and command line (see [`crate::cli::ScriptArgs`]).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::runner::RunPlan;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "deploy.toml";

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_CONTRACT: &str = "MyEpicNFT";
pub const DEFAULT_METHOD: &str = "makeAnEpicNFT";
pub const DEFAULT_LABEL: &str = "Minted NFT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub network: NetworkConfig,
    pub signer: SignerConfig,
    pub contract: ContractConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub rpc_url: String,
    /// When set, the node must report this chain id.
    pub chain_id: Option<u64>,
    pub confirmations: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            confirmations: 1,
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignerConfig {
    pub private_key: Option<String>,
}

impl std::fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractConfig {
    pub name: String,
    pub artifacts_dir: PathBuf,
    pub method: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CONTRACT.to_string(),
            artifacts_dir: PathBuf::from("artifacts"),
            method: DEFAULT_METHOD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Invocations after deployment. Unset means the binary's own default.
    pub invocations: Option<u32>,
    pub label: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            invocations: None,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Loads the config from `path`, or from [`DEFAULT_CONFIG_PATH`] when it
    /// exists, or falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a config file body. Values are checked by [`Config::validate`]
    /// once overrides have been applied.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_url.trim().is_empty() {
            return Err(Error::InvalidConfig("network.rpc_url is empty".to_string()));
        }
        if self.contract.name.trim().is_empty() {
            return Err(Error::InvalidConfig("contract.name is empty".to_string()));
        }
        if self.contract.method.trim().is_empty() {
            return Err(Error::InvalidConfig("contract.method is empty".to_string()));
        }
        if self.network.confirmations == 0 {
            return Err(Error::InvalidConfig(
                "network.confirmations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn private_key(&self) -> Result<&str> {
        self.signer
            .private_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "missing signer private key (signer.private_key or PRIVATE_KEY)".to_string(),
                )
            })
    }

    /// Builds the run plan, using `default_invocations` unless the config
    /// pins a count.
    pub fn plan(&self, default_invocations: u32) -> RunPlan {
        RunPlan {
            contract: self.contract.name.clone(),
            method: self.contract.method.clone(),
            invocations: self.run.invocations.unwrap_or(default_invocations),
            label: self.run.label.clone(),
        }
    }
}
