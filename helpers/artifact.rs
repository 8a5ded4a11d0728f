//! Compiled contract artifacts (ABI + creation bytecode) read from disk.

use std::path::{Path, PathBuf};

use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub path: PathBuf,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Paths searched for `name` under `dir`, in order.
    ///
    /// Covers the Hardhat layout (`artifacts/contracts/X.sol/X.json`), the
    /// Foundry layout (`out/X.sol/X.json`) and a flat `X.json`.
    pub fn candidate_paths(dir: &Path, name: &str) -> Vec<PathBuf> {
        let file = format!("{name}.json");
        let source = format!("{name}.sol");
        vec![
            dir.join("contracts").join(&source).join(&file),
            dir.join(&source).join(&file),
            dir.join(&file),
        ]
    }

    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = Self::candidate_paths(dir, name)
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| Error::ArtifactNotFound {
                name: name.to_string(),
                dir: dir.to_path_buf(),
            })?;

        debug!(contract = name, path = %path.display(), "loading artifact");
        let content = std::fs::read_to_string(&path)?;
        let json: Value = serde_json::from_str(&content).map_err(|e| Error::InvalidArtifact {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::from_json(name, path, &json)
    }

    pub fn from_json(name: &str, path: PathBuf, json: &Value) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidArtifact {
            path: path.clone(),
            reason,
        };

        let abi_value = json
            .get("abi")
            .cloned()
            .ok_or_else(|| invalid("no abi".to_string()))?;
        let abi: JsonAbi =
            serde_json::from_value(abi_value).map_err(|e| invalid(format!("bad abi: {e}")))?;

        // Hardhat stores a hex string, Foundry nests it under `object`.
        let code = match json.get("bytecode") {
            Some(Value::String(code)) => code.as_str(),
            Some(Value::Object(obj)) => obj
                .get("object")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("bytecode.object missing".to_string()))?,
            _ => return Err(invalid("no bytecode".to_string())),
        };
        let code = code.strip_prefix("0x").unwrap_or(code);
        let bytecode = hex::decode(code).map_err(|e| invalid(format!("bad bytecode hex: {e}")))?;
        if bytecode.is_empty() {
            return Err(invalid(
                "empty bytecode (abstract contract or interface?)".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            path,
            abi,
            bytecode: Bytes::from(bytecode),
        })
    }

    /// Fails when the constructor takes arguments; the runner deploys with none.
    pub fn ensure_plain_constructor(&self) -> Result<()> {
        match &self.abi.constructor {
            Some(constructor) if !constructor.inputs.is_empty() => {
                Err(Error::ConstructorArguments(self.name.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Calldata for the zero-argument overload of `method`.
    pub fn zero_arg_calldata(&self, method: &str) -> Result<Bytes> {
        self.abi
            .function(method)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.is_empty()))
            .map(|function| Bytes::copy_from_slice(function.selector().as_slice()))
            .ok_or_else(|| Error::MethodNotFound {
                contract: self.name.clone(),
                method: method.to_string(),
            })
    }
}
