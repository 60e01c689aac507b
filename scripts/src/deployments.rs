//! Persistence of deployed contract addresses
//!
//! Each network has its own `<network>.json` file in the deployments
//! directory, mapping a deployment's logical name to its record.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, TxHash, B256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{constants::DEPLOYMENTS_FILE_EXTENSION, errors::ScriptError};

/// A contract deployed on a network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The name of the artifact the contract was deployed from
    pub contract: String,
    /// The address of the contract
    pub address: Address,
    /// The hash of the deployment transaction, absent when the contract was
    /// found already deployed at its deterministic address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    /// The keccak hash of the init code, used to detect changed deployments.
    /// Absent for contracts recorded by hand, which are never reused as
    /// deployments of local artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_code_hash: Option<B256>,
    /// The implementation a proxy delegates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Address>,
    /// The admin contract allowed to upgrade a proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Address>,
}

/// The deployments made on a single network
#[derive(Debug, Default)]
pub struct DeploymentStore {
    /// The backing file, `None` for an in-memory store
    path: Option<PathBuf>,
    /// The records, by logical deployment name
    records: BTreeMap<String, DeploymentRecord>,
}

impl DeploymentStore {
    /// Load the deployments of `network` from the deployments directory.
    ///
    /// A missing file is an empty store; it is created on the first write.
    pub fn load(dir: &Path, network: &str) -> Result<Self, ScriptError> {
        let path = dir.join(format!("{network}.{DEPLOYMENTS_FILE_EXTENSION}"));
        let records = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
            serde_json::from_str(&contents)
                .map_err(|e| ScriptError::ReadDeployments(format!("{}: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };

        debug!("loaded {} deployments from {}", records.len(), path.display());
        Ok(Self { path: Some(path), records })
    }

    /// A store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// The record of the named deployment
    pub fn get(&self, name: &str) -> Option<&DeploymentRecord> {
        self.records.get(name)
    }

    /// The names of all recorded deployments
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Record a deployment under `name`, replacing any previous record, and
    /// persist the store
    pub fn insert(&mut self, name: &str, record: DeploymentRecord) -> Result<(), ScriptError> {
        self.records.insert(name.to_string(), record);
        self.save()
    }

    /// Write the store to its backing file
    fn save(&self) -> Result<(), ScriptError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        }
        let contents = serde_json::to_string_pretty(&self.records)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;

        fs::write(path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }
}
