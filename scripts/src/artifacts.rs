//! Loading of compiled contract artifacts
//!
//! Artifacts are the JSON files Hardhat writes for each compiled contract,
//! of which only the contract name, ABI and creation bytecode are used.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::Bytes,
};
use serde::Deserialize;
use tracing::debug;

use crate::{constants::ARTIFACT_FILE_EXTENSION, errors::ScriptError};

/// A compiled contract
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// The name of the contract
    pub contract_name: String,
    /// The ABI of the contract
    pub abi: JsonAbi,
    /// The creation bytecode of the contract, without constructor arguments
    pub bytecode: Bytes,
}

impl Artifact {
    /// Build the init code deploying this contract with the given constructor arguments
    pub fn init_code(&self, args: &[DynSolValue]) -> Result<Bytes, ScriptError> {
        if self.bytecode.is_empty() {
            return Err(ScriptError::ContractDeployment(format!(
                "{} has no creation bytecode",
                self.contract_name
            )));
        }

        let encoded_args = match self.abi.constructor() {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(ScriptError::CalldataConstruction(format!(
                    "{} has no constructor but {} arguments were given",
                    self.contract_name,
                    args.len()
                )))
            }
        };

        Ok([self.bytecode.as_ref(), encoded_args.as_slice()].concat().into())
    }

    /// Encode a call to `method` with the given arguments, selecting the
    /// overload whose arity matches
    pub fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, ScriptError> {
        let function = self
            .abi
            .function(method)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == args.len()))
            .ok_or_else(|| {
                ScriptError::CalldataConstruction(format!(
                    "{} has no method {method} taking {} arguments",
                    self.contract_name,
                    args.len()
                ))
            })?;

        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
    }
}

/// Resolves contract names to artifacts, caching what it has read
#[derive(Debug, Default)]
pub struct ArtifactStore {
    /// The root of the artifacts tree, `None` for an in-memory store
    dir: Option<PathBuf>,
    /// The artifacts loaded so far, by contract name
    cache: HashMap<String, Artifact>,
}

impl ArtifactStore {
    /// An artifact store reading from the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()), cache: HashMap::new() }
    }

    /// An artifact store holding exactly the given artifacts
    pub fn in_memory(artifacts: impl IntoIterator<Item = Artifact>) -> Self {
        let cache = artifacts.into_iter().map(|a| (a.contract_name.clone(), a)).collect();
        Self { dir: None, cache }
    }

    /// Load the artifact of the named contract
    pub fn load(&mut self, contract: &str) -> Result<Artifact, ScriptError> {
        if let Some(artifact) = self.cache.get(contract) {
            return Ok(artifact.clone());
        }

        let path = self
            .dir
            .as_deref()
            .and_then(|dir| find_artifact_file(dir, contract))
            .ok_or_else(|| ScriptError::MissingArtifact(contract.to_string()))?;
        debug!("loading artifact {}", path.display());

        let contents =
            fs::read_to_string(&path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        let artifact: Artifact = serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;

        self.cache.insert(contract.to_string(), artifact.clone());
        Ok(artifact)
    }
}

/// Search the artifacts tree for `<contract>.json`, depth first
fn find_artifact_file(dir: &Path, contract: &str) -> Option<PathBuf> {
    let file_name = format!("{contract}.{ARTIFACT_FILE_EXTENSION}");
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().is_some_and(|name| name == file_name.as_str()) {
            return Some(path);
        }
    }

    subdirs.sort();
    subdirs.into_iter().find_map(|subdir| find_artifact_file(&subdir, contract))
}
