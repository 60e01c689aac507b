//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy::primitives::{Address, TxHash};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading a deployments file
    ReadDeployments(String),
    /// Error writing a deployments file
    WriteDeployments(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// No compilation artifact exists for the given contract name
    MissingArtifact(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A transaction was mined but reverted
    TransactionReverted(TxHash),
    /// A transaction was not confirmed before the timeout elapsed
    ConfirmationTimeout(TxHash),
    /// No deployment is recorded under the given name on the active network
    MissingDeployment(String),
    /// The deterministic deployment proxy has no code on the active network
    MissingDeterministicDeployer(Address),
    /// No deploy script carries any of the requested tags
    UnknownTags(Vec<String>),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::MissingArtifact(s) => write!(f, "no artifact found for contract {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::TransactionReverted(hash) => {
                write!(f, "transaction {:#x} reverted", hash)
            }
            ScriptError::ConfirmationTimeout(hash) => {
                write!(f, "timed out waiting for transaction {:#x}", hash)
            }
            ScriptError::MissingDeployment(s) => write!(f, "no deployment recorded for {}", s),
            ScriptError::MissingDeterministicDeployer(addr) => {
                write!(f, "deterministic deployment proxy {:#x} is not deployed", addr)
            }
            ScriptError::UnknownTags(tags) => {
                write!(f, "no deploy script tagged with any of {}", tags.join(", "))
            }
        }
    }
}

impl Error for ScriptError {}
