//! Scripts for deploying, initializing and upgrading the SolvBTC contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod chain;
pub mod cli;
mod commands;
pub mod constants;
pub mod deploy;
pub mod deployments;
pub mod errors;
pub mod framework;
pub mod gas;
pub mod networks;
mod solidity;
pub mod utils;

#[cfg(test)]
mod test_utils;
