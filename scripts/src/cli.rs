//! Definitions of CLI arguments and commands for the deploy scripts

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::{
    artifacts::ArtifactStore,
    chain::{setup_client, ChainClient, ConfirmationOptions, RpcClient},
    commands::{list, run, salt, upgrade},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIRMATIONS, DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        DEFAULT_DEPLOYMENTS_DIR, DEFAULT_NETWORK, DEFAULT_RPC_URL, RECEIPT_POLL_INTERVAL,
        SOLVBTC_YIELD_TOKEN_FACTORY_VERSION,
    },
    deployments::DeploymentStore,
    errors::ScriptError,
    framework::DeployEnv,
    gas::GasStrategy,
    networks::gas_strategy,
};

/// Deploy and upgrade the SolvBTC contracts
#[derive(Parser)]
pub struct Cli {
    /// Arguments shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Arguments shared by every command
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// The network to deploy to, selecting the deployments file, the gas
    /// strategy and the deterministic suffix
    #[arg(short, long, env = "NETWORK", default_value = DEFAULT_NETWORK, global = true)]
    pub network: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL, global = true)]
    pub rpc_url: String,

    /// Private key of the deployer
    #[arg(short, long, env = "PKEY", hide_env_values = true, global = true)]
    pub priv_key: Option<String>,

    /// Directory holding one deployments file per network
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_DIR, global = true)]
    pub deployments_dir: PathBuf,

    /// Directory holding the compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR, global = true)]
    pub artifacts_dir: PathBuf,

    /// Fixed gas price in wei, overriding the network's strategy
    #[arg(long, global = true)]
    pub gas_price: Option<u128>,

    /// Number of confirmations to wait for on each transaction
    #[arg(long, default_value_t = DEFAULT_CONFIRMATIONS, global = true)]
    pub confirmations: u64,

    /// Seconds to wait for each transaction before giving up
    #[arg(long, default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,
}

impl GlobalArgs {
    /// The gas strategy for the selected network
    pub fn gas_strategy(&self) -> GasStrategy {
        match self.gas_price {
            Some(wei) => GasStrategy::Fixed(wei),
            None => gas_strategy(&self.network),
        }
    }

    /// How to wait for transactions
    pub fn confirmation_options(&self) -> ConfirmationOptions {
        ConfirmationOptions {
            confirmations: self.confirmations,
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: RECEIPT_POLL_INTERVAL,
        }
    }

    /// Connect to the RPC endpoint as the deployer
    pub async fn client(&self) -> Result<RpcClient, ScriptError> {
        let priv_key = self.priv_key.as_deref().ok_or_else(|| {
            ScriptError::ClientInitialization("no private key given, set --priv-key".to_string())
        })?;
        setup_client(priv_key, &self.rpc_url).await
    }

    /// Build the deploy environment for the selected network over `client`
    pub fn deploy_env<C: ChainClient>(&self, client: C) -> Result<DeployEnv<C>, ScriptError> {
        let artifacts = ArtifactStore::new(self.artifacts_dir.clone());
        let deployments = DeploymentStore::load(&self.deployments_dir, &self.network)?;

        Ok(DeployEnv::new(client, &self.network, artifacts, deployments)
            .with_gas_strategy(self.gas_strategy())
            .with_confirmations(self.confirmation_options()))
    }
}

/// The commands the CLI can run
#[derive(Subcommand)]
pub enum Command {
    /// Run the deploy scripts carrying any of the given tags
    Run(RunArgs),
    /// List the deploy scripts with their ids and tags
    List,
    /// Print the deterministic salt of a contract on the selected network
    Salt(SaltArgs),
    /// Upgrade a proxy through its admin contract
    Upgrade(UpgradeArgs),
}

impl Command {
    /// Run the command with the given global arguments
    pub async fn run(self, global: &GlobalArgs) -> Result<(), ScriptError> {
        match self {
            Command::Run(args) => run(args, global).await,
            Command::List => {
                list();
                Ok(())
            }
            Command::Salt(args) => salt(args, global),
            Command::Upgrade(args) => upgrade(args, global).await,
        }
    }
}

/// Run the deploy scripts
#[derive(Args)]
pub struct RunArgs {
    /// The tags selecting the scripts to run, all scripts if omitted
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

/// Compute a deterministic deployment salt.
///
/// The salt is the keccak256 hash of the contract name followed by the
/// network's version suffix.
#[derive(Args)]
pub struct SaltArgs {
    /// The deployment name of the contract
    #[arg(long)]
    pub name: String,

    /// The version the suffix is derived from
    #[arg(long, default_value = SOLVBTC_YIELD_TOKEN_FACTORY_VERSION)]
    pub version: String,

    /// The contract's init code in hex, to also print the address the
    /// deterministic deployment proxy would create it at
    #[arg(long)]
    pub init_code: Option<String>,
}

/// Upgrade a proxy's implementation
#[derive(Args)]
pub struct UpgradeArgs {
    /// Address of the proxy admin contract
    #[arg(long)]
    pub proxy_admin: String,

    /// Address of the proxy contract
    #[arg(long)]
    pub proxy: String,

    /// Address of the new implementation contract
    #[arg(short, long)]
    pub implementation: String,

    /// Optional calldata, in hex form, with which to
    /// call the implementation contract when upgrading
    #[arg(short, long)]
    pub calldata: Option<String>,
}
