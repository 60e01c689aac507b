//! Deploys the SolvBTC yield token factory at the same address on every
//! network of a tier

use alloy::{dyn_abi::DynSolValue, primitives::B256};
use colored::Colorize;
use tracing::{info, warn};

use crate::{
    chain::ChainClient,
    constants::{
        SOLVBTC_FACTORY_CONTRACT, SOLVBTC_YIELD_TOKEN_FACTORY, SOLVBTC_YIELD_TOKEN_FACTORY_VERSION,
    },
    errors::ScriptError,
    framework::{DeployEnv, DeployOptions},
    networks::deterministic_suffix,
    utils::deterministic_salt,
};

/// The CREATE2 salt of the yield token factory on `network`, `None` if the
/// network has no deterministic suffix
fn yield_token_factory_salt(network: &str) -> Option<B256> {
    deterministic_suffix(network, SOLVBTC_YIELD_TOKEN_FACTORY_VERSION)
        .map(|suffix| deterministic_salt(SOLVBTC_YIELD_TOKEN_FACTORY, &suffix))
}

/// Deploy the yield token factory, administered and governed by the deployer
pub(super) async fn deploy_yield_token_factory<C: ChainClient>(
    env: &mut DeployEnv<C>,
) -> Result<(), ScriptError> {
    let deployer = env.named_accounts().deployer;

    let salt = yield_token_factory_salt(env.network());
    if salt.is_none() {
        warn!("no deterministic salt for {}, deploying with CREATE", env.network());
    }

    let opts = DeployOptions {
        contract: Some(SOLVBTC_FACTORY_CONTRACT.to_string()),
        from: deployer,
        args: vec![DynSolValue::Address(deployer), DynSolValue::Address(deployer)],
        log: true,
        deterministic_deployment: salt,
        ..Default::default()
    };
    let factory = env.deploy(SOLVBTC_YIELD_TOKEN_FACTORY, opts).await?;

    info!(
        "{} deployed at {} on {}",
        SOLVBTC_YIELD_TOKEN_FACTORY.yellow(),
        format!("{:#x}", factory.address).green(),
        env.network().red()
    );
    Ok(())
}
