//! Implementations of the CLI commands

use std::str::FromStr;

use alloy::{
    primitives::{Address, Bytes},
    sol_types::SolCall,
};
use colored::Colorize;
use tracing::info;

use crate::{
    chain::ChainClient,
    cli::{GlobalArgs, RunArgs, SaltArgs, UpgradeArgs},
    constants::DETERMINISTIC_DEPLOYER_ADDRESS,
    deploy::{run_tags, Script},
    errors::ScriptError,
    framework::DeployEnv,
    networks::deterministic_suffix,
    solidity::IProxyAdmin,
    utils::{create2_address, deterministic_salt},
};

/// Run the deploy scripts selected by `args.tags`
pub async fn run(args: RunArgs, global: &GlobalArgs) -> Result<(), ScriptError> {
    let client = global.client().await?;
    let mut env = global.deploy_env(client)?;

    let states = run_tags(&mut env, &args.tags).await?;
    info!("completed {} scripts on {}", states.len(), env.network().red());
    Ok(())
}

/// Print every deploy script with its id and tags
pub fn list() {
    for script in Script::ALL {
        println!("{:>6}  {:<32} {}", script.id(), script.to_string(), script.tags().join(", "));
    }
}

/// Print the deterministic suffix and salt of a contract on the selected
/// network, and its CREATE2 address if the init code is given
pub fn salt(args: SaltArgs, global: &GlobalArgs) -> Result<(), ScriptError> {
    let Some(suffix) = deterministic_suffix(&global.network, &args.version) else {
        println!("no deterministic suffix for network {}", global.network);
        return Ok(());
    };
    let salt = deterministic_salt(&args.name, &suffix);
    println!("suffix:  {suffix}");
    println!("salt:    {salt:#x}");

    if let Some(init_code) = args.init_code {
        let init_code = hex::decode(init_code.trim_start_matches("0x"))
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
        let address = create2_address(DETERMINISTIC_DEPLOYER_ADDRESS, salt, &init_code);
        println!("address: {address:#x}");
    }
    Ok(())
}

/// Upgrade a proxy through its admin contract
pub async fn upgrade(args: UpgradeArgs, global: &GlobalArgs) -> Result<(), ScriptError> {
    let client = global.client().await?;
    let env = global.deploy_env(client)?;
    upgrade_proxy(&env, args).await
}

/// Call `upgradeAndCall` on the proxy admin and wait for it to be confirmed
async fn upgrade_proxy<C: ChainClient>(
    env: &DeployEnv<C>,
    args: UpgradeArgs,
) -> Result<(), ScriptError> {
    let proxy_admin_address = Address::from_str(&args.proxy_admin)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
    let proxy_address = Address::from_str(&args.proxy)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
    let implementation_address = Address::from_str(&args.implementation)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;

    let data = if let Some(calldata) = args.calldata {
        hex::decode(calldata.trim_start_matches("0x"))
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?
            .into()
    } else {
        Bytes::new()
    };

    let calldata = IProxyAdmin::upgradeAndCallCall {
        proxy: proxy_address,
        implementation: implementation_address,
        data,
    }
    .abi_encode();
    let tx = env.execute(proxy_admin_address, calldata.into()).await?;
    env.wait(tx).await?;

    info!("upgraded proxy {proxy_address:#x} to {implementation_address:#x} (tx: {tx:#x})");
    Ok(())
}
