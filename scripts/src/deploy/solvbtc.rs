//! Deploys the SolvBTC token behind a transparent proxy, upgrading it to the
//! latest implementation version known for the network

use alloy::dyn_abi::DynSolValue;
use colored::Colorize;
use tracing::info;

use crate::{
    chain::ChainClient,
    constants::{
        SOLVBTC_CONTRACT, SOLVBTC_TOKEN_NAME, SOLVBTC_TOKEN_SYMBOL, SOLVBTC_UNDERLYING_ASSET,
    },
    errors::ScriptError,
    framework::{DeployEnv, DeployOptions, Initializer, ProxyOptions},
    networks::{solvbtc_versions, upgrade_names},
};

/// The deployment name of the first SolvBTC implementation
pub const SOLVBTC_IMPL_NAME: &str = "SolvBTCImpl";

/// The deployment name of the SolvBTC proxy
pub const SOLVBTC_PROXY_NAME: &str = "SolvBTCProxy";

/// The initializer run when the SolvBTC proxy is first deployed
fn solvbtc_initializer() -> Initializer {
    Initializer {
        method: "initialize".to_string(),
        args: vec![
            DynSolValue::String(SOLVBTC_TOKEN_NAME.to_string()),
            DynSolValue::String(SOLVBTC_TOKEN_SYMBOL.to_string()),
            DynSolValue::Address(SOLVBTC_UNDERLYING_ASSET),
        ],
    }
}

/// Deploy or upgrade the SolvBTC proxy
pub(super) async fn deploy_solvbtc<C: ChainClient>(
    env: &mut DeployEnv<C>,
) -> Result<(), ScriptError> {
    let deployer = env.named_accounts().deployer;
    let gas_price = env.gas_price().await?;

    let upgrades = upgrade_names(SOLVBTC_IMPL_NAME, solvbtc_versions(env.network()));
    let opts = DeployOptions {
        contract: Some(SOLVBTC_CONTRACT.to_string()),
        from: deployer,
        gas_price,
        log: true,
        ..Default::default()
    };
    let proxy_opts = ProxyOptions { initializer: Some(solvbtc_initializer()), upgrades };

    let deployment =
        env.deploy_or_upgrade(SOLVBTC_IMPL_NAME, SOLVBTC_PROXY_NAME, opts, proxy_opts).await?;

    match deployment.new_implementation_name {
        Some(name) => info!(
            "{} at {:#x} now runs {}",
            SOLVBTC_PROXY_NAME.yellow(),
            deployment.proxy.address,
            name.green()
        ),
        None => info!(
            "{} at {:#x} is up to date",
            SOLVBTC_PROXY_NAME.yellow(),
            deployment.proxy.address
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{Address, Bytes},
        sol_types::{SolCall, SolValue},
    };

    use super::*;
    use crate::{
        solidity::ISolvBTC,
        test_utils::{mock_env, MOCK_DEPLOYER, PROXY_BYTECODE},
    };

    #[tokio::test]
    async fn test_initializer_passed_through_unmodified() {
        let mut env = mock_env("bsc");
        deploy_solvbtc(&mut env).await.unwrap();

        let submitted = env.client().submitted();
        assert_eq!(submitted.len(), 2);

        let proxy_args = &submitted[1].input[PROXY_BYTECODE.len()..];
        let (_, _, data) = <(Address, Address, Bytes)>::abi_decode_params(proxy_args).unwrap();
        let init = ISolvBTC::initializeCall::abi_decode(&data).unwrap();
        assert_eq!(init.name_, "Solv BTC");
        assert_eq!(init.symbol_, "SolvBTC");
        assert_eq!(init.asset_, SOLVBTC_UNDERLYING_ASSET);
    }

    #[tokio::test]
    async fn test_rerun_is_a_noop() {
        let mut env = mock_env("arb");
        deploy_solvbtc(&mut env).await.unwrap();
        deploy_solvbtc(&mut env).await.unwrap();

        assert_eq!(env.client().submitted().len(), 2);
        let proxy = env.get(SOLVBTC_PROXY_NAME).unwrap();
        assert_eq!(proxy.address, MOCK_DEPLOYER.create(1));
        assert_eq!(proxy.implementation, Some(MOCK_DEPLOYER.create(0)));
    }
}
