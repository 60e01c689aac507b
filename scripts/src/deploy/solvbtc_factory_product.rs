//! Deploys the SolvBTC product proxy through the SolvBTC factory and points
//! it at the multi-asset pool

use alloy::{
    primitives::Address,
    sol_types::{SolCall, SolValue},
};
use colored::Colorize;
use tracing::info;

use crate::{
    chain::ChainClient,
    constants::{
        SOLVBTC_CONTRACT, SOLVBTC_FACTORY_CONTRACT, SOLVBTC_MULTI_ASSET_POOL_PROXY,
        SOLVBTC_PRODUCT_NAME, SOLVBTC_PRODUCT_TYPE, SOLVBTC_TOKEN_NAME, SOLVBTC_TOKEN_SYMBOL,
    },
    errors::ScriptError,
    framework::DeployEnv,
    solidity::{ISolvBTC, ISolvBTCFactory},
};

/// Deploy the SolvBTC product proxy and run its second initializer
pub(super) async fn deploy_solvbtc_factory_product<C: ChainClient>(
    env: &mut DeployEnv<C>,
) -> Result<(), ScriptError> {
    let factory = env.get(SOLVBTC_FACTORY_CONTRACT)?.address;

    let deploy_call = ISolvBTCFactory::deployProductProxyCall {
        productType: SOLVBTC_PRODUCT_TYPE.to_string(),
        productName: SOLVBTC_PRODUCT_NAME.to_string(),
        tokenName: SOLVBTC_TOKEN_NAME.to_string(),
        tokenSymbol: SOLVBTC_TOKEN_SYMBOL.to_string(),
    };
    let tx = env.execute(factory, deploy_call.abi_encode().into()).await?;
    info!("deploy {} at {tx:#x}", SOLVBTC_CONTRACT.yellow());
    env.wait(tx).await?;

    let get_proxy_call = ISolvBTCFactory::getProxyCall {
        productType: SOLVBTC_PRODUCT_TYPE.to_string(),
        productName: SOLVBTC_PRODUCT_NAME.to_string(),
    };
    let ret = env.read(factory, get_proxy_call.abi_encode().into()).await?;
    let solvbtc = Address::abi_decode(&ret)
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let pool = env.get(SOLVBTC_MULTI_ASSET_POOL_PROXY)?.address;
    let initialize_call = ISolvBTC::initializeV2Call { solvBTCMultiAssetPool_: pool };
    let tx = env.execute(solvbtc, initialize_call.abi_encode().into()).await?;
    info!("{} {:#x} initializeV2 at {tx:#x}", SOLVBTC_CONTRACT.yellow(), solvbtc);
    env.wait(tx).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        deployments::DeploymentRecord,
        framework::DeployEnv,
        gas::GasStrategy,
        test_utils::{address_return, mock_env, MockChain},
    };

    /// A recorded deployment at the given address
    fn record(contract: &str, address: Address) -> DeploymentRecord {
        DeploymentRecord {
            contract: contract.to_string(),
            address,
            transaction_hash: None,
            init_code_hash: None,
            implementation: None,
            admin: None,
        }
    }

    /// An environment with the factory and pool recorded, and a factory that
    /// knows the given product proxy
    fn env_with_factory(
        factory: Address,
        pool: Address,
        product: Address,
    ) -> DeployEnv<MockChain> {
        let mut env = mock_env("sepolia");
        env.record(SOLVBTC_FACTORY_CONTRACT, record(SOLVBTC_FACTORY_CONTRACT, factory)).unwrap();
        env.record(SOLVBTC_MULTI_ASSET_POOL_PROXY, record("SolvBTCMultiAssetPool", pool)).unwrap();
        env.client().set_call_response(
            factory,
            ISolvBTCFactory::getProxyCall::SELECTOR,
            address_return(product),
        );
        env
    }

    #[tokio::test]
    async fn test_initialize_targets_factory_proxy() {
        let factory = Address::repeat_byte(0xfa);
        let pool = Address::repeat_byte(0x90);
        let product = Address::repeat_byte(0x50);
        let mut env = env_with_factory(factory, pool, product);

        deploy_solvbtc_factory_product(&mut env).await.unwrap();

        let submitted = env.client().submitted();
        assert_eq!(submitted.len(), 2);

        assert_eq!(submitted[0].to, Some(factory));
        let deploy =
            ISolvBTCFactory::deployProductProxyCall::abi_decode(&submitted[0].input).unwrap();
        assert_eq!(deploy.productType, "Solv BTC");
        assert_eq!(deploy.productName, "Solv BTC");
        assert_eq!(deploy.tokenName, "Solv BTC");
        assert_eq!(deploy.tokenSymbol, "SolvBTC");

        assert_eq!(submitted[1].to, Some(product));
        let init = ISolvBTC::initializeV2Call::abi_decode(&submitted[1].input).unwrap();
        assert_eq!(init.solvBTCMultiAssetPool_, pool);
    }

    #[tokio::test]
    async fn test_transactions_use_oracle_gas_price() {
        let factory = Address::repeat_byte(0xfa);
        let env =
            env_with_factory(factory, Address::repeat_byte(0x90), Address::repeat_byte(0x50));
        let mut env = env.with_gas_strategy(GasStrategy::Fixed(1_000));

        deploy_solvbtc_factory_product(&mut env).await.unwrap();
        assert!(env.client().submitted().iter().all(|tx| tx.gas_price == Some(1_000)));
    }

    #[tokio::test]
    async fn test_reverted_factory_call_stops_the_script() {
        let factory = Address::repeat_byte(0xfa);
        let mut env =
            env_with_factory(factory, Address::repeat_byte(0x90), Address::repeat_byte(0x50));
        env.client().revert_next();

        let res = deploy_solvbtc_factory_product(&mut env).await;
        assert!(matches!(res, Err(ScriptError::TransactionReverted(_))));
        assert_eq!(env.client().submitted().len(), 1);
    }
}
