//! The environment handed to each deploy script: named accounts, artifacts,
//! recorded deployments and the deploy / deploy-or-upgrade operations

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{keccak256, Address, Bytes, TxHash, B256},
    sol_types::SolCall,
};
use colored::Colorize;
use tracing::{debug, info};

use crate::{
    artifacts::ArtifactStore,
    chain::{wait_for_confirmation, ChainClient, ConfirmationOptions, Receipt, TxRequest},
    constants::{
        DETERMINISTIC_DEPLOYER_ADDRESS, PROXY_ADMIN_STORAGE_SLOT,
        PROXY_IMPLEMENTATION_STORAGE_SLOT, TRANSPARENT_PROXY_CONTRACT,
    },
    deployments::{DeploymentRecord, DeploymentStore},
    errors::ScriptError,
    gas::GasStrategy,
    solidity::IProxyAdmin,
    utils::{address_from_word, create2_address},
};

/// The accounts the scripts act as
#[derive(Clone, Copy, Debug)]
pub struct NamedAccounts {
    /// The account deploying and administering the contracts
    pub deployer: Address,
}

/// Options for deploying a single contract
#[derive(Clone, Debug, Default)]
pub struct DeployOptions {
    /// The artifact to deploy, defaults to the deployment name
    pub contract: Option<String>,
    /// The account to deploy from
    pub from: Address,
    /// The constructor arguments
    pub args: Vec<DynSolValue>,
    /// The gas price to pay, `None` to let the client decide
    pub gas_price: Option<u128>,
    /// Whether to log the deployment at info level
    pub log: bool,
    /// The CREATE2 salt, if the contract should land at a deterministic address
    pub deterministic_deployment: Option<B256>,
}

/// The call made on a freshly deployed proxy
#[derive(Clone, Debug)]
pub struct Initializer {
    /// The name of the implementation method to call
    pub method: String,
    /// The arguments to call it with
    pub args: Vec<DynSolValue>,
}

/// Options for deploying or upgrading a proxy
#[derive(Clone, Debug, Default)]
pub struct ProxyOptions {
    /// The initializer called when the proxy is first deployed
    pub initializer: Option<Initializer>,
    /// The deployment names of the implementations following the first one,
    /// oldest first. The proxy is upgraded to the last one.
    pub upgrades: Vec<String>,
}

/// The outcome of [`DeployEnv::deploy_or_upgrade`]
#[derive(Clone, Debug)]
pub struct ProxyDeployment {
    /// The proxy record
    pub proxy: DeploymentRecord,
    /// The implementation the proxy was pointed at in this run, if any
    pub new_implementation: Option<DeploymentRecord>,
    /// The deployment name of that implementation
    pub new_implementation_name: Option<String>,
}

/// Everything a deploy script may act on
pub struct DeployEnv<C> {
    /// The network client
    client: C,
    /// The network identifier
    network: String,
    /// The accounts the scripts act as
    accounts: NamedAccounts,
    /// How to price transactions
    gas: GasStrategy,
    /// The compiled contracts
    artifacts: ArtifactStore,
    /// The deployments recorded on this network
    deployments: DeploymentStore,
    /// How to wait for transactions
    confirmations: ConfirmationOptions,
}

impl<C: ChainClient> DeployEnv<C> {
    /// Create an environment for `network`, acting as the client's sender
    pub fn new(
        client: C,
        network: &str,
        artifacts: ArtifactStore,
        deployments: DeploymentStore,
    ) -> Self {
        let accounts = NamedAccounts { deployer: client.sender() };
        Self {
            client,
            network: network.to_string(),
            accounts,
            gas: GasStrategy::default(),
            artifacts,
            deployments,
            confirmations: ConfirmationOptions::default(),
        }
    }

    /// Set the gas strategy used for script transactions
    pub fn with_gas_strategy(mut self, gas: GasStrategy) -> Self {
        self.gas = gas;
        self
    }

    /// Set how transactions are waited on
    pub fn with_confirmations(mut self, confirmations: ConfirmationOptions) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// The network identifier
    pub fn network(&self) -> &str {
        &self.network
    }

    /// The accounts the scripts act as
    pub fn named_accounts(&self) -> NamedAccounts {
        self.accounts
    }

    /// The network client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The gas price recommended for the network, `None` to let the client decide
    pub async fn gas_price(&self) -> Result<Option<u128>, ScriptError> {
        self.gas.gas_price(&self.client).await
    }

    /// The recorded deployment with the given name
    pub fn get(&self, name: &str) -> Result<&DeploymentRecord, ScriptError> {
        self.deployments.get(name).ok_or_else(|| ScriptError::MissingDeployment(name.to_string()))
    }

    /// The deployments recorded on the network
    pub fn deployments(&self) -> &DeploymentStore {
        &self.deployments
    }

    /// Record a deployment made outside the scripts, e.g. a contract
    /// deployed by another repository
    pub fn record(&mut self, name: &str, record: DeploymentRecord) -> Result<(), ScriptError> {
        self.deployments.insert(name, record)
    }

    // ----------------
    // | Transactions |
    // ----------------

    /// Submit a call to `to` at the recommended gas price, without waiting for it
    pub async fn execute(&self, to: Address, calldata: Bytes) -> Result<TxHash, ScriptError> {
        let gas_price = self.gas_price().await?;
        self.send(TxRequest::call(to, calldata).with_gas_price(gas_price)).await
    }

    /// Wait for a submitted transaction to be confirmed
    pub async fn wait(&self, hash: TxHash) -> Result<Receipt, ScriptError> {
        wait_for_confirmation(&self.client, hash, &self.confirmations).await
    }

    /// Execute a read-only call
    pub async fn read(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError> {
        self.client.call(to, calldata).await
    }

    /// Submit a transaction as is
    async fn send(&self, tx: TxRequest) -> Result<TxHash, ScriptError> {
        let hash = self.client.submit(tx).await?;
        debug!(tx = %hash, "submitted transaction");
        Ok(hash)
    }

    // ---------------
    // | Deployments |
    // ---------------

    /// Deploy a contract under `name`, or reuse the recorded deployment if it
    /// was made from the same init code and still has code on chain
    pub async fn deploy(
        &mut self,
        name: &str,
        opts: DeployOptions,
    ) -> Result<DeploymentRecord, ScriptError> {
        self.check_sender(opts.from)?;

        let contract = opts.contract.clone().unwrap_or_else(|| name.to_string());
        let artifact = self.artifacts.load(&contract)?;
        let init_code = artifact.init_code(&opts.args)?;
        let init_code_hash = keccak256(&init_code);

        if let Some(existing) = self.deployments.get(name) {
            let unchanged = existing.init_code_hash == Some(init_code_hash);
            if unchanged && !self.client.code_at(existing.address).await?.is_empty() {
                let existing = existing.clone();
                let message = format!("reusing {} at {:#x}", name.yellow(), existing.address);
                self.log_deployment(opts.log, &message);
                return Ok(existing);
            }
        }

        let (address, transaction_hash) = match opts.deterministic_deployment {
            Some(salt) => self.deploy_deterministic(name, salt, init_code, opts.gas_price).await?,
            None => {
                let tx = TxRequest::create(init_code).with_gas_price(opts.gas_price);
                let hash = self.send(tx).await?;
                debug!(tx = %hash, "deploying {name}");

                let receipt = self.wait(hash).await?;
                let address = receipt.contract_address.ok_or_else(|| {
                    ScriptError::ContractDeployment(format!(
                        "no contract address in receipt of {hash:#x}"
                    ))
                })?;
                (address, Some(hash))
            }
        };

        let record = DeploymentRecord {
            contract,
            address,
            transaction_hash,
            init_code_hash: Some(init_code_hash),
            implementation: None,
            admin: None,
        };
        self.deployments.insert(name, record.clone())?;

        let tx = transaction_hash.map(|h| format!(" (tx: {h:#x})")).unwrap_or_default();
        let message = format!("deployed {} at {:#x}{tx}", name.yellow(), address);
        self.log_deployment(opts.log, &message);
        Ok(record)
    }

    /// Deploy through the deterministic deployment proxy, returning the
    /// address and the deployment transaction, if one was needed
    async fn deploy_deterministic(
        &self,
        name: &str,
        salt: B256,
        init_code: Bytes,
        gas_price: Option<u128>,
    ) -> Result<(Address, Option<TxHash>), ScriptError> {
        let address = create2_address(DETERMINISTIC_DEPLOYER_ADDRESS, salt, &init_code);
        debug!(salt = %salt, "deterministic address of {name} is {address:#x}");

        if !self.client.code_at(address).await?.is_empty() {
            return Ok((address, None));
        }
        if self.client.code_at(DETERMINISTIC_DEPLOYER_ADDRESS).await?.is_empty() {
            return Err(ScriptError::MissingDeterministicDeployer(DETERMINISTIC_DEPLOYER_ADDRESS));
        }

        let input = [salt.as_slice(), init_code.as_ref()].concat();
        let tx = TxRequest::call(DETERMINISTIC_DEPLOYER_ADDRESS, input).with_gas_price(gas_price);
        let hash = self.send(tx).await?;
        self.wait(hash).await?;

        if self.client.code_at(address).await?.is_empty() {
            return Err(ScriptError::ContractDeployment(format!(
                "no code at {address:#x} after deterministic deployment of {name}"
            )));
        }
        Ok((address, Some(hash)))
    }

    /// Deploy a transparent proxy in front of `first_impl_name` if none is
    /// recorded under `proxy_name`, then upgrade it to the last entry of
    /// `proxy_opts.upgrades` if it does not already point there.
    pub async fn deploy_or_upgrade(
        &mut self,
        first_impl_name: &str,
        proxy_name: &str,
        opts: DeployOptions,
        proxy_opts: ProxyOptions,
    ) -> Result<ProxyDeployment, ScriptError> {
        let mut deployment = match self.deployments.get(proxy_name).cloned() {
            Some(proxy) => ProxyDeployment {
                proxy,
                new_implementation: None,
                new_implementation_name: None,
            },
            None => {
                let initializer = proxy_opts.initializer.as_ref();
                self.deploy_proxy(first_impl_name, proxy_name, &opts, initializer).await?
            }
        };

        if let Some(target_name) = proxy_opts.upgrades.last() {
            let target = self.deploy(target_name, opts.clone()).await?;
            let upgraded = self
                .upgrade_proxy(proxy_name, &mut deployment.proxy, &target, opts.gas_price)
                .await?;
            if upgraded {
                deployment.new_implementation = Some(target);
                deployment.new_implementation_name = Some(target_name.clone());
            }
        }

        Ok(deployment)
    }

    /// Deploy the first implementation and a proxy initialized against it
    async fn deploy_proxy(
        &mut self,
        impl_name: &str,
        proxy_name: &str,
        opts: &DeployOptions,
        initializer: Option<&Initializer>,
    ) -> Result<ProxyDeployment, ScriptError> {
        let implementation = self.deploy(impl_name, opts.clone()).await?;

        let artifact = self.artifacts.load(&implementation.contract)?;
        let data = match initializer {
            Some(init) => artifact.encode_call(&init.method, &init.args)?,
            None => Bytes::new(),
        };

        let proxy_opts = DeployOptions {
            contract: Some(TRANSPARENT_PROXY_CONTRACT.to_string()),
            from: opts.from,
            args: vec![
                DynSolValue::Address(implementation.address),
                DynSolValue::Address(opts.from),
                DynSolValue::Bytes(data.to_vec()),
            ],
            gas_price: opts.gas_price,
            log: opts.log,
            deterministic_deployment: None,
        };
        let mut proxy = self.deploy(proxy_name, proxy_opts).await?;

        // The proxy deploys its own admin contract, whose address is kept in
        // the EIP-1967 admin slot
        let admin_word = self.client.storage_at(proxy.address, PROXY_ADMIN_STORAGE_SLOT).await?;
        proxy.implementation = Some(implementation.address);
        proxy.admin = Some(address_from_word(admin_word));
        self.deployments.insert(proxy_name, proxy.clone())?;

        Ok(ProxyDeployment {
            proxy,
            new_implementation: Some(implementation),
            new_implementation_name: Some(impl_name.to_string()),
        })
    }

    /// Point the proxy at `target` through its admin contract, returning
    /// whether an upgrade was needed
    async fn upgrade_proxy(
        &mut self,
        proxy_name: &str,
        proxy: &mut DeploymentRecord,
        target: &DeploymentRecord,
        gas_price: Option<u128>,
    ) -> Result<bool, ScriptError> {
        let current =
            self.client.storage_at(proxy.address, PROXY_IMPLEMENTATION_STORAGE_SLOT).await?;
        if address_from_word(current) == target.address {
            debug!("{proxy_name} already points at {:#x}", target.address);
            return Ok(false);
        }

        let admin = match proxy.admin {
            Some(admin) => admin,
            None => address_from_word(
                self.client.storage_at(proxy.address, PROXY_ADMIN_STORAGE_SLOT).await?,
            ),
        };

        let calldata = IProxyAdmin::upgradeAndCallCall {
            proxy: proxy.address,
            implementation: target.address,
            data: Bytes::new(),
        }
        .abi_encode();
        let hash = self.send(TxRequest::call(admin, calldata).with_gas_price(gas_price)).await?;
        info!("upgrading {} to {:#x} (tx: {hash:#x})", proxy_name.yellow(), target.address);
        self.wait(hash).await?;

        proxy.implementation = Some(target.address);
        proxy.admin = Some(admin);
        self.deployments.insert(proxy_name, proxy.clone())?;
        Ok(true)
    }

    /// Ensure the client signs for the requested account
    fn check_sender(&self, from: Address) -> Result<(), ScriptError> {
        if from != self.client.sender() {
            return Err(ScriptError::ClientInitialization(format!(
                "no signer available for {from:#x}"
            )));
        }
        Ok(())
    }

    /// Log a deployment event at info level if requested, debug otherwise
    fn log_deployment(&self, log: bool, message: &str) {
        if log {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }
}
