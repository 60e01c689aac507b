//! The interface the deploy scripts use to talk to a network, and its
//! RPC-backed implementation

use std::{str::FromStr, time::Duration};

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, TxKind, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::{
    constants::{DEFAULT_CONFIRMATIONS, DEFAULT_CONFIRMATION_TIMEOUT_SECS, RECEIPT_POLL_INTERVAL},
    errors::ScriptError,
};

/// A transaction to submit from the deployer account
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxRequest {
    /// The recipient, `None` for a contract creation
    pub to: Option<Address>,
    /// The calldata, or the init code for a contract creation
    pub input: Bytes,
    /// The gas price to pay, `None` to let the client estimate fees
    pub gas_price: Option<u128>,
}

impl TxRequest {
    /// A call to the contract at `to`
    pub fn call(to: Address, input: impl Into<Bytes>) -> Self {
        Self { to: Some(to), input: input.into(), gas_price: None }
    }

    /// A contract creation with the given init code
    pub fn create(init_code: impl Into<Bytes>) -> Self {
        Self { to: None, input: init_code.into(), gas_price: None }
    }

    /// Attach a gas price to the transaction
    pub fn with_gas_price(mut self, gas_price: Option<u128>) -> Self {
        self.gas_price = gas_price;
        self
    }
}

/// The mined outcome of a transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// The hash of the transaction
    pub transaction_hash: TxHash,
    /// The block the transaction was included in
    pub block_number: u64,
    /// Whether the transaction executed successfully
    pub success: bool,
    /// The address of the created contract, for contract creations
    pub contract_address: Option<Address>,
}

/// A handle on a network with an unlocked deployer account
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// The deployer account transactions are sent from
    fn sender(&self) -> Address;

    /// The chain ID of the network
    async fn chain_id(&self) -> Result<u64, ScriptError>;

    /// The node's current gas price, in wei
    async fn gas_price(&self) -> Result<u128, ScriptError>;

    /// The number of the latest block
    async fn block_number(&self) -> Result<u64, ScriptError>;

    /// The runtime code at an address
    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError>;

    /// The value of a storage slot of a contract
    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError>;

    /// Execute a read-only call against the latest block
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ScriptError>;

    /// Sign and submit a transaction, returning its hash without waiting for it
    async fn submit(&self, tx: TxRequest) -> Result<TxHash, ScriptError>;

    /// The receipt of a mined transaction, `None` while it is pending
    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, ScriptError>;
}

/// How long and how deep to wait for transactions
#[derive(Clone, Debug)]
pub struct ConfirmationOptions {
    /// The number of blocks, including the inclusion block, to wait for
    pub confirmations: u64,
    /// The maximum time to wait for a transaction to be confirmed
    pub timeout: Duration,
    /// The interval between receipt polls
    pub poll_interval: Duration,
}

impl Default for ConfirmationOptions {
    fn default() -> Self {
        Self {
            confirmations: DEFAULT_CONFIRMATIONS,
            timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            poll_interval: RECEIPT_POLL_INTERVAL,
        }
    }
}

/// Wait until a transaction is mined with the configured number of confirmations.
///
/// A reverted transaction and a timeout are both fatal.
pub async fn wait_for_confirmation<C: ChainClient>(
    client: &C,
    hash: TxHash,
    opts: &ConfirmationOptions,
) -> Result<Receipt, ScriptError> {
    let deadline = Instant::now() + opts.timeout;
    loop {
        if let Some(receipt) = client.receipt(hash).await? {
            if !receipt.success {
                return Err(ScriptError::TransactionReverted(hash));
            }

            let latest = client.block_number().await?;
            let depth = (latest + 1).saturating_sub(receipt.block_number);
            if depth >= opts.confirmations {
                debug!(tx = %hash, block = receipt.block_number, "transaction confirmed");
                return Ok(receipt);
            }
        }

        if Instant::now() >= deadline {
            return Err(ScriptError::ConfirmationTimeout(hash));
        }
        sleep(opts.poll_interval).await;
    }
}

// --------------
// | RPC Client |
// --------------

/// A [`ChainClient`] talking to a JSON-RPC node over HTTP
#[derive(Clone)]
pub struct RpcClient {
    /// The signing provider
    provider: DynProvider<Ethereum>,
    /// The address of the signer
    sender: Address,
}

/// Sets up the client with which to deploy, from the deployer's private key
/// and the network's RPC url
pub async fn setup_client(priv_key: &str, rpc_url: &str) -> Result<RpcClient, ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let sender = signer.address();

    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
    let client = RpcClient { provider: DynProvider::new(provider), sender };

    let chain_id = client.chain_id().await?;
    info!(chain_id, deployer = %sender, "connected to {rpc_url}");

    Ok(client)
}

impl ChainClient for RpcClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
    }

    async fn gas_price(&self) -> Result<u128, ScriptError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError> {
        let value = self
            .provider
            .get_storage_at(address, U256::from_be_bytes(slot.0))
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(B256::from(value.to_be_bytes::<32>()))
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ScriptError> {
        let request = TransactionRequest::default().with_to(to).with_input(input);
        self.provider
            .call(request)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn submit(&self, tx: TxRequest) -> Result<TxHash, ScriptError> {
        let kind = tx.to.map_or(TxKind::Create, TxKind::Call);
        let mut request = TransactionRequest::default()
            .with_from(self.sender)
            .with_kind(kind)
            .with_input(tx.input);
        if let Some(gas_price) = tx.gas_price {
            request = request.with_gas_price(gas_price);
        }

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, ScriptError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(receipt.and_then(|r| {
            Some(Receipt {
                transaction_hash: r.transaction_hash,
                block_number: r.block_number?,
                success: r.status(),
                contract_address: r.contract_address,
            })
        }))
    }
}
