//! Helpers for testing the deploy scripts against an in-memory chain

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
};

use alloy::{
    primitives::{address, keccak256, Address, Bytes, TxHash, B256},
    sol_types::{SolCall, SolValue},
};

use crate::{
    artifacts::{Artifact, ArtifactStore},
    chain::{ChainClient, ConfirmationOptions, Receipt, TxRequest},
    constants::{
        DETERMINISTIC_DEPLOYER_ADDRESS, NUM_BYTES_STORAGE_SLOT, PROXY_ADMIN_STORAGE_SLOT,
        PROXY_IMPLEMENTATION_STORAGE_SLOT,
    },
    deployments::DeploymentStore,
    errors::ScriptError,
    framework::DeployEnv,
    solidity::IProxyAdmin,
    utils::create2_address,
};

/// The account the mock chain signs for
pub const MOCK_DEPLOYER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// The creation bytecode of the mock transparent proxy
pub const PROXY_BYTECODE: &[u8] = &[0x60, 0x01, 0x60, 0x01];

/// The creation bytecode of the mock SolvBTC contract
pub const SOLVBTC_BYTECODE: &[u8] = &[0x60, 0x02, 0x60, 0x02];

/// The creation bytecode of the mock SolvBTC factory
pub const FACTORY_BYTECODE: &[u8] = &[0x60, 0x03, 0x60, 0x03];

/// The runtime code the mock places at every created contract
const RUNTIME_CODE: &[u8] = &[0xfe];

/// The state of the mock chain
#[derive(Default)]
struct MockState {
    /// The deployer's next nonce
    nonce: u64,
    /// The latest block number
    block: u64,
    /// The node's gas price
    gas_price: u128,
    /// Runtime code by address
    code: HashMap<Address, Bytes>,
    /// Storage by contract and slot
    storage: HashMap<(Address, B256), B256>,
    /// Return data of read-only calls, by contract and selector
    call_responses: HashMap<(Address, [u8; 4]), Bytes>,
    /// Receipts of mined transactions
    receipts: HashMap<TxHash, Receipt>,
    /// Every transaction submitted, in order
    submitted: Vec<TxRequest>,
    /// Whether the next transaction reverts
    revert_next: bool,
    /// Whether transactions are left unmined
    withhold_receipts: bool,
}

/// A [`ChainClient`] over an in-memory chain that mines each transaction
/// into its own block.
///
/// Contract creations get runtime code; creations of the mock proxy also
/// get their EIP-1967 slots set, and calls to a proxy admin's
/// `upgradeAndCall` update the proxy's implementation slot.
#[derive(Default)]
pub struct MockChain {
    /// The chain state
    state: Mutex<MockState>,
}

impl MockChain {
    /// An empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// The admin contract the mock proxy at `proxy` creates
    pub fn proxy_admin_of(proxy: Address) -> Address {
        proxy.create(1)
    }

    /// Lock the chain state
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Set the node's gas price
    pub fn set_gas_price(&self, gas_price: u128) {
        self.state().gas_price = gas_price;
    }

    /// Place runtime code at an address
    pub fn set_code(&self, address: Address, code: Bytes) {
        self.state().code.insert(address, code);
    }

    /// Set the return data of calls to `selector` on `to`
    pub fn set_call_response(&self, to: Address, selector: [u8; 4], response: Vec<u8>) {
        self.state().call_responses.insert((to, selector), response.into());
    }

    /// Make the deterministic deployment proxy available
    pub fn install_deterministic_deployer(&self) {
        self.set_code(DETERMINISTIC_DEPLOYER_ADDRESS, Bytes::from_static(RUNTIME_CODE));
    }

    /// Make the next submitted transaction revert
    pub fn revert_next(&self) {
        self.state().revert_next = true;
    }

    /// Stop mining submitted transactions
    pub fn withhold_receipts(&self) {
        self.state().withhold_receipts = true;
    }

    /// Mine `n` empty blocks
    pub fn advance_blocks(&self, n: u64) {
        self.state().block += n;
    }

    /// Every transaction submitted so far
    pub fn submitted(&self) -> Vec<TxRequest> {
        self.state().submitted.clone()
    }

    /// Apply the effects of a successful transaction, returning the created
    /// contract address for contract creations
    fn execute(state: &mut MockState, nonce: u64, tx: &TxRequest) -> Option<Address> {
        match tx.to {
            None => {
                let address = MOCK_DEPLOYER.create(nonce);
                state.code.insert(address, Bytes::from_static(RUNTIME_CODE));

                if let Some(args) = tx.input.strip_prefix(PROXY_BYTECODE) {
                    let (logic, _owner, _data) =
                        <(Address, Address, Bytes)>::abi_decode_params(args).ok()?;
                    let admin = Self::proxy_admin_of(address);
                    let storage = &mut state.storage;
                    storage.insert((address, PROXY_IMPLEMENTATION_STORAGE_SLOT), logic.into_word());
                    storage.insert((address, PROXY_ADMIN_STORAGE_SLOT), admin.into_word());
                    state.code.insert(admin, Bytes::from_static(RUNTIME_CODE));
                }
                Some(address)
            }
            Some(to) if to == DETERMINISTIC_DEPLOYER_ADDRESS => {
                let salt = B256::from_slice(&tx.input[..NUM_BYTES_STORAGE_SLOT]);
                let init_code = &tx.input[NUM_BYTES_STORAGE_SLOT..];
                let address = create2_address(to, salt, init_code);
                state.code.insert(address, Bytes::from_static(RUNTIME_CODE));
                None
            }
            Some(_) => {
                if let Ok(call) = IProxyAdmin::upgradeAndCallCall::abi_decode(&tx.input) {
                    let slot = (call.proxy, PROXY_IMPLEMENTATION_STORAGE_SLOT);
                    state.storage.insert(slot, call.implementation.into_word());
                }
                None
            }
        }
    }
}

impl ChainClient for MockChain {
    fn sender(&self) -> Address {
        MOCK_DEPLOYER
    }

    async fn chain_id(&self) -> Result<u64, ScriptError> {
        Ok(31337)
    }

    async fn gas_price(&self) -> Result<u128, ScriptError> {
        Ok(self.state().gas_price)
    }

    async fn block_number(&self) -> Result<u64, ScriptError> {
        Ok(self.state().block)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        Ok(self.state().code.get(&address).cloned().unwrap_or_default())
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError> {
        Ok(self.state().storage.get(&(address, slot)).copied().unwrap_or_default())
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ScriptError> {
        let selector: [u8; 4] = input
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ScriptError::ContractInteraction("calldata too short".to_string()))?;

        self.state().call_responses.get(&(to, selector)).cloned().ok_or_else(|| {
            ScriptError::ContractInteraction(format!("no mock response for call to {to:#x}"))
        })
    }

    async fn submit(&self, tx: TxRequest) -> Result<TxHash, ScriptError> {
        let mut state = self.state();
        let nonce = state.nonce;
        state.nonce += 1;

        let hash = keccak256([nonce.to_be_bytes().as_slice(), tx.input.as_ref()].concat());
        let success = !std::mem::take(&mut state.revert_next);
        let contract_address = if success { Self::execute(&mut state, nonce, &tx) } else { None };

        if !state.withhold_receipts {
            state.block += 1;
            let receipt = Receipt {
                transaction_hash: hash,
                block_number: state.block,
                success,
                contract_address,
            };
            state.receipts.insert(hash, receipt);
        }

        state.submitted.push(tx);
        Ok(hash)
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, ScriptError> {
        Ok(self.state().receipts.get(&hash).cloned())
    }
}

// -------------
// | Artifacts |
// -------------

/// Build an artifact from its ABI JSON and creation bytecode
fn artifact(name: &str, abi: serde_json::Value, bytecode: &[u8]) -> Artifact {
    serde_json::from_value(serde_json::json!({
        "contractName": name,
        "abi": abi,
        "bytecode": Bytes::copy_from_slice(bytecode),
    }))
    .unwrap()
}

/// The transparent proxy artifact
pub fn proxy_artifact() -> Artifact {
    let abi = serde_json::json!([{
        "type": "constructor",
        "stateMutability": "payable",
        "inputs": [
            { "name": "_logic", "type": "address" },
            { "name": "initialOwner", "type": "address" },
            { "name": "_data", "type": "bytes" },
        ],
    }]);
    artifact("TransparentUpgradeableProxy", abi, PROXY_BYTECODE)
}

/// The SolvBTC artifact
pub fn solvbtc_artifact() -> Artifact {
    let abi = serde_json::json!([
        {
            "type": "function",
            "name": "initialize",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "name_", "type": "string" },
                { "name": "symbol_", "type": "string" },
                { "name": "asset_", "type": "address" },
            ],
            "outputs": [],
        },
        {
            "type": "function",
            "name": "initializeV2",
            "stateMutability": "nonpayable",
            "inputs": [{ "name": "solvBTCMultiAssetPool_", "type": "address" }],
            "outputs": [],
        },
    ]);
    artifact("SolvBTC", abi, SOLVBTC_BYTECODE)
}

/// The SolvBTC factory artifact
pub fn factory_artifact() -> Artifact {
    let abi = serde_json::json!([{
        "type": "constructor",
        "stateMutability": "nonpayable",
        "inputs": [
            { "name": "admin_", "type": "address" },
            { "name": "governor_", "type": "address" },
        ],
    }]);
    artifact("SolvBTCFactory", abi, FACTORY_BYTECODE)
}

/// A deploy environment over a fresh mock chain with every test artifact
/// and no deployments
pub fn mock_env(network: &str) -> DeployEnv<MockChain> {
    let artifacts =
        ArtifactStore::in_memory([proxy_artifact(), solvbtc_artifact(), factory_artifact()]);
    let confirmations = ConfirmationOptions {
        confirmations: 1,
        timeout: std::time::Duration::from_millis(100),
        poll_interval: std::time::Duration::from_millis(5),
    };

    DeployEnv::new(MockChain::new(), network, artifacts, DeploymentStore::in_memory())
        .with_confirmations(confirmations)
}

/// A fresh directory path under the system temp directory
pub fn temp_dir(label: &str) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("solvbtc-scripts-{label}-{}-{n}", std::process::id()))
}

/// Encode an address as the return data of a call
pub fn address_return(address: Address) -> Vec<u8> {
    address.abi_encode()
}
