//! Constants used in the deploy scripts

use std::time::Duration;

use alloy::primitives::{address, b256, Address, B256};

/// The storage slot containing the proxy admin contract address in a transparent proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// The storage slot containing the implementation address in a transparent proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const PROXY_IMPLEMENTATION_STORAGE_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The address of the deterministic deployment proxy used for CREATE2 deployments.
///
/// See https://github.com/Arachnid/deterministic-deployment-proxy
pub const DETERMINISTIC_DEPLOYER_ADDRESS: Address =
    address!("4e59b44847b379578588920ca78fbf26c0b4956c");

/// The artifact name of the transparent upgradeable proxy contract
///
/// Compiled from https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/transparent/TransparentUpgradeableProxy.sol
pub const TRANSPARENT_PROXY_CONTRACT: &str = "TransparentUpgradeableProxy";

/// The default number of confirmations to wait for on each transaction
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// The default number of seconds to wait for a transaction to be confirmed
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 300;

/// The interval at which to poll for transaction receipts
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The default directory holding the per-network deployments files
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

/// The default directory holding the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The extension of a deployments file
pub const DEPLOYMENTS_FILE_EXTENSION: &str = "json";

/// The extension of a compiled contract artifact
pub const ARTIFACT_FILE_EXTENSION: &str = "json";

/// The name of the network used when none is given
pub const DEFAULT_NETWORK: &str = "localhost";

/// The default RPC url, a local development node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

// -------------------
// | SolvBTC Product |
// -------------------

/// The product type under which SolvBTC is registered in its factory
pub const SOLVBTC_PRODUCT_TYPE: &str = "Solv BTC";

/// The product name under which SolvBTC is registered in its factory
pub const SOLVBTC_PRODUCT_NAME: &str = "Solv BTC";

/// The ERC20 name of the SolvBTC token
pub const SOLVBTC_TOKEN_NAME: &str = "Solv BTC";

/// The ERC20 symbol of the SolvBTC token
pub const SOLVBTC_TOKEN_SYMBOL: &str = "SolvBTC";

/// The underlying asset the SolvBTC token is initialized with
pub const SOLVBTC_UNDERLYING_ASSET: Address =
    address!("1418511884942f7da13f3c2b19088a4e3b36ccd0");

/// The SolvBTC contract name
pub const SOLVBTC_CONTRACT: &str = "SolvBTC";

/// The SolvBTC factory contract name, also the deployment name of the SolvBTC factory
pub const SOLVBTC_FACTORY_CONTRACT: &str = "SolvBTCFactory";

/// The deployment name of the SolvBTC multi-asset pool proxy
pub const SOLVBTC_MULTI_ASSET_POOL_PROXY: &str = "SolvBTCMultiAssetPoolProxy";

/// The deployment name of the SolvBTC yield token factory
pub const SOLVBTC_YIELD_TOKEN_FACTORY: &str = "SolvBTCYieldTokenFactory";

/// The release version of the SolvBTC yield token factory
pub const SOLVBTC_YIELD_TOKEN_FACTORY_VERSION: &str = "_v2.0";
