//! Definitions of Solidity functions called during deployment

use alloy::sol;

sol! {
    /// The admin contract owning a transparent upgradeable proxy
    interface IProxyAdmin {
        function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
    }

    /// The factory instantiating SolvBTC product proxies
    interface ISolvBTCFactory {
        function deployProductProxy(
            string memory productType,
            string memory productName,
            string memory tokenName,
            string memory tokenSymbol
        ) external returns (address);

        function getProxy(string memory productType, string memory productName) external view returns (address);
    }

    /// The SolvBTC token
    interface ISolvBTC {
        function initialize(string memory name_, string memory symbol_, address asset_) external;

        function initializeV2(address solvBTCMultiAssetPool_) external;
    }
}
