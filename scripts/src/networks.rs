//! The table of networks the scripts know how to deploy to
//!
//! Every lookup here is pure. A network missing from the table is not an
//! error, it simply receives no network-specific override.

use crate::gas::GasStrategy;

/// The environment class of a network, which determines the suffix
/// appended to deterministic deployment salts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkTier {
    /// An internal development deployment on a public testnet
    Dev,
    /// A public testnet
    Testnet,
    /// A production network
    Mainnet,
}

impl NetworkTier {
    /// The prefix placed ahead of the release version in a deterministic suffix
    pub fn suffix_prefix(&self) -> &'static str {
        match self {
            NetworkTier::Dev => "_dev",
            NetworkTier::Testnet => "_tnt",
            NetworkTier::Mainnet => "",
        }
    }
}

/// A network the scripts have configuration for
#[derive(Clone, Copy, Debug)]
pub struct Network {
    /// The network identifier, as passed on the command line
    pub name: &'static str,
    /// The environment class of the network
    pub tier: NetworkTier,
    /// How gas prices are chosen on this network
    pub gas: GasStrategy,
}

impl Network {
    /// Declare a network that lets the client pick gas prices
    const fn new(name: &'static str, tier: NetworkTier) -> Self {
        Self { name, tier, gas: GasStrategy::Client }
    }
}

/// Every network with a deterministic deployment suffix
pub const KNOWN_NETWORKS: &[Network] = &[
    Network::new("dev_sepolia", NetworkTier::Dev),
    Network::new("sepolia", NetworkTier::Testnet),
    Network::new("merlin_test", NetworkTier::Testnet),
    Network::new("blast_test", NetworkTier::Testnet),
    Network::new("ailayer_test", NetworkTier::Testnet),
    Network::new("bob_test", NetworkTier::Testnet),
    Network::new("mainnet", NetworkTier::Mainnet),
    Network::new("arb", NetworkTier::Mainnet),
    Network::new("bsc", NetworkTier::Mainnet),
    Network::new("merlin", NetworkTier::Mainnet),
    Network::new("mantle", NetworkTier::Mainnet),
    Network::new("ailayer", NetworkTier::Mainnet),
    Network::new("bob", NetworkTier::Mainnet),
    Network::new("avax", NetworkTier::Mainnet),
];

/// Prior implementation versions of the SolvBTC contract, per network.
///
/// Each version `v` names an implementation deployment `SolvBTCImpl_<v>`;
/// the last entry is the one the proxy should point at.
const SOLVBTC_VERSIONS: &[(&str, &[&str])] = &[];

/// Look up a network by its identifier
pub fn lookup(name: &str) -> Option<&'static Network> {
    KNOWN_NETWORKS.iter().find(|network| network.name == name)
}

/// The suffix appended to a deployment name to build its deterministic salt.
///
/// Returns `None` for networks without a deterministic deployment setup.
pub fn deterministic_suffix(network: &str, version: &str) -> Option<String> {
    lookup(network).map(|n| format!("{}{}", n.tier.suffix_prefix(), version))
}

/// The gas strategy configured for a network, `Client` when unknown
pub fn gas_strategy(network: &str) -> GasStrategy {
    lookup(network).map(|n| n.gas).unwrap_or_default()
}

/// The known implementation versions of SolvBTC on a network, empty when unknown
pub fn solvbtc_versions(network: &str) -> &'static [&'static str] {
    versions_for(SOLVBTC_VERSIONS, network)
}

/// Find the versions list of a network in a versions table
fn versions_for(
    table: &'static [(&'static str, &'static [&'static str])],
    network: &str,
) -> &'static [&'static str] {
    table
        .iter()
        .find(|(name, _)| *name == network)
        .map(|(_, versions)| *versions)
        .unwrap_or(&[])
}

/// Build the implementation deployment names for a list of versions
pub fn upgrade_names(first_impl_name: &str, versions: &[&str]) -> Vec<String> {
    versions.iter().map(|v| format!("{first_impl_name}_{v}")).collect()
}
