//! Gas price selection for submitted transactions

use crate::{chain::ChainClient, errors::ScriptError};

/// How the gas price of a transaction is chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GasStrategy {
    /// Leave the gas price to the client's fee estimation
    #[default]
    Client,
    /// Use a fixed gas price, in wei
    Fixed(u128),
    /// Use the node's reported gas price, scaled by `percent / 100`
    Node {
        /// The percentage of the node's gas price to pay
        percent: u64,
    },
}

impl GasStrategy {
    /// Resolve the gas price to attach to a transaction.
    ///
    /// `None` means the client picks the fees itself.
    pub async fn gas_price<C: ChainClient>(&self, client: &C) -> Result<Option<u128>, ScriptError> {
        match *self {
            GasStrategy::Client => Ok(None),
            GasStrategy::Fixed(price) => Ok(Some(price)),
            GasStrategy::Node { percent } => {
                let price = client.gas_price().await?;
                Ok(Some(price.saturating_mul(percent as u128) / 100))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChain;

    #[tokio::test]
    async fn test_client_strategy_leaves_price_unset() {
        let chain = MockChain::new();
        assert_eq!(GasStrategy::Client.gas_price(&chain).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fixed_and_node_strategies() {
        let chain = MockChain::new();
        chain.set_gas_price(2_000_000_000);

        let fixed = GasStrategy::Fixed(7).gas_price(&chain).await.unwrap();
        assert_eq!(fixed, Some(7));

        let node = GasStrategy::Node { percent: 150 }.gas_price(&chain).await.unwrap();
        assert_eq!(node, Some(3_000_000_000));
    }
}
