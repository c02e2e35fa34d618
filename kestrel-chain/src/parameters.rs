//! Chain instance parameters.

use serde::{Deserialize, Serialize};

/// The production network and its test companion.
///
/// The network an address belongs to selects its base58check version
/// byte, so addresses never cross networks by accident.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub enum Network {
    /// The production network.
    Mainnet,
    /// The testing network.
    Testnet,
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}
