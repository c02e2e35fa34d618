//! Block-related structures needed by transaction validation.
//!
//! Kestrel's block assembly and chain organization live elsewhere; the
//! transaction layer only needs block heights, for lock times and
//! coinbase maturity.

use serde::{Deserialize, Serialize};

/// The height of a block in the chain, counted from the genesis block at
/// height zero.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Height(pub u32);

impl Height {
    /// The genesis height.
    pub const MIN: Height = Height(0);

    /// The maximum representable height. Heights at or above
    /// `500_000_000` would collide with the timestamp interpretation of
    /// lock times.
    pub const MAX: Height = Height(499_999_999);
}
