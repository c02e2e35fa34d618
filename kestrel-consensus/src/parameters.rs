//! Consensus constants inherited from Bitcoin.

/// Number of blocks a coinbase output must age before it can be spent.
pub const COINBASE_MATURITY: u32 = 100;

/// Factor weighting witness-stripped bytes against the block weight
/// limit.
pub const WITNESS_SCALE_FACTOR: usize = 4;

/// The maximum weight of a block, and therefore of a transaction.
pub const MAX_BLOCK_WEIGHT: usize = 4_000_000;
