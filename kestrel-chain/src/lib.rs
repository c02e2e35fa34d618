//! Core data structures for the kestrel permissioned ledger.
//!
//! Kestrel is a Bitcoin-derived chain in which coins, role grants, and
//! policy parameters all flow through a single UTXO-style transaction
//! model. This crate holds the consensus-critical data model: the 64-bit
//! value word that multiplexes the three payload shapes, the transaction
//! and output types, and the wire serialization they share.

pub mod amount;
pub mod block;
pub mod cached;
pub mod compactint;
pub mod parameters;
pub mod policy;
pub mod role;
pub mod serialization;
pub mod transaction;
pub mod transparent;

pub use serialization::{SerializationError, WireDeserialize, WireDeserializeInto, WireSerialize};
