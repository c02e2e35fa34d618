//! Transactions and transaction-related structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::{money_range, Amount};
use crate::block;
use crate::compactint::CompactInt;
use crate::serialization::sha256d;
use crate::{cached::Cached, WireSerialize};

mod hash;
mod lock_time;
mod serialize;
mod version;

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;
#[cfg(test)]
mod tests;

pub use hash::Hash;
pub use lock_time::{LockTime, LOCKTIME_THRESHOLD};
pub use version::Version;

use crate::transparent;

/// A kestrel transaction.
///
/// A transaction spends previous outputs and creates new ones. Unlike
/// plain Bitcoin, the version is not a format revision: it names which of
/// the coin / role / policy payload taxonomies the outputs follow, and
/// deserialization uses it to reconstruct each output's payload tag (see
/// [`Version::output_kind`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The transaction version, selecting the payload taxonomy.
    pub version: i32,
    /// The transaction inputs.
    pub inputs: Vec<transparent::Input>,
    /// The transaction outputs.
    pub outputs: Vec<transparent::Output>,
    /// The transaction lock time.
    pub locktime: LockTime,
    hash: Cached<Hash>,
}

impl Transaction {
    pub fn new(
        version: Version,
        inputs: Vec<transparent::Input>,
        outputs: Vec<transparent::Output>,
        locktime: LockTime,
    ) -> Transaction {
        Transaction {
            version: version as i32,
            inputs,
            outputs,
            locktime,
            hash: Cached::new(),
        }
    }

    /// Build a transaction from a raw version number, which may be
    /// outside the known taxonomy. Useful to exercise version checks.
    pub fn from_raw_version(
        version: i32,
        inputs: Vec<transparent::Input>,
        outputs: Vec<transparent::Output>,
        locktime: LockTime,
    ) -> Transaction {
        Transaction {
            version,
            inputs,
            outputs,
            locktime,
            hash: Cached::new(),
        }
    }

    /// Get the id of this transaction: the hash of its witness-stripped
    /// serialization.
    pub fn hash(&self) -> Hash {
        // If we have a cached version, just return that
        if let Some(hash) = self.hash.value() {
            return hash;
        }
        // Otherwise, serialize the tx to calculate and return the hash
        Hash::from(self)
    }

    /// The hash covering transaction and witness data both. Equal to
    /// [`Transaction::hash`] for transactions without witnesses.
    pub fn witness_hash(&self) -> Hash {
        if !self.has_witness() {
            return self.hash();
        }
        let mut writer = sha256d::Writer::default();
        self.wire_serialize(&mut writer)
            .expect("sha256d writers never fail");
        Hash(writer.finish())
    }

    /// The typed view of `version`, if it names a known taxonomy.
    pub fn typed_version(&self) -> Option<Version> {
        use std::convert::TryFrom;
        Version::try_from(self.version).ok()
    }

    /// Returns `true` if this transaction is a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].outpoint.is_null()
    }

    pub fn contains_coinbase_input(&self) -> bool {
        self.inputs.iter().any(|input| input.is_coinbase())
    }

    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    /// Sum of the coin outputs, checked against the money range at every
    /// step. `None` means an output or the running total left the valid
    /// range.
    pub fn value_out(&self) -> Option<Amount> {
        let mut total = Amount::zero();
        for output in self.outputs.iter() {
            if let Some(value) = output.value() {
                if !money_range(value) {
                    return None;
                }
                total = total.checked_add(value)?;
                if !money_range(total) {
                    return None;
                }
            }
        }
        Some(total)
    }

    /// Whether this transaction is final with respect to the given block
    /// height and time, either because its lock time has passed or
    /// because every input opted out with a final sequence number.
    pub fn is_final(&self, height: block::Height, block_time: DateTime<Utc>) -> bool {
        let lock_passed = match self.locktime {
            LockTime::Height(lock_height) => {
                lock_height.0 == 0 || lock_height.0 < height.0
            }
            LockTime::Time(lock_time) => lock_time.timestamp() < block_time.timestamp(),
        };
        lock_passed
            || self
                .inputs
                .iter()
                .all(|input| input.sequence == transparent::Input::SEQUENCE_FINAL)
    }

    /// Returns the serialized length (in bytes) of the witness-stripped
    /// form of this transaction, which is what the block weight limit is
    /// measured against.
    pub fn base_size(&self) -> usize {
        let mut size = 0;
        size += 4 + CompactInt::size(self.inputs.len());
        for input in self.inputs.iter() {
            size += input.len();
        }
        size += CompactInt::size(self.outputs.len());
        for output in self.outputs.iter() {
            size += output.len();
        }
        size + 4
    }

    /// Returns the total serialized length (in bytes) including witness
    /// data and the extended-format framing, when present.
    pub fn total_size(&self) -> usize {
        if !self.has_witness() {
            return self.base_size();
        }
        let mut size = self.base_size() + 2; // dummy and flags bytes
        for input in self.inputs.iter() {
            let stack = &input.witness.0;
            size += CompactInt::size(stack.len());
            for item in stack.iter() {
                size += CompactInt::size(item.len()) + item.len();
            }
        }
        size
    }
}
