//! Transparent (Bitcoin-inherited) transaction pieces: outpoints, inputs,
//! and the multiplexed outputs.
#![allow(clippy::unit_arg)]

mod address;
mod script;
mod serialize;

pub use address::{Address, ToAddressWithNetwork};
pub use script::Script;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::parameters::Network;
use crate::policy::PolicyRecord;
use crate::role::RoleSet;
use crate::serialization::SerializationError;
use crate::transaction;

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;
#[cfg(test)]
mod prop;

/// OutPoint
///
/// A particular transaction output reference.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
pub struct OutPoint {
    /// References the transaction that contains the UTXO being spent.
    pub hash: transaction::Hash,

    /// Identifies which UTXO from that transaction is referenced; the
    /// first output is 0, etc.
    pub index: u32,
}

impl OutPoint {
    /// The null outpoint, marking the single input of a coinbase
    /// transaction.
    pub const NULL: OutPoint = OutPoint {
        hash: transaction::Hash([0; 32]),
        index: std::u32::MAX,
    };

    pub fn is_null(&self) -> bool {
        *self == OutPoint::NULL
    }

    #[inline]
    pub const fn len() -> usize {
        36
    }
}

/// The witness stack attached to an input. Only serialized through the
/// extended transaction format.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Witness(pub Vec<Vec<u8>>);

impl Witness {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A transparent input to a transaction.
///
/// An input whose outpoint is [`OutPoint::NULL`] is a coinbase input; its
/// `unlock_script` carries free-form miner data instead of a spending
/// script.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// The previous output reference this input spends.
    pub outpoint: OutPoint,
    /// The script that authorizes spending `outpoint`.
    pub unlock_script: Script,
    /// The sequence number for the input.
    pub sequence: u32,
    /// The segregated witness stack, if any.
    pub witness: Witness,
}

impl Input {
    /// Setting `sequence` to this value for every input in a transaction
    /// disables lock time.
    pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

    /// If this flag is set, `sequence` is not interpreted as a relative
    /// lock time (BIP 68).
    pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

    /// If `sequence` encodes a relative lock time and this flag is set,
    /// the lock time has units of 512 seconds; otherwise it counts
    /// blocks.
    pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

    /// Mask extracting the relative lock time from `sequence`.
    pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

    /// Shift converting a time-typed sequence lock to seconds.
    pub const SEQUENCE_LOCKTIME_GRANULARITY: u32 = 9;

    pub fn new(outpoint: OutPoint, unlock_script: Script, sequence: u32) -> Input {
        Input {
            outpoint,
            unlock_script,
            sequence,
            witness: Witness::default(),
        }
    }

    /// Whether this is the null-outpoint input of a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        self.outpoint.is_null()
    }

    /// Serialized length in bytes, excluding the witness stack.
    pub fn len(&self) -> usize {
        OutPoint::len() + self.unlock_script.serialized_size() + 4
    }
}

/// The tag distinguishing the three output payload shapes.
///
/// Tags are never serialized: the wire carries only the 64-bit value
/// word, and deserialization reconstructs the tag from the transaction
/// version and the output's index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// A coin amount.
    Coin,
    /// A role grant.
    Role,
    /// A policy change.
    Policy,
}

/// The decoded 64-bit value word of an output.
///
/// The word overlays three interpretations selected by its top two bits:
/// coin (`0x`), role (`10`), and policy (`11`). Every payload knows how
/// to reproduce its word byte for byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// A coin amount in satoshis.
    Coin(Amount),
    /// A role set.
    Role(RoleSet),
    /// A policy-change record.
    Policy(PolicyRecord),
}

impl Payload {
    pub fn kind(&self) -> OutputKind {
        match self {
            Payload::Coin(_) => OutputKind::Coin,
            Payload::Role(_) => OutputKind::Role,
            Payload::Policy(_) => OutputKind::Policy,
        }
    }

    /// The wire form of this payload.
    pub fn to_word(&self) -> u64 {
        match *self {
            Payload::Coin(amount) => amount.to_word(),
            Payload::Role(roles) => roles.to_word(),
            Payload::Policy(record) => record.to_word(),
        }
    }

    /// Decode a word under the interpretation named by `kind`, checking
    /// the word's mode and reserved bits against it.
    pub fn from_word_as(kind: OutputKind, word: u64) -> Result<Payload, SerializationError> {
        match kind {
            OutputKind::Coin => Amount::from_word(word).map(Payload::Coin),
            OutputKind::Role => RoleSet::from_word(word).map(Payload::Role),
            OutputKind::Policy => PolicyRecord::from_word(word).map(Payload::Policy),
        }
    }

    /// Decode a word by its own mode bits.
    pub fn from_word(word: u64) -> Result<Payload, SerializationError> {
        if word >> 63 == 0 {
            Amount::from_word(word).map(Payload::Coin)
        } else if (word >> 62) & 1 == 0 {
            RoleSet::from_word(word).map(Payload::Role)
        } else {
            PolicyRecord::from_word(word).map(Payload::Policy)
        }
    }
}

/// A transparent output of a transaction.
///
/// Besides the familiar coin outputs, kestrel outputs may carry a role
/// set or a policy-change record; all three share the output's single
/// 64-bit value slot. The lock script defines the conditions under which
/// the output can be spent, and doubles as the identity the payload
/// applies to for role and policy outputs.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// The decoded value word.
    pub payload: Payload,

    /// The script guarding this output.
    pub lock_script: Script,
}

impl Output {
    pub fn coin(value: Amount, lock_script: Script) -> Output {
        Output {
            payload: Payload::Coin(value),
            lock_script,
        }
    }

    pub fn role(roles: RoleSet, lock_script: Script) -> Output {
        Output {
            payload: Payload::Role(roles),
            lock_script,
        }
    }

    pub fn policy(record: PolicyRecord, lock_script: Script) -> Output {
        Output {
            payload: Payload::Policy(record),
            lock_script,
        }
    }

    pub fn kind(&self) -> OutputKind {
        self.payload.kind()
    }

    /// The coin amount, for coin outputs.
    pub fn value(&self) -> Option<Amount> {
        match self.payload {
            Payload::Coin(amount) => Some(amount),
            _ => None,
        }
    }

    /// The role set, for role outputs.
    pub fn roles(&self) -> Option<RoleSet> {
        match self.payload {
            Payload::Role(roles) => Some(roles),
            _ => None,
        }
    }

    /// The destination address of the lock script, when it is a standard
    /// pay-to-pubkey-hash or pay-to-script-hash script.
    pub fn address(&self, network: Network) -> Option<Address> {
        self.lock_script.destination(network)
    }

    /// Returns the serialized length (in bytes) of this output.
    pub fn len(&self) -> usize {
        8 + self.lock_script.serialized_size()
    }
}
