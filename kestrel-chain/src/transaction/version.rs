//! The transaction-version taxonomy.

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::serialization::SerializationError;
use crate::transparent::OutputKind;

/// The known transaction versions.
///
/// The version determines the payload kind of every output slot, so the
/// meaning of a serialized output can be recovered without a tag on the
/// wire. Numbering is consensus critical.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    /// A miner spending matured coinbase outputs.
    CoinbaseTransfer = 1944,
    /// A coin transfer, paying a fee out of its inputs.
    CoinTransfer = 1945,
    /// Role rotations on existing accounts, free of fee.
    RoleChange = 1946,
    /// Policy parameter changes, free of fee.
    PolicyChange = 1947,
    /// Role rotations carrying a fee and a change output.
    RoleChangeFee = 1948,
    /// Policy changes carrying a fee and a change output.
    PolicyChangeFee = 1949,
    /// Role grants to previously unseen accounts, free of fee.
    RoleCreate = 1950,
    /// Role grants to new accounts, carrying a fee and a change output.
    RoleCreateFee = 1951,
    /// Coin creation by a creator account, free of fee.
    CoinCreation = 1952,
    /// Coin creation carrying a fee and a change output.
    CoinCreationFee = 1953,
}

impl Version {
    /// Default version for newly built transactions.
    pub const CURRENT: Version = Version::CoinbaseTransfer;

    /// The highest version accepted by relay policy.
    pub const MAX_STANDARD: i32 = Version::CoinCreationFee as i32;

    /// Whether this version reserves output index 1 for a change output
    /// (and input index 1 for the coins paying it).
    pub fn has_change_output(self) -> bool {
        match self {
            Version::CoinTransfer
            | Version::RoleChangeFee
            | Version::PolicyChangeFee
            | Version::RoleCreateFee
            | Version::CoinCreationFee => true,
            _ => false,
        }
    }

    /// Whether this version settles without a fee.
    pub fn is_free(self) -> bool {
        match self {
            Version::RoleChange
            | Version::PolicyChange
            | Version::RoleCreate
            | Version::CoinCreation => true,
            _ => false,
        }
    }

    /// Index of the first payload input, past the credentials and any
    /// fee input.
    pub fn extra_input_offset(self) -> usize {
        if self.has_change_output() {
            2
        } else {
            1
        }
    }

    /// Index of the first payload output, past the role repeat and any
    /// change output.
    pub fn extra_output_offset(self) -> usize {
        if self.has_change_output() {
            2
        } else {
            1
        }
    }

    /// The payload kind carried by outputs past the offsets.
    pub fn payload_kind(self) -> OutputKind {
        match self {
            Version::CoinbaseTransfer
            | Version::CoinTransfer
            | Version::CoinCreation
            | Version::CoinCreationFee => OutputKind::Coin,
            Version::RoleChange
            | Version::RoleChangeFee
            | Version::RoleCreate
            | Version::RoleCreateFee => OutputKind::Role,
            Version::PolicyChange | Version::PolicyChangeFee => OutputKind::Policy,
        }
    }

    /// The payload kind of the output at `index`.
    ///
    /// For every version but the coinbase transfer, output 0 is the
    /// author's "role repeat" and fee-bearing versions reserve output 1
    /// for change; everything after carries the version's payload.
    pub fn output_kind(self, index: usize) -> OutputKind {
        if self == Version::CoinbaseTransfer {
            return OutputKind::Coin;
        }
        if index == 0 {
            return OutputKind::Role;
        }
        if index == 1 && self.has_change_output() {
            return OutputKind::Coin;
        }
        self.payload_kind()
    }
}

impl TryFrom<i32> for Version {
    type Error = SerializationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        use Version::*;
        Ok(match value {
            1944 => CoinbaseTransfer,
            1945 => CoinTransfer,
            1946 => RoleChange,
            1947 => PolicyChange,
            1948 => RoleChangeFee,
            1949 => PolicyChangeFee,
            1950 => RoleCreate,
            1951 => RoleCreateFee,
            1952 => CoinCreation,
            1953 => CoinCreationFee,
            _ => return Err(SerializationError::Parse("unknown transaction version")),
        })
    }
}
