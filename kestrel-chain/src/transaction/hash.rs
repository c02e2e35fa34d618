//! Transaction ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::serialization::{sha256d, SerializationError, WireDeserialize, WireSerialize};

use super::Transaction;

/// A transaction id: the sha256d digest of the witness-stripped
/// serialization.
///
/// Displayed and parsed in the conventional big-endian hex form, while
/// the internal bytes stay in wire order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl<'a> From<&'a Transaction> for Hash {
    fn from(transaction: &'a Transaction) -> Self {
        let mut writer = sha256d::Writer::default();
        transaction
            .serialize_without_witness(&mut writer)
            .expect("sha256d writers never fail");
        Hash(writer.finish())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.write_str(&hex::encode(&reversed))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.debug_tuple("transaction::Hash")
            .field(&hex::encode(&reversed))
            .finish()
    }
}

impl std::str::FromStr for Hash {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 32];
        if s.len() != 64 {
            return Err(SerializationError::Parse("hash length mismatch"));
        }
        hex::decode_to_slice(s, &mut bytes[..])
            .map_err(|_| SerializationError::Parse("invalid hex for hash"))?;
        bytes.reverse();
        Ok(Hash(bytes))
    }
}

impl WireSerialize for Hash {
    fn wire_serialize<W: std::io::Write>(&self, writer: W) -> Result<(), std::io::Error> {
        self.0.wire_serialize(writer)
    }
}

impl WireDeserialize for Hash {
    fn wire_deserialize<R: std::io::Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(Hash(<[u8; 32]>::wire_deserialize(reader)?))
    }
}
