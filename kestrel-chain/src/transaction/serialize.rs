//! Wire impls for transactions.
//!
//! Basic format:
//! - `i32` version
//! - `Vec<Input>` (CompactSize-prefixed)
//! - `Vec<Output>` (CompactSize-prefixed; each an `i64` word and a script)
//! - `u32` lock time
//!
//! Extended format, used whenever any input carries a witness stack:
//! - `i32` version
//! - dummy CompactSize `0`, then a flags byte (bit 0 = witness present)
//! - `Vec<Input>`, `Vec<Output>`
//! - one witness stack per input
//! - `u32` lock time
//!
//! Output payload tags are not on the wire. They are reconstructed here
//! from the transaction version and each output's index, and the raw
//! 64-bit words are decoded under the reconstructed interpretation; a
//! word that contradicts its slot (wrong mode bits, nonzero reserved
//! bits) fails the whole transaction.

use std::convert::TryFrom;
use std::io;

use crate::cached::Cached;
use crate::compactint::CompactInt;
use crate::serialization::{SerializationError, WireDeserialize, WireSerialize};
use crate::transparent::{Input, Output, Payload, Script, Witness};

use super::{LockTime, Transaction, Version};

/// Sanity limit on the size of a single transaction (a whole block), to
/// protect deserialization against DOS attacks.
pub const MAX_TX_SIZE: u64 = 4_000_000;

impl Transaction {
    /// Serializes in the basic format regardless of witness data. This is
    /// the form the transaction id commits to.
    pub fn serialize_without_witness<W: io::Write>(
        &self,
        mut writer: W,
    ) -> Result<(), io::Error> {
        self.version.wire_serialize(&mut writer)?;
        self.inputs.wire_serialize(&mut writer)?;
        self.outputs.wire_serialize(&mut writer)?;
        self.locktime.wire_serialize(&mut writer)
    }
}

impl WireSerialize for Transaction {
    fn wire_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        if !self.has_witness() {
            return self.serialize_without_witness(writer);
        }

        self.version.wire_serialize(&mut writer)?;
        // extended format: dummy empty vin, then the flags byte
        CompactInt::from(0).wire_serialize(&mut writer)?;
        1u8.wire_serialize(&mut writer)?;
        self.inputs.wire_serialize(&mut writer)?;
        self.outputs.wire_serialize(&mut writer)?;
        for input in self.inputs.iter() {
            input.witness.wire_serialize(&mut writer)?;
        }
        self.locktime.wire_serialize(&mut writer)
    }
}

/// Deserializes a transaction, reconstructing output tags and caching the
/// transaction id.
impl WireDeserialize for Transaction {
    fn wire_deserialize<R: io::Read>(src: R) -> Result<Self, SerializationError> {
        let mut src = src.take(MAX_TX_SIZE);

        let version = i32::wire_deserialize(&mut src)?;
        let mut inputs = <Vec<Input>>::wire_deserialize(&mut src)?;
        let mut flags = 0u8;
        let outputs;
        if inputs.is_empty() {
            // We read a dummy or a genuinely empty vin.
            flags = u8::wire_deserialize(&mut src)?;
            if flags != 0 {
                inputs = <Vec<Input>>::wire_deserialize(&mut src)?;
                outputs = read_outputs(&mut src, version)?;
            } else {
                outputs = Vec::new();
            }
        } else {
            // We read a non-empty vin. A normal vout follows.
            outputs = read_outputs(&mut src, version)?;
        }

        if flags & 1 != 0 {
            flags ^= 1;
            for input in inputs.iter_mut() {
                input.witness = Witness::wire_deserialize(&mut src)?;
            }
        }
        if flags != 0 {
            return Err(SerializationError::Parse(
                "unknown transaction optional data",
            ));
        }

        let locktime = LockTime::wire_deserialize(&mut src)?;

        let mut tx = Transaction {
            version,
            inputs,
            outputs,
            locktime,
            hash: Cached::new(),
        };
        // Calculate and cache the transaction id.
        let own_hash = tx.hash();
        tx.hash = Cached::from(own_hash);
        Ok(tx)
    }
}

/// Reads the output vector, assigning each output the payload kind its
/// `(version, index)` slot dictates.
fn read_outputs<R: io::Read>(
    mut reader: R,
    version: i32,
) -> Result<Vec<Output>, SerializationError> {
    let count = CompactInt::wire_deserialize(&mut reader)?.value() as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    // A version is only required once there are outputs to type.
    let version = Version::try_from(version)?;

    let blind_alloc_limit = 1024;
    let mut outputs = Vec::with_capacity(std::cmp::min(count, blind_alloc_limit));
    for index in 0..count {
        let word = u64::wire_deserialize(&mut reader)?;
        let lock_script = Script::wire_deserialize(&mut reader)?;
        let payload = Payload::from_word_as(version.output_kind(index), word)?;
        outputs.push(Output {
            payload,
            lock_script,
        });
    }
    Ok(outputs)
}

impl<T> WireDeserialize for std::sync::Arc<T>
where
    T: WireDeserialize,
{
    fn wire_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(std::sync::Arc::new(T::wire_deserialize(reader)?))
    }
}

impl<T> WireSerialize for std::sync::Arc<T>
where
    T: WireSerialize,
{
    fn wire_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        T::wire_serialize(self, writer)
    }
}
