//! Wire impls for outpoints and inputs.
//!
//! Outputs have no standalone `WireDeserialize` impl: their payload tag
//! is not on the wire, so decoding an output requires the enclosing
//! transaction's version and the output's index. That decode lives in
//! `transaction::serialize`.

use std::io;

use crate::serialization::{SerializationError, WireDeserialize, WireSerialize};

use super::{Input, OutPoint, Output, Witness};

impl WireSerialize for OutPoint {
    fn wire_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.hash.wire_serialize(&mut writer)?;
        self.index.wire_serialize(&mut writer)
    }
}

impl WireDeserialize for OutPoint {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(OutPoint {
            hash: WireDeserialize::wire_deserialize(&mut reader)?,
            index: u32::wire_deserialize(&mut reader)?,
        })
    }
}

/// The witness stack is carried out of band by the extended transaction
/// format, so inputs serialize without it.
impl WireSerialize for Input {
    fn wire_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.outpoint.wire_serialize(&mut writer)?;
        self.unlock_script.wire_serialize(&mut writer)?;
        self.sequence.wire_serialize(&mut writer)
    }
}

impl WireDeserialize for Input {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Input {
            outpoint: OutPoint::wire_deserialize(&mut reader)?,
            unlock_script: WireDeserialize::wire_deserialize(&mut reader)?,
            sequence: u32::wire_deserialize(&mut reader)?,
            witness: Witness::default(),
        })
    }
}

impl WireSerialize for Witness {
    fn wire_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        self.0.wire_serialize(writer)
    }
}

impl WireDeserialize for Witness {
    fn wire_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(Witness(WireDeserialize::wire_deserialize(reader)?))
    }
}

impl WireSerialize for Output {
    fn wire_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.payload.to_word().wire_serialize(&mut writer)?;
        self.lock_script.wire_serialize(&mut writer)
    }
}
