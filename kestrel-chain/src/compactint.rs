//! The Bitcoin variable-length integer format ("CompactSize").

use crate::{SerializationError, WireDeserialize, WireSerialize};
use byteorder::{LittleEndian, WriteBytesExt};

/// A variable-length unsigned integer prefix, used to encode collection
/// lengths on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactInt(u64);

impl CompactInt {
    pub fn from(value: usize) -> CompactInt {
        CompactInt(value as u64)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The number of bytes the encoding of `value` occupies.
    pub fn size(value: usize) -> usize {
        if value < 253 {
            1
        } else if value <= std::u16::MAX as usize {
            3
        } else if value <= std::u32::MAX as usize {
            5
        } else {
            9
        }
    }
}

impl WireSerialize for CompactInt {
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        if self.value() < 253 {
            target.write_all(&[self.value() as u8])
        } else if self.value() <= std::u16::MAX as u64 {
            target.write_all(&[253])?;
            target.write_u16::<LittleEndian>(self.value() as u16)
        } else if self.value() <= std::u32::MAX as u64 {
            target.write_all(&[254])?;
            target.write_u32::<LittleEndian>(self.value() as u32)
        } else {
            target.write_all(&[255])?;
            target.write_u64::<LittleEndian>(self.value())
        }
    }
}

impl WireDeserialize for CompactInt {
    fn wire_deserialize<R: std::io::Read>(
        mut target: R,
    ) -> Result<CompactInt, SerializationError> {
        let first = u8::wire_deserialize(&mut target)?;
        match first {
            0..=252 => Ok(CompactInt(first as u64)),
            253 => Ok(CompactInt(u16::wire_deserialize(&mut target)? as u64)),
            254 => Ok(CompactInt(u32::wire_deserialize(&mut target)? as u64)),
            255 => Ok(CompactInt(u64::wire_deserialize(&mut target)?)),
        }
    }
}
