//! Consensus-critical serialization.
//!
//! This module contains the `WireSerialize` and `WireDeserialize` traits,
//! analogs of the Serde `Serialize` and `Deserialize` traits but intended
//! for the Bitcoin-inherited wire formats that kestrel keeps byte
//! compatible, plus impls for the primitive types those formats are built
//! from (little-endian integers, length-prefixed vectors).

mod deserialize;
mod error;

pub mod sha256d;

pub use deserialize::{WireDeserialize, WireDeserializeInto};
pub use error::SerializationError;

use crate::compactint::CompactInt;
use byteorder::{LittleEndian, WriteBytesExt};

/// Consensus serialization to any `io::Write` target.
pub trait WireSerialize {
    fn wire_serialize<W: std::io::Write>(&self, target: W) -> Result<(), std::io::Error>;

    fn wire_serialize_to_vec(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut data = Vec::new();
        self.wire_serialize(&mut data)?;
        Ok(data)
    }
}

impl WireSerialize for u8 {
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        target.write_all(&[*self])
    }
}

impl WireSerialize for u16 {
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        target.write_u16::<LittleEndian>(*self)
    }
}

impl WireSerialize for u32 {
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        target.write_u32::<LittleEndian>(*self)
    }
}

impl WireSerialize for u64 {
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        target.write_u64::<LittleEndian>(*self)
    }
}

impl WireSerialize for i32 {
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        target.write_i32::<LittleEndian>(*self)
    }
}

impl WireSerialize for i64 {
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        target.write_i64::<LittleEndian>(*self)
    }
}

impl WireSerialize for [u8; 32] {
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        target.write_all(self)
    }
}

impl<T> WireSerialize for Vec<T>
where
    T: WireSerialize,
{
    fn wire_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        CompactInt::from(self.len()).wire_serialize(&mut target)?;
        for item in self.iter() {
            item.wire_serialize(&mut target)?
        }
        Ok(())
    }
}
