use byteorder::{LittleEndian, ReadBytesExt};
use std::io;

use super::CompactInt;
use super::SerializationError;

type Result<R> = std::result::Result<R, SerializationError>;

/// Consensus deserialization from any `io::Read` source.
pub trait WireDeserialize {
    fn wire_deserialize<R: io::Read>(reader: R) -> Result<Self>
    where
        Self: Sized;
}

/// Helper for deserializing more succinctly via type inference
pub trait WireDeserializeInto {
    /// Deserialize based on type inference
    fn wire_deserialize_into<T>(self) -> Result<T>
    where
        T: WireDeserialize;
}

impl<R: io::Read> WireDeserializeInto for R {
    fn wire_deserialize_into<T>(self) -> Result<T>
    where
        T: WireDeserialize,
    {
        T::wire_deserialize(self)
    }
}

impl WireDeserialize for u8 {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<u8> {
        Ok(reader.read_u8()?)
    }
}

impl WireDeserialize for u16 {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<u16> {
        Ok(reader.read_u16::<LittleEndian>()?)
    }
}

impl WireDeserialize for u32 {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<u32> {
        Ok(reader.read_u32::<LittleEndian>()?)
    }
}

impl WireDeserialize for u64 {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<u64> {
        Ok(reader.read_u64::<LittleEndian>()?)
    }
}

impl WireDeserialize for i32 {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<i32> {
        Ok(reader.read_i32::<LittleEndian>()?)
    }
}

impl WireDeserialize for i64 {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<i64> {
        Ok(reader.read_i64::<LittleEndian>()?)
    }
}

impl<T> WireDeserialize for Vec<T>
where
    T: WireDeserialize,
{
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<Vec<T>> {
        let len = CompactInt::wire_deserialize(&mut reader)?.value() as usize;
        // Limit preallocation to about 1000 items since blind preallocation
        // is a DOS vulnerability
        let blind_alloc_limit = 1024;
        let mut result: Vec<T> = Vec::with_capacity(std::cmp::min(len, blind_alloc_limit));
        for _ in 0..len {
            result.push(T::wire_deserialize(&mut reader)?);
        }
        Ok(result)
    }
}

impl WireDeserialize for [u8; 32] {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<[u8; 32]> {
        let mut result = [0u8; 32];
        reader.read_exact(&mut result)?;
        Ok(result)
    }
}
