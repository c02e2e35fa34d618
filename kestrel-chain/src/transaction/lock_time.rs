//! Transaction lock times.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::block;
use crate::serialization::{SerializationError, WireDeserialize, WireSerialize};

/// Raw lock-time values below this threshold are block heights; values at
/// or above it are unix timestamps.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// A transaction lock time, restraining inclusion until a block height or
/// point in time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockTime {
    /// Unlocked once the chain passes this height.
    Height(block::Height),
    /// Unlocked once block time passes this timestamp.
    Time(DateTime<Utc>),
}

impl LockTime {
    /// The earliest timestamp a time lock can hold.
    pub const MIN_TIMESTAMP: i64 = LOCKTIME_THRESHOLD as i64;

    /// The latest timestamp a time lock can hold.
    pub const MAX_TIMESTAMP: i64 = std::u32::MAX as i64;

    /// A lock time that restrains nothing.
    pub fn unlocked() -> LockTime {
        LockTime::Height(block::Height(0))
    }
}

impl WireSerialize for LockTime {
    fn wire_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        match self {
            LockTime::Height(height) => writer.write_u32::<LittleEndian>(height.0),
            LockTime::Time(time) => {
                writer.write_u32::<LittleEndian>(time.timestamp() as u32)
            }
        }
    }
}

impl WireDeserialize for LockTime {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let raw = reader.read_u32::<LittleEndian>()?;
        if raw < LOCKTIME_THRESHOLD {
            Ok(LockTime::Height(block::Height(raw)))
        } else {
            Ok(LockTime::Time(Utc.timestamp(raw as i64, 0)))
        }
    }
}
