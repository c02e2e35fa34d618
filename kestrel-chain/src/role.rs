//! Role sets: the six account privilege flags and their codecs.
//!
//! A role payload occupies the shared 64-bit value word with the top two
//! bits set to `10`, the six flags in bits 61..=56, and the remaining 56
//! bits reserved as zero. The canonical string form is the positional
//! template `MCLRAD`, each letter replaced by `.` when the flag is
//! absent, e.g. `M..R..` for a registered manager.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::serialization::SerializationError;

/// The two word bits that select the payload interpretation.
pub(crate) const MODE_MASK: u64 = 0b11 << 62;
/// Mode bits of a role payload.
pub(crate) const MODE_ROLE: u64 = 0b10 << 62;

bitflags! {
    /// The set of privileges attached to an account.
    ///
    /// Flag positions are consensus critical: they are the exact bits the
    /// role occupies inside the value word.
    pub struct RoleSet: u64 {
        /// `M`: manager, may grant and revoke any role.
        const MANAGER = 1 << 61;
        /// `C`: coin creator.
        const CREATOR = 1 << 60;
        /// `L`: law enforcement, may disable and re-enable accounts.
        const LAW_ENFORCEMENT = 1 << 59;
        /// `R`: registered. Required for any on-chain action.
        const REGISTERED = 1 << 58;
        /// `A`: account manager, may register and unregister accounts.
        const ACCOUNT_MANAGER = 1 << 57;
        /// `D`: disabled.
        const DISABLED = 1 << 56;
    }
}

/// Template order for the string form.
const TEMPLATE: [(char, RoleSet); 6] = [
    ('M', RoleSet::MANAGER),
    ('C', RoleSet::CREATOR),
    ('L', RoleSet::LAW_ENFORCEMENT),
    ('R', RoleSet::REGISTERED),
    ('A', RoleSet::ACCOUNT_MANAGER),
    ('D', RoleSet::DISABLED),
];

impl RoleSet {
    /// The wire form of this role set: mode bits plus flag bits. The
    /// reserved region is zero by construction.
    pub fn to_word(self) -> u64 {
        MODE_ROLE | self.bits()
    }

    /// Reads a role set out of a value word, requiring role mode bits and
    /// an all-zero reserved region.
    pub fn from_word(word: u64) -> Result<RoleSet, SerializationError> {
        if word & MODE_MASK != MODE_ROLE {
            return Err(SerializationError::Parse("role word has wrong mode bits"));
        }
        RoleSet::from_bits(word & !MODE_MASK)
            .ok_or(SerializationError::Parse("role word has nonzero reserved bits"))
    }
}

impl Default for RoleSet {
    fn default() -> Self {
        RoleSet::empty()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(letter, flag) in TEMPLATE.iter() {
            let c = if self.contains(flag) { letter } else { '.' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl FromStr for RoleSet {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let mut roles = RoleSet::empty();
        for &(letter, flag) in TEMPLATE.iter() {
            match chars.next() {
                Some(c) if c == letter => roles.insert(flag),
                Some('.') => {}
                Some(_) => {
                    return Err(SerializationError::Parse(
                        "unexpected character in role string",
                    ))
                }
                None => return Err(SerializationError::Parse("role string too short")),
            }
        }
        if chars.next().is_some() {
            return Err(SerializationError::Parse("role string too long"));
        }
        Ok(roles)
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u64::deserialize(deserializer)?;
        RoleSet::from_bits(bits).ok_or_else(|| D::Error::custom("invalid role bits"))
    }
}
