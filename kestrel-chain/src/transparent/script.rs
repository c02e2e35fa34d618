#![allow(clippy::unit_arg)]
use crate::{
    compactint::CompactInt,
    parameters::Network,
    serialization::{SerializationError, WireDeserialize, WireSerialize},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    io::{self, Read},
};

use super::Address;

/// An encoding of a Bitcoin script.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct Script(pub Vec<u8>);

impl Script {
    pub fn serialized_size(&self) -> usize {
        CompactInt::size(self.0.len()) + self.0.len()
    }

    /// Extracts the destination address of a standard lock script.
    ///
    /// Recognizes the two standard templates:
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG` (P2PKH)
    /// and `OP_HASH160 <20 bytes> OP_EQUAL` (P2SH). Anything else has no
    /// extractable destination.
    pub fn destination(&self, network: Network) -> Option<Address> {
        let bytes = &self.0;
        match bytes.len() {
            25 if bytes[0] == 0x76
                && bytes[1] == 0xa9
                && bytes[2] == 0x14
                && bytes[23] == 0x88
                && bytes[24] == 0xac =>
            {
                let mut pub_key_hash = [0u8; 20];
                pub_key_hash.copy_from_slice(&bytes[3..23]);
                Some(Address::PayToPublicKeyHash {
                    network,
                    pub_key_hash,
                })
            }
            23 if bytes[0] == 0xa9 && bytes[1] == 0x14 && bytes[22] == 0x87 => {
                let mut script_hash = [0u8; 20];
                script_hash.copy_from_slice(&bytes[2..22]);
                Some(Address::PayToScriptHash {
                    network,
                    script_hash,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Script")
            .field(&hex::encode(&self.0))
            .finish()
    }
}

impl WireSerialize for Script {
    fn wire_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        CompactInt::from(self.0.len()).wire_serialize(&mut writer)?;
        writer.write_all(&self.0[..])?;
        Ok(())
    }
}

impl WireDeserialize for Script {
    fn wire_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = CompactInt::wire_deserialize(&mut reader)?.value();
        let mut bytes = Vec::new();
        reader.take(len).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != len {
            return Err(SerializationError::Parse("script data was truncated"));
        }
        Ok(Script(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p2pkh_bytes(hash: [u8; 20]) -> Vec<u8> {
        let mut bytes = vec![0x76, 0xa9, 0x14];
        bytes.extend_from_slice(&hash);
        bytes.extend_from_slice(&[0x88, 0xac]);
        bytes
    }

    #[test]
    fn p2pkh_destination() {
        let script = Script(p2pkh_bytes([7; 20]));
        assert_eq!(
            script.destination(Network::Mainnet),
            Some(Address::PayToPublicKeyHash {
                network: Network::Mainnet,
                pub_key_hash: [7; 20],
            })
        );
    }

    #[test]
    fn p2sh_destination() {
        let mut bytes = vec![0xa9, 0x14];
        bytes.extend_from_slice(&[9; 20]);
        bytes.push(0x87);
        let script = Script(bytes);
        assert_eq!(
            script.destination(Network::Testnet),
            Some(Address::PayToScriptHash {
                network: Network::Testnet,
                script_hash: [9; 20],
            })
        );
    }

    #[test]
    fn nonstandard_scripts_have_no_destination() {
        assert_eq!(Script(vec![]).destination(Network::Mainnet), None);
        assert_eq!(Script(vec![0x51]).destination(Network::Mainnet), None);
        // P2PKH with one opcode off
        let mut bytes = p2pkh_bytes([7; 20]);
        bytes[24] = 0xab;
        assert_eq!(Script(bytes).destination(Network::Mainnet), None);
    }
}
