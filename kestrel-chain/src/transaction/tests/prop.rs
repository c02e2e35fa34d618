use proptest::prelude::*;
use std::io::Cursor;

use super::super::*;

use crate::serialization::{WireDeserialize, WireDeserializeInto, WireSerialize};
use crate::transparent::Witness;

proptest! {
    #[test]
    fn transaction_roundtrip(tx in any::<Transaction>()) {
        kestrel_test::init();

        let data = tx.wire_serialize_to_vec().expect("tx should serialize");
        let tx2: Transaction = data.as_slice().wire_deserialize_into()
            .expect("randomized tx should deserialize");

        prop_assert_eq![tx, tx2];
    }

    /// The transaction id commits to the witness-stripped form, so
    /// stripping witnesses never changes it.
    #[test]
    fn witness_does_not_change_txid(tx in any::<Transaction>()) {
        kestrel_test::init();

        let mut stripped = tx.clone();
        for input in stripped.inputs.iter_mut() {
            input.witness = Witness::default();
        }

        prop_assert_eq!(tx.hash(), stripped.hash());
        prop_assert_eq!(stripped.hash(), stripped.witness_hash());
    }

    #[test]
    fn base_size_matches_serialization(tx in any::<Transaction>()) {
        kestrel_test::init();

        let mut data = Vec::new();
        tx.serialize_without_witness(&mut data).expect("tx should serialize");
        prop_assert_eq!(data.len(), tx.base_size());

        let full = tx.wire_serialize_to_vec().expect("tx should serialize");
        prop_assert_eq!(full.len(), tx.total_size());
    }

    #[test]
    fn transaction_hash_display_fromstr_roundtrip(hash in any::<Hash>()) {
        kestrel_test::init();

        let display = format!("{}", hash);
        let parsed = display.parse::<Hash>().expect("hash should parse");
        prop_assert_eq!(hash, parsed);
    }

    #[test]
    fn locktime_roundtrip(locktime in any::<LockTime>()) {
        kestrel_test::init();

        let mut bytes = Cursor::new(Vec::new());
        locktime.wire_serialize(&mut bytes)?;

        bytes.set_position(0);
        let other_locktime = LockTime::wire_deserialize(&mut bytes)?;

        prop_assert_eq![locktime, other_locktime];
    }
}
