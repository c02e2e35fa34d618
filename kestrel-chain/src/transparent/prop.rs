use proptest::prelude::*;

use super::{OutPoint, Payload};
use crate::serialization::{WireDeserialize, WireSerialize};

proptest! {
    /// Any payload reproduces its word byte for byte, both through the
    /// self-describing mode dispatch and through the tag-directed decode.
    #[test]
    fn payload_word_roundtrip(payload in any::<Payload>()) {
        kestrel_test::init();

        let word = payload.to_word();

        let by_mode = Payload::from_word(word).expect("well-formed words must decode");
        prop_assert_eq!(by_mode, payload);

        let by_kind = Payload::from_word_as(payload.kind(), word)
            .expect("tag-directed decode must accept the matching kind");
        prop_assert_eq!(by_kind, payload);
        prop_assert_eq!(by_kind.to_word(), word);
    }

    #[test]
    fn outpoint_roundtrip(outpoint in any::<OutPoint>()) {
        kestrel_test::init();

        let data = outpoint.wire_serialize_to_vec().expect("outpoint should serialize");
        prop_assert_eq!(data.len(), OutPoint::len());
        let outpoint2 = OutPoint::wire_deserialize(&data[..]).expect("outpoint should deserialize");
        prop_assert_eq!(outpoint, outpoint2);
    }
}
