//! Proptest strategies for transparent types.

use std::convert::TryFrom;

use proptest::{arbitrary::any, collection::vec, prelude::*};

use crate::amount::{Amount, MAX_MONEY};
use crate::policy::{PolicyChangeType, PolicyRecord};
use crate::role::RoleSet;

use super::{Input, OutPoint, Output, Payload, Script, Witness};

impl Arbitrary for RoleSet {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        // six random flag bits, shifted into their word positions
        (0u8..64)
            .prop_map(|bits| RoleSet::from_bits_truncate((bits as u64) << 56))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for PolicyChangeType {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            (0u32..15).prop_map(|raw| {
                PolicyChangeType::try_from(raw).expect("values below 15 are defined")
            }),
            Just(PolicyChangeType::Noop),
        ]
        .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for PolicyRecord {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (any::<bool>(), any::<PolicyChangeType>(), any::<u32>())
            .prop_map(|(permanent, change_type, param)| PolicyRecord {
                permanent,
                change_type,
                param,
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Payload {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            // includes negative amounts, which must survive the wire
            (-1_000_i64..=MAX_MONEY.as_sat())
                .prop_map(|sat| Payload::Coin(Amount::from_sat(sat))),
            any::<RoleSet>().prop_map(Payload::Role),
            any::<PolicyRecord>().prop_map(Payload::Policy),
        ]
        .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for OutPoint {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (any::<[u8; 32]>(), any::<u32>())
            .prop_map(|(hash, index)| OutPoint {
                hash: crate::transaction::Hash(hash),
                index,
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Witness {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(Witness::default()),
            vec(vec(any::<u8>(), 0..32), 1..4).prop_map(Witness),
        ]
        .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Input {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (
            any::<OutPoint>(),
            any::<Script>(),
            any::<u32>(),
            any::<Witness>(),
        )
            .prop_map(|(outpoint, unlock_script, sequence, witness)| Input {
                outpoint,
                unlock_script,
                sequence,
                witness,
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Output {
    /// Strategy for outputs whose payload already has the right kind for
    /// its position, chosen by the caller.
    pub fn strategy_with_payload(
        payload: impl Strategy<Value = Payload> + 'static,
    ) -> BoxedStrategy<Self> {
        (payload, any::<Script>())
            .prop_map(|(payload, lock_script)| Output {
                payload,
                lock_script,
            })
            .boxed()
    }
}
