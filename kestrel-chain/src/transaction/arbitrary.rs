//! Proptest strategies for transactions.

use chrono::{TimeZone, Utc};
use proptest::{arbitrary::any, collection::vec, prelude::*};

use crate::amount::{Amount, MAX_MONEY};
use crate::block;
use crate::cached::Cached;
use crate::policy::PolicyRecord;
use crate::role::RoleSet;
use crate::transparent::{self, Output, OutputKind, Payload};

use super::{Hash, LockTime, Transaction, Version};

impl Arbitrary for Hash {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        any::<[u8; 32]>().prop_map(Hash).boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for LockTime {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        prop_oneof![
            (block::Height::MIN.0..=block::Height::MAX.0)
                .prop_map(|n| LockTime::Height(block::Height(n))),
            (LockTime::MIN_TIMESTAMP..=LockTime::MAX_TIMESTAMP)
                .prop_map(|n| LockTime::Time(Utc.timestamp(n, 0))),
        ]
        .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Version {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        use Version::*;
        prop::sample::select(vec![
            CoinbaseTransfer,
            CoinTransfer,
            RoleChange,
            PolicyChange,
            RoleChangeFee,
            PolicyChangeFee,
            RoleCreate,
            RoleCreateFee,
            CoinCreation,
            CoinCreationFee,
        ])
        .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

/// A payload strategy matching `kind`, so generated outputs agree with
/// the slot the version assigns them.
fn payload_strategy(kind: OutputKind) -> BoxedStrategy<Payload> {
    match kind {
        OutputKind::Coin => (0i64..=MAX_MONEY.as_sat())
            .prop_map(|sat| Payload::Coin(Amount::from_sat(sat)))
            .boxed(),
        OutputKind::Role => any::<RoleSet>().prop_map(Payload::Role).boxed(),
        OutputKind::Policy => any::<PolicyRecord>().prop_map(Payload::Policy).boxed(),
    }
}

impl Transaction {
    /// Strategy for transactions of one version, with outputs whose
    /// payload kinds match their slots and at least one input (the wire
    /// format cannot represent an empty, witness-free input vector
    /// unambiguously).
    pub fn strategy_for(version: Version) -> BoxedStrategy<Self> {
        let outputs = (1usize..5).prop_flat_map(move |count| {
            let slots: Vec<_> = (0..count)
                .map(|index| {
                    Output::strategy_with_payload(payload_strategy(
                        version.output_kind(index),
                    ))
                })
                .collect();
            slots
        });
        (
            vec(any::<transparent::Input>(), 1..5),
            outputs,
            any::<LockTime>(),
        )
            .prop_map(move |(inputs, outputs, locktime)| Transaction {
                version: version as i32,
                inputs,
                outputs,
                locktime,
                hash: Cached::new(),
            })
            .boxed()
    }
}

impl Arbitrary for Transaction {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        any::<Version>()
            .prop_flat_map(Transaction::strategy_for)
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
