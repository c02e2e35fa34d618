//! Validation scenarios, end to end through both passes.

use kestrel_chain::amount::{Amount, MAX_MONEY};
use kestrel_chain::block::Height;
use kestrel_chain::parameters::Network;
use kestrel_chain::policy::{ActivePolicy, PolicyChangeType, PolicyRecord};
use kestrel_chain::role::RoleSet;
use kestrel_chain::transaction::{Hash, LockTime, Transaction, Version};
use kestrel_chain::transparent::{Input, OutPoint, Output, Script, Witness};

use super::check::{check_transaction, check_tx_inputs};
use crate::error::TransactionError;
use crate::view::{MapView, Utxo};

const NETWORK: Network = Network::Mainnet;
const SPEND_HEIGHT: Height = Height(200);

/// A standard pay-to-pubkey-hash script for the pseudo address `tag`.
fn p2pkh(tag: u8) -> Script {
    let mut bytes = vec![0x76, 0xa9, 0x14];
    bytes.extend_from_slice(&[tag; 20]);
    bytes.extend_from_slice(&[0x88, 0xac]);
    Script(bytes)
}

fn outpoint(tag: u8) -> OutPoint {
    OutPoint {
        hash: Hash([tag; 32]),
        index: 0,
    }
}

fn input(tag: u8) -> Input {
    Input {
        outpoint: outpoint(tag),
        unlock_script: Script(vec![tag]),
        sequence: Input::SEQUENCE_FINAL,
        witness: Witness::default(),
    }
}

fn role_utxo(roles: RoleSet, owner: u8) -> Utxo {
    Utxo {
        output: Output::role(roles, p2pkh(owner)),
        height: Height(1),
        from_coinbase: false,
    }
}

fn coin_utxo(sat: i64, owner: u8) -> Utxo {
    Utxo {
        output: Output::coin(Amount::from_sat(sat), p2pkh(owner)),
        height: Height(1),
        from_coinbase: false,
    }
}

fn coinbase_utxo(sat: i64, owner: u8, height: u32) -> Utxo {
    Utxo {
        output: Output::coin(Amount::from_sat(sat), p2pkh(owner)),
        height: Height(height),
        from_coinbase: true,
    }
}

fn roles(template: &str) -> RoleSet {
    template.parse().expect("test role template must parse")
}

/// Run both validation passes, returning the fee.
fn validate(tx: &Transaction, view: &MapView) -> Result<Amount, TransactionError> {
    check_transaction(tx, &ActivePolicy::default(), true)?;
    check_tx_inputs(tx, view, SPEND_HEIGHT, NETWORK)
}

#[test]
fn manager_grants_creator_role() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("M..R.."), 0xa0));
    view.insert(outpoint(2), role_utxo(roles("...R.."), 0xb0));

    let tx = Transaction::new(
        Version::RoleChange,
        vec![input(1), input(2)],
        vec![
            Output::role(roles("M..R.."), p2pkh(0xa0)),
            Output::role(roles(".C.R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Ok(Amount::zero()));
}

#[test]
fn non_manager_cannot_grant_roles() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("...RA."), 0xa0));
    view.insert(outpoint(2), role_utxo(roles("...R.."), 0xb0));

    let tx = Transaction::new(
        Version::RoleChange,
        vec![input(1), input(2)],
        vec![
            Output::role(roles("...RA."), p2pkh(0xa0)),
            Output::role(roles(".C.R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Err(TransactionError::NotAuthorized));
}

#[test]
fn account_manager_can_register() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("...RA."), 0xa0));
    view.insert(outpoint(2), role_utxo(roles("......"), 0xb0));

    let tx = Transaction::new(
        Version::RoleChange,
        vec![input(1), input(2)],
        vec![
            Output::role(roles("...RA."), p2pkh(0xa0)),
            Output::role(roles("...R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Ok(Amount::zero()));
}

#[test]
fn disabled_credentials_are_rejected() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("M..R.D"), 0xa0));
    view.insert(outpoint(2), role_utxo(roles("...R.."), 0xb0));

    let tx = Transaction::new(
        Version::RoleChange,
        vec![input(1), input(2)],
        vec![
            Output::role(roles("M..R.D"), p2pkh(0xa0)),
            Output::role(roles(".C.R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Err(TransactionError::NotAuthorized));
}

#[test]
fn voluntary_privilege_drop_is_allowed() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("M..R.."), 0xa0));
    view.insert(outpoint(2), role_utxo(roles("...R.."), 0xb0));

    let tx = Transaction::new(
        Version::RoleChange,
        vec![input(1), input(2)],
        vec![
            // empty repeat: the author drops their own roles
            Output::role(RoleSet::empty(), p2pkh(0xa0)),
            Output::role(roles(".C.R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Ok(Amount::zero()));
}

#[test]
fn coin_transfer_pays_fee() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("...R.."), 0xa0));
    view.insert(outpoint(2), coin_utxo(1000, 0xa0));

    let tx = Transaction::new(
        Version::CoinTransfer,
        vec![input(1), input(2)],
        vec![
            Output::role(roles("...R.."), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(400), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(500), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Ok(Amount::from_sat(100)));
}

#[test]
fn coin_transfer_with_insufficient_funds() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("...R.."), 0xa0));
    view.insert(outpoint(2), coin_utxo(1000, 0xa0));

    let tx = Transaction::new(
        Version::CoinTransfer,
        vec![input(1), input(2)],
        vec![
            Output::role(roles("...R.."), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(500), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(1000), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(
        validate(&tx, &view),
        Err(TransactionError::InputsBelowOutputs)
    );
}

#[test]
fn role_repeat_mismatch_is_rejected() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("...R.."), 0xa0));
    view.insert(outpoint(2), coin_utxo(1000, 0xa0));

    let tx = Transaction::new(
        Version::CoinTransfer,
        vec![input(1), input(2)],
        vec![
            // non-empty repeat that differs from the credentials
            Output::role(roles("...RA."), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(400), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(500), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(
        validate(&tx, &view),
        Err(TransactionError::InvalidRoleRepeat)
    );
}

#[test]
fn role_change_must_not_reuse_author_address() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("M..R.."), 0xa0));
    // the payload input belongs to the author's own address
    view.insert(outpoint(2), role_utxo(roles("...R.."), 0xa0));

    let tx = Transaction::new(
        Version::RoleChange,
        vec![input(1), input(2)],
        vec![
            Output::role(roles("M..R.."), p2pkh(0xa0)),
            Output::role(roles(".C.R.."), p2pkh(0xa0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Err(TransactionError::AddressReuse));
}

#[test]
fn role_change_pairing_is_required() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("M..R.."), 0xa0));

    // manager credentials, but no paired input for the payload output
    let tx = Transaction::new(
        Version::RoleChange,
        vec![input(1)],
        vec![
            Output::role(roles("M..R.."), p2pkh(0xa0)),
            Output::role(roles(".C.R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(
        validate(&tx, &view),
        Err(TransactionError::InputOutputMismatch)
    );
}

#[test]
fn role_change_fee_spends_author_coins() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("M..R.."), 0xa0));
    view.insert(outpoint(2), coin_utxo(5000, 0xa0));
    view.insert(outpoint(3), role_utxo(roles("...R.."), 0xb0));

    let tx = Transaction::new(
        Version::RoleChangeFee,
        vec![input(1), input(2), input(3)],
        vec![
            Output::role(roles("M..R.."), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(2000), p2pkh(0xa0)),
            Output::role(roles(".C.R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Ok(Amount::from_sat(3000)));
}

#[test]
fn role_change_fee_input_must_match_author() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("M..R.."), 0xa0));
    // fee coins owned by somebody else
    view.insert(outpoint(2), coin_utxo(5000, 0xc0));
    view.insert(outpoint(3), role_utxo(roles("...R.."), 0xb0));

    let tx = Transaction::new(
        Version::RoleChangeFee,
        vec![input(1), input(2), input(3)],
        vec![
            Output::role(roles("M..R.."), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(2000), p2pkh(0xa0)),
            Output::role(roles(".C.R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(validate(&tx, &view), Err(TransactionError::AddressMismatch));
}

#[test]
fn missing_credentials_are_rejected() {
    kestrel_test::init();

    let mut view = MapView::new();
    // first input resolves to a coin, not role credentials
    view.insert(outpoint(1), coin_utxo(1000, 0xa0));

    let tx = Transaction::new(
        Version::CoinTransfer,
        vec![input(1)],
        vec![
            Output::role(roles("...R.."), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(400), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(500), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    assert_eq!(
        validate(&tx, &view),
        Err(TransactionError::MissingCredentials)
    );
}

#[test]
fn unresolved_inputs_are_rejected() {
    kestrel_test::init();

    let view = MapView::new();
    let tx = Transaction::new(
        Version::CoinTransfer,
        vec![input(1)],
        vec![Output::role(roles("...R.."), p2pkh(0xa0))],
        LockTime::unlocked(),
    );

    assert_eq!(
        check_tx_inputs(&tx, &view, SPEND_HEIGHT, NETWORK),
        Err(TransactionError::MissingInputs)
    );
}

#[test]
fn policy_change_requires_manager() {
    kestrel_test::init();

    let record = PolicyRecord {
        permanent: false,
        change_type: PolicyChangeType::SetMinTxFee,
        param: 4500,
    };

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("M..R.."), 0xa0));
    let tx = Transaction::new(
        Version::PolicyChange,
        vec![input(1)],
        vec![
            Output::role(roles("M..R.."), p2pkh(0xa0)),
            Output::policy(record, p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );
    assert_eq!(validate(&tx, &view), Ok(Amount::zero()));

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles(".C.R.."), 0xa0));
    let tx = Transaction::new(
        Version::PolicyChange,
        vec![input(1)],
        vec![
            Output::role(roles(".C.R.."), p2pkh(0xa0)),
            Output::policy(record, p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );
    assert_eq!(validate(&tx, &view), Err(TransactionError::NotAuthorized));
}

#[test]
fn role_create_requires_fresh_account() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("...RA."), 0xa0));

    let tx = Transaction::new(
        Version::RoleCreate,
        vec![input(1)],
        vec![
            Output::role(roles("...RA."), p2pkh(0xa0)),
            Output::role(roles("...R.."), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    // fresh target: accepted
    assert_eq!(validate(&tx, &view), Ok(Amount::zero()));

    // known target: refused
    view.insert_role(
        kestrel_chain::transparent::Address::PayToPublicKeyHash {
            network: NETWORK,
            pub_key_hash: [0xb0; 20],
        },
        roles("...R.."),
    );
    assert_eq!(validate(&tx, &view), Err(TransactionError::NotAuthorized));
}

#[test]
fn coin_creation_needs_creator_and_policy_room() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles(".C.R.."), 0xa0));

    let tx = Transaction::new(
        Version::CoinCreation,
        vec![input(1)],
        vec![
            Output::role(roles(".C.R.."), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(1_000), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );

    // The default policy allows no coin creation at all.
    assert_eq!(
        check_transaction(&tx, &ActivePolicy::default(), true),
        Err(TransactionError::OutputTotalTooLarge)
    );

    let mut policy = ActivePolicy::default();
    policy.coin_creation_limit = Amount::from_sat(10_000);
    assert_eq!(check_transaction(&tx, &policy, true), Ok(()));
    assert_eq!(
        check_tx_inputs(&tx, &view, SPEND_HEIGHT, NETWORK),
        Ok(Amount::zero())
    );

    // A registered non-creator may not create coin.
    let mut view = MapView::new();
    view.insert(outpoint(1), role_utxo(roles("...R.."), 0xa0));
    let tx = Transaction::new(
        Version::CoinCreation,
        vec![input(1)],
        vec![
            Output::role(roles("...R.."), p2pkh(0xa0)),
            Output::coin(Amount::from_sat(1_000), p2pkh(0xb0)),
        ],
        LockTime::unlocked(),
    );
    assert_eq!(
        check_tx_inputs(&tx, &view, SPEND_HEIGHT, NETWORK),
        Err(TransactionError::NotAuthorized)
    );
}

#[test]
fn coinbase_transfer_spends_only_coinbases() {
    kestrel_test::init();

    let mut view = MapView::new();
    view.insert(outpoint(1), coinbase_utxo(5_000_000_000, 0xa0, 1));

    let tx = Transaction::new(
        Version::CoinbaseTransfer,
        vec![input(1)],
        vec![Output::coin(Amount::from_sat(4_999_000_000), p2pkh(0xb0))],
        LockTime::unlocked(),
    );

    // matured coinbase input: accepted, and the difference is the fee
    assert_eq!(validate(&tx, &view), Ok(Amount::from_sat(1_000_000)));

    // a plain coin input is not acceptable here
    let mut view = MapView::new();
    view.insert(outpoint(1), coin_utxo(5_000_000_000, 0xa0));
    assert_eq!(
        validate(&tx, &view),
        Err(TransactionError::CoinbaseExpected)
    );
}

#[test]
fn immature_coinbase_spend_is_rejected() {
    kestrel_test::init();

    let mut view = MapView::new();
    // created at height 150, spent at 200: only 50 deep
    view.insert(outpoint(1), coinbase_utxo(5_000_000_000, 0xa0, 150));

    let tx = Transaction::new(
        Version::CoinbaseTransfer,
        vec![input(1)],
        vec![Output::coin(Amount::from_sat(4_999_000_000), p2pkh(0xb0))],
        LockTime::unlocked(),
    );

    assert_eq!(
        validate(&tx, &view),
        Err(TransactionError::ImmatureCoinbaseSpend)
    );

    // exactly at maturity: accepted
    let mut view = MapView::new();
    view.insert(outpoint(1), coinbase_utxo(5_000_000_000, 0xa0, 100));
    assert!(validate(&tx, &view).is_ok());
}

mod structural {
    use super::*;

    fn policy() -> ActivePolicy {
        ActivePolicy::default()
    }

    #[test]
    fn empty_vectors_are_rejected() {
        kestrel_test::init();

        let tx = Transaction::new(
            Version::CoinbaseTransfer,
            vec![],
            vec![Output::coin(Amount::from_sat(1), p2pkh(1))],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::NoInputs)
        );

        let tx = Transaction::new(
            Version::CoinbaseTransfer,
            vec![input(1)],
            vec![],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::NoOutputs)
        );
    }

    #[test]
    fn money_boundaries() {
        kestrel_test::init();

        let tx = Transaction::new(
            Version::CoinbaseTransfer,
            vec![input(1)],
            vec![Output::coin(MAX_MONEY, p2pkh(1))],
            LockTime::unlocked(),
        );
        assert_eq!(check_transaction(&tx, &policy(), true), Ok(()));

        let tx = Transaction::new(
            Version::CoinbaseTransfer,
            vec![input(1)],
            vec![Output::coin(MAX_MONEY + Amount::from_sat(1), p2pkh(1))],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::OutputTooLarge)
        );

        let tx = Transaction::new(
            Version::CoinbaseTransfer,
            vec![input(1)],
            vec![Output::coin(Amount::from_sat(-1), p2pkh(1))],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::OutputNegative)
        );

        // two in-range outputs overflowing the total
        let tx = Transaction::new(
            Version::CoinbaseTransfer,
            vec![input(1)],
            vec![
                Output::coin(MAX_MONEY, p2pkh(1)),
                Output::coin(Amount::from_sat(1), p2pkh(2)),
            ],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::OutputTotalTooLarge)
        );
    }

    #[test]
    fn wrong_first_output_kind() {
        kestrel_test::init();

        let tx = Transaction::new(
            Version::CoinTransfer,
            vec![input(1)],
            vec![Output::coin(Amount::from_sat(5), p2pkh(1))],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::WrongOutputType)
        );
    }

    #[test]
    fn unknown_version_is_rejected() {
        kestrel_test::init();

        let tx = Transaction::from_raw_version(
            7,
            vec![input(1)],
            vec![Output::coin(Amount::from_sat(5), p2pkh(1))],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::UnknownVersion)
        );
    }

    #[test]
    fn duplicate_inputs_are_rejected() {
        kestrel_test::init();

        let tx = Transaction::new(
            Version::CoinbaseTransfer,
            vec![input(1), input(1)],
            vec![Output::coin(Amount::from_sat(5), p2pkh(1))],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::DuplicateInputs)
        );
        // the scan can be skipped
        assert_eq!(check_transaction(&tx, &policy(), false), Ok(()));
    }

    #[test]
    fn coinbase_script_length_bounds() {
        kestrel_test::init();

        let coinbase = |data: Vec<u8>| {
            Transaction::new(
                Version::CoinbaseTransfer,
                vec![Input::new(OutPoint::NULL, Script(data), 0)],
                vec![Output::coin(Amount::from_sat(50), p2pkh(1))],
                LockTime::unlocked(),
            )
        };

        assert_eq!(check_transaction(&coinbase(vec![0; 2]), &policy(), true), Ok(()));
        assert_eq!(
            check_transaction(&coinbase(vec![0; 100]), &policy(), true),
            Ok(())
        );
        assert_eq!(
            check_transaction(&coinbase(vec![0; 1]), &policy(), true),
            Err(TransactionError::CoinbaseScriptSigLength)
        );
        assert_eq!(
            check_transaction(&coinbase(vec![0; 101]), &policy(), true),
            Err(TransactionError::CoinbaseScriptSigLength)
        );
    }

    #[test]
    fn null_prevout_outside_coinbase() {
        kestrel_test::init();

        let tx = Transaction::new(
            Version::CoinbaseTransfer,
            vec![input(1), Input::new(OutPoint::NULL, Script(vec![0; 4]), 0)],
            vec![Output::coin(Amount::from_sat(5), p2pkh(1))],
            LockTime::unlocked(),
        );
        assert_eq!(
            check_transaction(&tx, &policy(), true),
            Err(TransactionError::NullPrevout)
        );
    }
}
