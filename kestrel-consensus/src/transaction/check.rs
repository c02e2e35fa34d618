//! Transaction checks.
//!
//! Checks are evaluated in a fixed order and the first failure decides
//! the reject code, so independent implementations agree on the code a
//! given malformed transaction produces.

use std::collections::HashSet;
use std::convert::TryFrom;

use tracing::trace;

use kestrel_chain::amount::{money_range, Amount, MAX_MONEY};
use kestrel_chain::block;
use kestrel_chain::parameters::Network;
use kestrel_chain::policy::ActivePolicy;
use kestrel_chain::role::RoleSet;
use kestrel_chain::transaction::{Transaction, Version};
use kestrel_chain::transparent::{Address, OutputKind, Script};

use crate::error::TransactionError;
use crate::parameters::{COINBASE_MATURITY, MAX_BLOCK_WEIGHT, WITNESS_SCALE_FACTOR};
use crate::view::InputsView;

/// Context-free validation of a single transaction.
///
/// Checks the universal gates (non-empty inputs and outputs, weight
/// limit, duplicate spends, coinbase shape) and the per-version output
/// shape and money bounds. `policy` supplies the coin-creation limit;
/// `check_duplicate_inputs` may be disabled by block validation, which
/// performs its own duplicate scan.
pub fn check_transaction(
    tx: &Transaction,
    policy: &ActivePolicy,
    check_duplicate_inputs: bool,
) -> Result<(), TransactionError> {
    if tx.inputs.is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if tx.outputs.is_empty() {
        return Err(TransactionError::NoOutputs);
    }
    // Size limit, measured without the witness since it has not been
    // checked for malleability yet.
    if tx.base_size() * WITNESS_SCALE_FACTOR > MAX_BLOCK_WEIGHT {
        return Err(TransactionError::Oversize);
    }

    let version =
        Version::try_from(tx.version).map_err(|_| TransactionError::UnknownVersion)?;
    match version {
        Version::CoinbaseTransfer => {
            check_coin_outputs(tx, 0, MAX_MONEY)?;
        }
        Version::CoinTransfer => {
            // The first output is the author's "role repeat".
            if tx.outputs[0].kind() != OutputKind::Role {
                return Err(TransactionError::WrongOutputType);
            }
            check_coin_outputs(tx, 1, MAX_MONEY)?;
        }
        Version::CoinCreation => {
            if tx.outputs[0].kind() != OutputKind::Role {
                return Err(TransactionError::WrongOutputType);
            }
            // Coin creation is additionally capped by the active policy.
            let cap = std::cmp::min(MAX_MONEY, policy.coin_creation_limit);
            check_coin_outputs(tx, 1, cap)?;
        }
        Version::RoleChange
        | Version::RoleChangeFee
        | Version::PolicyChange
        | Version::PolicyChangeFee
        | Version::RoleCreate
        | Version::RoleCreateFee
        | Version::CoinCreationFee => {
            if tx.outputs[0].kind() != OutputKind::Role {
                return Err(TransactionError::WrongOutputType);
            }
            // Payload shape and money bounds are enforced by the
            // context-aware pass, which resolves the paired inputs.
        }
    }

    // Duplicate-input scan. Slow, so block validation opts out.
    if check_duplicate_inputs {
        let mut outpoints = HashSet::new();
        for input in tx.inputs.iter() {
            if !outpoints.insert(input.outpoint) {
                return Err(TransactionError::DuplicateInputs);
            }
        }
    }

    if tx.is_coinbase() {
        let data_len = tx.inputs[0].unlock_script.0.len();
        if data_len < 2 || data_len > 100 {
            return Err(TransactionError::CoinbaseScriptSigLength);
        }
    } else {
        for input in tx.inputs.iter() {
            if input.outpoint.is_null() {
                return Err(TransactionError::NullPrevout);
            }
        }
    }

    Ok(())
}

/// Per-output money checks shared by the coin-carrying versions: every
/// output from `first_payload` on must be a coin, each value and the
/// running total must stay inside the money range, and the total must
/// not exceed `total_cap`.
fn check_coin_outputs(
    tx: &Transaction,
    first_payload: usize,
    total_cap: Amount,
) -> Result<(), TransactionError> {
    let mut value_out = Amount::zero();
    for output in tx.outputs.iter().skip(first_payload) {
        let value = match output.value() {
            Some(value) => value,
            None => return Err(TransactionError::WrongOutputType),
        };
        if value < Amount::zero() {
            return Err(TransactionError::OutputNegative);
        }
        if value > MAX_MONEY {
            return Err(TransactionError::OutputTooLarge);
        }
        value_out = value_out
            .checked_add(value)
            .ok_or(TransactionError::OutputTotalTooLarge)?;
        if !money_range(value_out) || value_out > total_cap {
            return Err(TransactionError::OutputTotalTooLarge);
        }
    }
    Ok(())
}

/// Context-aware validation of a transaction against a snapshot of the
/// UTXO set.
///
/// Callers must run [`check_transaction`] first and must only call this
/// once every input resolves. On success returns the transaction fee
/// (zero for the free management versions).
pub fn check_tx_inputs(
    tx: &Transaction,
    inputs: &impl InputsView,
    spend_height: block::Height,
    network: Network,
) -> Result<Amount, TransactionError> {
    // are the actual inputs available?
    if !inputs.have_inputs(tx) {
        return Err(TransactionError::MissingInputs);
    }

    let version =
        Version::try_from(tx.version).map_err(|_| TransactionError::InvalidVersion)?;

    if version == Version::CoinbaseTransfer {
        // Special case of a miner spending coinbases: every input must
        // itself be a coinbase coin output.
        for input in tx.inputs.iter() {
            let prevout = inputs
                .utxo(&input.outpoint)
                .expect("all inputs resolve once have_inputs succeeds");
            debug_assert_eq!(prevout.output.kind(), OutputKind::Coin);
            if !prevout.from_coinbase {
                return Err(TransactionError::CoinbaseExpected);
            }
        }
    } else {
        check_credentials_and_addressing(tx, version, inputs, network)?;
    }

    // Calculate fees
    if version.is_free() {
        // Free management transactions don't require a fee.
        return Ok(Amount::zero());
    }

    let mut value_in = Amount::zero();
    for input in tx.inputs.iter() {
        let prevout = inputs
            .utxo(&input.outpoint)
            .expect("all inputs resolve once have_inputs succeeds");

        // Only coin inputs fund the transaction; credentials and the
        // role payload inputs carry no value.
        let value = match prevout.output.value() {
            Some(value) => value,
            None => continue,
        };

        // If the input is a coinbase, check that it's matured.
        let depth = spend_height.0 as i64 - prevout.height.0 as i64;
        if prevout.from_coinbase && depth < COINBASE_MATURITY as i64 {
            return Err(TransactionError::ImmatureCoinbaseSpend);
        }

        value_in = value_in
            .checked_add(value)
            .ok_or(TransactionError::InputValuesOutOfRange)?;
        if !money_range(value) || !money_range(value_in) {
            return Err(TransactionError::InputValuesOutOfRange);
        }
    }

    let value_out = tx
        .value_out()
        .ok_or(TransactionError::OutputTotalTooLarge)?;
    if value_in < value_out {
        return Err(TransactionError::InputsBelowOutputs);
    }

    let txfee = value_in - value_out;
    if !money_range(txfee) {
        return Err(TransactionError::FeeOutOfRange);
    }

    trace!(?txfee, version = tx.version, "transaction fee computed");
    Ok(txfee)
}

/// The non-coinbase half of the context-aware pass: credentials, the
/// role repeat, authorization, and the address discipline binding every
/// slot to the author's address.
fn check_credentials_and_addressing(
    tx: &Transaction,
    version: Version,
    inputs: &impl InputsView,
    network: Network,
) -> Result<(), TransactionError> {
    // Retrieve the first input's utxo: the author's credentials.
    let credentials = inputs
        .utxo(&tx.inputs[0].outpoint)
        .expect("all inputs resolve once have_inputs succeeds");

    let credential_roles = match credentials.output.roles() {
        Some(roles) => roles,
        None => return Err(TransactionError::MissingCredentials),
    };

    // The first output must be a "role repeat".
    let role_repeat = match tx.outputs.get(0) {
        Some(output) if output.kind() == OutputKind::Role => output,
        _ => return Err(TransactionError::MissingRoleRepeat),
    };

    // Ensure that the account has sufficient privileges for the
    // operation.
    if !is_authorized(tx, version, credential_roles, inputs, network) {
        return Err(TransactionError::NotAuthorized);
    }

    // All inputs must be bound to the credentials address so that one
    // cannot use their privileges with another account's coins. Role
    // changes are the exception: their payload inputs are the role
    // outputs being rotated, which belong to *other* addresses and must
    // pair up with the outputs replacing them.
    let author = destination(&credentials.output.lock_script, network);
    match version {
        Version::RoleChange | Version::RoleChangeFee => {
            if version == Version::RoleChangeFee {
                // The fee input must be a coin owned by the author.
                let fee_input = tx
                    .inputs
                    .get(1)
                    .ok_or(TransactionError::InputOutputMismatch)?;
                let prevout = inputs
                    .utxo(&fee_input.outpoint)
                    .expect("all inputs resolve once have_inputs succeeds");
                if prevout.output.kind() != OutputKind::Coin {
                    return Err(TransactionError::CoinTransferExpected);
                }
                if !same_destination(&author, &prevout.output.lock_script, network) {
                    return Err(TransactionError::AddressMismatch);
                }
            }

            // Each payload input/output pair rotates one foreign
            // account, so the vectors must line up index for index.
            if tx.inputs.len() != tx.outputs.len() {
                return Err(TransactionError::InputOutputMismatch);
            }
            for index in version.extra_input_offset()..tx.inputs.len() {
                let prevout = inputs
                    .utxo(&tx.inputs[index].outpoint)
                    .expect("all inputs resolve once have_inputs succeeds");
                if prevout.output.kind() != OutputKind::Role
                    || tx.outputs[index].kind() != OutputKind::Role
                {
                    return Err(TransactionError::RoleChangeExpected);
                }
                let target = destination(&prevout.output.lock_script, network);
                if destinations_equal(&author, &target) {
                    return Err(TransactionError::AddressReuse);
                }
                if !same_destination(&target, &tx.outputs[index].lock_script, network) {
                    return Err(TransactionError::InputOutputMismatch);
                }
            }
        }
        _ => {
            // Every other input must be a coin owned by the author.
            for input in tx.inputs.iter().skip(1) {
                let prevout = inputs
                    .utxo(&input.outpoint)
                    .expect("all inputs resolve once have_inputs succeeds");
                if prevout.output.kind() != OutputKind::Coin {
                    return Err(TransactionError::CoinTransferExpected);
                }
                if !same_destination(&author, &prevout.output.lock_script, network) {
                    return Err(TransactionError::AddressMismatch);
                }
            }
        }
    }

    // The role repeat claims the author's own address.
    if !same_destination(&author, &role_repeat.lock_script, network) {
        return Err(TransactionError::AddressMismatch);
    }

    // So does the change output, on versions that carry one.
    if version.has_change_output() {
        let change = tx
            .outputs
            .get(1)
            .ok_or(TransactionError::InputOutputMismatch)?;
        if !same_destination(&author, &change.lock_script, network) {
            return Err(TransactionError::AddressMismatch);
        }
    }

    // Payload outputs must all carry the version's payload kind.
    let payload_kind = version.payload_kind();
    for output in tx.outputs.iter().skip(version.extra_output_offset()) {
        if output.kind() != payload_kind {
            return Err(TransactionError::InvalidOutputType);
        }
    }

    // The role repeat must restate the credentials roles, except that a
    // role change may drop them entirely (a voluntary privilege drop,
    // used to attach the account to a new parent).
    let repeated = role_repeat
        .roles()
        .expect("the role repeat was checked to be a role output");
    let voluntary_drop = match version {
        Version::RoleChange | Version::RoleChangeFee => repeated.is_empty(),
        _ => false,
    };
    if !voluntary_drop && repeated != credential_roles {
        return Err(TransactionError::InvalidRoleRepeat);
    }

    // Payload outputs must not reuse the author's address.
    for output in tx.outputs.iter().skip(version.extra_output_offset()) {
        if destinations_equal(&author, &destination(&output.lock_script, network)) {
            return Err(TransactionError::AddressReuse);
        }
    }

    Ok(())
}

/// How many exclusive offices (M, C, L, A) a role set holds.
fn office_count(roles: RoleSet) -> u32 {
    (roles
        & (RoleSet::MANAGER
            | RoleSet::CREATOR
            | RoleSet::LAW_ENFORCEMENT
            | RoleSet::ACCOUNT_MANAGER))
        .bits()
        .count_ones()
}

/// Whether a role set may author transactions: registered, not disabled,
/// and holding at most one office.
pub fn is_valid_role_in(roles: RoleSet) -> bool {
    roles.contains(RoleSet::REGISTERED)
        && !roles.contains(RoleSet::DISABLED)
        && office_count(roles) <= 1
}

/// Whether a role set may be written to an output: empty, or registered
/// with at most one office.
pub fn is_valid_role_out(roles: RoleSet) -> bool {
    roles.is_empty() || (roles.contains(RoleSet::REGISTERED) && office_count(roles) <= 1)
}

/// Whether `in_role` is allowed to flip exactly the flags in `delta`.
pub fn is_authorized_role_delta(in_role: RoleSet, delta: RoleSet) -> bool {
    // Manager privileges are required to grant or remove M, C, L and A.
    if delta.intersects(
        RoleSet::MANAGER
            | RoleSet::CREATOR
            | RoleSet::LAW_ENFORCEMENT
            | RoleSet::ACCOUNT_MANAGER,
    ) && !in_role.contains(RoleSet::MANAGER)
    {
        return false;
    }
    // Manager or account-manager privileges are required to register or
    // unregister an account.
    if delta.contains(RoleSet::REGISTERED)
        && !in_role.intersects(RoleSet::MANAGER | RoleSet::ACCOUNT_MANAGER)
    {
        return false;
    }
    // Manager or law-enforcement privileges are required to disable or
    // re-enable an account.
    if delta.contains(RoleSet::DISABLED)
        && !in_role.intersects(RoleSet::MANAGER | RoleSet::LAW_ENFORCEMENT)
    {
        return false;
    }
    // Every changed flag was vetted.
    true
}

/// Authorization of `tx` under the author's `in_role` credentials.
fn is_authorized(
    tx: &Transaction,
    version: Version,
    in_role: RoleSet,
    inputs: &impl InputsView,
    network: Network,
) -> bool {
    if !is_valid_role_in(in_role) {
        return false;
    }

    // Managers can perform anything; the validity check made sure they
    // are registered and not disabled.
    if in_role.contains(RoleSet::MANAGER) {
        return true;
    }

    match version {
        // Coinbase transfers never reach here, and transfers only need
        // the registration already checked by `is_valid_role_in`.
        Version::CoinbaseTransfer | Version::CoinTransfer => true,
        Version::RoleChange | Version::RoleChangeFee => {
            for index in version.extra_output_offset()..tx.outputs.len() {
                let new_roles = match tx.outputs[index].roles() {
                    Some(roles) => roles,
                    None => return false,
                };
                if !is_valid_role_out(new_roles) {
                    return false;
                }
                // The paired input carries the roles being replaced.
                let prevout = match tx
                    .inputs
                    .get(index)
                    .and_then(|input| inputs.utxo(&input.outpoint))
                {
                    Some(prevout) => prevout,
                    None => return false,
                };
                let old_roles = match prevout.output.roles() {
                    Some(roles) => roles,
                    None => return false,
                };
                let delta = new_roles ^ old_roles;
                if !is_authorized_role_delta(in_role, delta) {
                    return false;
                }
            }
            true
        }
        Version::RoleCreate | Version::RoleCreateFee => {
            for index in version.extra_output_offset()..tx.outputs.len() {
                let new_roles = match tx.outputs[index].roles() {
                    Some(roles) => roles,
                    None => return false,
                };
                if !is_valid_role_out(new_roles) {
                    return false;
                }
                // The target account must not already hold roles.
                if let Some(address) =
                    destination(&tx.outputs[index].lock_script, network)
                {
                    if inputs.prior_roles(&address).is_some() {
                        return false;
                    }
                }
                if !is_authorized_role_delta(in_role, new_roles) {
                    return false;
                }
            }
            true
        }
        // Only a manager can change policy, and managers were accepted
        // above.
        Version::PolicyChange | Version::PolicyChangeFee => false,
        // Only a creator can create coin.
        Version::CoinCreation | Version::CoinCreationFee => {
            in_role.contains(RoleSet::CREATOR)
        }
    }
}

/// The destination of a lock script, when it has one.
fn destination(script: &Script, network: Network) -> Option<Address> {
    script.destination(network)
}

/// Whether `author` and the destination of `script` are the same
/// address. Unextractable destinations never match.
fn same_destination(author: &Option<Address>, script: &Script, network: Network) -> bool {
    destinations_equal(author, &script.destination(network))
}

/// Address equality where an unextractable destination equals nothing,
/// itself included.
fn destinations_equal(lhs: &Option<Address>, rhs: &Option<Address>) -> bool {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        _ => false,
    }
}
