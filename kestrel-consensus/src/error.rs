//! Consensus rejection errors.

use thiserror::Error;

/// A reason a transaction failed validation.
///
/// Every variant maps to a stable reject-code string consumed by peers
/// ([`TransactionError::reject_code`]) and a denial-of-service score for
/// peer banning ([`TransactionError::dos_score`]). Checks run in a fixed
/// documented order, so a given malformed transaction always surfaces
/// the same variant.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction has no inputs")]
    NoInputs,

    #[error("transaction has no outputs")]
    NoOutputs,

    #[error("transaction exceeds the block weight limit")]
    Oversize,

    #[error("transaction output has a negative value")]
    OutputNegative,

    #[error("transaction output value is above the money limit")]
    OutputTooLarge,

    #[error("sum of transaction outputs is out of range")]
    OutputTotalTooLarge,

    #[error("transaction output has the wrong payload kind for its version")]
    WrongOutputType,

    #[error("unknown transaction version")]
    UnknownVersion,

    #[error("transaction spends the same outpoint twice")]
    DuplicateInputs,

    #[error("coinbase script length out of bounds")]
    CoinbaseScriptSigLength,

    #[error("non-coinbase transaction has a null previous outpoint")]
    NullPrevout,

    #[error("transaction inputs are missing or already spent")]
    MissingInputs,

    #[error("first input does not carry role credentials")]
    MissingCredentials,

    #[error("first output is not a role repeat")]
    MissingRoleRepeat,

    #[error("credentials are not authorized for this transaction")]
    NotAuthorized,

    #[error("input must spend a coin output")]
    CoinTransferExpected,

    #[error("input/output pair must both carry role payloads")]
    RoleChangeExpected,

    #[error("coinbase transfer may only spend coinbase outputs")]
    CoinbaseExpected,

    #[error("address differs from the credentials address")]
    AddressMismatch,

    #[error("payload must not reuse the credentials address")]
    AddressReuse,

    #[error("inputs and outputs are not paired")]
    InputOutputMismatch,

    #[error("role repeat does not restate the credentials roles")]
    InvalidRoleRepeat,

    #[error("payload output has the wrong kind for its version")]
    InvalidOutputType,

    #[error("transaction version invalid in this context")]
    InvalidVersion,

    #[error("input value is below output value")]
    InputsBelowOutputs,

    #[error("transaction input values are out of range")]
    InputValuesOutOfRange,

    #[error("transaction fee is out of range")]
    FeeOutOfRange,

    #[error("tried to spend a coinbase output before maturity")]
    ImmatureCoinbaseSpend,
}

impl TransactionError {
    /// The stable reject-code string for this rejection, as sent to
    /// peers.
    pub fn reject_code(self) -> &'static str {
        use TransactionError::*;
        match self {
            NoInputs => "bad-txns-vin-empty",
            NoOutputs => "bad-txns-vout-empty",
            Oversize => "bad-txns-oversize",
            OutputNegative => "bad-txns-vout-negative",
            OutputTooLarge => "bad-txns-vout-toolarge",
            OutputTotalTooLarge => "bad-txns-txouttotal-toolarge",
            WrongOutputType => "bad-txns-vout-wrong-type",
            UnknownVersion => "bad-txns-version",
            DuplicateInputs => "bad-txns-inputs-duplicate",
            CoinbaseScriptSigLength => "bad-cb-length",
            NullPrevout => "bad-txns-prevout-null",
            MissingInputs => "bad-txns-inputs-missingorspent",
            MissingCredentials => "bad-txns-missing-credentials",
            MissingRoleRepeat => "bad-txns-missing-rolerepeat",
            NotAuthorized => "bad-txns-not-authorized",
            CoinTransferExpected => "bad-txns-coin-transfer-expected",
            RoleChangeExpected => "bad-txns-role-change-expected",
            CoinbaseExpected => "bad-txns-coinbase-expected",
            AddressMismatch => "bad-txns-address-mismatch",
            AddressReuse => "bad-txns-address-reuse",
            InputOutputMismatch => "bad-txns-io-mismatch",
            InvalidRoleRepeat => "bad-txns-invalid-rolerepeat",
            InvalidOutputType => "bad-txns-invalid-vouttype",
            InvalidVersion => "bad-txns-invalid-txversion",
            InputsBelowOutputs => "bad-txns-in-belowout",
            InputValuesOutOfRange => "bad-txns-inputvalues-outofrange",
            FeeOutOfRange => "bad-txns-fee-outofrange",
            ImmatureCoinbaseSpend => "bad-txns-premature-spend-of-coinbase",
        }
    }

    /// The denial-of-service score attached to this rejection: 10 for
    /// structural defects, 100 for substantive consensus violations.
    pub fn dos_score(self) -> u32 {
        use TransactionError::*;
        match self {
            NoInputs | NoOutputs | NullPrevout => 10,
            _ => 100,
        }
    }
}
