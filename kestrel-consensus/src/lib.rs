//! Per-transaction consensus validation for the kestrel ledger.
//!
//! Two entry points, mirroring the two validation stages:
//!
//! - [`transaction::check::check_transaction`]: context-free structural
//!   checks on a single transaction.
//! - [`transaction::check::check_tx_inputs`]: context-aware checks
//!   against a snapshot of the UTXO set, enforcing authorization,
//!   addressing, and fees. Returns the transaction fee.
//!
//! Both are synchronous, stateless functions; every piece of context
//! they consult is an explicit argument. Callers turn a
//! [`TransactionError`] into a peer reject message via
//! [`TransactionError::reject_code`] and a ban score via
//! [`TransactionError::dos_score`].

pub mod error;
pub mod parameters;
pub mod transaction;
pub mod view;

pub use error::TransactionError;
pub use view::{InputsView, MapView, Utxo};
