//! The managed-account registry of the kestrel ledger.
//!
//! Accounts form the authority tree consulted when role transactions are
//! finalized: each account carries its role set, its parent, and its
//! children, rooted at the single account without a parent. The registry
//! persists to a flat text file on every mutation and never panics
//! across its API boundary; failures surface as `false` returns and
//! tracing output.

mod account;
mod config;
mod db;
mod visualization;

pub use account::Account;
pub use config::Config;
pub use db::AccountDb;
pub use visualization::AccountGraph;
