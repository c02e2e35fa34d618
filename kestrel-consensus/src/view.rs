//! The abstract view of the UTXO set that validation reads.
//!
//! The chain database is an external collaborator; validation only needs
//! to resolve outpoints to unspent outputs and to ask whether an address
//! already holds a role. [`MapView`] is the in-memory implementation used
//! by tests and by callers that assemble their own snapshots.

use std::collections::{BTreeMap, HashMap};

use kestrel_chain::block;
use kestrel_chain::role::RoleSet;
use kestrel_chain::transaction::Transaction;
use kestrel_chain::transparent::{Address, OutPoint, Output};

/// An unspent transaction output together with the context validation
/// needs about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    /// The unspent output itself.
    pub output: Output,
    /// The height of the block the output was created in.
    pub height: block::Height,
    /// Whether the output was created by a coinbase transaction, making
    /// it subject to the maturity rule.
    pub from_coinbase: bool,
}

/// An immutable snapshot of the UTXO set, resolvable by outpoint.
pub trait InputsView {
    /// The unspent output `outpoint` refers to, if it exists and is
    /// unspent in this snapshot.
    fn utxo(&self, outpoint: &OutPoint) -> Option<&Utxo>;

    /// The role set currently recorded on chain for `address`, if any.
    /// Consulted by role creation to refuse re-creating an account.
    fn prior_roles(&self, address: &Address) -> Option<RoleSet>;

    /// Whether every input of `tx` resolves in this snapshot.
    fn have_inputs(&self, tx: &Transaction) -> bool {
        tx.inputs
            .iter()
            .all(|input| self.utxo(&input.outpoint).is_some())
    }
}

/// A map-backed [`InputsView`].
#[derive(Debug, Default, Clone)]
pub struct MapView {
    utxos: HashMap<OutPoint, Utxo>,
    roles: BTreeMap<Address, RoleSet>,
}

impl MapView {
    pub fn new() -> MapView {
        MapView::default()
    }

    /// Insert an unspent output.
    pub fn insert(&mut self, outpoint: OutPoint, utxo: Utxo) {
        self.utxos.insert(outpoint, utxo);
    }

    /// Record an existing on-chain role for `address`.
    pub fn insert_role(&mut self, address: Address, roles: RoleSet) {
        self.roles.insert(address, roles);
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

impl InputsView for MapView {
    fn utxo(&self, outpoint: &OutPoint) -> Option<&Utxo> {
        self.utxos.get(outpoint)
    }

    fn prior_roles(&self, address: &Address) -> Option<RoleSet> {
        self.roles.get(address).copied()
    }
}
