//! The persisted account registry.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use lazy_static::lazy_static;
use tracing::{debug, info, warn};

use kestrel_chain::transparent::Address;

use crate::account::Account;
use crate::config::Config;

lazy_static! {
    /// One lock per backing file, shared by every registry instance in
    /// the process. Held for the duration of each save so concurrent
    /// owners of the same path cannot interleave partial writes.
    static ref FILE_LOCKS: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>> =
        Mutex::new(HashMap::new());
}

fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    FILE_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(path.to_path_buf())
        .or_default()
        .clone()
}

/// The managed-account registry: address → account, plus the recorded
/// root.
///
/// Mutations persist the whole registry to disk before returning. All
/// methods report failure as `false` and log the cause; nothing panics
/// across this boundary.
pub struct AccountDb {
    accounts: BTreeMap<Address, Account>,
    root: Option<Address>,
    db_path: PathBuf,
}

impl AccountDb {
    /// Open the registry backed by `path`, loading it when the file
    /// exists and starting empty otherwise.
    pub fn new(path: impl Into<PathBuf>) -> AccountDb {
        let mut db = AccountDb {
            accounts: BTreeMap::new(),
            root: None,
            db_path: path.into(),
        };
        if db.db_path.exists() {
            info!(path = ?db.db_path, "loading account registry from disk");
            if let Err(error) = db.load_from_disk() {
                warn!(?error, path = ?db.db_path, "could not load account registry, starting empty");
                db.accounts.clear();
                db.root = None;
            }
        } else {
            info!(path = ?db.db_path, "initializing empty account registry");
        }
        db
    }

    /// Open the registry at the configured location.
    pub fn from_config(config: &Config) -> AccountDb {
        AccountDb::new(config.account_db_path())
    }

    /// Register a new account. Fails if the address is already known, or
    /// if the named parent is the account itself or absent from the
    /// registry. A parentless account becomes the root.
    pub fn add_account(&mut self, address: Address, account: Account) -> bool {
        if self.accounts.contains_key(&address) {
            warn!(%address, "account already exists");
            return false;
        }

        match account.parent().cloned() {
            None => {
                debug!(%address, "no parent, account becomes the root");
                self.root = Some(address);
            }
            Some(parent) => {
                if parent == address {
                    warn!(%address, "account cannot be its own parent");
                    return false;
                }
                let parent_account = match self.accounts.get_mut(&parent) {
                    Some(parent_account) => parent_account,
                    None => {
                        warn!(%address, %parent, "parent account is not registered");
                        return false;
                    }
                };
                parent_account.add_child(address);
            }
        }

        debug!(%address, roles = %account.roles(), "adding account");
        self.accounts.insert(address, account);
        self.persist()
    }

    /// Update an account, delegating to [`AccountDb::add_account`] for
    /// unknown addresses. An account whose roles were empty may be
    /// reattached to a new parent in the same update; roles are always
    /// overwritten.
    pub fn update_account(&mut self, address: Address, account: Account) -> bool {
        if !self.accounts.contains_key(&address) {
            return self.add_account(address, account);
        }

        let stored = &self.accounts[&address];
        let reattach = stored.roles().is_empty() && account.parent().is_some();
        if reattach {
            let new_parent = account
                .parent()
                .cloned()
                .expect("reattach requires a parent");
            if !self.accounts.contains_key(&new_parent) {
                warn!(%address, parent = %new_parent, "new parent is not registered");
                return false;
            }

            debug!(%address, parent = %new_parent, "reattaching account");
            if let Some(old_parent) = self.accounts[&address].parent().cloned() {
                if let Some(old_parent_account) = self.accounts.get_mut(&old_parent) {
                    old_parent_account.remove_child(&address);
                }
            }
            self.accounts
                .get_mut(&new_parent)
                .expect("presence checked above")
                .add_child(address);
            self.accounts
                .get_mut(&address)
                .expect("presence checked above")
                .set_parent(Some(new_parent));
        }

        debug!(%address, roles = %account.roles(), "updating account roles");
        self.accounts
            .get_mut(&address)
            .expect("presence checked above")
            .set_roles(account.roles());
        self.persist()
    }

    /// Remove a leaf account, detaching it from its parent. Deleting an
    /// account that still has children is refused, so the tree never
    /// acquires orphan subtrees.
    pub fn delete_account(&mut self, address: &Address) -> bool {
        let account = match self.accounts.get(address) {
            Some(account) => account,
            None => return false,
        };
        if !account.children().is_empty() {
            warn!(%address, "refusing to delete an account with children");
            return false;
        }

        let parent = account.parent().cloned();
        self.accounts.remove(address);
        if let Some(parent_account) = parent.and_then(|parent| self.accounts.get_mut(&parent)) {
            parent_account.remove_child(address);
        }
        if self.root.as_ref() == Some(address) {
            self.root = None;
        }
        self.persist()
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// The root of the authority tree: the unique account without a
    /// parent.
    pub fn root_address(&self) -> Option<&Address> {
        self.root.as_ref()
    }

    /// Drop every account and persist the empty registry.
    pub fn reset(&mut self) -> bool {
        self.accounts.clear();
        self.root = None;
        self.persist()
    }

    fn persist(&self) -> bool {
        match self.save_to_disk() {
            Ok(()) => true,
            Err(error) => {
                warn!(?error, path = ?self.db_path, "could not persist account registry");
                false
            }
        }
    }

    /// Rewrite the whole backing file. Alternating lines: the base58
    /// address, then the account's `roles|parent|children` record.
    fn save_to_disk(&self) -> io::Result<()> {
        let lock = file_lock(&self.db_path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut file = fs::File::create(&self.db_path)?;
        for (address, account) in self.accounts.iter() {
            writeln!(file, "{}", address)?;
            writeln!(file, "{}", account.encode_line())?;
        }
        file.flush()
    }

    fn load_from_disk(&mut self) -> io::Result<()> {
        let file = BufReader::new(fs::File::open(&self.db_path)?);
        let mut lines = file.lines();

        while let Some(address_line) = lines.next() {
            let address_line = address_line?;
            let address_line = address_line.trim();
            if address_line.is_empty() {
                continue;
            }
            let address: Address = address_line.parse().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, "unparseable address line")
            })?;
            let account_line = lines.next().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "missing account line")
            })??;
            let account = Account::parse_line(&account_line)
                .map_err(|reason| io::Error::new(io::ErrorKind::InvalidData, reason))?;

            if account.parent().is_none() {
                self.root = Some(address);
            }
            self.accounts.insert(address, account);
        }

        info!(count = self.accounts.len(), "account registry loaded");
        Ok(())
    }
}

impl std::fmt::Debug for AccountDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountDb")
            .field("path", &self.db_path)
            .field("accounts", &self.accounts.len())
            .field("root", &self.root)
            .finish()
    }
}
