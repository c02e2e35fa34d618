//! Configuration for the account registry's on-disk state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the account registry.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The directory the registry file lives in.
    ///
    /// Defaults to the platform data directory: `$XDG_DATA_HOME/kestrel`
    /// or `~/.local/share/kestrel` on Linux, the equivalents elsewhere.
    pub data_dir: PathBuf,
}

impl Config {
    /// The path of the registry's backing file.
    pub fn account_db_path(&self) -> PathBuf {
        self.data_dir.join("accounts.dat")
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("kestrel"))
            .unwrap_or_else(|| PathBuf::from("kestrel-data"));
        Config { data_dir }
    }
}
