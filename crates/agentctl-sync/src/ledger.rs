//! Provenance ledger
//!
//! Records every output a sync run wrote, keyed by target and path, with the
//! checksum of the bytes written. An existing file belongs to a previous sync
//! of an item only when the ledger says so and the file still has the
//! recorded checksum.

use std::fs::File;
use std::io::Read;

use agentctl_fs::{NormalizedPath, io};
use agentctl_targets::ItemType;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Directory under the repository root holding agentctl state.
pub const STATE_DIR: &str = ".agentctl";
/// Ledger file name inside [`STATE_DIR`].
pub const LEDGER_FILE: &str = "ledger.toml";

const LEDGER_VERSION: &str = "1";

/// One synced output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub target: String,
    pub item_type: ItemType,
    pub item_name: String,
    /// Repository-relative when the output lives inside the repository,
    /// absolute otherwise.
    pub path: String,
    pub checksum: String,
}

impl LedgerEntry {
    /// Absolute path of the output.
    pub fn resolve(&self, repo_root: &NormalizedPath) -> NormalizedPath {
        let path = NormalizedPath::new(&self.path);
        if path.is_absolute() {
            path
        } else {
            repo_root.join(path.as_str())
        }
    }
}

/// The set of outputs written by previous syncs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    version: String,
    #[serde(default, rename = "entry")]
    entries: Vec<LedgerEntry>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION.to_string(),
            entries: Vec::new(),
        }
    }

    /// Location of the ledger for `repo_root`.
    pub fn path(repo_root: &NormalizedPath) -> NormalizedPath {
        repo_root.join(STATE_DIR).join(LEDGER_FILE)
    }

    /// Load the ledger with a shared lock, or an empty ledger when none exists.
    pub fn load(repo_root: &NormalizedPath) -> Result<Self> {
        let path = Self::path(repo_root);
        let native = path.to_native();
        if !native.is_file() {
            tracing::debug!(path = %path, "No ledger, starting empty");
            return Ok(Self::new());
        }

        let file = File::open(&native).map_err(|e| agentctl_fs::Error::io(&native, e))?;
        FileExt::lock_shared(&file).map_err(|_| agentctl_fs::Error::LockFailed {
            path: native.clone(),
        })?;
        let mut content = String::new();
        (&file)
            .read_to_string(&mut content)
            .map_err(|e| agentctl_fs::Error::io(&native, e))?;

        let mut ledger: Ledger = toml::from_str(&content).map_err(|source| Error::LedgerParse {
            path: native.clone(),
            source,
        })?;
        ledger.entries.sort();
        tracing::debug!(path = %path, entries = ledger.entries.len(), "Loaded ledger");
        Ok(ledger)
    }

    /// Persist the ledger atomically.
    pub fn save(&self, repo_root: &NormalizedPath) -> Result<()> {
        let path = Self::path(repo_root);
        let content = toml::to_string_pretty(self)?;
        io::write_text(&path, &content)?;
        tracing::debug!(path = %path, entries = self.entries.len(), "Saved ledger");
        Ok(())
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries recorded for one target.
    pub fn entries_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a LedgerEntry> {
        self.entries.iter().filter(move |e| e.target == target)
    }

    /// The entry owning `path` for `target`, if any.
    pub fn find(
        &self,
        repo_root: &NormalizedPath,
        target: &str,
        path: &NormalizedPath,
    ) -> Option<&LedgerEntry> {
        let key = ledger_key(repo_root, path);
        self.entries
            .iter()
            .find(|e| e.target == target && e.path == key)
    }

    /// Whether the file at `path` with `checksum` was written by a previous
    /// sync of exactly this item.
    pub fn attributes(
        &self,
        repo_root: &NormalizedPath,
        target: &str,
        item_type: ItemType,
        item_name: &str,
        path: &NormalizedPath,
        checksum: &str,
    ) -> bool {
        self.find(repo_root, target, path).is_some_and(|entry| {
            entry.item_type == item_type && entry.item_name == item_name && entry.checksum == checksum
        })
    }

    /// Record an output, replacing whatever owned the path before.
    pub fn record(
        &mut self,
        repo_root: &NormalizedPath,
        target: &str,
        item_type: ItemType,
        item_name: &str,
        path: &NormalizedPath,
        checksum: String,
    ) {
        let key = ledger_key(repo_root, path);
        self.entries.retain(|e| !(e.target == target && e.path == key));
        self.entries.push(LedgerEntry {
            target: target.to_string(),
            item_type,
            item_name: item_name.to_string(),
            path: key,
            checksum,
        });
        self.entries.sort();
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn forget(&mut self, repo_root: &NormalizedPath, target: &str, path: &NormalizedPath) -> bool {
        let key = ledger_key(repo_root, path);
        let before = self.entries.len();
        self.entries.retain(|e| !(e.target == target && e.path == key));
        before != self.entries.len()
    }
}

fn ledger_key(repo_root: &NormalizedPath, path: &NormalizedPath) -> String {
    path.display_relative_to(repo_root)
}
