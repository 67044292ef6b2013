//! Error types for agentctl-sync

use std::path::PathBuf;

/// Result type for agentctl-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a sync run before anything is written.
///
/// Hook and write failures during apply are not errors of this type; they
/// are recorded in the [`SyncSummary`](crate::SyncSummary).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad selectors or options supplied by the caller
    #[error("{message}")]
    Configuration { message: String },

    /// Ledger file exists but cannot be parsed
    #[error("Failed to parse ledger {path}: {source}")]
    LedgerParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Ledger could not be serialized
    #[error(transparent)]
    LedgerSerialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Catalog(#[from] agentctl_catalog::Error),

    #[error(transparent)]
    Targets(#[from] agentctl_targets::Error),

    #[error(transparent)]
    Fs(#[from] agentctl_fs::Error),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
