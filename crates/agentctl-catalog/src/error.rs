//! Error types for agentctl-catalog
//!
//! Every variant is fatal for a sync run and names the offending file.

use std::path::PathBuf;

use agentctl_targets::ItemType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] agentctl_fs::Error),

    #[error("Agent catalog not found at {path}")]
    CatalogNotFound { path: PathBuf },

    #[error("Unsupported targets ({targets}) in {path}")]
    InvalidTargets { path: PathBuf, targets: String },

    #[error("Empty targets in {path}")]
    EmptyTargets { path: PathBuf },

    #[error("Duplicate {item_type} '{name}': {first} and {second}")]
    DuplicateItem {
        item_type: ItemType,
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid item name '{name}' in {path}")]
    InvalidName { path: PathBuf, name: String },

    #[error("Invalid frontmatter in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },
}
