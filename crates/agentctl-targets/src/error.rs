//! Error types for agentctl-targets

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] agentctl_fs::Error),

    #[error("Unknown target '{name}' (known targets: {known})")]
    UnknownTarget { name: String, known: String },

    #[error("Target '{id}' extends unknown target '{base}'")]
    UnknownBase { id: String, base: String },

    #[error("Invalid configuration in {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Hook command `{command}` failed: {message}")]
    HookCommand { command: String, message: String },

    #[error("{message}")]
    Hook { message: String },
}
