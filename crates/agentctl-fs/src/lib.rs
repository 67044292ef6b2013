//! Filesystem primitives for agentctl
//!
//! Provides normalized path handling, atomic locked writes, content
//! checksums and the repository-root discovery used by the sync engine.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;
pub mod root;

pub use checksum::{compute_bytes_checksum, compute_content_checksum};
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use root::{CATALOG_DIR, find_repo_root};
