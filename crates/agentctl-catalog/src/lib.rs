//! Canonical catalog loader for agentctl
//!
//! Items live under `<repo>/agents/`:
//!
//! ```text
//! agents/
//!   commands/<name>.md
//!   skills/<name>/SKILL.md   (+ support files)
//!   subagents/<name>.md
//!   instructions/<name>.md
//! ```
//!
//! A leading `---` YAML block is parsed as frontmatter. `targets` or
//! `targetAgents` restrict an item to specific targets and are validated
//! against the [`TargetRegistry`](agentctl_targets::TargetRegistry).

pub mod error;
pub mod frontmatter;
pub mod item;
pub mod loader;
pub mod targets;

pub use error::{Error, Result};
pub use frontmatter::{Frontmatter, FrontmatterValue, parse_frontmatter, split_frontmatter};
pub use item::{ItemDetails, SkillFile, SourceItem, SourceType};
pub use loader::{Catalog, SKILL_FILE, load};
pub use targets::{TargetResolution, resolve_targets};
