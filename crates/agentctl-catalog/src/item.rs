//! Catalog items

use std::collections::BTreeSet;

use agentctl_fs::NormalizedPath;
use agentctl_targets::ItemType;
use serde::Serialize;

use crate::frontmatter::Frontmatter;

/// Whether an item is shared with the team or local to one checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Shared,
    /// `*.local.md` files and `*.local` skill directories.
    Local,
}

/// A support file shipped alongside a skill's `SKILL.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillFile {
    /// Path relative to the skill directory, `/`-separated.
    pub relative_path: String,
    pub content: String,
}

/// Kind-specific item data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemDetails {
    Command {
        /// Frontmatter `prompt` when present, else the body.
        prompt: String,
    },
    Skill {
        directory: NormalizedPath,
        files: Vec<SkillFile>,
    },
    Subagent {
        file_name: String,
    },
    Instruction {
        /// Directory the instruction file is written into; `None` means the repository root.
        output_dir: Option<NormalizedPath>,
        group: Option<String>,
    },
}

/// One canonical catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceItem {
    pub item_type: ItemType,
    pub source_path: NormalizedPath,
    pub source_type: SourceType,
    pub name: String,
    pub raw: String,
    pub frontmatter: Frontmatter,
    pub body: String,
    /// Canonical target ids; `None` means every target.
    pub target_restriction: Option<BTreeSet<String>>,
    pub details: ItemDetails,
}

impl SourceItem {
    /// Whether this item should be synced to `target_id`.
    pub fn applies_to(&self, target_id: &str) -> bool {
        match &self.target_restriction {
            None => true,
            Some(targets) => targets.contains(target_id),
        }
    }

    /// The command prompt; the body for other kinds.
    pub fn prompt(&self) -> &str {
        match &self.details {
            ItemDetails::Command { prompt } => prompt,
            _ => &self.body,
        }
    }
}
