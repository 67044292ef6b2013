//! Catalog item kinds

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a canonical catalog item.
///
/// The declaration order is the order items are planned within a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Command,
    Skill,
    Subagent,
    Instruction,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [
        ItemType::Command,
        ItemType::Skill,
        ItemType::Subagent,
        ItemType::Instruction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Skill => "skill",
            Self::Subagent => "subagent",
            Self::Instruction => "instruction",
        }
    }

    /// Directory under `agents/` holding items of this kind.
    pub fn catalog_dir(&self) -> &'static str {
        match self {
            Self::Command => "commands",
            Self::Skill => "skills",
            Self::Subagent => "subagents",
            Self::Instruction => "instructions",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
