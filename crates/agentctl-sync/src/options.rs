//! Run-wide sync options

use std::collections::BTreeMap;
use std::fmt;

use agentctl_targets::{ConflictStrategy, FallbackPolicy, Scope};
use serde::{Deserialize, Serialize};

/// What to do with commands for a target that only takes global prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodexOption {
    /// Install commands as user-level prompts.
    #[default]
    Prompts,
    ConvertToSkills,
    Skip,
}

impl CodexOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prompts => "prompts",
            Self::ConvertToSkills => "convert_to_skills",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for CodexOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where converted skills go for a global-prompts-only target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodexConversionScope {
    #[default]
    Global,
    Project,
    Skip,
}

impl CodexConversionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
            Self::Skip => "skip",
        }
    }

    pub fn scope(&self) -> Option<Scope> {
        match self {
            Self::Global => Some(Scope::Global),
            Self::Project => Some(Scope::Project),
            Self::Skip => None,
        }
    }
}

/// Fully resolved options consumed by the plan builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanOptions {
    /// Command scope per target id; missing entries use the profile default.
    pub scope_by_target: BTreeMap<String, Scope>,
    pub remove_missing: bool,
    pub unsupported_fallback: FallbackPolicy,
    pub codex_option: CodexOption,
    pub codex_conversion_scope: CodexConversionScope,
    pub conflict_strategy: ConflictStrategy,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            scope_by_target: BTreeMap::new(),
            remove_missing: true,
            unsupported_fallback: FallbackPolicy::Skip,
            codex_option: CodexOption::Prompts,
            codex_conversion_scope: CodexConversionScope::Global,
            conflict_strategy: ConflictStrategy::Skip,
        }
    }
}
