//! Target profile definitions

use std::fmt;

use agentctl_invoke::CliSchema;
use serde::{Deserialize, Serialize};

use crate::hooks::TargetHooks;
use crate::item::ItemType;

/// Where a synced output is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Inside the repository.
    Project,
    /// Under the user's home directory.
    Global,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a profile definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileSource {
    BuiltIn,
    Override,
    Custom,
}

impl ProfileSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuiltIn => "built-in",
            Self::Override => "override",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandFormat {
    #[default]
    Markdown,
    Toml,
}

/// What to do with an item the target has no convention for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    ConvertToSkills,
    #[default]
    Skip,
}

impl FallbackPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConvertToSkills => "convert_to_skills",
            Self::Skip => "skip",
        }
    }
}

/// Per-scope output path templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedTemplates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,
}

impl ScopedTemplates {
    pub fn new(project: Option<&str>, global: Option<&str>) -> Self {
        Self {
            project: project.map(str::to_string),
            global: global.map(str::to_string),
        }
    }

    pub fn get(&self, scope: Scope) -> Option<&str> {
        match scope {
            Scope::Project => self.project.as_deref(),
            Scope::Global => self.global.as_deref(),
        }
    }

    pub fn scopes(&self) -> Vec<Scope> {
        let mut scopes = Vec::new();
        if self.project.is_some() {
            scopes.push(Scope::Project);
        }
        if self.global.is_some() {
            scopes.push(Scope::Global);
        }
        scopes
    }

    pub fn is_empty(&self) -> bool {
        self.project.is_none() && self.global.is_none()
    }
}

/// How a target handles slash commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSupport {
    /// Commands are written per scope in the given format.
    Native {
        templates: ScopedTemplates,
        format: CommandFormat,
    },
    /// Commands can only be installed as user-level prompts.
    GlobalPromptsOnly {
        template: String,
        format: CommandFormat,
    },
    Unsupported,
}

impl CommandSupport {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Native { .. } => "native",
            Self::GlobalPromptsOnly { .. } => "global-prompts-only",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn scopes(&self) -> Vec<Scope> {
        match self {
            Self::Native { templates, .. } => templates.scopes(),
            Self::GlobalPromptsOnly { .. } => vec![Scope::Global],
            Self::Unsupported => Vec::new(),
        }
    }

    pub fn template(&self, scope: Scope) -> Option<&str> {
        match self {
            Self::Native { templates, .. } => templates.get(scope),
            Self::GlobalPromptsOnly { template, .. } if scope == Scope::Global => Some(template),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<CommandFormat> {
        match self {
            Self::Native { format, .. } | Self::GlobalPromptsOnly { format, .. } => Some(*format),
            Self::Unsupported => None,
        }
    }
}

/// How a target handles subagents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubagentSupport {
    Native { template: String },
    Fallback(FallbackPolicy),
}

/// A fully materialized target definition.
#[derive(Debug, Clone)]
pub struct TargetProfile {
    pub id: String,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub source: ProfileSource,
    pub commands: CommandSupport,
    /// Skill directory templates; each skill is written to `<dir>/SKILL.md`.
    pub skills: ScopedTemplates,
    pub subagents: SubagentSupport,
    /// Instruction file name written into each instruction's output directory.
    pub instructions: Option<String>,
    pub cli: CliSchema,
    /// Arguments `agentctl translate` forwards unless told otherwise.
    pub passthrough_defaults: Vec<String>,
    pub hooks: TargetHooks,
}

impl TargetProfile {
    /// Scopes this target can place commands into.
    ///
    /// Targets without command support still sync project-level items,
    /// so they report `project`.
    pub fn supported_scopes(&self) -> Vec<Scope> {
        let scopes = self.commands.scopes();
        if scopes.is_empty() {
            vec![Scope::Project]
        } else {
            scopes
        }
    }

    pub fn supports_scope(&self, scope: Scope) -> bool {
        self.supported_scopes().contains(&scope)
    }

    /// `project` when supported, otherwise `global`.
    pub fn default_scope(&self) -> Scope {
        if self.supports_scope(Scope::Project) {
            Scope::Project
        } else {
            Scope::Global
        }
    }

    pub fn supports_slash_commands(&self) -> bool {
        !matches!(self.commands, CommandSupport::Unsupported)
    }

    /// Whether items of `item_type` have a native output convention.
    pub fn supports(&self, item_type: ItemType) -> bool {
        match item_type {
            ItemType::Command => self.supports_slash_commands(),
            ItemType::Skill => !self.skills.is_empty(),
            ItemType::Subagent => matches!(self.subagents, SubagentSupport::Native { .. }),
            ItemType::Instruction => self.instructions.is_some(),
        }
    }

    /// True when `name` is this target's id or one of its aliases.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.id.eq_ignore_ascii_case(name) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;

    #[test]
    fn default_scope_prefers_project() {
        let claude = builtins::claude();
        assert_eq!(claude.supported_scopes(), vec![Scope::Project, Scope::Global]);
        assert_eq!(claude.default_scope(), Scope::Project);
    }

    #[test]
    fn global_only_target_defaults_to_global() {
        let codex = builtins::codex();
        assert_eq!(codex.supported_scopes(), vec![Scope::Global]);
        assert_eq!(codex.default_scope(), Scope::Global);
        assert_eq!(codex.commands.template(Scope::Project), None);
        assert!(codex.commands.template(Scope::Global).is_some());
    }

    #[test]
    fn unsupported_commands_report_project_scope() {
        let copilot = builtins::copilot();
        assert!(!copilot.supports_slash_commands());
        assert_eq!(copilot.default_scope(), Scope::Project);
    }

    #[test]
    fn matches_id_and_aliases_case_insensitively() {
        let claude = builtins::claude();
        assert!(claude.matches("Claude"));
        assert!(claude.matches(" claude-code "));
        assert!(!claude.matches("gemini"));
    }

    #[test]
    fn supports_by_item_type() {
        let gemini = builtins::gemini();
        assert!(gemini.supports(ItemType::Command));
        assert!(gemini.supports(ItemType::Skill));
        assert!(!gemini.supports(ItemType::Subagent));
        assert!(gemini.supports(ItemType::Instruction));
    }
}
