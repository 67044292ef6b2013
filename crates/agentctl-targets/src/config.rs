//! Repository configuration: `agents/agentctl.toml`

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use agentctl_fs::{CATALOG_DIR, NormalizedPath, io};
use agentctl_invoke::CliSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hooks::{CommandHook, TargetHooks};
use crate::profile::{CommandFormat, CommandSupport, FallbackPolicy, ScopedTemplates, SubagentSupport};

/// Config file name inside the catalog directory.
pub const CONFIG_FILE: &str = "agentctl.toml";

/// How to settle a planned output that collides with a foreign file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    Overwrite,
    Rename,
    #[default]
    Skip,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Rename => "rename",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "rename" => Ok(Self::Rename),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unknown conflict strategy '{other}' (expected overwrite, rename or skip)"
            )),
        }
    }
}

/// `[sync]` defaults; CLI flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<ConflictStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_missing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsupported_fallback: Option<FallbackPolicy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandSupportKind {
    Native,
    GlobalPromptsOnly,
    Unsupported,
}

/// `[targets.commands]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<CommandSupportKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<CommandFormat>,
}

impl CommandsConfig {
    pub(crate) fn materialize(&self, id: &str, path: &Path) -> Result<CommandSupport> {
        let format = self.format.unwrap_or_default();
        let kind = self.support.unwrap_or(if self.project.is_none() && self.global.is_none() {
            CommandSupportKind::Unsupported
        } else {
            CommandSupportKind::Native
        });
        match kind {
            CommandSupportKind::Unsupported => Ok(CommandSupport::Unsupported),
            CommandSupportKind::Native => {
                if self.project.is_none() && self.global.is_none() {
                    return Err(invalid(
                        path,
                        format!("target '{id}' declares native commands without a path"),
                    ));
                }
                Ok(CommandSupport::Native {
                    templates: ScopedTemplates {
                        project: self.project.clone(),
                        global: self.global.clone(),
                    },
                    format,
                })
            }
            CommandSupportKind::GlobalPromptsOnly => match &self.global {
                Some(template) => Ok(CommandSupport::GlobalPromptsOnly {
                    template: template.clone(),
                    format,
                }),
                None => Err(invalid(
                    path,
                    format!("target '{id}' declares global-prompts-only commands without `global`"),
                )),
            },
        }
    }
}

/// `[targets.subagents]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubagentsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackPolicy>,
}

impl SubagentsConfig {
    pub(crate) fn materialize(&self) -> SubagentSupport {
        match &self.path {
            Some(template) => SubagentSupport::Native {
                template: template.clone(),
            },
            None => SubagentSupport::Fallback(self.fallback.unwrap_or_default()),
        }
    }
}

/// `instructions = "FILE.md"` or `instructions = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstructionsConfig {
    FileName(String),
    Enabled(bool),
}

/// `[targets.hooks]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HooksConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_sync: Option<CommandHook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_sync: Option<CommandHook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_convert: Option<CommandHook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_convert: Option<CommandHook>,
}

impl HooksConfig {
    pub fn into_hooks(self) -> TargetHooks {
        fn wrap(hook: Option<CommandHook>) -> Option<Arc<dyn crate::hooks::TargetHook>> {
            hook.map(|h| Arc::new(h) as Arc<dyn crate::hooks::TargetHook>)
        }
        TargetHooks {
            before_sync: wrap(self.before_sync),
            after_sync: wrap(self.after_sync),
            before_convert: wrap(self.before_convert),
            after_convert: wrap(self.after_convert),
        }
    }
}

/// One `[[targets]]` entry.
///
/// With an `id` matching a built-in it patches that target field by field.
/// With a new `id` it declares a custom target, optionally `extends` another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<ScopedTemplates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subagents: Option<SubagentsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<InstructionsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli: Option<CliSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passthrough_defaults: Option<Vec<String>>,
    #[serde(default)]
    pub hooks: HooksConfig,
}

impl TargetPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Parsed `agents/agentctl.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_targets: Vec<String>,
    #[serde(default)]
    pub sync: SyncDefaults,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<TargetPatch>,
    /// File the config was read from; used in error messages.
    #[serde(skip)]
    pub source_path: Option<NormalizedPath>,
}

impl AgentsConfig {
    pub fn config_path(repo_root: &Path) -> NormalizedPath {
        NormalizedPath::new(repo_root)
            .join(CATALOG_DIR)
            .join(CONFIG_FILE)
    }

    /// Load the repository config, or defaults when the file is absent.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = Self::config_path(repo_root);
        let Some(content) = io::read_text_if_exists(&path)? else {
            tracing::debug!(path = %path, "No agentctl config, using defaults");
            return Ok(Self::default());
        };
        let mut config = Self::parse(&content, path.as_ref())?;
        config.source_path = Some(path);
        Ok(config)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for patch in &config.targets {
            if patch.id.trim().is_empty() {
                return Err(invalid(path, "target entry with an empty id".to_string()));
            }
        }
        Ok(config)
    }

    pub(crate) fn display_path(&self) -> &Path {
        self.source_path
            .as_ref()
            .map(AsRef::<Path>::as_ref)
            .unwrap_or_else(|| Path::new(CONFIG_FILE))
    }
}

pub(crate) fn invalid(path: &Path, message: String) -> Error {
    Error::InvalidConfig {
        path: path.to_path_buf(),
        message,
    }
}
