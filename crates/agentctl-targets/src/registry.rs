//! Target registry
//!
//! Built-ins are registered first, then each `[[targets]]` patch from the
//! repository config is applied in file order. The result is a set of fully
//! materialized profiles; nothing is resolved lazily afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use agentctl_invoke::CliSchema;

use crate::builtins;
use crate::config::{AgentsConfig, InstructionsConfig, TargetPatch, invalid};
use crate::error::{Error, Result};
use crate::hooks::TargetHooks;
use crate::profile::{
    CommandSupport, FallbackPolicy, ProfileSource, ScopedTemplates, SubagentSupport,
    TargetProfile,
};

/// Central registry of target profiles, keyed by lowercase id.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: BTreeMap<String, TargetProfile>,
}

impl TargetRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with all built-in targets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for profile in builtins::builtin_profiles() {
            registry.register(profile);
        }
        registry
    }

    /// Built-ins with the repository configuration applied.
    pub fn from_config(config: &AgentsConfig) -> Result<Self> {
        let mut registry = Self::with_builtins();
        let path = config.display_path();
        for patch in &config.targets {
            registry.apply_patch(patch, path)?;
        }
        for name in &config.disabled_targets {
            match registry.canonical_id(name).map(str::to_string) {
                Some(id) => {
                    tracing::debug!(target_id = %id, "Target disabled by config");
                    registry.targets.remove(&id);
                }
                None => tracing::warn!(name = %name, "Ignoring unknown disabled target"),
            }
        }
        Ok(registry)
    }

    /// Register a profile, replacing any profile with the same id.
    pub fn register(&mut self, profile: TargetProfile) {
        self.targets.insert(profile.id.to_ascii_lowercase(), profile);
    }

    /// Apply one config patch: override, extend or add a target.
    pub fn apply_patch(&mut self, patch: &TargetPatch, config_path: &Path) -> Result<()> {
        let id = patch.id.trim().to_ascii_lowercase();

        if patch.disabled {
            self.targets.remove(&id);
            return Ok(());
        }

        let existing = self.targets.get(&id).cloned();
        let (mut profile, source) = match (&patch.extends, existing) {
            (Some(base), existing) => {
                let base_profile = self.get(base).cloned().ok_or_else(|| Error::UnknownBase {
                    id: id.clone(),
                    base: base.clone(),
                })?;
                let source = if existing.is_some() {
                    ProfileSource::Override
                } else {
                    ProfileSource::Custom
                };
                let mut profile = base_profile;
                profile.aliases = Vec::new();
                (profile, source)
            }
            (None, Some(existing)) => (existing, ProfileSource::Override),
            (None, None) => (blank_profile(&id), ProfileSource::Custom),
        };

        profile.id = id.clone();
        profile.source = source;
        if let Some(display_name) = &patch.display_name {
            profile.display_name = display_name.clone();
        } else if source == ProfileSource::Custom {
            profile.display_name = id.clone();
        }
        if let Some(aliases) = &patch.aliases {
            profile.aliases = aliases.iter().map(|a| a.trim().to_ascii_lowercase()).collect();
        }
        if let Some(commands) = &patch.commands {
            profile.commands = commands.materialize(&id, config_path)?;
        }
        if let Some(skills) = &patch.skills {
            profile.skills = skills.clone();
        }
        if let Some(subagents) = &patch.subagents {
            profile.subagents = subagents.materialize();
        }
        match &patch.instructions {
            Some(InstructionsConfig::FileName(name)) => profile.instructions = Some(name.clone()),
            Some(InstructionsConfig::Enabled(false)) => profile.instructions = None,
            Some(InstructionsConfig::Enabled(true)) if profile.instructions.is_none() => {
                return Err(invalid(
                    config_path,
                    format!("target '{id}' enables instructions without a file name"),
                ));
            }
            Some(InstructionsConfig::Enabled(true)) | None => {}
        }
        if let Some(cli) = &patch.cli {
            profile.cli = cli.clone();
        }
        profile.cli.agent = id.clone();
        if let Some(defaults) = &patch.passthrough_defaults {
            profile.passthrough_defaults = defaults.clone();
        }
        profile.hooks.merge(patch.hooks.clone().into_hooks());

        for alias in &profile.aliases {
            if let Some(owner) = self.canonical_id(alias)
                && owner != id
            {
                return Err(invalid(
                    config_path,
                    format!("alias '{alias}' of target '{id}' is already used by '{owner}'"),
                ));
            }
        }

        tracing::debug!(target_id = %id, source = source.as_str(), "Materialized target profile");
        self.targets.insert(id, profile);
        Ok(())
    }

    /// Attach code-defined hooks to a registered target.
    pub fn set_hooks(&mut self, name: &str, hooks: TargetHooks) -> Result<()> {
        let id = self.resolve(name)?.id.clone();
        if let Some(profile) = self.targets.get_mut(&id) {
            profile.hooks.merge(hooks);
        }
        Ok(())
    }

    /// Canonical id for a target name or alias, case-insensitively.
    pub fn canonical_id(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.id.as_str())
    }

    /// Get a profile by id or alias.
    pub fn get(&self, name: &str) -> Option<&TargetProfile> {
        let key = name.trim().to_ascii_lowercase();
        self.targets
            .get(&key)
            .or_else(|| self.targets.values().find(|p| p.matches(&key)))
    }

    /// Get a profile by id or alias, failing for unknown names.
    pub fn resolve(&self, name: &str) -> Result<&TargetProfile> {
        self.get(name).ok_or_else(|| Error::UnknownTarget {
            name: name.trim().to_string(),
            known: self.ids().join(", "),
        })
    }

    /// Check if a target name or alias is registered.
    pub fn is_known(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All profiles, sorted by id.
    pub fn list(&self) -> Vec<&TargetProfile> {
        self.targets.values().collect()
    }

    /// All target ids (sorted).
    pub fn ids(&self) -> Vec<&str> {
        self.targets.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

fn blank_profile(id: &str) -> TargetProfile {
    TargetProfile {
        id: id.to_string(),
        display_name: id.to_string(),
        aliases: Vec::new(),
        source: ProfileSource::Custom,
        commands: CommandSupport::Unsupported,
        skills: ScopedTemplates::default(),
        subagents: SubagentSupport::Fallback(FallbackPolicy::Skip),
        instructions: None,
        cli: CliSchema::new(id, id),
        passthrough_defaults: Vec::new(),
        hooks: TargetHooks::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandsConfig, HooksConfig};
    use crate::hooks::{CommandHook, FnHook};
    use crate::profile::Scope;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn path() -> &'static Path {
        Path::new("agents/agentctl.toml")
    }

    #[test]
    fn test_empty_registry() {
        let registry = TargetRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_with_builtins_sorted() {
        let registry = TargetRegistry::with_builtins();
        assert_eq!(registry.ids(), vec!["claude", "codex", "copilot", "gemini"]);
        let listed: Vec<_> = registry.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(listed, registry.ids());
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_alias_aware() {
        let registry = TargetRegistry::with_builtins();
        assert_eq!(registry.resolve("CLAUDE").unwrap().id, "claude");
        assert_eq!(registry.resolve("Gemini-CLI").unwrap().id, "gemini");
        assert!(registry.is_known("copilot-cli"));
        assert!(!registry.is_known("cursor"));
    }

    #[test]
    fn test_resolve_unknown_lists_known() {
        let registry = TargetRegistry::with_builtins();
        let err = registry.resolve("cursor").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'cursor'"));
        assert!(msg.contains("claude, codex, copilot, gemini"));
    }

    #[test]
    fn test_override_is_shallow() {
        let mut registry = TargetRegistry::with_builtins();
        let patch = TargetPatch {
            display_name: Some("Claude (team)".into()),
            ..TargetPatch::new("claude")
        };
        registry.apply_patch(&patch, path()).unwrap();

        let claude = registry.resolve("claude").unwrap();
        assert_eq!(claude.display_name, "Claude (team)");
        assert_eq!(claude.source, ProfileSource::Override);
        // Untouched fields keep the built-in values.
        assert_eq!(claude.instructions.as_deref(), Some("CLAUDE.md"));
        assert_eq!(claude.aliases, vec!["claude-code"]);
        assert!(claude.supports_scope(Scope::Global));
    }

    #[test]
    fn test_custom_target_extends_builtin() {
        let mut registry = TargetRegistry::with_builtins();
        let patch = TargetPatch {
            extends: Some("claude".into()),
            display_name: Some("Acme Agent".into()),
            commands: Some(CommandsConfig {
                project: Some("{repoRoot}/.acme/commands/{itemName}.md".into()),
                ..CommandsConfig::default()
            }),
            ..TargetPatch::new("Acme")
        };
        registry.apply_patch(&patch, path()).unwrap();

        let acme = registry.resolve("acme").unwrap();
        assert_eq!(acme.source, ProfileSource::Custom);
        assert_eq!(acme.display_name, "Acme Agent");
        assert!(acme.aliases.is_empty());
        assert_eq!(acme.cli.agent, "acme");
        assert_eq!(acme.supported_scopes(), vec![Scope::Project]);
        assert_eq!(acme.instructions.as_deref(), Some("CLAUDE.md"));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_custom_target_without_base() {
        let mut registry = TargetRegistry::with_builtins();
        let patch = TargetPatch {
            skills: Some(ScopedTemplates::new(Some(".tool/skills/{itemName}"), None)),
            ..TargetPatch::new("tool")
        };
        registry.apply_patch(&patch, path()).unwrap();

        let tool = registry.resolve("tool").unwrap();
        assert_eq!(tool.display_name, "tool");
        assert!(!tool.supports_slash_commands());
        assert_eq!(tool.cli.modes.interactive.command, "tool");
    }

    #[test]
    fn test_unknown_base_fails() {
        let mut registry = TargetRegistry::with_builtins();
        let patch = TargetPatch {
            extends: Some("nope".into()),
            ..TargetPatch::new("acme")
        };
        let err = registry.apply_patch(&patch, path()).unwrap_err();
        assert!(matches!(err, Error::UnknownBase { .. }));
    }

    #[test]
    fn test_alias_collision_fails() {
        let mut registry = TargetRegistry::with_builtins();
        let patch = TargetPatch {
            aliases: Some(vec!["claude-code".into()]),
            ..TargetPatch::new("acme")
        };
        let err = registry.apply_patch(&patch, path()).unwrap_err();
        assert!(err.to_string().contains("already used by 'claude'"));
    }

    #[test]
    fn test_disabled_targets_removed() {
        let config = AgentsConfig {
            disabled_targets: vec!["Copilot-CLI".into(), "unknown".into()],
            targets: vec![TargetPatch {
                disabled: true,
                ..TargetPatch::new("codex")
            }],
            ..AgentsConfig::default()
        };
        let registry = TargetRegistry::from_config(&config).unwrap();
        assert_eq!(registry.ids(), vec!["claude", "gemini"]);
    }

    #[test]
    fn test_config_hooks_merge_into_profile() {
        let config = AgentsConfig {
            targets: vec![TargetPatch {
                hooks: HooksConfig {
                    before_sync: Some(CommandHook::new("true", Vec::<String>::new())),
                    ..HooksConfig::default()
                },
                ..TargetPatch::new("gemini")
            }],
            ..AgentsConfig::default()
        };
        let mut registry = TargetRegistry::from_config(&config).unwrap();
        registry
            .set_hooks(
                "gemini-cli",
                TargetHooks {
                    after_convert: Some(Arc::new(FnHook::new("noop", |_| Ok(())))),
                    ..TargetHooks::default()
                },
            )
            .unwrap();

        let gemini = registry.resolve("gemini").unwrap();
        assert!(gemini.hooks.before_sync.is_some());
        assert!(gemini.hooks.after_convert.is_some());
        assert!(gemini.hooks.before_convert.is_none());
    }
}
