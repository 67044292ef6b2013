//! Target profile registry for agentctl
//!
//! A target is one coding-agent CLI convention (Claude, Gemini, Codex,
//! Copilot, or a custom one declared in `agents/agentctl.toml`). Each
//! [`TargetProfile`] records where synced items land on disk, how the CLI
//! is invoked, and which lifecycle hooks surround a sync.
//!
//! The [`TargetRegistry`] is built once per run from the built-ins plus the
//! repository's configuration and is read-only afterwards.

pub mod builtins;
pub mod config;
pub mod error;
pub mod hooks;
pub mod item;
pub mod profile;
pub mod registry;
pub mod template;

pub use config::{
    AgentsConfig, CONFIG_FILE, CommandSupportKind, CommandsConfig, ConflictStrategy, HooksConfig, InstructionsConfig,
    SubagentsConfig, SyncDefaults, TargetPatch,
};
pub use error::{Error, Result};
pub use hooks::{CommandHook, FnHook, HookItem, HookPayload, TargetHook, TargetHooks};
pub use item::ItemType;
pub use profile::{
    CommandFormat, CommandSupport, FallbackPolicy, ProfileSource, Scope, ScopedTemplates,
    SubagentSupport, TargetProfile,
};
pub use registry::TargetRegistry;
pub use template::TemplateContext;
