//! Interactive prompts for sync-commands
//!
//! Uses dialoguer for terminal-based selection. Only called when stdin is a
//! terminal and `--yes` was not given.

use agentctl_sync::{CodexConversionScope, CodexOption};
use agentctl_targets::{ConflictStrategy, FallbackPolicy, Scope, TargetProfile};
use dialoguer::{Confirm, MultiSelect, Select};

use crate::error::{CliError, Result};

const FALLBACKS: &[(&str, FallbackPolicy)] = &[
    ("Skip commands for these targets", FallbackPolicy::Skip),
    ("Convert commands to skills", FallbackPolicy::ConvertToSkills),
];

const CODEX_OPTIONS: &[(&str, CodexOption)] = &[
    ("Install as user prompts", CodexOption::Prompts),
    ("Convert to skills", CodexOption::ConvertToSkills),
    ("Skip commands", CodexOption::Skip),
];

const CODEX_SCOPES: &[(&str, CodexConversionScope)] = &[
    ("Global (home directory)", CodexConversionScope::Global),
    ("Project (repository)", CodexConversionScope::Project),
    ("Skip", CodexConversionScope::Skip),
];

const STRATEGIES: &[(&str, ConflictStrategy)] = &[
    ("Skip: leave existing files alone", ConflictStrategy::Skip),
    ("Rename: write next to them with a numeric suffix", ConflictStrategy::Rename),
    ("Overwrite: replace them", ConflictStrategy::Overwrite),
];

fn choose<T: Copy>(prompt: &str, options: &[(&str, T)]) -> Result<T> {
    let labels: Vec<&str> = options.iter().map(|(label, _)| *label).collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(options[idx].1)
}

/// Pick targets; all are preselected.
pub fn select_targets(profiles: &[&TargetProfile]) -> Result<Vec<String>> {
    let labels: Vec<String> = profiles
        .iter()
        .map(|p| format!("{} ({})", p.display_name, p.id))
        .collect();
    let defaults = vec![true; labels.len()];
    let picked = MultiSelect::new()
        .with_prompt("Targets to sync (space to toggle, enter to confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    if picked.is_empty() {
        return Err(CliError::user("No targets selected."));
    }
    Ok(picked.into_iter().map(|i| profiles[i].id.clone()).collect())
}

pub fn unsupported_fallback(targets: &[&str]) -> Result<FallbackPolicy> {
    choose(
        &format!("{} cannot take slash commands", targets.join(", ")),
        FALLBACKS,
    )
}

pub fn codex_option(target: &str) -> Result<CodexOption> {
    choose(&format!("{target} only supports global prompts"), CODEX_OPTIONS)
}

pub fn codex_conversion_scope() -> Result<CodexConversionScope> {
    choose("Where should converted skills go?", CODEX_SCOPES)
}

pub fn scope(profile: &TargetProfile) -> Result<Scope> {
    let scopes = profile.supported_scopes();
    let default = profile.default_scope();
    let labels: Vec<&str> = scopes.iter().map(Scope::as_str).collect();
    let idx = Select::new()
        .with_prompt(format!("Command scope for {}", profile.display_name))
        .items(&labels)
        .default(scopes.iter().position(|s| *s == default).unwrap_or(0))
        .interact()?;
    Ok(scopes[idx])
}

pub fn conflict_strategy(count: usize) -> Result<ConflictStrategy> {
    choose(
        &format!("{count} file(s) hold content agentctl did not write"),
        STRATEGIES,
    )
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(true).interact()?)
}
