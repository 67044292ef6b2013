//! The targets command

use std::path::Path;

use agentctl_fs::find_repo_root;
use agentctl_targets::{AgentsConfig, Scope, SubagentSupport, TargetProfile, TargetRegistry};
use colored::Colorize;
use serde_json::{Value, json};

use crate::error::Result;

/// List the targets configured for the repository around `cwd`.
pub fn run_targets(cwd: &Path, json: bool) -> Result<()> {
    let root = find_repo_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
    let registry = TargetRegistry::from_config(&AgentsConfig::load(&root)?)?;
    let profiles = registry.list();

    if json {
        let list: Vec<Value> = profiles.iter().map(|p| describe(p)).collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("{}", "Targets".bold());
    println!();
    for profile in &profiles {
        let scopes = scope_names(&profile.supported_scopes());
        println!(
            "  {:<10} {} ({}) commands: {}, scopes: {}",
            profile.id.green(),
            profile.display_name,
            profile.source.as_str().dimmed(),
            profile.commands.kind(),
            if scopes.is_empty() { "-".to_string() } else { scopes.join(", ") },
        );
    }
    println!();
    println!("{} {} targets.", "Total:".dimmed(), profiles.len());
    Ok(())
}

fn scope_names(scopes: &[Scope]) -> Vec<&'static str> {
    scopes.iter().map(Scope::as_str).collect()
}

/// JSON description of one profile.
pub fn describe(profile: &TargetProfile) -> Value {
    let subagents = match &profile.subagents {
        SubagentSupport::Native { .. } => "native".to_string(),
        SubagentSupport::Fallback(policy) => format!("fallback:{}", policy.as_str()),
    };
    json!({
        "id": profile.id,
        "displayName": profile.display_name,
        "aliases": profile.aliases,
        "source": profile.source.as_str(),
        "commands": profile.commands.kind(),
        "scopes": scope_names(&profile.supported_scopes()),
        "defaultScope": profile.default_scope().as_str(),
        "subagents": subagents,
        "instructions": profile.instructions,
    })
}
