//! The translate command

use std::path::Path;

use agentctl_fs::find_repo_root;
use agentctl_invoke::{InvocationRequest, TranslationResult, translate};
use agentctl_targets::{AgentsConfig, TargetRegistry};
use colored::Colorize;

use crate::cli::TranslateArgs;
use crate::error::Result;

/// Translate the request in `args` for its target and print the result.
pub fn run_translate(cwd: &Path, args: &TranslateArgs) -> Result<()> {
    let root = find_repo_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
    let registry = TargetRegistry::from_config(&AgentsConfig::load(&root)?)?;
    let result = translate_for(&registry, args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    for warning in &result.warnings {
        eprintln!("{}", warning.yellow());
    }
    println!("{}", command_line(&result));
    Ok(())
}

/// Build the request from `args` and translate it against the target's schema.
///
/// The target's default passthrough arguments come before the caller's.
pub fn translate_for(registry: &TargetRegistry, args: &TranslateArgs) -> Result<TranslationResult> {
    let profile = registry.resolve(&args.target)?;

    let mut request = InvocationRequest::new(args.mode);
    request.prompt = args.prompt.clone();
    request.approval = args.approval;
    request.sandbox = args.sandbox;
    request.output = args.output;
    request.model = args.model.clone();
    request.web = args.web;
    request.passthrough.args = profile
        .passthrough_defaults
        .iter()
        .chain(args.passthrough.iter())
        .cloned()
        .collect();

    tracing::debug!(target_id = %profile.id, mode = %args.mode, "Translating invocation");
    Ok(translate(&request, &profile.cli))
}

/// Shell-quoted command line for display.
pub fn command_line(result: &TranslationResult) -> String {
    std::iter::once(&result.command)
        .chain(result.args.iter())
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
