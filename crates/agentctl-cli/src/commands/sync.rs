//! The sync-commands command

use std::io::IsTerminal;
use std::path::Path;

use agentctl_fs::find_repo_root;
use agentctl_sync::{
    CodexOption, SyncRequest, SyncSummary, apply_slash_command_sync, format_plan_summary,
    format_sync_summary, plan_slash_command_sync_with_registry, select_targets,
};
use agentctl_targets::{AgentsConfig, CommandSupport, TargetProfile, TargetRegistry};
use colored::Colorize;

use crate::cli::SyncArgs;
use crate::error::{CliError, Result};
use crate::interactive;

/// Run sync-commands from `cwd`.
///
/// Prompts only when `interactive` is set; otherwise every unset option
/// takes its configured or built-in default.
pub fn run_sync_commands(cwd: &Path, args: &SyncArgs, interactive: bool) -> Result<()> {
    let root = find_repo_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
    let config = AgentsConfig::load(&root)?;
    let registry = TargetRegistry::from_config(&config)?;

    let mut targets = select_targets(&registry, &args.only, &args.skip)?;
    if interactive && args.only.is_empty() && args.skip.is_empty() {
        targets = interactive::select_targets(&registry.list())?;
    }

    let mut request = SyncRequest {
        repo_root: root.clone(),
        home_dir: args.home.clone(),
        targets,
        scope_by_target: args.scopes.iter().cloned().collect(),
        remove_missing: args.remove_missing,
        unsupported_fallback: args.unsupported_fallback,
        codex_option: args.codex_option,
        codex_conversion_scope: args.codex_conversion_scope,
        conflict_resolution: args.conflicts,
        use_defaults: args.yes,
        non_interactive: !interactive,
    };
    if interactive {
        prompt_options(&registry, &mut request)?;
    }

    let mut details = plan_slash_command_sync_with_registry(&request, &registry)?;
    if !args.json {
        println!("{}", format_plan_summary(&details.plan, &details.target_summaries));
    }

    if interactive && details.conflict_count > 0 && args.conflicts.is_none() {
        let strategy = interactive::conflict_strategy(details.conflict_count)?;
        if strategy != details.options.conflict_strategy {
            details = details.replan(strategy);
            println!();
            println!("{}", format_plan_summary(&details.plan, &details.target_summaries));
        }
    }

    if interactive && !interactive::confirm("Apply these changes?")? {
        println!("{}", "Sync cancelled.".yellow());
        return Ok(());
    }

    let summary = apply_slash_command_sync(&details);
    report(&summary, args.json)
}

/// Ask for every option the flags and config left open.
fn prompt_options(registry: &TargetRegistry, request: &mut SyncRequest) -> Result<()> {
    let selected: Vec<&TargetProfile> = request
        .targets
        .iter()
        .filter_map(|t| registry.get(t))
        .collect();

    let unsupported: Vec<&str> = selected
        .iter()
        .filter(|p| matches!(p.commands, CommandSupport::Unsupported))
        .map(|p| p.id.as_str())
        .collect();
    if !unsupported.is_empty() && request.unsupported_fallback.is_none() {
        request.unsupported_fallback = Some(interactive::unsupported_fallback(&unsupported)?);
    }

    if let Some(prompts_only) = selected
        .iter()
        .find(|p| matches!(p.commands, CommandSupport::GlobalPromptsOnly { .. }))
        && request.codex_option.is_none()
    {
        let option = interactive::codex_option(&prompts_only.display_name)?;
        request.codex_option = Some(option);
        if option == CodexOption::ConvertToSkills && request.codex_conversion_scope.is_none() {
            request.codex_conversion_scope = Some(interactive::codex_conversion_scope()?);
        }
    }

    for profile in selected {
        if profile.supported_scopes().len() > 1 && !request.scope_by_target.contains_key(&profile.id) {
            request
                .scope_by_target
                .insert(profile.id.clone(), interactive::scope(profile)?);
        }
    }
    Ok(())
}

fn report(summary: &SyncSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", format_sync_summary(summary, true));
    } else {
        println!();
        println!("{}", format_sync_summary(summary, false));
        for warning in &summary.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        for error in &summary.errors {
            eprintln!("{} {}", "failed:".red().bold(), error);
        }
    }

    if summary.had_failures {
        return Err(CliError::user(format!(
            "sync finished with {} error(s)",
            summary.errors.len()
        )));
    }
    Ok(())
}

/// Whether prompts may be shown.
pub fn is_interactive(args: &SyncArgs) -> bool {
    !args.yes && !args.json && std::io::stdin().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentctl_test_utils::CatalogFixture;
    use pretty_assertions::assert_eq;

    fn args(fixture: &CatalogFixture) -> SyncArgs {
        SyncArgs {
            yes: true,
            home: Some(fixture.home().to_path_buf()),
            ..SyncArgs::default()
        }
    }

    #[test]
    fn test_sync_all_targets_non_interactive() {
        let fixture = CatalogFixture::new();
        fixture.command("deploy", "Deploy.\n");

        run_sync_commands(fixture.root(), &args(&fixture), false).unwrap();

        fixture.assert_file_content(".claude/commands/deploy.md", "Deploy.\n");
        fixture.assert_file_exists(".gemini/commands/deploy.toml");
        assert_eq!(fixture.read_home(".codex/prompts/deploy.md"), "Deploy.\n");
    }

    #[test]
    fn test_sync_from_subdirectory_finds_root() {
        let fixture = CatalogFixture::new();
        fixture.command("deploy", "Deploy.\n");
        fixture.write("src/lib/keep.txt", "");
        let mut args = args(&fixture);
        args.only = vec!["claude".into()];

        run_sync_commands(&fixture.root().join("src/lib"), &args, false).unwrap();

        fixture.assert_file_exists(".claude/commands/deploy.md");
    }

    #[test]
    fn test_unknown_target_fails_before_writing() {
        let fixture = CatalogFixture::new();
        fixture.command("deploy", "Deploy.\n");
        let mut args = args(&fixture);
        args.only = vec!["cursor".into()];

        let err = run_sync_commands(fixture.root(), &args, false).unwrap_err();

        assert!(err.to_string().contains("unknown target 'cursor'"));
        fixture.assert_file_not_exists(".claude/commands/deploy.md");
    }
}
