//! CLI argument parsing using clap derive

use std::path::PathBuf;

use agentctl_invoke::{ApprovalPolicy, InvocationMode, OutputFormat, SandboxMode};
use agentctl_sync::{CodexConversionScope, CodexOption};
use agentctl_targets::{ConflictStrategy, FallbackPolicy, Scope};
use clap::{Parser, Subcommand};

/// agentctl - Keep coding-agent commands, skills and instructions in sync
#[derive(Parser, Debug)]
#[command(name = "agentctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sync the `agents/` catalog into each target's conventions
    ///
    /// Examples:
    ///   agentctl sync-commands                   # Interactive
    ///   agentctl sync-commands --yes             # Accept defaults
    ///   agentctl sync-commands --only claude,gemini --conflicts rename
    SyncCommands(SyncArgs),

    /// Print the command line a target CLI needs for an abstract invocation
    ///
    /// Nothing is executed. Arguments after `--` are forwarded verbatim.
    ///
    /// Examples:
    ///   agentctl translate claude --mode one-shot --prompt "fix the build" --approval yolo
    ///   agentctl translate codex --mode one-shot --web on -- --profile ci
    Translate(TranslateArgs),

    /// List the configured targets
    Targets {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncArgs {
    /// Targets to leave out (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "only")]
    pub skip: Vec<String>,

    /// Only sync these targets (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Accept defaults without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Remove outputs whose source item is gone
    #[arg(long, value_name = "BOOL")]
    pub remove_missing: Option<bool>,

    /// How to treat files that were not written by agentctl
    #[arg(long, value_name = "overwrite|rename|skip")]
    pub conflicts: Option<ConflictStrategy>,

    /// What to do with commands for targets without slash commands
    #[arg(long, value_name = "convert_to_skills|skip", value_parser = parse_fallback)]
    pub unsupported_fallback: Option<FallbackPolicy>,

    /// Command handling for global-prompts-only targets
    #[arg(long, value_name = "prompts|convert_to_skills|skip", value_parser = parse_codex_option)]
    pub codex_option: Option<CodexOption>,

    /// Scope for skills converted from global-prompts-only commands
    #[arg(long, value_name = "global|project|skip", value_parser = parse_codex_scope)]
    pub codex_conversion_scope: Option<CodexConversionScope>,

    /// Command scope for a target, e.g. `claude=global` (repeatable)
    #[arg(long = "scope", value_name = "TARGET=SCOPE", value_parser = parse_scope_assignment)]
    pub scopes: Vec<(String, Scope)>,

    /// Home directory for global outputs
    #[arg(long, env = "AGENTCTL_HOME", hide = true)]
    pub home: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct TranslateArgs {
    /// Target name or alias
    pub target: String,

    /// Invocation mode
    #[arg(long, default_value = "interactive", value_name = "interactive|one-shot")]
    pub mode: InvocationMode,

    /// Prompt for one-shot runs
    #[arg(short, long)]
    pub prompt: Option<String>,

    #[arg(long, value_name = "prompt|auto-edit|yolo")]
    pub approval: Option<ApprovalPolicy>,

    #[arg(long, value_name = "workspace-write|read-only|off")]
    pub sandbox: Option<SandboxMode>,

    #[arg(long, value_name = "text|json|stream-json")]
    pub output: Option<OutputFormat>,

    #[arg(long)]
    pub model: Option<String>,

    /// Web search
    #[arg(long, value_name = "on|off", value_parser = parse_on_off)]
    pub web: Option<bool>,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,

    /// Arguments forwarded to the target CLI
    #[arg(last = true)]
    pub passthrough: Vec<String>,
}

fn parse_fallback(s: &str) -> Result<FallbackPolicy, String> {
    match normalize(s).as_str() {
        "convert_to_skills" => Ok(FallbackPolicy::ConvertToSkills),
        "skip" => Ok(FallbackPolicy::Skip),
        other => Err(format!("unknown fallback '{other}' (expected convert_to_skills or skip)")),
    }
}

fn parse_codex_option(s: &str) -> Result<CodexOption, String> {
    match normalize(s).as_str() {
        "prompts" => Ok(CodexOption::Prompts),
        "convert_to_skills" => Ok(CodexOption::ConvertToSkills),
        "skip" => Ok(CodexOption::Skip),
        other => Err(format!(
            "unknown codex option '{other}' (expected prompts, convert_to_skills or skip)"
        )),
    }
}

fn parse_codex_scope(s: &str) -> Result<CodexConversionScope, String> {
    match normalize(s).as_str() {
        "global" => Ok(CodexConversionScope::Global),
        "project" => Ok(CodexConversionScope::Project),
        "skip" => Ok(CodexConversionScope::Skip),
        other => Err(format!(
            "unknown conversion scope '{other}' (expected global, project or skip)"
        )),
    }
}

fn parse_scope(s: &str) -> Result<Scope, String> {
    match normalize(s).as_str() {
        "project" => Ok(Scope::Project),
        "global" => Ok(Scope::Global),
        other => Err(format!("unknown scope '{other}' (expected project or global)")),
    }
}

fn parse_scope_assignment(s: &str) -> Result<(String, Scope), String> {
    let (target, scope) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TARGET=SCOPE, got '{s}'"))?;
    let target = target.trim();
    if target.is_empty() {
        return Err(format!("missing target in '{s}'"));
    }
    Ok((target.to_string(), parse_scope(scope)?))
}

fn parse_on_off(s: &str) -> Result<bool, String> {
    match normalize(s).as_str() {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}
