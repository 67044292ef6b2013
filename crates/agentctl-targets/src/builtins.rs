//! Built-in target profiles
//!
//! Every built-in target is defined here: output conventions and the CLI
//! invocation dialect together.

use agentctl_invoke::{
    ApprovalPolicy, CliSchema, FlagArgs, FlagMap, InvocationMode, ModeInvocation, ModelFlag,
    OutputFormat, PassthroughPosition, PassthroughSpec, PromptPosition, PromptSpec, SandboxMode,
    WebFlag,
};

use crate::hooks::TargetHooks;
use crate::profile::{
    CommandFormat, CommandSupport, FallbackPolicy, ProfileSource, ScopedTemplates,
    SubagentSupport, TargetProfile,
};

/// Number of built-in targets.
pub const BUILTIN_COUNT: usize = 4;

/// All built-in target profiles, in id order.
pub fn builtin_profiles() -> Vec<TargetProfile> {
    vec![claude(), codex(), copilot(), gemini()]
}

pub fn claude() -> TargetProfile {
    let mut cli = CliSchema::new("claude", "claude");
    cli.prompt = Some(PromptSpec::Flag {
        flag: vec!["-p".into()],
    });
    cli.flags.approval = Some(
        FlagMap::new()
            .value(ApprovalPolicy::Prompt, FlagArgs::none())
            .value(ApprovalPolicy::AutoEdit, FlagArgs::Unsupported)
            .value(
                ApprovalPolicy::Yolo,
                FlagArgs::args(["--dangerously-skip-permissions"]),
            ),
    );
    cli.flags.output = Some(
        FlagMap::new()
            .mode_value(InvocationMode::OneShot, OutputFormat::Text, FlagArgs::none())
            .mode_value(
                InvocationMode::OneShot,
                OutputFormat::Json,
                FlagArgs::args(["--output-format", "json"]),
            )
            .mode_value(
                InvocationMode::OneShot,
                OutputFormat::StreamJson,
                FlagArgs::args(["--output-format", "stream-json", "--verbose"]),
            ),
    );
    cli.flags.model = Some(ModelFlag {
        flag: vec!["--model".into()],
        modes: vec![],
    });

    TargetProfile {
        id: "claude".into(),
        display_name: "Claude Code".into(),
        aliases: vec!["claude-code".into()],
        source: ProfileSource::BuiltIn,
        commands: CommandSupport::Native {
            templates: ScopedTemplates::new(
                Some("{repoRoot}/.claude/commands/{itemName}.md"),
                Some("{homeDir}/.claude/commands/{itemName}.md"),
            ),
            format: CommandFormat::Markdown,
        },
        skills: ScopedTemplates::new(
            Some("{repoRoot}/.claude/skills/{itemName}"),
            Some("{homeDir}/.claude/skills/{itemName}"),
        ),
        subagents: SubagentSupport::Native {
            template: "{repoRoot}/.claude/agents/{itemName}.md".into(),
        },
        instructions: Some("CLAUDE.md".into()),
        cli,
        passthrough_defaults: Vec::new(),
        hooks: TargetHooks::default(),
    }
}

pub fn gemini() -> TargetProfile {
    let mut cli = CliSchema::new("gemini", "gemini");
    cli.prompt = Some(PromptSpec::Flag {
        flag: vec!["-p".into()],
    });
    cli.flags.approval = Some(
        FlagMap::new()
            .value(
                ApprovalPolicy::Prompt,
                FlagArgs::args(["--approval-mode", "default"]),
            )
            .value(
                ApprovalPolicy::AutoEdit,
                FlagArgs::args(["--approval-mode", "auto_edit"]),
            )
            .value(ApprovalPolicy::Yolo, FlagArgs::args(["--yolo"])),
    );
    cli.flags.sandbox = Some(
        FlagMap::new()
            .value(SandboxMode::WorkspaceWrite, FlagArgs::args(["--sandbox"]))
            .value(SandboxMode::Off, FlagArgs::none()),
    );
    cli.flags.output = Some(
        FlagMap::new()
            .mode_value(InvocationMode::OneShot, OutputFormat::Text, FlagArgs::none())
            .mode_value(
                InvocationMode::OneShot,
                OutputFormat::Json,
                FlagArgs::args(["--output-format", "json"]),
            )
            .mode_value(
                InvocationMode::OneShot,
                OutputFormat::StreamJson,
                FlagArgs::args(["--output-format", "stream-json"]),
            ),
    );
    cli.flags.model = Some(ModelFlag {
        flag: vec!["--model".into()],
        modes: vec![],
    });
    // Web search is always on and cannot be disabled.
    cli.flags.web = Some(WebFlag {
        on: Some(FlagArgs::none()),
        off: Some(FlagArgs::Unsupported),
        modes: vec![],
    });

    TargetProfile {
        id: "gemini".into(),
        display_name: "Gemini CLI".into(),
        aliases: vec!["gemini-cli".into()],
        source: ProfileSource::BuiltIn,
        commands: CommandSupport::Native {
            templates: ScopedTemplates::new(
                Some("{repoRoot}/.gemini/commands/{itemName}.toml"),
                Some("{homeDir}/.gemini/commands/{itemName}.toml"),
            ),
            format: CommandFormat::Toml,
        },
        skills: ScopedTemplates::new(
            Some("{repoRoot}/.gemini/skills/{itemName}"),
            Some("{homeDir}/.gemini/skills/{itemName}"),
        ),
        subagents: SubagentSupport::Fallback(FallbackPolicy::ConvertToSkills),
        instructions: Some("GEMINI.md".into()),
        cli,
        passthrough_defaults: Vec::new(),
        hooks: TargetHooks::default(),
    }
}

pub fn codex() -> TargetProfile {
    let mut cli = CliSchema::new("codex", "codex");
    cli.modes.one_shot = ModeInvocation::new("codex", ["exec"]);
    cli.prompt = Some(PromptSpec::Positional {
        position: PromptPosition::Last,
    });
    cli.flags.approval = Some(
        FlagMap::new()
            .value(ApprovalPolicy::Prompt, FlagArgs::none())
            .value(ApprovalPolicy::AutoEdit, FlagArgs::args(["--full-auto"]))
            .value(
                ApprovalPolicy::Yolo,
                FlagArgs::args(["--dangerously-bypass-approvals-and-sandbox"]),
            ),
    );
    cli.flags.sandbox = Some(
        FlagMap::new()
            .value(
                SandboxMode::WorkspaceWrite,
                FlagArgs::args(["--sandbox", "workspace-write"]),
            )
            .value(
                SandboxMode::ReadOnly,
                FlagArgs::args(["--sandbox", "read-only"]),
            )
            .value(
                SandboxMode::Off,
                FlagArgs::args(["--sandbox", "danger-full-access"]),
            ),
    );
    cli.flags.output = Some(
        FlagMap::new()
            .mode_value(InvocationMode::OneShot, OutputFormat::Text, FlagArgs::none())
            .mode_value(InvocationMode::OneShot, OutputFormat::Json, FlagArgs::args(["--json"]))
            .mode_value(
                InvocationMode::OneShot,
                OutputFormat::StreamJson,
                FlagArgs::args(["--json"]),
            ),
    );
    cli.flags.model = Some(ModelFlag {
        flag: vec!["--model".into()],
        modes: vec![],
    });
    cli.flags.web = Some(WebFlag {
        on: Some(FlagArgs::args(["--search"])),
        off: Some(FlagArgs::none()),
        modes: vec![],
    });
    cli.passthrough = Some(PassthroughSpec {
        position: PassthroughPosition::BeforePrompt,
    });

    TargetProfile {
        id: "codex".into(),
        display_name: "Codex".into(),
        aliases: Vec::new(),
        source: ProfileSource::BuiltIn,
        commands: CommandSupport::GlobalPromptsOnly {
            template: "{homeDir}/.codex/prompts/{itemName}.md".into(),
            format: CommandFormat::Markdown,
        },
        skills: ScopedTemplates::new(
            Some("{repoRoot}/.codex/skills/{itemName}"),
            Some("{homeDir}/.codex/skills/{itemName}"),
        ),
        subagents: SubagentSupport::Fallback(FallbackPolicy::Skip),
        instructions: Some("AGENTS.md".into()),
        cli,
        passthrough_defaults: vec!["-c".into(), "model_reasoning_effort=\"high\"".into()],
        hooks: TargetHooks::default(),
    }
}

pub fn copilot() -> TargetProfile {
    let mut cli = CliSchema::new("copilot", "copilot");
    cli.prompt = Some(PromptSpec::Flag {
        flag: vec!["-p".into()],
    });
    cli.flags.approval = Some(
        FlagMap::new()
            .value(ApprovalPolicy::Prompt, FlagArgs::none())
            .value(ApprovalPolicy::AutoEdit, FlagArgs::Unsupported)
            .value(ApprovalPolicy::Yolo, FlagArgs::args(["--allow-all-tools"])),
    );
    cli.flags.model = Some(ModelFlag {
        flag: vec!["--model".into()],
        modes: vec![],
    });

    TargetProfile {
        id: "copilot".into(),
        display_name: "GitHub Copilot CLI".into(),
        aliases: vec!["copilot-cli".into()],
        source: ProfileSource::BuiltIn,
        commands: CommandSupport::Unsupported,
        skills: ScopedTemplates::new(
            Some("{repoRoot}/.github/skills/{itemName}"),
            Some("{homeDir}/.copilot/skills/{itemName}"),
        ),
        subagents: SubagentSupport::Native {
            template: "{repoRoot}/.github/agents/{itemName}.agent.md".into(),
        },
        instructions: Some("copilot-instructions.md".into()),
        cli,
        passthrough_defaults: vec!["--silent".into()],
        hooks: TargetHooks::default(),
    }
}
