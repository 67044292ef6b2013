//! Request-to-argv translation

use serde::Serialize;

use crate::request::{FlagKey, InvocationMode, InvocationRequest};
use crate::schema::{CliSchema, FlagMap, PassthroughPosition, PromptPosition, PromptSpec};

/// Base argument that marks a non-interactive execution subcommand.
const EXEC_SUBCOMMAND: &str = "exec";

/// Global flag that must precede an execution subcommand.
const SEARCH_FLAG: &str = "--search";

/// Concrete command line produced for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    pub command: String,
    pub args: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Append `request.passthrough.args`. Defaults to `true`.
    pub include_passthrough: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            include_passthrough: true,
        }
    }
}

/// Translate `request` into `schema`'s dialect with default options.
pub fn translate(request: &InvocationRequest, schema: &CliSchema) -> TranslationResult {
    translate_with(request, schema, &TranslateOptions::default())
}

/// Translate `request` into `schema`'s dialect.
///
/// Never fails: anything the schema cannot express produces exactly one
/// warning of the form `Warning: <agent> does not support <field> (<value>); ignoring.`
/// The prompt warning omits the value.
pub fn translate_with(
    request: &InvocationRequest,
    schema: &CliSchema,
    options: &TranslateOptions,
) -> TranslationResult {
    if let Some(custom) = &schema.translate {
        return custom.call(request);
    }

    let mode = request.mode;
    let base = schema.modes.get(mode);
    let mut args = base.args.clone();
    let mut warnings = Vec::new();

    let mut warn = |field: &str, value: Option<&str>| {
        let shown = value.map(|v| format!(" ({v})")).unwrap_or_default();
        warnings.push(format!(
            "Warning: {} does not support {}{}; ignoring.",
            schema.agent, field, shown
        ));
    };

    if let Some(approval) = request.approval {
        push_mapped(&mut args, &mut warn, schema.flags.approval.as_ref(), mode, approval);
    }
    if let Some(sandbox) = request.sandbox {
        push_mapped(&mut args, &mut warn, schema.flags.sandbox.as_ref(), mode, sandbox);
    }
    if let Some(output) = request.output {
        push_mapped(&mut args, &mut warn, schema.flags.output.as_ref(), mode, output);
    }

    if let Some(model) = &request.model {
        match &schema.flags.model {
            Some(flag) if flag.allows(mode) => {
                args.extend(flag.flag.iter().cloned());
                args.push(model.clone());
            }
            _ => warn("--model", Some(model)),
        }
    }

    if let Some(enabled) = request.web {
        let value = if enabled { "on" } else { "off" };
        let resolved = schema
            .flags
            .web
            .as_ref()
            .filter(|web| web.allows(mode))
            .and_then(|web| web.resolve(enabled));
        match resolved {
            Some(extra) => args.extend(extra.iter().cloned()),
            None => warn("--web", Some(value)),
        }
    }

    // Search is a global flag and is rejected after the exec subcommand.
    if mode == InvocationMode::OneShot
        && base.args.iter().any(|a| a == EXEC_SUBCOMMAND)
        && let Some(index) = args.iter().position(|a| a == SEARCH_FLAG)
    {
        let flag = args.remove(index);
        args.insert(0, flag);
    }

    let mut prompt_args = Vec::new();
    let mut prompt_position = PromptPosition::Last;
    if mode == InvocationMode::OneShot
        && let Some(prompt) = &request.prompt
    {
        match &schema.prompt {
            Some(PromptSpec::Flag { flag }) => {
                prompt_args.extend(flag.iter().cloned());
                prompt_args.push(prompt.clone());
            }
            Some(PromptSpec::Positional { position }) => {
                prompt_args.push(prompt.clone());
                prompt_position = *position;
            }
            // The prompt text is left out of the warning.
            None => warn("--prompt", None),
        }
    }

    let passthrough: &[String] = if options.include_passthrough {
        &request.passthrough.args
    } else {
        &[]
    };

    let args = if prompt_args.is_empty() {
        args.extend(passthrough.iter().cloned());
        args
    } else {
        let (before, after): (&[String], &[String]) = match schema.passthrough_position() {
            PassthroughPosition::BeforePrompt => (passthrough, &[]),
            PassthroughPosition::After => (&[], passthrough),
        };
        let mut out = Vec::with_capacity(args.len() + prompt_args.len() + passthrough.len());
        match prompt_position {
            PromptPosition::First => {
                out.extend(before.iter().cloned());
                out.extend(prompt_args);
                out.extend(args);
            }
            PromptPosition::Last => {
                out.extend(args);
                out.extend(before.iter().cloned());
                out.extend(prompt_args);
            }
        }
        out.extend(after.iter().cloned());
        out
    };

    TranslationResult {
        command: base.command.clone(),
        args,
        warnings,
    }
}

fn push_mapped<K: FlagKey>(
    args: &mut Vec<String>,
    warn: &mut impl FnMut(&str, Option<&str>),
    map: Option<&FlagMap<K>>,
    mode: InvocationMode,
    key: K,
) {
    match map.and_then(|m| m.resolve(mode, key)) {
        Some(extra) => args.extend(extra.iter().cloned()),
        None => warn(K::FIELD, Some(key.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ApprovalPolicy, OutputFormat, SandboxMode};
    use crate::schema::{
        CustomTranslate, FlagArgs, ModeInvocation, ModelFlag, PassthroughSpec, WebFlag,
    };
    use pretty_assertions::assert_eq;

    fn claude_like() -> CliSchema {
        let mut schema = CliSchema::new("claude", "claude");
        schema.prompt = Some(PromptSpec::Flag {
            flag: vec!["-p".into()],
        });
        schema.flags.approval = Some(
            FlagMap::new()
                .value(ApprovalPolicy::Prompt, FlagArgs::none())
                .value(ApprovalPolicy::AutoEdit, FlagArgs::Unsupported)
                .value(
                    ApprovalPolicy::Yolo,
                    FlagArgs::args(["--dangerously-skip-permissions"]),
                ),
        );
        schema.flags.output = Some(
            FlagMap::new()
                .mode_value(InvocationMode::OneShot, OutputFormat::Text, FlagArgs::none())
                .mode_value(
                    InvocationMode::OneShot,
                    OutputFormat::Json,
                    FlagArgs::args(["--output-format", "json"]),
                ),
        );
        schema.flags.model = Some(ModelFlag {
            flag: vec!["--model".into()],
            modes: vec![],
        });
        schema
    }

    fn codex_like() -> CliSchema {
        let mut schema = CliSchema::new("codex", "codex");
        schema.modes.one_shot = ModeInvocation::new("codex", ["exec"]);
        schema.prompt = Some(PromptSpec::Positional {
            position: PromptPosition::Last,
        });
        schema.flags.web = Some(WebFlag {
            on: Some(FlagArgs::args(["--search"])),
            off: Some(FlagArgs::none()),
            modes: vec![],
        });
        schema.passthrough = Some(PassthroughSpec {
            position: PassthroughPosition::BeforePrompt,
        });
        schema
    }

    #[test]
    fn one_shot_yolo_json_with_prompt_flag() {
        let request = InvocationRequest::new(InvocationMode::OneShot)
            .with_prompt("fix tests")
            .with_approval(ApprovalPolicy::Yolo)
            .with_output(OutputFormat::Json);

        let result = translate(&request, &claude_like());

        assert_eq!(result.command, "claude");
        assert_eq!(
            result.args,
            vec![
                "--dangerously-skip-permissions",
                "--output-format",
                "json",
                "-p",
                "fix tests"
            ]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unsupported_value_warns_once_and_adds_nothing() {
        let request =
            InvocationRequest::new(InvocationMode::Interactive).with_approval(ApprovalPolicy::AutoEdit);

        let result = translate(&request, &claude_like());

        assert!(result.args.is_empty());
        assert_eq!(
            result.warnings,
            vec!["Warning: claude does not support --approval (auto-edit); ignoring."]
        );
    }

    #[test]
    fn missing_flag_family_warns() {
        let request =
            InvocationRequest::new(InvocationMode::OneShot).with_sandbox(SandboxMode::ReadOnly);

        let result = translate(&request, &claude_like());

        assert_eq!(
            result.warnings,
            vec!["Warning: claude does not support --sandbox (read-only); ignoring."]
        );
    }

    #[test]
    fn mode_only_mapping_does_not_apply_to_other_mode() {
        let request =
            InvocationRequest::new(InvocationMode::Interactive).with_output(OutputFormat::Json);

        let result = translate(&request, &claude_like());

        assert!(result.args.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("--output (json)"));
    }

    #[test]
    fn model_restricted_to_other_mode_warns() {
        let mut schema = claude_like();
        schema.flags.model = Some(ModelFlag {
            flag: vec!["--model".into()],
            modes: vec![InvocationMode::OneShot],
        });
        let request = InvocationRequest::new(InvocationMode::Interactive).with_model("opus");

        let result = translate(&request, &schema);

        assert!(result.args.is_empty());
        assert_eq!(
            result.warnings,
            vec!["Warning: claude does not support --model (opus); ignoring."]
        );
    }

    #[test]
    fn exec_web_search_moves_before_subcommand() {
        let request = InvocationRequest::new(InvocationMode::OneShot)
            .with_prompt("summarize")
            .with_web(true)
            .with_passthrough(["-c", "model_reasoning_effort=\"high\""]);

        let result = translate(&request, &codex_like());

        assert_eq!(result.command, "codex");
        assert_eq!(
            result.args,
            vec![
                "--search",
                "exec",
                "-c",
                "model_reasoning_effort=\"high\"",
                "summarize"
            ]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn interactive_web_search_stays_in_place() {
        let request = InvocationRequest::new(InvocationMode::Interactive).with_web(true);
        let result = translate(&request, &codex_like());
        assert_eq!(result.args, vec!["--search"]);
    }

    #[test]
    fn web_off_without_mapping_warns_off() {
        let mut schema = codex_like();
        schema.flags.web = Some(WebFlag {
            on: Some(FlagArgs::none()),
            off: Some(FlagArgs::Unsupported),
            modes: vec![],
        });
        let request = InvocationRequest::new(InvocationMode::OneShot).with_web(false);

        let result = translate(&request, &schema);

        assert_eq!(
            result.warnings,
            vec!["Warning: codex does not support --web (off); ignoring."]
        );
    }

    #[test]
    fn positional_prompt_first() {
        let mut schema = CliSchema::new("tool", "tool");
        schema.modes.one_shot = ModeInvocation::new("tool", ["run"]);
        schema.prompt = Some(PromptSpec::Positional {
            position: PromptPosition::First,
        });
        let request = InvocationRequest::new(InvocationMode::OneShot)
            .with_prompt("hello")
            .with_passthrough(["--x"]);

        let result = translate(&request, &schema);

        assert_eq!(result.args, vec!["hello", "run", "--x"]);
    }

    #[test]
    fn positional_prompt_first_with_passthrough_before() {
        let mut schema = CliSchema::new("tool", "tool");
        schema.modes.one_shot = ModeInvocation::new("tool", ["run"]);
        schema.prompt = Some(PromptSpec::Positional {
            position: PromptPosition::First,
        });
        schema.passthrough = Some(PassthroughSpec {
            position: PassthroughPosition::BeforePrompt,
        });
        let request = InvocationRequest::new(InvocationMode::OneShot)
            .with_prompt("hello")
            .with_passthrough(["--x"]);

        let result = translate(&request, &schema);

        assert_eq!(result.args, vec!["--x", "hello", "run"]);
    }

    #[test]
    fn prompt_ignored_in_interactive_mode() {
        let request = InvocationRequest::new(InvocationMode::Interactive)
            .with_prompt("hi")
            .with_passthrough(["--verbose"]);

        let result = translate(&request, &claude_like());

        assert_eq!(result.args, vec!["--verbose"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn prompt_without_mechanism_warns() {
        let schema = CliSchema::new("bare", "bare");
        let request = InvocationRequest::new(InvocationMode::OneShot).with_prompt("hi");

        let result = translate(&request, &schema);

        assert!(result.args.is_empty());
        assert_eq!(
            result.warnings,
            vec!["Warning: bare does not support --prompt; ignoring."]
        );
    }

    #[test]
    fn passthrough_can_be_excluded() {
        let request = InvocationRequest::new(InvocationMode::OneShot)
            .with_prompt("hi")
            .with_passthrough(["--silent"]);
        let options = TranslateOptions {
            include_passthrough: false,
        };

        let result = translate_with(&request, &claude_like(), &options);

        assert_eq!(result.args, vec!["-p", "hi"]);
    }

    #[test]
    fn custom_translate_short_circuits() {
        let mut schema = claude_like();
        schema.translate = Some(CustomTranslate::new(|req| TranslationResult {
            command: "wrapper".into(),
            args: vec![req.mode.to_string()],
            warnings: vec![],
        }));
        let request = InvocationRequest::new(InvocationMode::OneShot)
            .with_approval(ApprovalPolicy::AutoEdit)
            .with_prompt("ignored");

        let result = translate(&request, &schema);

        assert_eq!(result.command, "wrapper");
        assert_eq!(result.args, vec!["one-shot"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn mode_base_args_come_first() {
        let request = InvocationRequest::new(InvocationMode::OneShot).with_model("o3");
        let mut schema = codex_like();
        schema.flags.model = Some(ModelFlag {
            flag: vec!["--model".into()],
            modes: vec![],
        });

        let result = translate(&request, &schema);

        assert_eq!(result.args, vec!["exec", "--model", "o3"]);
    }
}
