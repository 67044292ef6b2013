//! Property tests for request translation

use agentctl_invoke::{
    ApprovalPolicy, CliSchema, FlagArgs, FlagMap, InvocationMode, InvocationRequest, ModelFlag,
    OutputFormat, PromptSpec, SandboxMode, translate,
};
use proptest::prelude::*;

fn mode() -> impl Strategy<Value = InvocationMode> {
    prop::sample::select(InvocationMode::ALL)
}

fn request() -> impl Strategy<Value = InvocationRequest> {
    (
        mode(),
        prop::option::of("[a-z ]{1,12}"),
        prop::option::of(prop::sample::select(ApprovalPolicy::ALL)),
        prop::option::of(prop::sample::select(SandboxMode::ALL)),
        prop::option::of(prop::sample::select(OutputFormat::ALL)),
        prop::option::of("[a-z0-9-]{1,8}"),
        prop::option::of(any::<bool>()),
        prop::collection::vec("--[a-z]{1,6}", 0..3),
    )
        .prop_map(
            |(mode, prompt, approval, sandbox, output, model, web, passthrough)| {
                InvocationRequest {
                    mode,
                    prompt,
                    approval,
                    sandbox,
                    output,
                    model,
                    web,
                    passthrough: agentctl_invoke::Passthrough { args: passthrough },
                }
            },
        )
}

/// A schema that maps every value and accepts every field.
fn permissive_schema() -> CliSchema {
    let mut schema = CliSchema::new("full", "full");
    schema.prompt = Some(PromptSpec::Flag {
        flag: vec!["-p".into()],
    });
    let mut approval = FlagMap::new();
    for value in ApprovalPolicy::ALL {
        approval = approval.value(*value, FlagArgs::args([format!("--approval={value}")]));
    }
    let mut sandbox = FlagMap::new();
    for value in SandboxMode::ALL {
        sandbox = sandbox.value(*value, FlagArgs::args([format!("--sandbox={value}")]));
    }
    let mut output = FlagMap::new();
    for value in OutputFormat::ALL {
        output = output.value(*value, FlagArgs::args([format!("--output={value}")]));
    }
    schema.flags.approval = Some(approval);
    schema.flags.sandbox = Some(sandbox);
    schema.flags.output = Some(output);
    schema.flags.model = Some(ModelFlag {
        flag: vec!["--model".into()],
        modes: vec![],
    });
    schema.flags.web = Some(agentctl_invoke::WebFlag {
        on: Some(FlagArgs::args(["--web"])),
        off: Some(FlagArgs::none()),
        modes: vec![],
    });
    schema
}

fn expected_warning_count(request: &InvocationRequest) -> usize {
    let prompt = request.mode == InvocationMode::OneShot && request.prompt.is_some();
    [
        request.approval.is_some(),
        request.sandbox.is_some(),
        request.output.is_some(),
        request.model.is_some(),
        request.web.is_some(),
        prompt,
    ]
    .into_iter()
    .filter(|set| *set)
    .count()
}

proptest! {
    #[test]
    fn bare_schema_warns_once_per_set_field(request in request()) {
        let schema = CliSchema::new("bare", "bare");
        let result = translate(&request, &schema);

        prop_assert_eq!(&result.command, "bare");
        prop_assert_eq!(result.warnings.len(), expected_warning_count(&request));
        prop_assert_eq!(&result.args, &request.passthrough.args);
        for warning in &result.warnings {
            prop_assert!(warning.starts_with("Warning: bare does not support --"));
            prop_assert!(warning.ends_with("; ignoring."));
        }
    }

    #[test]
    fn permissive_schema_never_warns(request in request()) {
        let result = translate(&request, &permissive_schema());

        prop_assert!(result.warnings.is_empty());
        for arg in &request.passthrough.args {
            prop_assert!(result.args.contains(arg));
        }
        if request.mode == InvocationMode::OneShot
            && let Some(prompt) = &request.prompt
        {
            // Passthrough defaults to after the prompt.
            let tail = request.passthrough.args.len();
            let at = result.args.len() - tail - 1;
            prop_assert_eq!(&result.args[at], prompt);
            prop_assert_eq!(&result.args[at - 1], "-p");
        }
    }

    #[test]
    fn translation_is_deterministic(request in request()) {
        let schema = permissive_schema();
        prop_assert_eq!(translate(&request, &schema), translate(&request, &schema));
    }
}
