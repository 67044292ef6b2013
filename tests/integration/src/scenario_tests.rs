//! Cross-crate scenarios: multi-kind catalogs, hook ordering, failure
//! isolation and invocation translation.

use std::sync::{Arc, Mutex};

use agentctl_invoke::{
    ApprovalPolicy, CliSchema, FlagArgs, FlagMap, InvocationMode, InvocationRequest, translate,
};
use agentctl_sync::{
    SyncActionKind, SyncRequest, SyncStatus, apply_slash_command_sync,
    plan_slash_command_sync, plan_slash_command_sync_with_registry,
};
use agentctl_targets::{FnHook, HookPayload, TargetHooks, TargetRegistry};
use agentctl_test_utils::CatalogFixture;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn request(fixture: &CatalogFixture, targets: &[&str]) -> SyncRequest {
    SyncRequest {
        repo_root: fixture.root().to_path_buf(),
        home_dir: Some(fixture.home().to_path_buf()),
        targets: targets.iter().map(|t| t.to_string()).collect(),
        non_interactive: true,
        ..SyncRequest::default()
    }
}

fn recorder(log: &Arc<Mutex<Vec<String>>>, stage: &'static str) -> Arc<FnHook> {
    let log = Arc::clone(log);
    Arc::new(FnHook::new(stage, move |payload: &HookPayload| {
        let entry = match &payload.item {
            Some(item) => format!("{stage}:{}", item.name),
            None => stage.to_string(),
        };
        log.lock().map_err(|e| e.to_string())?.push(entry);
        Ok(())
    }))
}

#[test]
fn test_every_item_kind_reaches_claude() {
    let fixture = CatalogFixture::new();
    fixture.command("deploy", "Deploy.\n");
    fixture.skill("lint", "---\nname: lint\n---\nLint it.\n");
    fixture.skill_file("lint", "scripts/run.sh", "#!/bin/sh\n");
    fixture.subagent("reviewer", "---\nname: reviewer\n---\nReview.\n");
    fixture.instruction("AGENTS", "Be brief.\n");

    let summary = apply_slash_command_sync(
        &plan_slash_command_sync(&request(&fixture, &["claude"])).unwrap(),
    );

    assert!(!summary.had_failures, "{:?}", summary.errors);
    fixture.assert_file_exists(".claude/commands/deploy.md");
    fixture.assert_file_exists(".claude/skills/lint/SKILL.md");
    fixture.assert_file_content(".claude/skills/lint/scripts/run.sh", "#!/bin/sh\n");
    fixture.assert_file_exists(".claude/agents/reviewer.md");
    fixture.assert_file_content("CLAUDE.md", "Be brief.\n");
    assert_eq!(summary.per_target["claude"].created, 5);
}

#[test]
fn test_subagent_fallbacks_differ_per_target() {
    let fixture = CatalogFixture::new();
    fixture.subagent("reviewer", "---\nname: reviewer\n---\nReview.\n");

    let details = plan_slash_command_sync(&request(&fixture, &["codex", "gemini"])).unwrap();
    apply_slash_command_sync(&details);

    // Gemini turns subagents into skills; codex skips them.
    fixture.assert_file_exists(".gemini/skills/reviewer/SKILL.md");
    fixture.assert_file_not_exists(".codex/skills/reviewer/SKILL.md");
    let codex: Vec<_> = details.plan.actions_for("codex").collect();
    assert!(codex.iter().all(|a| a.kind == SyncActionKind::Skip));
}

#[test]
fn test_hooks_run_in_lifecycle_order() {
    let fixture = CatalogFixture::new();
    fixture.command("deploy", "Deploy.\n");
    fixture.command("lint", "Lint.\n");

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = TargetRegistry::with_builtins();
    registry
        .set_hooks(
            "claude",
            TargetHooks {
                before_sync: Some(recorder(&log, "before_sync")),
                after_sync: Some(recorder(&log, "after_sync")),
                before_convert: Some(recorder(&log, "before_convert")),
                after_convert: Some(recorder(&log, "after_convert")),
            },
        )
        .unwrap();

    let details =
        plan_slash_command_sync_with_registry(&request(&fixture, &["claude"]), &registry).unwrap();
    apply_slash_command_sync(&details);

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "before_sync",
            "before_convert:deploy",
            "after_convert:deploy",
            "before_convert:lint",
            "after_convert:lint",
            "after_sync",
        ]
    );
}

#[test]
fn test_failing_target_does_not_stop_the_others() {
    let fixture = CatalogFixture::new();
    fixture.command("deploy", "Deploy.\n");

    let mut registry = TargetRegistry::with_builtins();
    registry
        .set_hooks(
            "codex",
            TargetHooks {
                before_sync: Some(Arc::new(FnHook::new("boom", |_| Err("offline".into())))),
                ..TargetHooks::default()
            },
        )
        .unwrap();

    let details = plan_slash_command_sync_with_registry(
        &request(&fixture, &["claude", "codex", "gemini"]),
        &registry,
    )
    .unwrap();
    let summary = apply_slash_command_sync(&details);

    assert!(summary.had_failures);
    let statuses: Vec<(&str, SyncStatus)> = summary
        .results
        .iter()
        .map(|r| (r.target_id.as_str(), r.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("claude", SyncStatus::Synced),
            ("codex", SyncStatus::Failed),
            ("gemini", SyncStatus::Synced),
        ]
    );
    assert!(summary.errors.iter().all(|e| e.starts_with("codex: ")));
    fixture.assert_file_exists(".claude/commands/deploy.md");
}

#[rstest]
#[case::commands_only(false)]
#[case::with_skills(true)]
fn test_second_sync_changes_nothing(#[case] with_skills: bool) {
    let fixture = CatalogFixture::new();
    fixture.command("deploy", "Deploy.\n");
    if with_skills {
        fixture.skill("lint", "---\nname: lint\n---\nLint it.\n");
    }
    let targets = ["claude", "codex", "copilot", "gemini"];
    apply_slash_command_sync(&plan_slash_command_sync(&request(&fixture, &targets)).unwrap());

    let details = plan_slash_command_sync(&request(&fixture, &targets)).unwrap();
    let summary = apply_slash_command_sync(&details);

    assert!(details.plan.is_noop());
    assert!(summary.per_target.values().all(|c| c.changed() == 0));
}

#[test]
fn test_translator_maps_yolo_without_prompt() {
    let mut schema = CliSchema::new("x", "x");
    schema.flags.approval = Some(
        FlagMap::new().value(
            ApprovalPolicy::Yolo,
            FlagArgs::args(["--dangerously-skip-permissions"]),
        ),
    );

    let request =
        InvocationRequest::new(InvocationMode::OneShot).with_approval(ApprovalPolicy::Yolo);
    let result = translate(&request, &schema);

    assert_eq!(result.command, "x");
    assert_eq!(result.args, vec!["--dangerously-skip-permissions"]);
    assert!(result.warnings.is_empty());

    // A prompt the schema cannot place is dropped with a warning.
    let result = translate(&request.clone().with_prompt("hello"), &schema);
    assert_eq!(
        result.warnings,
        vec!["Warning: x does not support --prompt; ignoring."]
    );
    assert!(!result.args.contains(&"hello".to_string()));
}
