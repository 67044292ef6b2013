//! End-to-end integration test for the vertical slice
//!
//! Exercises the complete flow: config loading -> registry -> catalog ->
//! plan -> apply -> ledger, plus translation through a configured target.

use std::fs;

use agentctl_catalog::SourceType;
use agentctl_invoke::{ApprovalPolicy, InvocationMode, InvocationRequest, translate};
use agentctl_sync::{
    Ledger, STATE_DIR, SyncActionKind, SyncRequest, apply_slash_command_sync,
    plan_slash_command_sync,
};
use agentctl_targets::{AgentsConfig, ProfileSource, TargetRegistry};
use agentctl_test_utils::CatalogFixture;
use pretty_assertions::assert_eq;

const CONFIG: &str = r#"
disabled_targets = ["copilot"]

[sync]
conflicts = "rename"

[[targets]]
id = "acme"
extends = "claude"
display_name = "Acme Agent"

[targets.commands]
project = "{repoRoot}/.acme/commands/{itemName}.md"

[targets.hooks.before_sync]
command = "sh"
args = ["-c", "mkdir -p .acme && echo $AGENTCTL_TARGET > .acme/last-sync"]
"#;

fn setup() -> CatalogFixture {
    let fixture = CatalogFixture::new();
    fixture.config(CONFIG);
    fixture.command("deploy", "---\ndescription: Ship it\n---\nDeploy the service.\n");
    fixture.command("scratch.local", "Only on my machine.\n");
    fixture.command(
        "review",
        "---\ntargets: [acme, gemini]\n---\nReview the diff.\n",
    );
    fixture.skill("lint", "---\nname: lint\n---\nRun the linters.\n");
    fixture.instruction("AGENTS", "---\noutputPath: docs\n---\nBe kind.\n");
    fixture
}

fn request(fixture: &CatalogFixture, targets: &[&str]) -> SyncRequest {
    SyncRequest {
        repo_root: fixture.root().to_path_buf(),
        home_dir: Some(fixture.home().to_path_buf()),
        targets: targets.iter().map(|t| t.to_string()).collect(),
        non_interactive: true,
        ..SyncRequest::default()
    }
}

#[test]
fn test_registry_from_config() {
    let fixture = setup();
    let config = AgentsConfig::load(fixture.root()).unwrap();
    let registry = TargetRegistry::from_config(&config).unwrap();

    assert_eq!(registry.ids(), vec!["acme", "claude", "codex", "gemini"]);
    let acme = registry.resolve("ACME").unwrap();
    assert_eq!(acme.source, ProfileSource::Custom);
    assert_eq!(acme.display_name, "Acme Agent");
    assert!(!registry.is_known("copilot"));
}

#[test]
fn test_catalog_respects_restrictions_and_local_items() {
    let fixture = setup();
    let registry = TargetRegistry::from_config(&AgentsConfig::load(fixture.root()).unwrap()).unwrap();
    let catalog = agentctl_catalog::load(fixture.root(), &registry).unwrap();

    let scratch = catalog
        .items
        .iter()
        .find(|i| i.name == "scratch")
        .unwrap();
    assert_eq!(scratch.source_type, SourceType::Local);

    let review = catalog.items.iter().find(|i| i.name == "review").unwrap();
    assert!(review.applies_to("acme"));
    assert!(!review.applies_to("claude"));
}

#[test]
fn test_full_sync_flow() {
    let fixture = setup();
    let targets = ["acme", "claude", "codex", "gemini"];

    let details = plan_slash_command_sync(&request(&fixture, &targets)).unwrap();
    assert_eq!(details.conflict_count, 0);
    assert!(details.plan.failures.is_empty());

    let summary = apply_slash_command_sync(&details);
    assert!(!summary.had_failures, "{:?}", summary.errors);

    // Custom target: own command dir, hook ran first.
    fixture.assert_file_content(".acme/commands/deploy.md", "Deploy the service.\n");
    fixture.assert_file_content(".acme/commands/review.md", "Review the diff.\n");
    fixture.assert_file_content(".acme/last-sync", "acme\n");

    // Restricted item only lands where it is allowed.
    fixture.assert_file_not_exists(".claude/commands/review.md");
    fixture.assert_file_exists(".gemini/commands/review.toml");

    // Codex commands are user-level prompts.
    assert_eq!(fixture.read_home(".codex/prompts/deploy.md"), "Deploy the service.\n");

    // Instructions go to their configured directory.
    fixture.assert_file_content("docs/CLAUDE.md", "Be kind.\n");
    fixture.assert_file_content("docs/AGENTS.md", "Be kind.\n");

    // The ledger lists every written output.
    let ledger = Ledger::load(&agentctl_fs::NormalizedPath::new(fixture.root())).unwrap();
    assert!(ledger.entries_for("acme").any(|e| e.path == ".acme/commands/deploy.md"));
    assert!(fixture.root().join(STATE_DIR).join("ledger.toml").is_file());
}

#[test]
fn test_resync_after_edit_renames_and_stays_stable() {
    let fixture = setup();
    let targets = ["claude"];
    apply_slash_command_sync(&plan_slash_command_sync(&request(&fixture, &targets)).unwrap());

    // Hand edit makes the output foreign; config default strategy is rename.
    fixture.write(".claude/commands/deploy.md", "My notes\n");
    let details = plan_slash_command_sync(&request(&fixture, &targets)).unwrap();
    assert_eq!(details.conflict_count, 1);
    let summary = apply_slash_command_sync(&details);
    assert!(!summary.had_failures);
    fixture.assert_file_content(".claude/commands/deploy.md", "My notes\n");
    fixture.assert_file_content(".claude/commands/deploy-1.md", "Deploy the service.\n");

    let again = plan_slash_command_sync(&request(&fixture, &targets)).unwrap();
    assert!(
        again
            .plan
            .actions
            .iter()
            .chain(again.plan.removals.iter())
            .all(|a| a.kind == SyncActionKind::Skip)
    );
}

#[test]
fn test_ledger_file_is_readable_toml() {
    let fixture = setup();
    apply_slash_command_sync(&plan_slash_command_sync(&request(&fixture, &["gemini"])).unwrap());

    let raw = fs::read_to_string(fixture.root().join(".agentctl/ledger.toml")).unwrap();
    let parsed: toml::Value = toml::from_str(&raw).unwrap();
    let entries = parsed["entry"].as_array().unwrap();
    assert!(entries.iter().all(|e| e["checksum"].as_str().unwrap().starts_with("sha256:")));
    assert!(entries.iter().all(|e| e["target"].as_str() == Some("gemini")));
}

#[test]
fn test_translate_through_registry() {
    let fixture = setup();
    let registry = TargetRegistry::from_config(&AgentsConfig::load(fixture.root()).unwrap()).unwrap();
    let acme = registry.resolve("acme").unwrap();

    let request = InvocationRequest::new(InvocationMode::OneShot)
        .with_prompt("ship it")
        .with_approval(ApprovalPolicy::Yolo);
    let result = translate(&request, &acme.cli);

    // The schema is inherited from claude.
    assert_eq!(result.command, "claude");
    assert!(result.args.contains(&"--dangerously-skip-permissions".to_string()));
    assert!(result.args.contains(&"ship it".to_string()));
}
