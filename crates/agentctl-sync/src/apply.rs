//! Apply engine
//!
//! Executes a [`SyncPlan`] target by target in plan order. Hook and write
//! failures are recorded against their target and never stop the run.

use agentctl_fs::{compute_content_checksum, io};
use agentctl_targets::{HookItem, HookPayload, TargetProfile, TemplateContext};

use crate::hooks::{HookStage, run_hook};
use crate::ledger::Ledger;
use crate::plan::{ActionReason, PlanFailure, SyncAction, SyncActionKind, SyncPlan};
use crate::summary::{Counts, SyncResult, SyncStatus, SyncSummary};

/// Per-target bookkeeping while applying.
struct TargetRun<'a> {
    profile: &'a TargetProfile,
    templates: &'a TemplateContext,
    counts: Counts,
    errors: Vec<String>,
}

impl<'a> TargetRun<'a> {
    fn new(profile: &'a TargetProfile, templates: &'a TemplateContext) -> Self {
        Self {
            profile,
            templates,
            counts: Counts::default(),
            errors: Vec::new(),
        }
    }

    fn payload(&self, action: Option<&SyncAction>) -> HookPayload {
        HookPayload {
            target_id: self.profile.id.clone(),
            repo_root: self.templates.repo_root.clone(),
            home_dir: self.templates.home_dir.clone(),
            item: action.map(|a| HookItem {
                item_type: a.item_type,
                name: a.item_name.clone(),
                source_path: a
                    .source_path
                    .clone()
                    .unwrap_or_else(|| a.output_path.clone()),
            }),
        }
    }

    fn hook(&mut self, stage: HookStage, action: Option<&SyncAction>) -> bool {
        let payload = self.payload(action);
        let errors = &mut self.errors;
        run_hook(&self.profile.hooks, stage, &payload, &mut |message: String| {
            errors.push(message)
        })
    }

    fn fail(&mut self, message: String) {
        tracing::warn!(target_id = %self.profile.id, %message, "Sync step failed");
        self.counts.failed += 1;
        self.errors.push(message);
    }

    /// Write one create/update action, recording it in the ledger.
    fn write(&mut self, action: &SyncAction, ledger: &mut Ledger) {
        let Some(content) = action.content.as_deref() else {
            self.fail(format!("no content planned for {}", action.output_path));
            return;
        };
        if !self.hook(HookStage::BeforeConvert, Some(action)) {
            self.counts.failed += 1;
            return;
        }
        if let Err(e) = io::write_text(&action.output_path, content) {
            self.fail(format!("failed to write {}: {e}", action.output_path));
            return;
        }
        ledger.record(
            &self.templates.repo_root,
            &action.target_id,
            action.item_type,
            &action.item_name,
            &action.output_path,
            compute_content_checksum(content),
        );
        tracing::debug!(target_id = %action.target_id, path = %action.output_path, kind = %action.kind, "Wrote output");

        if !self.hook(HookStage::AfterConvert, Some(action)) {
            self.counts.failed += 1;
            return;
        }
        match action.kind {
            SyncActionKind::Create => self.counts.created += 1,
            _ => self.counts.updated += 1,
        }
    }

    fn skip(&mut self, action: &SyncAction, ledger: &mut Ledger, warnings: &mut Vec<String>) {
        if action.reason.claims_output()
            && let Some(content) = action.content.as_deref()
        {
            ledger.record(
                &self.templates.repo_root,
                &action.target_id,
                action.item_type,
                &action.item_name,
                &action.output_path,
                compute_content_checksum(content),
            );
        }
        if action.reason == ActionReason::ConflictSkipped {
            warnings.push(format!(
                "{}: left {} untouched because it holds content not written by agentctl",
                action.target_id, action.output_path
            ));
        }
        self.counts.skipped += 1;
    }

    fn remove(&mut self, action: &SyncAction, ledger: &mut Ledger) {
        let root = &self.templates.repo_root;
        match action.kind {
            SyncActionKind::Remove => {
                if let Err(e) = io::remove_file(&action.output_path) {
                    self.fail(format!("failed to remove {}: {e}", action.output_path));
                    return;
                }
                ledger.forget(root, &action.target_id, &action.output_path);
                self.counts.removed += 1;
            }
            _ => {
                // Modified orphans stay on disk but are no longer ours.
                ledger.forget(root, &action.target_id, &action.output_path);
                self.counts.skipped += 1;
            }
        }
    }

    fn result(&self) -> SyncResult {
        let name = &self.profile.display_name;
        let c = &self.counts;
        let status = if !self.errors.is_empty() {
            SyncStatus::Failed
        } else if c.changed() > 0 {
            SyncStatus::Synced
        } else {
            SyncStatus::Skipped
        };
        let message = if status == SyncStatus::Skipped {
            format!("{name}: up to date ({} skipped)", c.skipped)
        } else {
            let mut message = format!(
                "{name}: {} created, {} updated, {} removed, {} skipped",
                c.created, c.updated, c.removed, c.skipped
            );
            if c.failed > 0 {
                message.push_str(&format!(", {} failed", c.failed));
            }
            message
        };
        SyncResult {
            target_id: self.profile.id.clone(),
            status,
            message,
            error: (!self.errors.is_empty()).then(|| self.errors.join("; ")),
        }
    }
}

/// Apply `plan` for `profiles`, updating `ledger` and saving it under the
/// repository root.
pub fn apply_plan(
    plan: &SyncPlan,
    profiles: &[TargetProfile],
    templates: &TemplateContext,
    ledger: &mut Ledger,
) -> SyncSummary {
    let mut profiles: Vec<&TargetProfile> = profiles.iter().collect();
    profiles.sort_by(|a, b| a.id.cmp(&b.id));
    profiles.dedup_by(|a, b| a.id == b.id);

    let mut summary = SyncSummary {
        source_path: templates.repo_root.join(agentctl_fs::CATALOG_DIR).to_string(),
        warnings: plan.warnings.clone(),
        ..SyncSummary::default()
    };

    for profile in profiles {
        let id = profile.id.as_str();
        let actions: Vec<&SyncAction> = plan.actions_for(id).collect();
        let removals: Vec<&SyncAction> = plan.removals.iter().filter(|a| a.target_id == id).collect();
        let failures: Vec<&PlanFailure> = plan.failures.iter().filter(|f| f.target_id == id).collect();

        let mut run = TargetRun::new(profile, templates);
        if actions.is_empty() && removals.is_empty() && failures.is_empty() {
            summary.per_target.insert(id.to_string(), run.counts);
            summary.results.push(run.result());
            continue;
        }

        tracing::info!(target_id = id, actions = actions.len(), removals = removals.len(), "Applying target");
        if run.hook(HookStage::BeforeSync, None) {
            for action in &actions {
                match action.kind {
                    SyncActionKind::Create | SyncActionKind::Update => run.write(action, ledger),
                    SyncActionKind::Skip => run.skip(action, ledger, &mut summary.warnings),
                    SyncActionKind::Remove => run.remove(action, ledger),
                }
            }
            for removal in &removals {
                run.remove(removal, ledger);
            }
        } else {
            run.counts.failed += actions.len() + removals.len();
        }

        for failure in failures {
            run.fail(format!(
                "failed to convert {} '{}': {}",
                failure.item_type, failure.item_name, failure.message
            ));
        }

        run.hook(HookStage::AfterSync, None);

        summary
            .errors
            .extend(run.errors.iter().map(|e| format!("{id}: {e}")));
        summary.per_target.insert(id.to_string(), run.counts);
        summary.results.push(run.result());
    }

    if let Err(e) = ledger.save(&templates.repo_root) {
        tracing::warn!(error = %e, "Failed to save ledger");
        summary.errors.push(format!("ledger: {e}"));
    }
    summary.had_failures = !summary.errors.is_empty();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PlanOptions;
    use crate::planner::build_plan;
    use agentctl_targets::{FnHook, TargetHooks, TargetRegistry};
    use agentctl_test_utils::CatalogFixture;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Setup {
        fixture: CatalogFixture,
        registry: TargetRegistry,
    }

    impl Setup {
        fn new() -> Self {
            Self {
                fixture: CatalogFixture::new(),
                registry: TargetRegistry::with_builtins(),
            }
        }

        fn templates(&self) -> TemplateContext {
            TemplateContext::new(self.fixture.root(), self.fixture.home())
        }

        fn profiles(&self, targets: &[&str]) -> Vec<TargetProfile> {
            targets
                .iter()
                .map(|t| self.registry.resolve(t).unwrap().clone())
                .collect()
        }

        fn sync(&self, targets: &[&str], options: &PlanOptions) -> (SyncPlan, SyncSummary) {
            let templates = self.templates();
            let catalog = agentctl_catalog::load(self.fixture.root(), &self.registry).unwrap();
            let mut ledger = Ledger::load(&templates.repo_root).unwrap();
            let profiles = self.profiles(targets);
            let plan = build_plan(&catalog, &profiles, &templates, &ledger, options);
            let summary = apply_plan(&plan, &profiles, &templates, &mut ledger);
            (plan, summary)
        }
    }

    #[test]
    fn creates_files_and_records_ledger() {
        let setup = Setup::new();
        setup.fixture.command("deploy", "Deploy.\n");

        let (_, summary) = setup.sync(&["claude"], &PlanOptions::default());

        assert!(!summary.had_failures);
        assert_eq!(summary.per_target["claude"].created, 1);
        setup.fixture.assert_file_content(".claude/commands/deploy.md", "Deploy.\n");
        let ledger = Ledger::load(&setup.templates().repo_root).unwrap();
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].path, ".claude/commands/deploy.md");
    }

    #[test]
    fn second_run_only_skips() {
        let setup = Setup::new();
        setup.fixture.command("deploy", "Deploy.\n");
        setup.sync(&["claude", "gemini"], &PlanOptions::default());

        let (plan, summary) = setup.sync(&["claude", "gemini"], &PlanOptions::default());

        assert!(plan.actions.iter().all(|a| a.kind == SyncActionKind::Skip));
        assert_eq!(summary.results[0].status, SyncStatus::Skipped);
        assert_eq!(summary.per_target["gemini"].skipped, 1);
    }

    #[test]
    fn before_sync_failure_fails_whole_target() {
        let mut setup = Setup::new();
        setup.fixture.command("deploy", "Deploy.\n");
        setup.fixture.command("lint", "Lint.\n");
        setup
            .registry
            .set_hooks(
                "claude",
                TargetHooks {
                    before_sync: Some(Arc::new(FnHook::new("deny", |_| Err("not today".into())))),
                    ..TargetHooks::default()
                },
            )
            .unwrap();

        let (_, summary) = setup.sync(&["claude"], &PlanOptions::default());

        assert!(summary.had_failures);
        assert_eq!(summary.per_target["claude"].failed, 2);
        assert_eq!(summary.errors, vec!["claude: before_sync hook failed: not today".to_string()]);
        setup.fixture.assert_file_not_exists(".claude/commands/deploy.md");
    }

    #[test]
    fn after_convert_failure_keeps_written_file_owned() {
        let mut setup = Setup::new();
        setup.fixture.command("deploy", "Deploy.\n");
        setup
            .registry
            .set_hooks(
                "claude",
                TargetHooks {
                    after_convert: Some(Arc::new(FnHook::new("post", |_| Err("lint failed".into())))),
                    ..TargetHooks::default()
                },
            )
            .unwrap();

        let (_, summary) = setup.sync(&["claude"], &PlanOptions::default());

        assert_eq!(summary.per_target["claude"].failed, 1);
        assert_eq!(summary.per_target["claude"].created, 0);
        assert_eq!(summary.results[0].status, SyncStatus::Failed);
        let ledger = Ledger::load(&setup.templates().repo_root).unwrap();
        assert_eq!(ledger.entries().len(), 1);
    }

    #[test]
    fn conflict_skip_warns_and_keeps_file() {
        let setup = Setup::new();
        setup.fixture.command("deploy", "Deploy.\n");
        setup.fixture.write(".claude/commands/deploy.md", "mine\n");

        let (_, summary) = setup.sync(&["claude"], &PlanOptions::default());

        setup.fixture.assert_file_content(".claude/commands/deploy.md", "mine\n");
        assert_eq!(summary.per_target["claude"].skipped, 1);
        assert!(summary.warnings.iter().any(|w| w.contains("untouched")));
        assert!(!summary.had_failures);
    }

    #[test]
    fn modified_orphan_is_released() {
        let setup = Setup::new();
        setup.fixture.command("deploy", "Deploy.\n");
        setup.sync(&["claude"], &PlanOptions::default());
        setup.fixture.remove("agents/commands/deploy.md");
        setup.fixture.write(".claude/commands/deploy.md", "edited\n");

        let (plan, summary) = setup.sync(&["claude"], &PlanOptions::default());

        assert_eq!(plan.removals[0].reason, ActionReason::ModifiedSinceSync);
        assert_eq!(summary.per_target["claude"].skipped, 1);
        setup.fixture.assert_file_content(".claude/commands/deploy.md", "edited\n");
        assert!(Ledger::load(&setup.templates().repo_root).unwrap().is_empty());
    }

    #[test]
    fn untouched_target_runs_no_hooks() {
        let mut setup = Setup::new();
        setup.fixture.command("deploy", "Deploy.\n");
        setup.fixture.write(".claude/commands/deploy.md", "Deploy.\n");
        setup
            .registry
            .set_hooks(
                "gemini",
                TargetHooks {
                    before_sync: Some(Arc::new(FnHook::new("deny", |_| Err("boom".into())))),
                    ..TargetHooks::default()
                },
            )
            .unwrap();
        let options = PlanOptions::default();

        let templates = setup.templates();
        let catalog = agentctl_catalog::load(setup.fixture.root(), &setup.registry).unwrap();
        let profiles = setup.profiles(&["claude", "gemini"]);
        let mut plan = build_plan(&catalog, &profiles, &templates, &Ledger::new(), &options);
        plan.actions.retain(|a| a.target_id == "claude");
        let summary = apply_plan(&plan, &profiles, &templates, &mut Ledger::new());

        assert!(!summary.had_failures);
        assert_eq!(summary.results[1].status, SyncStatus::Skipped);
    }
}
