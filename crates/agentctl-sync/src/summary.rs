//! Plan and sync summaries

use std::collections::BTreeMap;

use agentctl_targets::Scope;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::plan::{SyncActionKind, SyncPlan};

/// Diff lines shown per conflict before truncating.
const MAX_DIFF_LINES: usize = 20;

/// Per-target outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Counts {
    pub fn changed(&self) -> usize {
        self.created + self.updated + self.removed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Skipped,
    Failed,
}

/// Outcome of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub target_id: String,
    pub status: SyncStatus,
    pub message: String,
    pub error: Option<String>,
}

/// Terminal report of an apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub source_path: String,
    pub per_target: BTreeMap<String, Counts>,
    pub results: Vec<SyncResult>,
    pub warnings: Vec<String>,
    /// `"<target>: <message>"` entries.
    pub errors: Vec<String>,
    pub had_failures: bool,
}

/// What the plan would do for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPlanSummary {
    pub target_id: String,
    pub display_name: String,
    pub scope: Scope,
    pub create: usize,
    pub update: usize,
    pub skip: usize,
    pub remove: usize,
    pub conflicts: usize,
    pub failures: usize,
}

impl TargetPlanSummary {
    pub fn from_plan(plan: &SyncPlan, target_id: &str, display_name: &str, scope: Scope) -> Self {
        Self {
            target_id: target_id.to_string(),
            display_name: display_name.to_string(),
            scope,
            create: plan.count(target_id, SyncActionKind::Create),
            update: plan.count(target_id, SyncActionKind::Update),
            skip: plan.count(target_id, SyncActionKind::Skip),
            remove: plan.count(target_id, SyncActionKind::Remove),
            conflicts: plan.conflicts_for(target_id),
            failures: plan
                .failures
                .iter()
                .filter(|f| f.target_id == target_id)
                .count(),
        }
    }
}

/// Human-readable plan description shown before confirmation.
pub fn format_plan_summary(plan: &SyncPlan, targets: &[TargetPlanSummary]) -> String {
    let mut lines = vec!["Planned changes:".to_string()];
    for t in targets {
        let mut line = format!(
            "  {} ({}, {}): {} create, {} update, {} remove, {} skip",
            t.display_name, t.target_id, t.scope, t.create, t.update, t.remove, t.skip
        );
        if t.conflicts > 0 {
            line.push_str(&format!(", {} conflict(s)", t.conflicts));
        }
        if t.failures > 0 {
            line.push_str(&format!(", {} failure(s)", t.failures));
        }
        lines.push(line);
    }

    for action in plan.actions.iter().chain(plan.removals.iter()) {
        if action.kind != SyncActionKind::Skip {
            lines.push(format!(
                "  {:<6} {} [{}] {}",
                action.kind, action.output_path, action.target_id, action.reason
            ));
        }
    }

    if !plan.conflicts.is_empty() {
        lines.push(String::new());
        lines.push("Conflicts:".to_string());
        for conflict in &plan.conflicts {
            lines.push(format!(
                "  {} [{}] {} '{}'",
                conflict.output_path, conflict.target_id, conflict.item_type, conflict.item_name
            ));
            lines.extend(
                diff_lines(&conflict.existing_content, &conflict.desired_content)
                    .into_iter()
                    .map(|l| format!("    {l}")),
            );
        }
    }

    for failure in &plan.failures {
        lines.push(format!(
            "  failed {} '{}' [{}]: {}",
            failure.item_type, failure.item_name, failure.target_id, failure.message
        ));
    }
    for warning in &plan.warnings {
        lines.push(format!("Warning: {warning}"));
    }
    lines.join("\n")
}

/// Line diff from existing to desired content, truncated.
fn diff_lines(existing: &str, desired: &str) -> Vec<String> {
    let diff = TextDiff::from_lines(existing, desired);
    let mut lines: Vec<String> = diff
        .iter_all_changes()
        .filter_map(|change| {
            let sign = match change.tag() {
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
                ChangeTag::Equal => return None,
            };
            Some(format!("{sign} {}", change.value().trim_end_matches(['\n', '\r'])))
        })
        .collect();
    if lines.len() > MAX_DIFF_LINES {
        let hidden = lines.len() - MAX_DIFF_LINES;
        lines.truncate(MAX_DIFF_LINES);
        lines.push(format!("... {hidden} more line(s)"));
    }
    lines
}

/// Render a summary as pretty JSON or as newline-joined result messages.
pub fn format_sync_summary(summary: &SyncSummary, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(summary).unwrap_or_else(|e| {
            format!("{{\"error\": \"failed to serialize summary: {e}\"}}")
        });
    }
    summary
        .results
        .iter()
        .map(|r| r.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
