//! Plan builder
//!
//! Computes a [`SyncPlan`] from the catalog, the selected targets, the
//! current filesystem and the provenance ledger. Nothing is written here;
//! the same inputs always produce the same plan.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;

use agentctl_catalog::{Catalog, SourceItem};
use agentctl_fs::{NormalizedPath, compute_bytes_checksum};
use agentctl_targets::{ItemType, Scope, TargetProfile, TemplateContext};

use crate::convert::{ConvertContext, convert};
use crate::ledger::Ledger;
use crate::options::PlanOptions;
use crate::plan::{ActionReason, Conflict, PlanFailure, SyncAction, SyncActionKind, SyncPlan};
use crate::render::{ConvertResult, RenderedFile};
use crate::resolver::{PathState, resolve_conflict};

type ItemKey<'a> = (&'a str, ItemType, &'a str);

struct Desired<'a> {
    target: &'a TargetProfile,
    item: &'a SourceItem,
    file: RenderedFile,
}

/// Scope used for `profile`'s commands under `options`.
pub fn effective_scope(profile: &TargetProfile, options: &PlanOptions) -> Scope {
    options
        .scope_by_target
        .get(&profile.id)
        .copied()
        .filter(|scope| profile.supports_scope(*scope))
        .unwrap_or_else(|| profile.default_scope())
}

/// Build the plan for `targets`.
pub fn build_plan(
    catalog: &Catalog,
    targets: &[TargetProfile],
    templates: &TemplateContext,
    ledger: &Ledger,
    options: &PlanOptions,
) -> SyncPlan {
    let mut targets: Vec<&TargetProfile> = targets.iter().collect();
    targets.sort_by(|a, b| a.id.cmp(&b.id));
    targets.dedup_by(|a, b| a.id == b.id);

    let mut plan = SyncPlan::default();
    let mut claimed: BTreeMap<NormalizedPath, String> = BTreeMap::new();
    let mut desired = Vec::new();

    for &profile in &targets {
        collect_desired(catalog, profile, templates, options, &mut claimed, &mut desired, &mut plan);
    }

    let root = &templates.repo_root;
    for entry in &desired {
        match plan_output(entry, root, ledger, options, &mut claimed, &mut plan.conflicts) {
            Ok(action) => {
                tracing::debug!(
                    target_id = %action.target_id,
                    item = %action.item_name,
                    kind = %action.kind,
                    path = %action.output_path,
                    "Planned action"
                );
                plan.actions.push(action);
            }
            Err(message) => plan.failures.push(PlanFailure {
                target_id: entry.target.id.clone(),
                item_type: entry.item.item_type,
                item_name: entry.item.name.clone(),
                message,
            }),
        }
    }

    if options.remove_missing {
        plan_removals(catalog, &targets, root, ledger, &claimed, &mut plan);
    }

    plan.actions.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    plan.removals.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    plan.conflicts.sort_by(|a, b| {
        (&a.target_id, a.item_type, &a.item_name, &a.output_path)
            .cmp(&(&b.target_id, b.item_type, &b.item_name, &b.output_path))
    });
    plan.failures.sort_by(|a, b| {
        (&a.target_id, a.item_type, &a.item_name).cmp(&(&b.target_id, b.item_type, &b.item_name))
    });
    plan
}

fn collect_desired<'a>(
    catalog: &'a Catalog,
    profile: &'a TargetProfile,
    templates: &TemplateContext,
    options: &PlanOptions,
    claimed: &mut BTreeMap<NormalizedPath, String>,
    desired: &mut Vec<Desired<'a>>,
    plan: &mut SyncPlan,
) {
    let native_skills: BTreeSet<String> = if profile.supports(ItemType::Skill) {
        catalog
            .items_of(ItemType::Skill)
            .filter(|item| item.applies_to(&profile.id))
            .map(|item| item.name.clone())
            .collect()
    } else {
        BTreeSet::new()
    };
    let ctx = ConvertContext {
        templates,
        scope: effective_scope(profile, options),
        options,
        native_skills: &native_skills,
    };

    for item in catalog.items.iter().filter(|i| i.applies_to(&profile.id)) {
        match convert(item, profile, &ctx) {
            ConvertResult::Skipped(reason) => {
                plan.warnings.push(format!(
                    "{}: skipping {} '{}': {}",
                    profile.id, item.item_type, item.name, reason
                ));
            }
            ConvertResult::Satisfied(reason) => {
                tracing::debug!(target_id = %profile.id, item = %item.name, %reason, "Conversion satisfied");
            }
            ConvertResult::Failed(message) => plan.failures.push(PlanFailure {
                target_id: profile.id.clone(),
                item_type: item.item_type,
                item_name: item.name.clone(),
                message,
            }),
            result => {
                for file in result.into_files() {
                    let owner = format!("{} {} '{}'", profile.id, item.item_type, item.name);
                    if let Some(first) = claimed.get(&file.path) {
                        plan.warnings.push(format!(
                            "{owner} maps to {} which is already planned for {first}; skipping",
                            file.path
                        ));
                        continue;
                    }
                    claimed.insert(file.path.clone(), owner);
                    desired.push(Desired {
                        target: profile,
                        item,
                        file,
                    });
                }
            }
        }
    }
}

fn plan_output(
    entry: &Desired<'_>,
    root: &NormalizedPath,
    ledger: &Ledger,
    options: &PlanOptions,
    claimed: &mut BTreeMap<NormalizedPath, String>,
    conflicts: &mut Vec<Conflict>,
) -> Result<SyncAction, String> {
    let target_id = entry.target.id.as_str();
    let item = entry.item;
    let path = &entry.file.path;
    let desired = &entry.file.content;

    let action = |kind, reason| SyncAction {
        kind,
        target_id: target_id.to_string(),
        item_type: item.item_type,
        item_name: item.name.clone(),
        output_path: path.clone(),
        reason,
        content: Some(desired.clone()),
        source_path: Some(item.source_path.clone()),
    };

    let existing = read_existing(path)?;
    let Some(existing) = existing else {
        return Ok(action(SyncActionKind::Create, ActionReason::New));
    };
    if existing == desired.as_bytes() {
        return Ok(action(SyncActionKind::Skip, ActionReason::UpToDate));
    }
    let checksum = compute_bytes_checksum(&existing);
    if ledger.attributes(root, target_id, item.item_type, &item.name, path, &checksum) {
        return Ok(action(SyncActionKind::Update, ActionReason::PreviouslySynced));
    }

    let conflict = Conflict {
        target_id: target_id.to_string(),
        item_type: item.item_type,
        item_name: item.name.clone(),
        output_path: path.clone(),
        existing_content: String::from_utf8_lossy(&existing).into_owned(),
        desired_content: desired.clone(),
        source_path: Some(item.source_path.clone()),
    };
    tracing::warn!(
        target_id,
        item = %item.name,
        path = %path,
        strategy = %options.conflict_strategy,
        "Output path holds unattributed content"
    );

    let resolved = resolve_conflict(&conflict, options.conflict_strategy, |candidate| {
        if claimed.contains_key(candidate) {
            return PathState::Taken;
        }
        match read_existing(candidate) {
            Ok(None) => PathState::Free,
            Ok(Some(bytes)) if bytes == desired.as_bytes() => PathState::InSync,
            Ok(Some(bytes))
                if ledger.attributes(
                    root,
                    target_id,
                    item.item_type,
                    &item.name,
                    candidate,
                    &compute_bytes_checksum(&bytes),
                ) =>
            {
                PathState::Owned
            }
            _ => PathState::Taken,
        }
    });
    if resolved.output_path != *path {
        claimed.insert(
            resolved.output_path.clone(),
            format!("{target_id} {} '{}'", item.item_type, item.name),
        );
    }
    conflicts.push(conflict);
    Ok(resolved)
}

/// Ledger entries of the selected targets whose source item is gone, or
/// whose item now maps to different paths, become removals.
fn plan_removals(
    catalog: &Catalog,
    targets: &[&TargetProfile],
    root: &NormalizedPath,
    ledger: &Ledger,
    claimed: &BTreeMap<NormalizedPath, String>,
    plan: &mut SyncPlan,
) {
    let planned_items: BTreeSet<ItemKey<'_>> = plan
        .actions
        .iter()
        .map(|a| (a.target_id.as_str(), a.item_type, a.item_name.as_str()))
        .collect();
    let planned_paths: BTreeSet<(ItemKey<'_>, &NormalizedPath)> = plan
        .actions
        .iter()
        .map(|a| {
            (
                (a.target_id.as_str(), a.item_type, a.item_name.as_str()),
                &a.output_path,
            )
        })
        .collect();

    let mut removals = Vec::new();
    let mut warnings = Vec::new();
    let mut failures = Vec::new();

    for profile in targets {
        for entry in ledger.entries_for(&profile.id) {
            let key = (profile.id.as_str(), entry.item_type, entry.item_name.as_str());
            let path = entry.resolve(root);
            let in_catalog = catalog.contains(entry.item_type, &entry.item_name);
            let moved = planned_items.contains(&key) && !planned_paths.contains(&(key, &path));
            if (in_catalog && !moved) || claimed.contains_key(&path) {
                continue;
            }

            let action = |kind, reason| SyncAction {
                kind,
                target_id: profile.id.clone(),
                item_type: entry.item_type,
                item_name: entry.item_name.clone(),
                output_path: path.clone(),
                reason,
                content: None,
                source_path: None,
            };
            match read_existing(&path) {
                Ok(None) => removals.push(action(SyncActionKind::Remove, ActionReason::AlreadyRemoved)),
                Ok(Some(bytes)) if compute_bytes_checksum(&bytes) == entry.checksum => {
                    removals.push(action(SyncActionKind::Remove, ActionReason::SourceRemoved));
                }
                Ok(Some(_)) => {
                    warnings.push(format!(
                        "{}: keeping {} because it was modified after sync",
                        profile.id, path
                    ));
                    removals.push(action(SyncActionKind::Skip, ActionReason::ModifiedSinceSync));
                }
                Err(message) => failures.push(PlanFailure {
                    target_id: profile.id.clone(),
                    item_type: entry.item_type,
                    item_name: entry.item_name.clone(),
                    message,
                }),
            }
        }
    }

    plan.removals.extend(removals);
    plan.warnings.extend(warnings);
    plan.failures.extend(failures);
}

fn read_existing(path: &NormalizedPath) -> Result<Option<Vec<u8>>, String> {
    match std::fs::read(path.to_native()) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("failed to read {path}: {e}")),
    }
}
