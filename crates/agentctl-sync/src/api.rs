//! Plan/apply entry points used by the CLI
//!
//! [`plan_slash_command_sync`] resolves a [`SyncRequest`] against the
//! repository configuration, loads the catalog and the ledger, and builds
//! the plan. [`apply_slash_command_sync`] executes it. Neither prompts.

use std::collections::BTreeMap;
use std::path::PathBuf;

use agentctl_catalog::Catalog;
use agentctl_fs::NormalizedPath;
use agentctl_targets::{
    AgentsConfig, ConflictStrategy, FallbackPolicy, Scope, SyncDefaults, TargetProfile,
    TargetRegistry, TemplateContext,
};

use crate::apply::apply_plan;
use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::options::{CodexConversionScope, CodexOption, PlanOptions};
use crate::plan::SyncPlan;
use crate::planner::{build_plan, effective_scope};
use crate::summary::{SyncSummary, TargetPlanSummary};

/// A sync run as asked for by the caller. Unset options fall back to the
/// `[sync]` table of `agents/agentctl.toml`, then to built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    pub repo_root: PathBuf,
    /// Overrides the user's home directory for global outputs.
    pub home_dir: Option<PathBuf>,
    /// Target names or aliases.
    pub targets: Vec<String>,
    /// Command scope per target name.
    pub scope_by_target: BTreeMap<String, Scope>,
    pub remove_missing: Option<bool>,
    pub unsupported_fallback: Option<FallbackPolicy>,
    pub codex_option: Option<CodexOption>,
    pub codex_conversion_scope: Option<CodexConversionScope>,
    pub conflict_resolution: Option<ConflictStrategy>,
    /// The caller accepted defaults instead of answering prompts.
    pub use_defaults: bool,
    pub non_interactive: bool,
}

/// Everything needed to show and apply a plan.
#[derive(Debug, Clone)]
pub struct SyncPlanDetails {
    pub request: SyncRequest,
    pub options: PlanOptions,
    pub profiles: Vec<TargetProfile>,
    pub templates: TemplateContext,
    pub catalog: Catalog,
    pub ledger: Ledger,
    pub plan: SyncPlan,
    pub target_summaries: Vec<TargetPlanSummary>,
    pub conflict_count: usize,
}

impl SyncPlanDetails {
    fn build(
        request: SyncRequest,
        options: PlanOptions,
        profiles: Vec<TargetProfile>,
        templates: TemplateContext,
        catalog: Catalog,
        ledger: Ledger,
    ) -> Self {
        let plan = build_plan(&catalog, &profiles, &templates, &ledger, &options);
        let target_summaries = profiles
            .iter()
            .map(|p| {
                TargetPlanSummary::from_plan(&plan, &p.id, &p.display_name, effective_scope(p, &options))
            })
            .collect();
        let conflict_count = plan.conflicts.len();
        Self {
            request,
            options,
            profiles,
            templates,
            catalog,
            ledger,
            plan,
            target_summaries,
            conflict_count,
        }
    }

    /// Rebuild the plan with a different conflict strategy.
    pub fn replan(&self, strategy: ConflictStrategy) -> Self {
        let mut request = self.request.clone();
        request.conflict_resolution = Some(strategy);
        let options = PlanOptions {
            conflict_strategy: strategy,
            ..self.options.clone()
        };
        Self::build(
            request,
            options,
            self.profiles.clone(),
            self.templates.clone(),
            self.catalog.clone(),
            self.ledger.clone(),
        )
    }
}

/// Plan a sync using the targets configured for the repository.
pub fn plan_slash_command_sync(request: &SyncRequest) -> Result<SyncPlanDetails> {
    let root = checked_root(request)?;
    let config = AgentsConfig::load(root.as_ref())?;
    let registry = TargetRegistry::from_config(&config)?;
    plan_with(request, &registry, &config.sync)
}

/// Plan a sync against a prebuilt registry, e.g. one carrying code hooks.
pub fn plan_slash_command_sync_with_registry(
    request: &SyncRequest,
    registry: &TargetRegistry,
) -> Result<SyncPlanDetails> {
    let root = checked_root(request)?;
    let config = AgentsConfig::load(root.as_ref())?;
    plan_with(request, registry, &config.sync)
}

/// Apply a plan produced by [`plan_slash_command_sync`].
pub fn apply_slash_command_sync(details: &SyncPlanDetails) -> SyncSummary {
    let mut ledger = details.ledger.clone();
    apply_plan(&details.plan, &details.profiles, &details.templates, &mut ledger)
}

/// Canonical target ids selected by `--only` or `--skip`.
///
/// With neither, every registered target is selected.
pub fn select_targets(registry: &TargetRegistry, only: &[String], skip: &[String]) -> Result<Vec<String>> {
    if !only.is_empty() && !skip.is_empty() {
        return Err(Error::configuration("--skip and --only cannot be used together"));
    }
    let canonical = |names: &[String]| -> Result<Vec<String>> {
        names
            .iter()
            .map(|name| canonical_id(registry, name))
            .collect()
    };

    let mut selected: Vec<String> = if only.is_empty() {
        let skipped = canonical(skip)?;
        registry
            .ids()
            .into_iter()
            .filter(|id| !skipped.iter().any(|s| s == id))
            .map(str::to_string)
            .collect()
    } else {
        canonical(only)?
    };
    selected.sort();
    selected.dedup();
    Ok(selected)
}

fn checked_root(request: &SyncRequest) -> Result<NormalizedPath> {
    let root = NormalizedPath::new(&request.repo_root);
    if !root.is_dir() {
        return Err(Error::configuration(format!(
            "repository root {} is not a directory",
            request.repo_root.display()
        )));
    }
    Ok(root)
}

fn canonical_id(registry: &TargetRegistry, name: &str) -> Result<String> {
    registry.canonical_id(name).map(str::to_string).ok_or_else(|| {
        Error::configuration(format!(
            "unknown target '{}' (known targets: {})",
            name.trim(),
            registry.ids().join(", ")
        ))
    })
}

fn plan_with(request: &SyncRequest, registry: &TargetRegistry, defaults: &SyncDefaults) -> Result<SyncPlanDetails> {
    let root = checked_root(request)?;
    if request.targets.is_empty() {
        return Err(Error::configuration("no targets selected"));
    }

    let mut profiles = Vec::new();
    for name in &request.targets {
        let id = canonical_id(registry, name)?;
        if let Some(profile) = registry.get(&id)
            && !profiles.iter().any(|p: &TargetProfile| p.id == profile.id)
        {
            profiles.push(profile.clone());
        }
    }
    profiles.sort_by(|a, b| a.id.cmp(&b.id));

    let mut scope_by_target = BTreeMap::new();
    for (name, scope) in &request.scope_by_target {
        scope_by_target.insert(canonical_id(registry, name)?, *scope);
    }

    let home_dir = match &request.home_dir {
        Some(dir) => dir.clone(),
        None => dirs::home_dir().ok_or_else(|| Error::configuration("could not determine the home directory"))?,
    };
    let templates = TemplateContext::new(&root, &home_dir);

    let options = PlanOptions {
        scope_by_target,
        remove_missing: request.remove_missing.or(defaults.remove_missing).unwrap_or(true),
        unsupported_fallback: request
            .unsupported_fallback
            .or(defaults.unsupported_fallback)
            .unwrap_or_default(),
        codex_option: request.codex_option.unwrap_or_default(),
        codex_conversion_scope: request.codex_conversion_scope.unwrap_or_default(),
        conflict_strategy: request
            .conflict_resolution
            .or(defaults.conflicts)
            .unwrap_or_default(),
    };
    tracing::debug!(
        targets = ?profiles.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        conflicts = %options.conflict_strategy,
        remove_missing = options.remove_missing,
        "Resolved sync options"
    );

    let catalog = agentctl_catalog::load(root.as_ref(), registry)?;
    let ledger = Ledger::load(&root)?;

    let mut request = request.clone();
    request.conflict_resolution = Some(options.conflict_strategy);
    Ok(SyncPlanDetails::build(request, options, profiles, templates, catalog, ledger))
}
