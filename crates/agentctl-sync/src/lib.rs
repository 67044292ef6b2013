//! Catalog synchronization for agentctl
//!
//! A sync run is split in two phases:
//!
//! 1. **Plan**: [`build_plan`] converts every catalog item for every selected
//!    target, compares the result with what is on disk and with the
//!    provenance [`Ledger`], and produces a [`SyncPlan`]. Unattributed files
//!    in the way become [`Conflict`]s, resolved by the run-wide
//!    [`ConflictStrategy`](agentctl_targets::ConflictStrategy).
//! 2. **Apply**: [`apply_plan`] performs the writes and removals in plan
//!    order, runs target hooks around them and reports a [`SyncSummary`].
//!    A failing hook or write only affects its own target.
//!
//! [`plan_slash_command_sync`] and [`apply_slash_command_sync`] wrap both
//! phases for the CLI.

pub mod api;
pub mod apply;
pub mod convert;
pub mod error;
pub mod hooks;
pub mod ledger;
pub mod options;
pub mod plan;
pub mod planner;
pub mod render;
pub mod resolver;
pub mod summary;

pub use api::{
    SyncPlanDetails, SyncRequest, apply_slash_command_sync, plan_slash_command_sync,
    plan_slash_command_sync_with_registry, select_targets,
};
pub use apply::apply_plan;
pub use convert::{ConvertContext, convert};
pub use error::{Error, Result};
pub use hooks::{HookStage, run_hook};
pub use ledger::{LEDGER_FILE, Ledger, LedgerEntry, STATE_DIR};
pub use options::{CodexConversionScope, CodexOption, PlanOptions};
pub use plan::{ActionReason, Conflict, PlanFailure, SyncAction, SyncActionKind, SyncPlan};
pub use planner::{build_plan, effective_scope};
pub use render::{ConvertResult, RenderedFile};
pub use resolver::{PathState, renamed_path, resolve_conflict};
pub use summary::{
    Counts, SyncResult, SyncStatus, SyncSummary, TargetPlanSummary, format_plan_summary,
    format_sync_summary,
};
