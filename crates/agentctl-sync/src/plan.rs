//! Declarative sync plan types

use std::fmt;

use agentctl_fs::NormalizedPath;
use agentctl_targets::ItemType;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncActionKind {
    Create,
    Update,
    Skip,
    Remove,
}

impl SyncActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Skip => "skip",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for SyncActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the planner chose an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ActionReason {
    /// Nothing exists at the output path yet.
    New,
    /// The output already holds the desired bytes.
    UpToDate,
    /// The output was written by a previous sync of this item.
    PreviouslySynced,
    /// A foreign file is replaced under the `overwrite` strategy.
    ConflictOverwritten,
    /// The desired content goes to a sibling of the foreign file.
    ConflictRenamed { original: NormalizedPath },
    /// A foreign file is left alone under the `skip` strategy.
    ConflictSkipped,
    /// The source item is gone and the output is unchanged since sync.
    SourceRemoved,
    /// The source item is gone but the output was edited after sync.
    ModifiedSinceSync,
    /// The source item is gone and so is its output.
    AlreadyRemoved,
}

impl ActionReason {
    /// Whether applying the action leaves the path owned by this item.
    pub fn claims_output(&self) -> bool {
        matches!(
            self,
            Self::New
                | Self::UpToDate
                | Self::PreviouslySynced
                | Self::ConflictOverwritten
                | Self::ConflictRenamed { .. }
        )
    }
}

impl fmt::Display for ActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new output"),
            Self::UpToDate => f.write_str("already in sync"),
            Self::PreviouslySynced => f.write_str("previously synced"),
            Self::ConflictOverwritten => f.write_str("conflict resolved by overwrite"),
            Self::ConflictRenamed { original } => {
                write!(f, "conflict with {original} resolved by rename")
            }
            Self::ConflictSkipped => f.write_str("conflict left unresolved"),
            Self::SourceRemoved => f.write_str("source item removed"),
            Self::ModifiedSinceSync => f.write_str("modified since last sync"),
            Self::AlreadyRemoved => f.write_str("output already removed"),
        }
    }
}

/// One planned filesystem effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncAction {
    pub kind: SyncActionKind,
    pub target_id: String,
    pub item_type: ItemType,
    pub item_name: String,
    pub output_path: NormalizedPath,
    #[serde(flatten)]
    pub reason: ActionReason,
    /// Bytes to write for create/update; desired bytes for in-sync skips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Source file the output is derived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<NormalizedPath>,
}

impl SyncAction {
    pub(crate) fn sort_key(&self) -> (&str, ItemType, &str, &NormalizedPath) {
        (
            &self.target_id,
            self.item_type,
            &self.item_name,
            &self.output_path,
        )
    }
}

/// A desired output whose path holds content not attributable to this item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub target_id: String,
    pub item_type: ItemType,
    pub item_name: String,
    pub output_path: NormalizedPath,
    pub existing_content: String,
    pub desired_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<NormalizedPath>,
}

/// An item that could not be converted for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanFailure {
    pub target_id: String,
    pub item_type: ItemType,
    pub item_name: String,
    pub message: String,
}

/// The complete, side-effect-free description of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    /// Create/update/skip actions ordered by target, item kind, item name, path.
    pub actions: Vec<SyncAction>,
    pub conflicts: Vec<Conflict>,
    /// Remove actions, plus skips for orphans edited after sync.
    pub removals: Vec<SyncAction>,
    pub failures: Vec<PlanFailure>,
    pub warnings: Vec<String>,
}

impl SyncPlan {
    /// Actions and removals for one target, in apply order.
    pub fn actions_for<'a>(&'a self, target_id: &'a str) -> impl Iterator<Item = &'a SyncAction> {
        self.actions
            .iter()
            .chain(self.removals.iter())
            .filter(move |a| a.target_id == target_id)
    }

    /// Number of actions of `kind` across actions and removals.
    pub fn count(&self, target_id: &str, kind: SyncActionKind) -> usize {
        self.actions_for(target_id).filter(|a| a.kind == kind).count()
    }

    pub fn conflicts_for(&self, target_id: &str) -> usize {
        self.conflicts
            .iter()
            .filter(|c| c.target_id == target_id)
            .count()
    }

    /// True when applying the plan would change nothing on disk.
    pub fn is_noop(&self) -> bool {
        self.failures.is_empty()
            && self
                .actions
                .iter()
                .chain(self.removals.iter())
                .all(|a| a.kind == SyncActionKind::Skip)
    }
}
