//! Conflict resolution
//!
//! Turns a [`Conflict`] into a concrete [`SyncAction`] under the run-wide
//! [`ConflictStrategy`]. The resolver is pure: what it knows about the
//! filesystem comes from the caller's probe.

use agentctl_catalog::SKILL_FILE;
use agentctl_fs::NormalizedPath;
use agentctl_targets::ConflictStrategy;

use crate::plan::{ActionReason, Conflict, SyncAction, SyncActionKind};

/// What currently occupies a candidate output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    /// Nothing on disk and not claimed by another planned output.
    Free,
    /// Already holds the desired bytes.
    InSync,
    /// Written by a previous sync of the same item.
    Owned,
    /// Foreign content, or claimed by another planned output.
    Taken,
}

/// Resolve `conflict` under `strategy`.
///
/// `probe` reports the state of rename candidates; it is not called for
/// the other strategies.
pub fn resolve_conflict<F>(conflict: &Conflict, strategy: ConflictStrategy, mut probe: F) -> SyncAction
where
    F: FnMut(&NormalizedPath) -> PathState,
{
    let action = |kind, output_path, reason, content| SyncAction {
        kind,
        target_id: conflict.target_id.clone(),
        item_type: conflict.item_type,
        item_name: conflict.item_name.clone(),
        output_path,
        reason,
        content,
        source_path: conflict.source_path.clone(),
    };
    let desired = Some(conflict.desired_content.clone());

    match strategy {
        ConflictStrategy::Overwrite => action(
            SyncActionKind::Update,
            conflict.output_path.clone(),
            ActionReason::ConflictOverwritten,
            desired,
        ),
        ConflictStrategy::Skip => action(
            SyncActionKind::Skip,
            conflict.output_path.clone(),
            ActionReason::ConflictSkipped,
            None,
        ),
        ConflictStrategy::Rename => {
            let reason = ActionReason::ConflictRenamed {
                original: conflict.output_path.clone(),
            };
            let mut suffix = 1;
            loop {
                let candidate = renamed_path(&conflict.output_path, suffix);
                let kind = match probe(&candidate) {
                    PathState::Free => SyncActionKind::Create,
                    PathState::InSync => SyncActionKind::Skip,
                    PathState::Owned => SyncActionKind::Update,
                    PathState::Taken => {
                        suffix += 1;
                        continue;
                    }
                };
                return action(kind, candidate, reason, desired);
            }
        }
    }
}

/// Sibling path carrying a numeric suffix.
///
/// Skill entry files keep their name; the skill directory is renamed
/// instead so the target still finds `SKILL.md`.
pub fn renamed_path(path: &NormalizedPath, suffix: usize) -> NormalizedPath {
    match (path.file_name(), path.parent()) {
        (Some(SKILL_FILE), Some(dir)) => dir.with_stem_suffix(suffix).join(SKILL_FILE),
        _ => path.with_stem_suffix(suffix),
    }
}
