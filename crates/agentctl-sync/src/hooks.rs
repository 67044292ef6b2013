//! Hook runner
//!
//! Runs one target hook and turns a failure into a labeled message for the
//! caller's error sink. Callers decide what a failure aborts.

use std::fmt;

use agentctl_targets::{HookPayload, TargetHook, TargetHooks};

/// The four points a target hook can run at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    BeforeSync,
    AfterSync,
    BeforeConvert,
    AfterConvert,
}

impl HookStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeSync => "before_sync",
            Self::AfterSync => "after_sync",
            Self::BeforeConvert => "before_convert",
            Self::AfterConvert => "after_convert",
        }
    }

    /// The hook registered for this stage, if any.
    pub fn select<'a>(&self, hooks: &'a TargetHooks) -> Option<&'a dyn TargetHook> {
        let slot = match self {
            Self::BeforeSync => &hooks.before_sync,
            Self::AfterSync => &hooks.after_sync,
            Self::BeforeConvert => &hooks.before_convert,
            Self::AfterConvert => &hooks.after_convert,
        };
        slot.as_deref()
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run the `stage` hook from `hooks`.
///
/// Returns `true` when there is no hook or it succeeded. On failure the
/// message `"<stage> hook failed: <error>"` goes to `on_error`.
pub fn run_hook(
    hooks: &TargetHooks,
    stage: HookStage,
    payload: &HookPayload,
    on_error: &mut dyn FnMut(String),
) -> bool {
    let Some(hook) = stage.select(hooks) else {
        return true;
    };
    match hook.run(payload) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(target_id = %payload.target_id, stage = %stage, error = %e, "Hook failed");
            on_error(format!("{stage} hook failed: {e}"));
            false
        }
    }
}
