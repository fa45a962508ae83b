//! Execution policy: what a task's failure means for the rest of the run.

use serde::{Deserialize, Serialize};

/// Per-task rule applied by the runner after the task reaches a terminal
/// state. Set at creation/edit time, read-only during a run.
///
/// Serialized as CONTINUE_AFTER_ERROR / HALT_AFTER_ERROR (the persisted-plan
/// vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecPolicy {
    /// A non-success outcome is recorded but the run proceeds to the next task.
    ContinueAfterError,

    /// A non-success outcome stops the run at this task.
    HaltAfterError,
}

impl ExecPolicy {
    /// Does a task that ended in `success = false` halt the remaining run?
    pub fn halts_on_failure(self) -> bool {
        matches!(self, ExecPolicy::HaltAfterError)
    }
}
