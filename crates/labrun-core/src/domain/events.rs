//! Run progress events.
//!
//! Observation boundary only: the runner broadcasts these for progress
//! display and does not depend on anyone listening.

use super::{RunId, RunOutcome, TaskId, TaskState};

/// One observable transition during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Task at `index` entered Running.
    TaskStarted {
        run_id: RunId,
        index: usize,
        task_id: TaskId,
    },

    /// Task at `index` reached a terminal state.
    TaskFinished {
        run_id: RunId,
        index: usize,
        task_id: TaskId,
        state: TaskState,
    },

    /// The run settled; `outcome` is the run-level result.
    RunFinished { run_id: RunId, outcome: RunOutcome },
}
