//! Task and run state machines.

use serde::{Deserialize, Serialize};

/// State of a single queued task.
///
/// State transitions:
/// - Pending -> Running -> FinishedSuccess
/// - Pending -> Running -> FinishedError
/// - Pending -> Running -> Cancelled (stop request reached the task mid-flight)
/// - Pending -> Cancelled does not exist: tasks never reached by an aborted
///   run simply stay Pending.
///
/// A terminal state goes back to Pending only through an explicit reset
/// before a new run, never otherwise.
///
/// Serialized as SCREAMING_SNAKE_CASE to match the persisted-plan vocabulary
/// (PENDING / RUNNING / FINISHED_SUCCESS / FINISHED_ERROR / CANCELLED).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Waiting for its turn in the queue.
    Pending,

    /// Currently being executed by the runner.
    Running,

    /// Completed, action succeeded.
    FinishedSuccess,

    /// Completed, action failed (timeout, protocol error, process failure, ...).
    FinishedError,

    /// Stopped by an operator stop request before completing.
    Cancelled,
}

impl TaskState {
    /// Is this a terminal state (no further transitions until reset)?
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::FinishedSuccess | TaskState::FinishedError | TaskState::Cancelled
        )
    }
}

/// Live status of the queue runner.
///
/// Transitions: Idle -> Running -> {Completed, Aborted} -> Idle (after
/// acknowledgment), with Running -> Aborting -> Aborted on a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// No run active; the queue may be edited.
    Idle,

    /// Sequential loop in progress.
    Running,

    /// Stop requested, waiting for the in-flight task to wind down.
    Aborting,

    /// The loop reached its end (possibly with ignored or halting failures).
    Completed,

    /// The run was stopped by the operator.
    Aborted,
}

impl RunStatus {
    /// Has the run reached a resting state (editable queue)?
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            RunStatus::Idle | RunStatus::Completed | RunStatus::Aborted
        )
    }
}

/// Final result of one run, reported once the runner settles.
///
/// Deliberately finer-grained than `RunStatus`: "ran to the end with every
/// task green", "ran to the end over ignored failures" and "halted at index i
/// by policy" are three different answers to "how did the run go", even
/// though all three settle as `RunStatus::Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// Every task reached FinishedSuccess.
    Completed,

    /// The loop reached the end, but `failed` tasks finished non-success
    /// under ContinueAfterError.
    CompletedWithFailures { failed: usize },

    /// A non-success task with HaltAfterError stopped the run at `index`.
    HaltedAt { index: usize },

    /// Operator stop request ended the run.
    Aborted,
}
