//! Outcome model: the result shape an execution context reports back.
//!
//! This module is architecture-agnostic: it does not assume how tasks are
//! scheduled or cancelled, it only defines the "shape" of results the runner
//! turns into terminal task state.

use serde_json::Value;

/// Result of executing one task, as reported by its execution context.
///
/// Every failure mode is absorbed into this value — execution never raises
/// past the runner. The runner maps:
/// - `Success` -> `TaskState::FinishedSuccess` (payload stored on the task)
/// - `Error` -> `TaskState::FinishedError` (message stored on the task)
/// - `Cancelled` -> `TaskState::Cancelled`
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Action completed; opaque success payload (decoded remote result,
    /// process exit report, ...).
    Success(Value),

    /// Action failed: timeout, protocol error, non-zero exit, spawn failure,
    /// malformed configuration, or an internal fault caught at the boundary.
    Error(String),

    /// A stop request interrupted the action before completion.
    Cancelled(String),
}

impl TaskOutcome {
    pub fn success(value: Value) -> Self {
        TaskOutcome::Success(value)
    }

    pub fn error(message: impl Into<String>) -> Self {
        TaskOutcome::Error(message.into())
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        TaskOutcome::Cancelled(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }
}
