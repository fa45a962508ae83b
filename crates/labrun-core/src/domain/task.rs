//! Queued task entity: metadata + kind-specific parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ExecPolicy, TaskId, TaskOutcome, TaskState};

/// Kind-specific parameters of a queued task.
///
/// A closed, internally tagged variant set: the engine dispatches on the kind
/// by pattern match, there is no open-ended registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    /// A remote procedure invocation against a lab-automation server.
    RemoteCommand {
        server_id: String,
        feature_id: String,
        command_id: String,
        #[serde(default)]
        args: Value,
    },

    /// A timed pause between actions.
    Delay { duration_ms: u64 },

    /// A local executable launch.
    LocalProcess {
        program: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
    },
}

impl TaskKind {
    /// Short human-readable label for logs and progress display.
    pub fn label(&self) -> String {
        match self {
            TaskKind::RemoteCommand {
                server_id,
                feature_id,
                command_id,
                ..
            } => format!("remote {server_id}/{feature_id}/{command_id}"),
            TaskKind::Delay { duration_ms } => format!("delay {duration_ms}ms"),
            TaskKind::LocalProcess { program, .. } => format!("process {program}"),
        }
    }
}

/// The addressed remote command of a `TaskKind::RemoteCommand`, in the shape
/// the dispatcher port consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCall {
    pub server_id: String,
    pub feature_id: String,
    pub command_id: String,
    pub args: Value,
}

/// Metadata + parameters for one task in the queue.
///
/// Design:
/// - This is the single source of truth for task state; the runner holds
///   indices only.
/// - All state transitions happen through the `mark_*` methods.
/// - The executing context works on a clone of `kind` and never touches the
///   entity; the runner applies the outcome after the execution has joined,
///   so there is no concurrent read/write window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub policy: ExecPolicy,
    pub state: TaskState,

    /// Opaque success payload (only when state = FinishedSuccess).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Failure detail (only when state = FinishedError or Cancelled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Timestamps set by the runner, for duration reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl QueueTask {
    pub fn new(kind: TaskKind, policy: ExecPolicy) -> Self {
        Self {
            id: TaskId::generate(),
            kind,
            policy,
            state: TaskState::Pending,
            result: None,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Rehydrate a task from a persisted plan record, keeping its stable id.
    pub fn with_id(id: TaskId, kind: TaskKind, policy: ExecPolicy) -> Self {
        Self {
            id,
            ..Self::new(kind, policy)
        }
    }

    pub fn remote_command(
        server_id: impl Into<String>,
        feature_id: impl Into<String>,
        command_id: impl Into<String>,
        args: Value,
        policy: ExecPolicy,
    ) -> Self {
        Self::new(
            TaskKind::RemoteCommand {
                server_id: server_id.into(),
                feature_id: feature_id.into(),
                command_id: command_id.into(),
                args,
            },
            policy,
        )
    }

    pub fn delay(duration: std::time::Duration, policy: ExecPolicy) -> Self {
        Self::new(
            TaskKind::Delay {
                duration_ms: duration.as_millis() as u64,
            },
            policy,
        )
    }

    pub fn local_process(
        program: impl Into<String>,
        args: Vec<String>,
        policy: ExecPolicy,
    ) -> Self {
        Self::new(
            TaskKind::LocalProcess {
                program: program.into(),
                args,
            },
            policy,
        )
    }

    /// Mark as running; called by the runner just before spawning execution.
    pub fn mark_running(&mut self, at: DateTime<Utc>) {
        self.state = TaskState::Running;
        self.started_at = Some(at);
    }

    /// Apply the execution outcome; called by the runner after the execution
    /// context has joined.
    pub fn apply_outcome(&mut self, outcome: TaskOutcome, at: DateTime<Utc>) {
        self.finished_at = Some(at);
        match outcome {
            TaskOutcome::Success(value) => {
                self.state = TaskState::FinishedSuccess;
                self.result = Some(value);
            }
            TaskOutcome::Error(message) => {
                self.state = TaskState::FinishedError;
                self.error = Some(message);
            }
            TaskOutcome::Cancelled(message) => {
                self.state = TaskState::Cancelled;
                self.error = Some(message);
            }
        }
    }

    /// Reset back to Pending, clearing result/error/timestamps.
    pub fn reset(&mut self) {
        self.state = TaskState::Pending;
        self.result = None;
        self.error = None;
        self.started_at = None;
        self.finished_at = None;
    }

    /// Wall-clock duration of the last execution, if it finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
