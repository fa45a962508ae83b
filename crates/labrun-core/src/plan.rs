//! Persisted plan data shape.
//!
//! The on-disk format itself is an external concern; this module only pins
//! the record shape the engine reads and writes: an ordered list of
//! `{ id, kind + kind-specific parameters, policy }`. Runtime fields (state,
//! result, timestamps) are deliberately not part of a plan — a loaded queue
//! always starts Pending.

use serde::{Deserialize, Serialize};

use crate::domain::{ExecPolicy, QueueTask, TaskId, TaskKind};

/// How a loaded plan is merged into a non-empty queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Destructive replace: the current queue is cleared first.
    Replace,

    /// The plan's tasks are appended after the current contents.
    Append,
}

/// One task as persisted in a plan, in list (= execution) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: TaskId,
    #[serde(flatten)]
    pub kind: TaskKind,
    pub policy: ExecPolicy,
}

impl PlanRecord {
    pub fn from_task(task: &QueueTask) -> Self {
        Self {
            id: task.id,
            kind: task.kind.clone(),
            policy: task.policy,
        }
    }

    pub fn into_task(self) -> QueueTask {
        QueueTask::with_id(self.id, self.kind, self.policy)
    }
}
