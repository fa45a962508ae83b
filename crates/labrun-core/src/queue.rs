//! TaskQueue: the ordered, editable task list.
//!
//! Design:
//! - Insertion order is execution order; reordering is an adjacent swap.
//! - The queue owns no "currently running" notion — that lives in the runner.
//! - Edit operations are only legal while no run is active; the runner's
//!   `with_queue_mut` enforces this at the boundary.

use serde::{Deserialize, Serialize};

use crate::domain::{QueueTask, TaskState};
use crate::error::EngineError;
use crate::plan::{LoadMode, PlanRecord};

/// Per-state task counts, for observability and status display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub pending: usize,
    pub running: usize,
    pub finished_success: usize,
    pub finished_error: usize,
    pub cancelled: usize,
}

/// Ordered, mutable sequence of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: Vec<QueueTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a task at the end.
    pub fn add(&mut self, task: QueueTask) {
        self.tasks.push(task);
    }

    /// Insert a task at `index` (index == len appends).
    pub fn insert_at(&mut self, index: usize, task: QueueTask) -> Result<(), EngineError> {
        if index > self.tasks.len() {
            return Err(EngineError::OutOfBounds {
                index,
                len: self.tasks.len(),
            });
        }
        self.tasks.insert(index, task);
        Ok(())
    }

    /// Remove and return the task at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<QueueTask, EngineError> {
        self.check_index(index)?;
        Ok(self.tasks.remove(index))
    }

    /// Swap the task at `index` with its predecessor. A no-op at index 0.
    pub fn move_up(&mut self, index: usize) -> Result<(), EngineError> {
        self.check_index(index)?;
        if index > 0 {
            self.tasks.swap(index, index - 1);
        }
        Ok(())
    }

    /// Swap the task at `index` with its successor. A no-op at the last index.
    pub fn move_down(&mut self, index: usize) -> Result<(), EngineError> {
        self.check_index(index)?;
        if index + 1 < self.tasks.len() {
            self.tasks.swap(index, index + 1);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn task_at(&self, index: usize) -> Result<&QueueTask, EngineError> {
        self.check_index(index)?;
        Ok(&self.tasks[index])
    }

    pub(crate) fn task_at_mut(&mut self, index: usize) -> Result<&mut QueueTask, EngineError> {
        self.check_index(index)?;
        Ok(&mut self.tasks[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueTask> {
        self.tasks.iter()
    }

    /// Reset every task back to Pending; must run before a full (re)start.
    pub fn reset_all_states(&mut self) {
        for task in &mut self.tasks {
            task.reset();
        }
    }

    /// Reset only `[from, len)`, preserving earlier outcomes for inspection
    /// (the run-from-here case).
    pub fn reset_states_from(&mut self, from: usize) {
        for task in self.tasks.iter_mut().skip(from) {
            task.reset();
        }
    }

    /// Point-in-time clone of all tasks, for presentation.
    pub fn snapshot(&self) -> Vec<QueueTask> {
        self.tasks.clone()
    }

    /// Per-state counts.
    pub fn counts(&self) -> QueueCounts {
        let mut counts = QueueCounts::default();
        for task in &self.tasks {
            match task.state {
                TaskState::Pending => counts.pending += 1,
                TaskState::Running => counts.running += 1,
                TaskState::FinishedSuccess => counts.finished_success += 1,
                TaskState::FinishedError => counts.finished_error += 1,
                TaskState::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    /// Load a persisted plan, either replacing or appending to the current
    /// contents as selected by the caller.
    pub fn hydrate(&mut self, records: Vec<PlanRecord>, mode: LoadMode) {
        if mode == LoadMode::Replace {
            self.tasks.clear();
        }
        self.tasks
            .extend(records.into_iter().map(PlanRecord::into_task));
    }

    /// Serialize the current queue in plan order.
    pub fn to_records(&self) -> Vec<PlanRecord> {
        self.tasks.iter().map(PlanRecord::from_task).collect()
    }

    fn check_index(&self, index: usize) -> Result<(), EngineError> {
        if index >= self.tasks.len() {
            return Err(EngineError::OutOfBounds {
                index,
                len: self.tasks.len(),
            });
        }
        Ok(())
    }
}
