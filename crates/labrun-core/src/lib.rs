//! labrun-core
//!
//! Sequential task-queue execution engine for lab-automation batches.
//!
//! # Module layout
//! - **domain**: entity model (ids, task + kinds, states, policy, outcome, events)
//! - **queue**: `TaskQueue`, the ordered, editable task list
//! - **plan**: persisted plan data shape (hydrate / serialize)
//! - **ports**: boundary traits (`CommandDispatcher`, `ProcessLauncher`)
//! - **impls**: in-process implementations (in-memory dispatcher, tokio launcher)
//! - **app**: the runner (`QueueRunner`), execution context, cancellation

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod plan;
pub mod ports;
pub mod queue;

pub use app::{CancelToken, CancellationController, ExecContext, QueueRunner};
pub use domain::{
    ExecPolicy, QueueTask, RemoteCall, RunEvent, RunId, RunOutcome, RunStatus, TaskId, TaskKind,
    TaskOutcome, TaskState,
};
pub use error::EngineError;
pub use plan::{LoadMode, PlanRecord};
pub use queue::{QueueCounts, TaskQueue};
