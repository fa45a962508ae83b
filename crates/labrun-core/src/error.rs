use thiserror::Error;

/// Engine API misuse errors.
///
/// Note the asymmetry with task failures: anything that goes wrong *inside* a
/// task is absorbed into the task's terminal state and never surfaces here.
/// `EngineError` covers only calls the engine refuses to perform.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("task index {index} out of bounds (len={len})")]
    OutOfBounds { index: usize, len: usize },

    #[error("queue is locked by an active run")]
    RunActive,
}
