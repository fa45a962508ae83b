//! App - the execution layer.
//!
//! - **ExecContext**: collaborators + timeouts handed to every execution.
//! - **execute**: per-kind execution contracts (remote call, delay, process).
//! - **QueueRunner**: the sequential run state machine and policy evaluator.
//! - **cancel**: cooperative stop signal with grace-period escalation.

pub mod cancel;
pub mod context;
pub mod execute;
pub mod runner;

pub use self::cancel::{CancelToken, CancellationController};
pub use self::context::{DEFAULT_RESPONSE_TIMEOUT, ExecContext, GRACE_PERIOD};
pub use self::runner::QueueRunner;
