//! Domain model (IDs, task entity, states, policy, outcomes, events).

pub mod events;
pub mod ids;
pub mod outcome;
pub mod policy;
pub mod state;
pub mod task;

pub use self::events::RunEvent;
pub use self::ids::{RunId, TaskId};
pub use self::outcome::TaskOutcome;
pub use self::policy::ExecPolicy;
pub use self::state::{RunOutcome, RunStatus, TaskState};
pub use self::task::{QueueTask, RemoteCall, TaskKind};
