//! Ports - boundary traits.
//!
//! Everything the engine needs from the outside world goes through a trait
//! here: the remote-call dispatcher and the local process launcher. The
//! traits are the seam for swapping implementations (real SiLA-style client,
//! in-memory test double, ...).

pub mod dispatch;
pub mod process;

pub use self::dispatch::{CommandDispatcher, DispatchError};
pub use self::process::{ProcessHandle, ProcessLauncher};
