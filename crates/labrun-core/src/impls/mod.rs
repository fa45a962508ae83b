//! Impls - port implementations shipped with the engine.
//!
//! - **InMemoryDispatcher**: canned-reply dispatcher for development and tests.
//! - **TokioProcessLauncher**: the real local process launcher.
//!
//! A production remote dispatcher (network client, certificate handling,
//! server discovery) lives outside this crate.

pub mod dispatcher;
pub mod process;

pub use self::dispatcher::{CannedReply, InMemoryDispatcher};
pub use self::process::TokioProcessLauncher;
