//! Local process launcher port.

use std::io;
use std::process::ExitStatus;

use async_trait::async_trait;

/// A spawned child process the engine can wait on or terminate.
#[async_trait]
pub trait ProcessHandle: Send {
    /// Wait for the child to exit.
    async fn wait(&mut self) -> io::Result<ExitStatus>;

    /// Terminate the child. Must not return before the child is gone, so the
    /// runner can report Cancelled without leaking the process.
    async fn terminate(&mut self) -> io::Result<()>;
}

/// Spawns local executables.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn spawn(&self, program: &str, args: &[String])
    -> io::Result<Box<dyn ProcessHandle>>;
}
