//! TokioProcessLauncher - the real local process launcher.

use std::io;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::ports::{ProcessHandle, ProcessLauncher};

/// Launches local executables via `tokio::process`.
///
/// Children are spawned with `kill_on_drop`, so even a force-aborted
/// execution context cannot leak a running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn spawn(
        &self,
        program: &str,
        args: &[String],
    ) -> io::Result<Box<dyn ProcessHandle>> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        Ok(Box::new(TokioProcessHandle { child }))
    }
}

struct TokioProcessHandle {
    child: Child,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    async fn terminate(&mut self) -> io::Result<()> {
        // kill() waits for the child to actually exit
        self.child.kill().await
    }
}
