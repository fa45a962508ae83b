//! Execution context: what every task execution gets handed.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{CommandDispatcher, ProcessLauncher};

/// Bounded wait for a remote command's response. Independent of run
/// cancellation: expiry is a FinishedError, not a Cancelled, outcome.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Window an in-flight task gets to stop cooperatively after a stop request
/// before its execution context is terminated forcefully.
pub const GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Collaborators and timeouts shared by all executions of one runner.
///
/// Cloned per task; the ports are behind `Arc`, so a clone is cheap.
#[derive(Clone)]
pub struct ExecContext {
    pub(crate) dispatcher: Arc<dyn CommandDispatcher>,
    pub(crate) launcher: Arc<dyn ProcessLauncher>,
    pub(crate) response_timeout: Duration,
    pub(crate) grace_period: Duration,
}

impl ExecContext {
    pub fn new(dispatcher: Arc<dyn CommandDispatcher>, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            dispatcher,
            launcher,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            grace_period: GRACE_PERIOD,
        }
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }
}
