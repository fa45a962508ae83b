//! Cooperative cancellation signal.
//!
//! One watch channel per run: the controller side is written once per stop
//! request, the token side is cloned into every execution context. Dropping
//! the controller counts as cancellation, so a torn-down runner can never
//! strand a task waiting on a signal that will not come.

use tokio::sync::watch;

/// Write side of the stop signal; owned by the runner for the duration of a
/// run.
pub struct CancellationController {
    tx: watch::Sender<bool>,
}

impl CancellationController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A token observing this controller. Cheap to clone.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Signal cancellation. Write-once in spirit: repeated calls are no-ops.
    pub fn trigger(&self) {
        // send_replace updates the value even when every token is gone
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancellationController {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the stop signal, observed cooperatively at every suspension
/// point of an execution context.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is signalled (or the controller is gone).
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // controller dropped: treat as a stop
                return;
            }
        }
    }
}
