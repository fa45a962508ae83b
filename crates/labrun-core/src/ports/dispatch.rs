//! Remote-call dispatcher port.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::RemoteCall;

/// Failure reported by the dispatcher for a submitted call.
///
/// The bounded response timeout is *not* part of this taxonomy on purpose:
/// the engine applies it around `submit` and treats "no response in time" as
/// its own terminal condition, distinct from an error the server actually
/// returned.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The server returned a defined error for the call.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The call never reached the server (connection refused, ...).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Submits remote procedure invocations to lab-automation servers.
///
/// Implementations own connection lifecycle, protocol handling and result
/// decoding; the engine only sees a decoded JSON result or a `DispatchError`.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn submit(&self, call: &RemoteCall) -> Result<Value, DispatchError>;
}
