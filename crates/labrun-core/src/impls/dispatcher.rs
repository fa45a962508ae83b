//! InMemoryDispatcher - canned-reply dispatcher for development and tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::RemoteCall;
use crate::ports::{CommandDispatcher, DispatchError};

/// What the fake server answers for a registered command.
#[derive(Debug, Clone)]
pub enum CannedReply {
    Success(Value),
    Protocol(String),
    Transport(String),

    /// Never answer; lets tests exercise the bounded response timeout.
    NoResponse,
}

/// In-process dispatcher with per-command canned replies.
///
/// Unregistered commands succeed and echo the call back, so a demo queue
/// works without any setup. An optional artificial latency is applied to
/// every call.
pub struct InMemoryDispatcher {
    replies: Mutex<HashMap<String, CannedReply>>,
    latency: Duration,
}

impl InMemoryDispatcher {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register the reply for `server_id/feature_id/command_id`.
    pub fn register(
        &self,
        server_id: &str,
        feature_id: &str,
        command_id: &str,
        reply: CannedReply,
    ) {
        let key = format!("{server_id}/{feature_id}/{command_id}");
        self.replies
            .lock()
            .expect("reply table lock poisoned")
            .insert(key, reply);
    }

    fn reply_for(&self, call: &RemoteCall) -> CannedReply {
        let key = format!(
            "{}/{}/{}",
            call.server_id, call.feature_id, call.command_id
        );
        let replies = self.replies.lock().expect("reply table lock poisoned");
        match replies.get(&key) {
            Some(reply) => reply.clone(),
            None => CannedReply::Success(serde_json::json!({
                "server_id": call.server_id,
                "feature_id": call.feature_id,
                "command_id": call.command_id,
                "echo": call.args,
            })),
        }
    }
}

impl Default for InMemoryDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandDispatcher for InMemoryDispatcher {
    async fn submit(&self, call: &RemoteCall) -> Result<Value, DispatchError> {
        // resolve the reply before any await so the lock is never held across one
        let reply = self.reply_for(call);

        if self.latency > Duration::ZERO {
            tokio::time::sleep(self.latency).await;
        }

        match reply {
            CannedReply::Success(value) => Ok(value),
            CannedReply::Protocol(message) => Err(DispatchError::Protocol(message)),
            CannedReply::Transport(message) => Err(DispatchError::Transport(message)),
            CannedReply::NoResponse => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
