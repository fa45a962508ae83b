//! Per-kind execution contracts.
//!
//! `execute_kind` runs one task's action to an outcome. It never returns an
//! error to its caller: timeouts, protocol errors, spawn failures and stop
//! requests all collapse into a `TaskOutcome`, and the runner decides control
//! flow from the task's terminal state alone.

use std::time::Duration;

use serde_json::json;

use crate::domain::{RemoteCall, TaskKind, TaskOutcome};

use super::cancel::CancelToken;
use super::context::ExecContext;

pub(crate) async fn execute_kind(
    kind: TaskKind,
    ctx: ExecContext,
    token: CancelToken,
) -> TaskOutcome {
    match kind {
        TaskKind::RemoteCommand {
            server_id,
            feature_id,
            command_id,
            args,
        } => {
            let call = RemoteCall {
                server_id,
                feature_id,
                command_id,
                args,
            };
            execute_remote(call, &ctx, &token).await
        }
        TaskKind::Delay { duration_ms } => {
            execute_delay(Duration::from_millis(duration_ms), &token).await
        }
        TaskKind::LocalProcess { program, args } => {
            execute_process(&program, &args, &ctx, &token).await
        }
    }
}

/// Submit through the dispatcher with the bounded response timeout.
///
/// Distinct terminal conditions, per the error taxonomy:
/// - no response within the timeout -> Error (not Cancelled)
/// - protocol/transport error from the server -> Error with the formatted detail
/// - stop request while waiting -> Cancelled (the in-flight future is dropped)
async fn execute_remote(call: RemoteCall, ctx: &ExecContext, token: &CancelToken) -> TaskOutcome {
    let bounded = tokio::time::timeout(ctx.response_timeout, ctx.dispatcher.submit(&call));

    tokio::select! {
        result = bounded => match result {
            Ok(Ok(value)) => TaskOutcome::success(value),
            Ok(Err(err)) => TaskOutcome::error(format!(
                "remote command {}/{}/{} failed: {err}",
                call.server_id, call.feature_id, call.command_id
            )),
            Err(_) => TaskOutcome::error(format!(
                "no response from server {} within {}s",
                call.server_id,
                ctx.response_timeout.as_secs()
            )),
        },
        _ = token.cancelled() => {
            TaskOutcome::cancelled("remote call interrupted by stop request")
        }
    }
}

/// Interruptible suspension for the configured duration.
async fn execute_delay(duration: Duration, token: &CancelToken) -> TaskOutcome {
    tokio::select! {
        _ = tokio::time::sleep(duration) => TaskOutcome::success(serde_json::Value::Null),
        _ = token.cancelled() => TaskOutcome::cancelled("delay interrupted by stop request"),
    }
}

/// Spawn and wait; a stop request terminates the child before reporting
/// Cancelled.
async fn execute_process(
    program: &str,
    args: &[String],
    ctx: &ExecContext,
    token: &CancelToken,
) -> TaskOutcome {
    let mut handle = match ctx.launcher.spawn(program, args).await {
        Ok(handle) => handle,
        Err(err) => return TaskOutcome::error(format!("failed to start {program}: {err}")),
    };

    let waited = tokio::select! {
        status = handle.wait() => Some(status),
        _ = token.cancelled() => None,
    };

    match waited {
        Some(Ok(status)) => match status.code() {
            Some(0) => TaskOutcome::success(json!({ "exit_code": 0 })),
            Some(code) => TaskOutcome::error(format!("{program} exited with code {code}")),
            None => TaskOutcome::error(format!("{program} was terminated by a signal")),
        },
        Some(Err(err)) => TaskOutcome::error(format!("waiting on {program} failed: {err}")),
        None => {
            if let Err(err) = handle.terminate().await {
                return TaskOutcome::error(format!(
                    "stop requested but terminating {program} failed: {err}"
                ));
            }
            TaskOutcome::cancelled("process terminated by stop request")
        }
    }
}
