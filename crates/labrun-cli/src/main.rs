//! Demo: build a small batch, run it, print progress, then show a stop
//! request interrupting a long delay.

use std::sync::Arc;
use std::time::Duration;

use labrun_core::impls::{CannedReply, InMemoryDispatcher, TokioProcessLauncher};
use labrun_core::{ExecPolicy, ExecContext, QueueRunner, QueueTask, RunEvent, TaskQueue};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // (A) a fake lab server: one command answers, one fails
    let dispatcher = InMemoryDispatcher::new().with_latency(Duration::from_millis(200));
    dispatcher.register(
        "pump-01",
        "PumpControl",
        "StartPump",
        CannedReply::Success(serde_json::json!({ "flow_rate": 2.5 })),
    );
    dispatcher.register(
        "pump-01",
        "PumpControl",
        "OpenValve",
        CannedReply::Protocol("valve 3 is blocked".into()),
    );

    let ctx = ExecContext::new(Arc::new(dispatcher), Arc::new(TokioProcessLauncher::new()));

    // (B) assemble the batch
    let mut queue = TaskQueue::new();
    queue.add(QueueTask::remote_command(
        "pump-01",
        "PumpControl",
        "StartPump",
        serde_json::json!({ "rate": 2.5 }),
        ExecPolicy::HaltAfterError,
    ));
    queue.add(QueueTask::delay(
        Duration::from_millis(500),
        ExecPolicy::ContinueAfterError,
    ));
    queue.add(QueueTask::remote_command(
        "pump-01",
        "PumpControl",
        "OpenValve",
        serde_json::json!({}),
        ExecPolicy::ContinueAfterError, // ignore the failure, keep going
    ));
    queue.add(QueueTask::local_process(
        "echo",
        vec!["batch done".into()],
        ExecPolicy::ContinueAfterError,
    ));

    let runner = QueueRunner::new(queue, ctx);

    // (C) print progress as the run unfolds
    let mut events = runner.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                RunEvent::TaskStarted { index, .. } => println!("  [{index}] running..."),
                RunEvent::TaskFinished { index, state, .. } => {
                    println!("  [{index}] -> {state:?}")
                }
                RunEvent::RunFinished { outcome, .. } => {
                    println!("run finished: {outcome:?}");
                    break;
                }
            }
        }
    });

    // (D) run the full batch
    println!("starting batch of {} tasks", runner.counts().await.pending);
    runner.start(0);
    runner.settled().await;
    let _ = printer.await;

    for task in runner.snapshot().await {
        if let Some(error) = &task.error {
            println!("  note: {} failed: {error}", task.kind.label());
        }
    }

    // (E) second run: stop the batch while a long delay is in flight
    runner.acknowledge();
    runner
        .with_queue_mut(|queue| {
            queue.clear();
            queue.add(QueueTask::delay(
                Duration::from_secs(60),
                ExecPolicy::ContinueAfterError,
            ));
        })
        .await
        .expect("queue is editable between runs");

    println!("\nstarting a 60s delay, stopping it after 1s");
    runner.start(0);
    tokio::time::sleep(Duration::from_secs(1)).await;
    runner.request_stop();
    let status = runner.settled().await;
    println!(
        "second run settled as {status:?}: {:?}",
        runner.snapshot().await[0].state
    );
}
