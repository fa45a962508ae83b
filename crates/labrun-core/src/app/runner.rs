//! QueueRunner - sequential run state machine.
//!
//! One runner drives one `TaskQueue`. A run executes tasks strictly in queue
//! order on a spawned loop; each task's action runs on its own spawned
//! execution context so a blocking action never prevents the loop from
//! observing a stop request. After every task the runner consults the task's
//! execution policy to continue or halt.
//!
//! # Stop protocol
//! `request_stop` sets the cooperative cancel signal and returns immediately.
//! The loop, while joining the in-flight execution, gives it the grace period
//! to wind down on its own, then force-aborts the execution context. The task
//! is marked Cancelled if it had not already reached a terminal state.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::domain::{
    QueueTask, RunEvent, RunId, RunOutcome, RunStatus, TaskKind, TaskOutcome, TaskState,
};
use crate::error::EngineError;
use crate::queue::{QueueCounts, TaskQueue};

use super::cancel::{CancelToken, CancellationController};
use super::context::ExecContext;
use super::execute::execute_kind;

/// Run-scoped bookkeeping behind a short-lived lock (never held across await).
struct RunControl {
    cancel: Option<CancellationController>,
    cursor: Option<usize>,
    last_outcome: Option<RunOutcome>,
}

struct RunnerInner {
    queue: tokio::sync::Mutex<TaskQueue>,
    ctx: ExecContext,
    status_tx: watch::Sender<RunStatus>,
    events_tx: broadcast::Sender<RunEvent>,
    control: std::sync::Mutex<RunControl>,
}

/// Drives sequential execution of a task queue.
///
/// Cheap to clone; all clones share the same queue and run state, so one
/// handle can sit in a UI layer requesting stops while another observes
/// progress.
#[derive(Clone)]
pub struct QueueRunner {
    inner: Arc<RunnerInner>,
}

impl QueueRunner {
    pub fn new(queue: TaskQueue, ctx: ExecContext) -> Self {
        let (status_tx, _) = watch::channel(RunStatus::Idle);
        let (events_tx, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(RunnerInner {
                queue: tokio::sync::Mutex::new(queue),
                ctx,
                status_tx,
                events_tx,
                control: std::sync::Mutex::new(RunControl {
                    cancel: None,
                    cursor: None,
                    last_outcome: None,
                }),
            }),
        }
    }

    /// Live run status.
    pub fn status(&self) -> RunStatus {
        *self.inner.status_tx.borrow()
    }

    /// Watch side of the status, for callers that want to await transitions.
    pub fn status_rx(&self) -> watch::Receiver<RunStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Subscribe to per-task and run-level progress events. Purely an
    /// observation boundary: the runner never depends on anyone listening.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Index of the task currently executing, if any.
    pub fn cursor(&self) -> Option<usize> {
        self.inner
            .control
            .lock()
            .expect("control lock poisoned")
            .cursor
    }

    /// Outcome of the most recently settled run.
    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.inner
            .control
            .lock()
            .expect("control lock poisoned")
            .last_outcome
    }

    /// Point-in-time clone of the queue for presentation.
    pub async fn snapshot(&self) -> Vec<QueueTask> {
        self.inner.queue.lock().await.snapshot()
    }

    /// Per-state task counts.
    pub async fn counts(&self) -> QueueCounts {
        self.inner.queue.lock().await.counts()
    }

    /// Edit the queue. Refused while a run is active; this is the boundary
    /// guard for the "no structural mutation during a run" invariant.
    pub async fn with_queue_mut<R>(
        &self,
        edit: impl FnOnce(&mut TaskQueue) -> R,
    ) -> Result<R, EngineError> {
        if !self.status().is_settled() {
            return Err(EngineError::RunActive);
        }
        let mut queue = self.inner.queue.lock().await;
        Ok(edit(&mut queue))
    }

    /// Acknowledge a settled run, returning the status to Idle.
    pub fn acknowledge(&self) {
        let _ctl = self.inner.control.lock().expect("control lock poisoned");
        if matches!(self.status(), RunStatus::Completed | RunStatus::Aborted) {
            self.inner.status_tx.send_replace(RunStatus::Idle);
        }
    }

    /// Start a run at `from_index`.
    ///
    /// Accepted only from Idle or Completed: a duplicate trigger while a run
    /// is active is ignored, and an aborted run must be acknowledged before a
    /// new one. A full run (`from_index == 0`) resets every task first; a
    /// run-from-here resets only the tasks it is about to execute, so earlier
    /// outcomes stay inspectable. `from_index >= len` settles as Completed
    /// without executing anything.
    pub fn start(&self, from_index: usize) {
        let token = {
            let mut ctl = self.inner.control.lock().expect("control lock poisoned");
            if !matches!(self.status(), RunStatus::Idle | RunStatus::Completed) {
                debug!(status = ?self.status(), "start ignored: runner not ready for a new run");
                return;
            }
            let controller = CancellationController::new();
            let token = controller.token();
            ctl.cancel = Some(controller);
            ctl.cursor = None;
            ctl.last_outcome = None;
            // send_replace: the transition must land even with no subscriber
            self.inner.status_tx.send_replace(RunStatus::Running);
            token
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.run_loop(from_index, token).await;
        });
    }

    /// Request a stop of the active run. Non-blocking; legal only while
    /// Running (idempotent while Aborting, a no-op otherwise). Escalation to
    /// forceful termination happens inside the run loop after the grace
    /// period.
    pub fn request_stop(&self) {
        let ctl = self.inner.control.lock().expect("control lock poisoned");
        match self.status() {
            RunStatus::Running => {
                if let Some(cancel) = &ctl.cancel {
                    cancel.trigger();
                }
                self.inner.status_tx.send_replace(RunStatus::Aborting);
                info!("queue run aborted by user");
            }
            RunStatus::Aborting => {
                // operator spamming the stop control; already on it
            }
            _ => {
                // nothing to stop
            }
        }
    }

    /// Wait until the current (or next) run settles and return its status.
    pub async fn settled(&self) -> RunStatus {
        let mut rx = self.inner.status_tx.subscribe();
        loop {
            let status = *rx.borrow_and_update();
            if matches!(status, RunStatus::Completed | RunStatus::Aborted) {
                return status;
            }
            if rx.changed().await.is_err() {
                return status;
            }
        }
    }
}

impl RunnerInner {
    async fn run_loop(self: Arc<Self>, from_index: usize, token: CancelToken) {
        let run_id = RunId::generate();
        let len = {
            let mut queue = self.queue.lock().await;
            if from_index == 0 {
                queue.reset_all_states();
            } else {
                queue.reset_states_from(from_index);
            }
            queue.len()
        };
        info!(%run_id, from_index, queue_len = len, "queue run started");

        let mut failed = 0usize;
        let mut halted_at = None;
        let mut aborted = false;

        for index in from_index..len {
            // stop requested between tasks: remaining tasks stay Pending
            if token.is_cancelled() {
                aborted = true;
                break;
            }

            let Some((task_id, kind, policy)) = ({
                let mut queue = self.queue.lock().await;
                queue.task_at_mut(index).ok().map(|task| {
                    task.mark_running(Utc::now());
                    (task.id, task.kind.clone(), task.policy)
                })
            }) else {
                // queue shrank underneath the run; treat as exhaustion
                warn!(index, "task vanished mid-run, stopping loop");
                break;
            };

            self.set_cursor(Some(index));
            self.emit(RunEvent::TaskStarted {
                run_id,
                index,
                task_id,
            });
            debug!(%task_id, index, task = %kind.label(), "task started");

            let mut handle = tokio::spawn(execute_kind(kind, self.ctx.clone(), token.clone()));
            let outcome = join_with_grace(&mut handle, &token, self.ctx.grace_period).await;

            let state = {
                let mut queue = self.queue.lock().await;
                match queue.task_at_mut(index) {
                    Ok(task) => {
                        task.apply_outcome(outcome, Utc::now());
                        task.state
                    }
                    Err(_) => break,
                }
            };
            self.emit(RunEvent::TaskFinished {
                run_id,
                index,
                task_id,
                state,
            });
            debug!(%task_id, index, ?state, "task finished");

            if token.is_cancelled() {
                aborted = true;
                break;
            }

            if state != TaskState::FinishedSuccess {
                failed += 1;
                if policy.halts_on_failure() {
                    halted_at = Some(index);
                    break;
                }
            }
        }

        self.set_cursor(None);

        let outcome = if aborted {
            RunOutcome::Aborted
        } else if let Some(index) = halted_at {
            RunOutcome::HaltedAt { index }
        } else if failed > 0 {
            RunOutcome::CompletedWithFailures { failed }
        } else {
            RunOutcome::Completed
        };

        {
            let mut ctl = self.control.lock().expect("control lock poisoned");
            ctl.cancel = None;
            ctl.last_outcome = Some(outcome);
            self.status_tx.send_replace(if aborted {
                RunStatus::Aborted
            } else {
                RunStatus::Completed
            });
        }
        info!(%run_id, ?outcome, "queue run settled");
        self.emit(RunEvent::RunFinished { run_id, outcome });
    }

    fn set_cursor(&self, cursor: Option<usize>) {
        self.control.lock().expect("control lock poisoned").cursor = cursor;
    }

    fn emit(&self, event: RunEvent) {
        // ignore send error: there may be no subscribers
        let _ = self.events_tx.send(event);
    }
}

/// Join an in-flight execution context.
///
/// On a stop request the context first gets `grace` to finish cooperatively;
/// if it is still running when the window closes, it is aborted forcefully.
/// A panic inside the context surfaces as a JoinError and becomes an Error
/// outcome rather than escaping the run loop.
async fn join_with_grace(
    handle: &mut JoinHandle<TaskOutcome>,
    token: &CancelToken,
    grace: std::time::Duration,
) -> TaskOutcome {
    tokio::select! {
        result = &mut *handle => flatten_join(result),
        _ = token.cancelled() => {
            match tokio::time::timeout(grace, &mut *handle).await {
                Ok(result) => flatten_join(result),
                Err(_) => {
                    warn!("task ignored the stop request; terminating its execution context");
                    handle.abort();
                    flatten_join((&mut *handle).await)
                }
            }
        }
    }
}

fn flatten_join(result: Result<TaskOutcome, JoinError>) -> TaskOutcome {
    match result {
        Ok(outcome) => outcome,
        Err(err) if err.is_cancelled() => {
            TaskOutcome::cancelled("terminated after grace period expired")
        }
        Err(err) => TaskOutcome::error(format!("internal fault during task execution: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::domain::ExecPolicy;
    use crate::impls::{CannedReply, InMemoryDispatcher, TokioProcessLauncher};

    fn context(dispatcher: InMemoryDispatcher) -> ExecContext {
        ExecContext::new(Arc::new(dispatcher), Arc::new(TokioProcessLauncher::new()))
    }

    fn delay(ms: u64, policy: ExecPolicy) -> QueueTask {
        QueueTask::delay(Duration::from_millis(ms), policy)
    }

    fn failing_remote(policy: ExecPolicy) -> (InMemoryDispatcher, QueueTask) {
        let dispatcher = InMemoryDispatcher::new();
        dispatcher.register("srv", "feat", "Fail", CannedReply::Protocol("nope".into()));
        let task = QueueTask::remote_command("srv", "feat", "Fail", json!({}), policy);
        (dispatcher, task)
    }

    async fn drain_until_finished(rx: &mut broadcast::Receiver<RunEvent>) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.recv().await {
            let done = matches!(event, RunEvent::RunFinished { .. });
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_executes_all_tasks_in_order() {
        let mut queue = TaskQueue::new();
        for _ in 0..3 {
            queue.add(delay(10, ExecPolicy::ContinueAfterError));
        }
        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        let mut rx = runner.subscribe();

        runner.start(0);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::Completed));

        let events = drain_until_finished(&mut rx).await;
        let transitions: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                RunEvent::TaskStarted { index, .. } => Some(format!("start:{index}")),
                RunEvent::TaskFinished { index, state, .. } => {
                    assert_eq!(*state, TaskState::FinishedSuccess);
                    Some(format!("finish:{index}"))
                }
                RunEvent::RunFinished { .. } => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec!["start:0", "finish:0", "start:1", "finish:1", "start:2", "finish:2"]
        );
        assert_eq!(runner.counts().await.finished_success, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn halt_policy_stops_the_run() {
        let (dispatcher, failing) = failing_remote(ExecPolicy::HaltAfterError);
        let mut queue = TaskQueue::new();
        queue.add(delay(10, ExecPolicy::ContinueAfterError));
        queue.add(failing);
        queue.add(delay(10, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(dispatcher));
        runner.start(0);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::HaltedAt { index: 1 }));

        let tasks = runner.snapshot().await;
        assert_eq!(tasks[0].state, TaskState::FinishedSuccess);
        assert_eq!(tasks[1].state, TaskState::FinishedError);
        // the task after the halt never left Pending
        assert_eq!(tasks[2].state, TaskState::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn continue_policy_proceeds_past_a_failure() {
        let (dispatcher, failing) = failing_remote(ExecPolicy::ContinueAfterError);
        let mut queue = TaskQueue::new();
        queue.add(failing);
        queue.add(delay(10, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(dispatcher));
        runner.start(0);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(
            runner.last_outcome(),
            Some(RunOutcome::CompletedWithFailures { failed: 1 })
        );

        let tasks = runner.snapshot().await;
        assert_eq!(tasks[0].state, TaskState::FinishedError);
        assert_eq!(tasks[1].state, TaskState::FinishedSuccess);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_a_long_delay_cancels_well_before_it_elapses() {
        let mut queue = TaskQueue::new();
        queue.add(delay(10_000, ExecPolicy::HaltAfterError));
        queue.add(delay(10, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        let started = tokio::time::Instant::now();
        runner.start(0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        runner.request_stop();

        assert_eq!(runner.settled().await, RunStatus::Aborted);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::Aborted));
        // cooperative cancel: far less than the 10s delay, well under grace + epsilon
        assert!(started.elapsed() < Duration::from_secs(3));

        let tasks = runner.snapshot().await;
        assert_eq!(tasks[0].state, TaskState::Cancelled);
        assert_eq!(tasks[1].state, TaskState::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn run_from_here_preserves_earlier_outcomes() {
        let (dispatcher, failing) = failing_remote(ExecPolicy::ContinueAfterError);
        let mut queue = TaskQueue::new();
        queue.add(failing);
        queue.add(delay(10, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(dispatcher));
        runner.start(0);
        runner.settled().await;
        let first_run = runner.snapshot().await;
        assert_eq!(first_run[0].state, TaskState::FinishedError);

        runner.start(1);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::Completed));

        let second_run = runner.snapshot().await;
        assert_eq!(second_run[0].state, TaskState::FinishedError);
        assert_eq!(second_run[0].finished_at, first_run[0].finished_at);
        assert_eq!(second_run[1].state, TaskState::FinishedSuccess);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent_while_running() {
        let mut queue = TaskQueue::new();
        queue.add(delay(500, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        let mut rx = runner.subscribe();

        runner.start(0);
        tokio::task::yield_now().await;
        runner.start(0); // duplicate trigger, must have no effect

        assert_eq!(runner.settled().await, RunStatus::Completed);
        let events = drain_until_finished(&mut rx).await;
        let starts = events
            .iter()
            .filter(|event| matches!(event, RunEvent::TaskStarted { .. }))
            .count();
        assert_eq!(starts, 1);
    }

    #[tokio::test]
    async fn empty_queue_completes_immediately() {
        let runner = QueueRunner::new(TaskQueue::new(), context(InMemoryDispatcher::new()));
        let mut rx = runner.subscribe();

        runner.start(0);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::Completed));

        let events = drain_until_finished(&mut rx).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RunEvent::RunFinished { .. }));
    }

    #[tokio::test]
    async fn start_past_the_end_completes_immediately() {
        let mut queue = TaskQueue::new();
        queue.add(delay(10, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        runner.start(5);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(runner.snapshot().await[0].state, TaskState::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_works_without_any_subscriber() {
        let mut queue = TaskQueue::new();
        queue.add(delay(10_000, ExecPolicy::ContinueAfterError));

        // no subscribe(), no status_rx(): transitions must land regardless
        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        let started = tokio::time::Instant::now();
        runner.start(0);
        assert_eq!(runner.status(), RunStatus::Running);

        tokio::time::sleep(Duration::from_millis(100)).await;
        runner.request_stop();
        assert_eq!(runner.status(), RunStatus::Aborting);

        while !runner.status().is_settled() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(runner.status(), RunStatus::Aborted);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_run_must_be_acknowledged_before_restarting() {
        let mut queue = TaskQueue::new();
        queue.add(delay(10_000, ExecPolicy::ContinueAfterError));
        queue.add(delay(10, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        runner.start(0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        runner.request_stop();
        assert_eq!(runner.settled().await, RunStatus::Aborted);

        // refused until the aborted run is acknowledged
        runner.start(0);
        assert_eq!(runner.status(), RunStatus::Aborted);

        runner.acknowledge();
        runner.start(0);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_stop_requests_settle_once() {
        let mut queue = TaskQueue::new();
        queue.add(delay(10_000, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        let mut rx = runner.subscribe();

        runner.start(0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        for _ in 0..5 {
            runner.request_stop();
        }
        assert_eq!(runner.status(), RunStatus::Aborting);

        assert_eq!(runner.settled().await, RunStatus::Aborted);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::Aborted));

        let events = drain_until_finished(&mut rx).await;
        let finishes = events
            .iter()
            .filter(|event| matches!(event, RunEvent::RunFinished { .. }))
            .count();
        assert_eq!(finishes, 1);
    }

    #[tokio::test]
    async fn request_stop_outside_a_run_is_a_noop() {
        let runner = QueueRunner::new(TaskQueue::new(), context(InMemoryDispatcher::new()));
        runner.request_stop();
        assert_eq!(runner.status(), RunStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn queue_edits_are_refused_during_a_run() {
        let mut queue = TaskQueue::new();
        queue.add(delay(1_000, ExecPolicy::ContinueAfterError));

        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        runner.start(0);
        tokio::task::yield_now().await;

        let refused = runner
            .with_queue_mut(|queue| queue.add(delay(1, ExecPolicy::ContinueAfterError)))
            .await;
        assert!(matches!(refused, Err(EngineError::RunActive)));

        runner.settled().await;
        runner
            .with_queue_mut(|queue| queue.add(delay(1, ExecPolicy::ContinueAfterError)))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn acknowledge_returns_to_idle() {
        let runner = QueueRunner::new(TaskQueue::new(), context(InMemoryDispatcher::new()));
        runner.start(0);
        assert_eq!(runner.settled().await, RunStatus::Completed);

        runner.acknowledge();
        assert_eq!(runner.status(), RunStatus::Idle);

        // acknowledging twice changes nothing
        runner.acknowledge();
        assert_eq!(runner.status(), RunStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn grace_period_escalation_aborts_a_stuck_execution() {
        let controller = CancellationController::new();
        let token = controller.token();

        // an execution that ignores its token entirely
        let mut handle = tokio::spawn(async {
            std::future::pending::<()>().await;
            TaskOutcome::success(serde_json::Value::Null)
        });

        let started = tokio::time::Instant::now();
        controller.trigger();
        let outcome = join_with_grace(&mut handle, &token, Duration::from_secs(2)).await;

        assert!(matches!(outcome, TaskOutcome::Cancelled(_)));
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn panic_inside_execution_becomes_finished_error() {
        let token = CancellationController::new().token();
        let mut handle = tokio::spawn(async { panic!("bad task configuration") });

        let outcome = join_with_grace(&mut handle, &token, Duration::from_secs(2)).await;
        assert!(matches!(outcome, TaskOutcome::Error(m) if m.contains("internal fault")));
    }

    // Concrete scenario from the acceptance checklist:
    // [Delay(1s, CONTINUE), RemoteCommand(fail, HALT), LocalProcess(echo, CONTINUE)]
    #[tokio::test(start_paused = true)]
    async fn mixed_scenario_halts_at_the_failing_remote_command() {
        let (dispatcher, failing) = failing_remote(ExecPolicy::HaltAfterError);
        let mut queue = TaskQueue::new();
        queue.add(delay(1_000, ExecPolicy::ContinueAfterError));
        queue.add(failing);
        queue.add(QueueTask::local_process(
            "echo",
            vec!["hello".into()],
            ExecPolicy::ContinueAfterError,
        ));

        let runner = QueueRunner::new(queue, context(dispatcher));
        let started = tokio::time::Instant::now();
        runner.start(0);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::HaltedAt { index: 1 }));
        assert!(started.elapsed() >= Duration::from_secs(1));

        let tasks = runner.snapshot().await;
        assert_eq!(tasks[0].state, TaskState::FinishedSuccess);
        assert_eq!(tasks[1].state, TaskState::FinishedError);
        assert!(tasks[1].error.as_deref().unwrap().contains("nope"));
        assert_eq!(tasks[2].state, TaskState::Pending);
    }

    #[tokio::test]
    async fn local_process_run_with_real_launcher() {
        let mut queue = TaskQueue::new();
        queue.add(QueueTask::local_process(
            "sh",
            vec!["-c".into(), "exit 3".into()],
            ExecPolicy::HaltAfterError,
        ));

        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        runner.start(0);
        assert_eq!(runner.settled().await, RunStatus::Completed);
        assert_eq!(runner.last_outcome(), Some(RunOutcome::HaltedAt { index: 0 }));

        let tasks = runner.snapshot().await;
        assert_eq!(tasks[0].state, TaskState::FinishedError);
        assert!(tasks[0].error.as_deref().unwrap().contains("code 3"));
        assert!(tasks[0].duration().is_some());
    }

    #[tokio::test]
    async fn stop_terminates_a_running_process() {
        let mut queue = TaskQueue::new();
        queue.add(QueueTask::local_process(
            "sleep",
            vec!["30".into()],
            ExecPolicy::ContinueAfterError,
        ));

        let runner = QueueRunner::new(queue, context(InMemoryDispatcher::new()));
        runner.start(0);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = std::time::Instant::now();
        runner.request_stop();
        assert_eq!(runner.settled().await, RunStatus::Aborted);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(runner.snapshot().await[0].state, TaskState::Cancelled);
    }
}
