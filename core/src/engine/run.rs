use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::catalog::{Action, CommandSource, Method};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::runner::{run_command, CommandOutcome, RunRequest};
use crate::state::{read_state, write_state, ActionResult, RunState};

use super::ticker;

/// Bound on UI-facing failure summaries.
const MESSAGE_LIMIT: usize = 200;

/// The concurrent action-execution engine.
///
/// One worker task per selected target, results aggregated into a single
/// lock-protected [`RunState`]. All accessors take brief lock acquisitions
/// and copy out, so a renderer can poll them at any cadence without blocking
/// workers. `Engine` is cheap to clone; clones share the same run state.
#[derive(Clone)]
pub struct Engine {
    state: Arc<RwLock<RunState>>,
    source: Arc<dyn CommandSource>,
    cfg: EngineConfig,
}

struct WorkerReport {
    result: ActionResult,
    output: String,
}

#[derive(Clone)]
struct WorkerCtx {
    state: Arc<RwLock<RunState>>,
    source: Arc<dyn CommandSource>,
    method: Method,
    action: Action,
    deadline: Duration,
    credential: Option<String>,
    cancel: CancellationToken,
    limiter: Option<Arc<Semaphore>>,
    tx: mpsc::UnboundedSender<WorkerReport>,
}

impl Engine {
    pub fn new(source: Arc<dyn CommandSource>, method: Method, cfg: EngineConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(RunState::new(method))),
            source,
            cfg,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RunState> {
        read_state(&self.state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RunState> {
        write_state(&self.state)
    }

    // ---- inbound ----

    pub fn set_selection(
        &self,
        method: Method,
        targets: impl IntoIterator<Item = String>,
        action: Action,
    ) {
        let mut st = self.write();
        st.method = method;
        st.targets = targets.into_iter().collect();
        st.action = action;
    }

    /// Stores the privileged-method password. It is only ever piped to stdin
    /// of `sudo -S` and is cleared when the run finalizes.
    pub fn set_credential(&self, secret: Option<String>) {
        self.write().credential = secret;
    }

    /// Sticky abort: already-running commands keep going, no further targets
    /// are started. Cleared by the next run's reset.
    pub fn request_abort(&self) {
        let mut st = self.write();
        st.abort_requested = true;
        debug!("abort requested");
    }

    /// Cancels the current run's token, which in-flight command runners
    /// observe near-immediately. Non-blocking; does not wait for workers.
    pub fn cancel_run(&self) {
        let token = self.read().cancel.clone();
        token.cancel();
    }

    /// Begins a run asynchronously and returns immediately.
    ///
    /// The reset of all run-scoped state happens under the write lock before
    /// any worker is spawned, so no worker can race a stale view.
    pub fn start_run(&self) -> Result<(), EngineError> {
        let (targets, method, action, credential, cancel) = {
            let mut st = self.write();
            if st.running() {
                st.last_error = Some("a run is already in progress".to_string());
                return Err(EngineError::RunInProgress);
            }
            if st.targets.is_empty() {
                st.last_error = Some("no targets selected".to_string());
                return Err(EngineError::NoTargets);
            }
            st.reset_for_run();
            (
                st.targets.iter().cloned().collect::<Vec<_>>(),
                st.method,
                st.action,
                st.credential.clone(),
                st.cancel.clone(),
            )
        };

        let deadline = match action {
            Action::Check => Duration::from_secs(self.cfg.check_timeout_secs),
            _ => Duration::from_secs(self.cfg.action_timeout_secs),
        };
        let limiter = self
            .cfg
            .max_parallel
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        info!(%method, %action, targets = targets.len(), "starting run");

        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = WorkerCtx {
            state: self.state.clone(),
            source: self.source.clone(),
            method,
            action,
            deadline,
            credential,
            cancel,
            limiter,
            tx,
        };

        for target in targets {
            // Cheap gate: an abort between reset and here skips the spawn
            // entirely; the worker re-checks as its first action.
            if self.read().abort_requested {
                debug!(%target, "abort requested, not spawning worker");
                continue;
            }
            tokio::spawn(worker(ctx.clone(), target));
        }
        drop(ctx); // last sender; the collector finalizes once all workers hang up

        let (stop_tx, stop_rx) = oneshot::channel();
        tokio::spawn(ticker::tick(
            self.state.clone(),
            Duration::from_millis(self.cfg.tick_interval_ms.max(1)),
            stop_rx,
        ));
        tokio::spawn(collect(self.state.clone(), rx, stop_tx));

        Ok(())
    }

    // ---- outbound, polled ----

    pub fn results(&self) -> Vec<ActionResult> {
        self.read().results.clone()
    }

    pub fn accumulated_output(&self) -> String {
        self.read().output.clone()
    }

    pub fn completed_count(&self) -> usize {
        self.read().completed
    }

    pub fn is_done(&self) -> bool {
        self.read().done
    }

    pub fn is_running(&self) -> bool {
        self.read().running()
    }

    pub fn animation_frame(&self) -> u8 {
        self.read().frame
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    pub fn selection(&self) -> (Method, Vec<String>, Action) {
        let st = self.read();
        (st.method, st.targets.iter().cloned().collect(), st.action)
    }

    pub fn has_credential(&self) -> bool {
        self.read().credential.is_some()
    }

    /// Wall clock of the current (or last) run.
    pub fn elapsed(&self) -> Option<Duration> {
        let st = self.read();
        st.started_at
            .map(|s| st.finished_at.unwrap_or_else(Instant::now).duration_since(s))
    }

    /// Time since the last run finalized; used for banner auto-clearing.
    pub fn since_done(&self) -> Option<Duration> {
        self.read().finished_at.map(|f| f.elapsed())
    }
}

async fn worker(ctx: WorkerCtx, target: String) {
    if read_state(&ctx.state).abort_requested {
        debug!(%target, "abort requested, skipping");
        return;
    }

    let _permit = match &ctx.limiter {
        Some(sem) => match sem.clone().acquire_owned().await {
            Ok(p) => Some(p),
            Err(_) => return,
        },
        None => None,
    };
    if read_state(&ctx.state).abort_requested {
        debug!(%target, "abort requested while queued, skipping");
        return;
    }

    let resolved = ctx
        .source
        .resolve(ctx.method, &target, ctx.action)
        .filter(|c| !c.trim().is_empty());
    let Some(command) = resolved else {
        let _ = ctx.tx.send(WorkerReport {
            result: ActionResult {
                target: target.clone(),
                succeeded: false,
                message: format!("no {} command found for {target}", ctx.action),
                duration_secs: 0,
            },
            output: String::new(),
        });
        return;
    };

    // Only system package managers get the piped credential.
    let credential = if ctx.method.requires_privilege() {
        ctx.credential.as_deref()
    } else {
        None
    };

    debug!(%target, action = %ctx.action, "running command");
    let outcome = run_command(RunRequest {
        command: &command,
        deadline: ctx.deadline,
        credential,
        cancel: ctx.cancel.clone(),
    })
    .await;

    let result = summarize(&target, ctx.action, &outcome);
    let mut output = format!("$ {command}\n");
    output.push_str(&outcome.combined_output);
    if !output.ends_with('\n') {
        output.push('\n');
    }
    let _ = ctx.tx.send(WorkerReport { result, output });
}

/// Applies worker reports under the lock in completion order, then finalizes:
/// sets `done` exactly once, stamps the completion time, clears the stored
/// credential and stops the ticker.
async fn collect(
    state: Arc<RwLock<RunState>>,
    mut rx: mpsc::UnboundedReceiver<WorkerReport>,
    stop_ticker: oneshot::Sender<()>,
) {
    while let Some(report) = rx.recv().await {
        let mut st = write_state(&state);
        st.output.push_str(&report.output);
        st.results.push(report.result);
        st.completed += 1;
    }

    let (completed, total) = {
        let mut st = write_state(&state);
        st.done = true;
        st.finished_at = Some(Instant::now());
        st.credential = None;
        (st.completed, st.targets.len())
    };
    let _ = stop_ticker.send(());
    info!(completed, total, "run complete");
}

fn summarize(target: &str, action: Action, outcome: &CommandOutcome) -> ActionResult {
    let message = if outcome.succeeded() {
        match action {
            // Check messages carry the full captured output; only failure
            // summaries are bounded.
            Action::Check => outcome.combined_output.trim().to_string(),
            _ => String::new(),
        }
    } else {
        let mut msg = outcome
            .failure_reason
            .clone()
            .unwrap_or_else(|| "command failed".to_string());
        let excerpt = outcome.combined_output.trim();
        if !excerpt.is_empty() && !outcome.timed_out && !outcome.cancelled {
            msg.push_str(": ");
            msg.push_str(excerpt);
        }
        truncate(&msg, MESSAGE_LIMIT)
    };
    ActionResult {
        target: target.to_string(),
        succeeded: outcome.succeeded(),
        message,
        duration_secs: outcome.duration_ms / 1000,
    }
}

fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(limit).collect();
        out.push_str("...");
        out
    }
}
