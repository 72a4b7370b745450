use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::catalog::{Action, Method};

pub const ANIMATION_FRAMES: u8 = 10;

/// Outcome of one (target, action) pair, appended exactly once per run by its
/// worker and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub target: String,
    pub succeeded: bool,
    /// Empty on success, except check actions which carry version/status text.
    /// Failure summaries are truncated to a bounded length upstream.
    pub message: String,
    pub duration_secs: u64,
}

/// The single mutable aggregate shared between workers, the progress ticker
/// and pollers. Guarded by one `RwLock` for the lifetime of the process;
/// run-scoped fields are re-initialized (not destroyed) at every run start.
pub struct RunState {
    pub method: Method,
    pub targets: BTreeSet<String>,
    pub action: Action,

    pub results: Vec<ActionResult>,
    pub output: String,
    pub completed: usize,
    pub done: bool,
    /// Sticky: once set it gates all future spawns until the next run's reset.
    pub abort_requested: bool,
    pub frame: u8,
    /// One token per run; replaced (never reused) by `reset_for_run`.
    pub cancel: CancellationToken,
    /// Privileged-method password, piped to `sudo -S`. Cleared at finalize.
    pub credential: Option<String>,
    pub last_error: Option<String>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl RunState {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            targets: BTreeSet::new(),
            action: Action::Check,
            results: Vec::new(),
            output: String::new(),
            completed: 0,
            done: false,
            abort_requested: false,
            frame: 0,
            cancel: CancellationToken::new(),
            credential: None,
            last_error: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Clears every run-scoped field and issues a fresh cancellation token.
    /// Must complete before any worker of the new run is spawned.
    pub fn reset_for_run(&mut self) {
        self.results.clear();
        self.output.clear();
        self.completed = 0;
        self.done = false;
        self.abort_requested = false;
        self.frame = 0;
        self.cancel = CancellationToken::new();
        self.last_error = None;
        self.started_at = Some(Instant::now());
        self.finished_at = None;
    }

    pub fn running(&self) -> bool {
        self.started_at.is_some() && !self.done
    }
}
