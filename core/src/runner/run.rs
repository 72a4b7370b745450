use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::exit::normalize_exit;
use super::types::CommandOutcome;

/// How long the kill paths keep reading output before giving up on the pipes.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

pub struct RunRequest<'a> {
    /// Executed as `sh -c "<command>"` so pipelines and `&&` work verbatim.
    pub command: &'a str,
    pub deadline: Duration,
    /// Piped to the child's stdin (with a trailing newline) instead of being
    /// embedded in the command text. Never echoed into the captured output.
    pub credential: Option<&'a str>,
    /// Global abort signal shared by all workers of a run.
    pub cancel: CancellationToken,
}

enum WaitEnd {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

/// Runs one shell command to completion under a deadline.
///
/// Never returns an error: spawn faults, nonzero exits, timeouts and
/// cancellations are all reported through the returned [`CommandOutcome`].
pub async fn run_command(req: RunRequest<'_>) -> CommandOutcome {
    let started = Instant::now();

    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(req.command)
        .stdin(if req.credential.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return CommandOutcome {
                exit_code: -1,
                duration_ms: started.elapsed().as_millis() as u64,
                failure_reason: Some(format!("failed to spawn shell: {e}")),
                ..CommandOutcome::default()
            };
        }
    };

    if let Some(secret) = req.credential {
        if let Some(mut stdin) = child.stdin.take() {
            // Best effort: the child may never read stdin.
            let line = format!("{secret}\n");
            let _ = stdin.write_all(line.as_bytes()).await;
            let _ = stdin.shutdown().await;
        }
    }

    // Both streams append into one buffer so the combined output keeps
    // arrival order without interleaving corruption.
    let sink: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let mut drains = Vec::with_capacity(2);
    if let Some(out) = child.stdout.take() {
        drains.push(tokio::spawn(drain(out, sink.clone())));
    }
    if let Some(err) = child.stderr.take() {
        drains.push(tokio::spawn(drain(err, sink.clone())));
    }

    let end = tokio::select! {
        biased;
        _ = req.cancel.cancelled() => WaitEnd::Cancelled,
        _ = tokio::time::sleep(req.deadline) => WaitEnd::TimedOut,
        res = child.wait() => WaitEnd::Exited(res),
    };

    let killed = !matches!(end, WaitEnd::Exited(_));
    let mut outcome = CommandOutcome::default();
    match end {
        WaitEnd::Exited(Ok(status)) => {
            outcome.exit_code = normalize_exit(status);
            if outcome.exit_code != 0 {
                outcome.failure_reason = Some(format!("exit status {}", outcome.exit_code));
            }
        }
        WaitEnd::Exited(Err(e)) => {
            outcome.exit_code = -1;
            outcome.failure_reason = Some(format!("failed to wait on child: {e}"));
        }
        WaitEnd::TimedOut => {
            debug!(deadline_secs = req.deadline.as_secs(), "command deadline expired, killing child");
            let _ = child.start_kill();
            let _ = child.wait().await;
            outcome.exit_code = -1;
            outcome.timed_out = true;
            outcome.failure_reason =
                Some(format!("timed out after {}s", req.deadline.as_secs()));
        }
        WaitEnd::Cancelled => {
            debug!("run cancelled, killing child");
            let _ = child.start_kill();
            let _ = child.wait().await;
            outcome.exit_code = -1;
            outcome.cancelled = true;
            outcome.failure_reason = Some("cancelled before completion".to_string());
        }
    }

    // A cleanly exited child has closed its pipes, so the drains finish on
    // their own. A killed shell may leave grandchildren holding the pipes
    // open; those get a short grace window and are then abandoned, keeping
    // whatever output arrived before the kill.
    for mut d in drains {
        if killed {
            if tokio::time::timeout(DRAIN_GRACE, &mut d).await.is_err() {
                d.abort();
            }
        } else {
            let _ = d.await;
        }
    }

    let bytes = sink.lock().unwrap_or_else(PoisonError::into_inner);
    outcome.combined_output = String::from_utf8_lossy(&bytes).into_owned();
    outcome.duration_ms = started.elapsed().as_millis() as u64;
    outcome
}

async fn drain<R>(mut src: R, sink: Arc<Mutex<Vec<u8>>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut buf = [0u8; 4096];
    loop {
        match src.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
                sink.extend_from_slice(&buf[..n]);
            }
        }
    }
}
