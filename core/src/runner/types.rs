/// Result of one external command execution.
///
/// Ordinary command failure is data, not an error: the runner never returns
/// `Err` for a nonzero exit, a timeout, or a cancellation. At most one of
/// `timed_out` / `cancelled` is set, and either implies `exit_code == -1`.
#[derive(Debug, Clone, Default)]
pub struct CommandOutcome {
    /// Interleaved stdout+stderr in arrival order, captured at completion.
    pub combined_output: String,
    /// Process exit status; `-1` is reserved for timeout/cancellation/fault.
    pub exit_code: i32,
    /// Wall clock from invocation to return, inclusive of output drain.
    pub duration_ms: u64,
    pub timed_out: bool,
    pub cancelled: bool,
    /// Present iff the command did not succeed.
    pub failure_reason: Option<String>,
}

impl CommandOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0 && !self.timed_out && !self.cancelled
    }
}
