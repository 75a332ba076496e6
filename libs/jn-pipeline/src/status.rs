use std::process::ExitStatus;

/// How one stage's process ended (spec.md §4.4 "Ordering guarantees" and
/// "Backpressure": a broken-pipe exit in a non-final stage is the normal
/// shape of early termination, not a failure).
#[derive(Debug, Clone)]
pub struct StageStatus {
    pub name: String,
    pub exit_status: ExitStatus,
    /// True if the process was killed by `SIGPIPE` (Unix) — the expected
    /// shape of "upstream stage writes after downstream already closed its
    /// read end" (spec.md §4.4 "Backpressure").
    pub broken_pipe: bool,
}

impl StageStatus {
    /// A stage failure is "real" (should become the pipeline's exit code)
    /// unless it's a broken-pipe exit, which is normal termination.
    pub fn is_failure(&self) -> bool {
        !self.exit_status.success() && !self.broken_pipe
    }
}

#[cfg(unix)]
pub fn is_broken_pipe(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    // SIGPIPE == 13 on every Unix this crate targets.
    status.signal() == Some(13)
}

#[cfg(not(unix))]
pub fn is_broken_pipe(_status: &ExitStatus) -> bool {
    false
}

/// Outcome of [`crate::Pipeline::run`]: the process's own exit code plus
/// every stage's individual status, in stage order (spec.md §4.4 `run`).
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub exit_code: i32,
    pub stage_statuses: Vec<StageStatus>,
}

impl PipelineResult {
    /// Aggregate policy (spec.md §7): the first non-broken-pipe failure
    /// becomes the process exit code; later failures are recorded in
    /// `stage_statuses` but never overwrite it. All-success or
    /// all-broken-pipe-or-success yields exit code 0.
    pub fn from_statuses(stage_statuses: Vec<StageStatus>) -> Self {
        let exit_code = stage_statuses
            .iter()
            .find(|s| s.is_failure())
            .and_then(|s| s.exit_status.code())
            .unwrap_or(0);
        // A failure with no code (killed by a signal other than SIGPIPE)
        // still needs a non-zero exit; spec.md §6.1 reserves 0/1/2/130, so
        // fold anything code-less into 1.
        let exit_code = if exit_code == 0 && stage_statuses.iter().any(StageStatus::is_failure) {
            1
        } else {
            exit_code
        };
        Self { exit_code, stage_statuses }
    }
}
