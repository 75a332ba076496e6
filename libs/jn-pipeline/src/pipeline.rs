use std::process::{Child, Stdio};

use crate::error::PipelineError;
use crate::stage::StageSpec;
use crate::status::{is_broken_pipe, PipelineResult, StageStatus};

struct SpawnedStage {
    name: String,
    child: Child,
}

/// A built pipeline: N spawned subprocess stages wired by N−1 OS pipes
/// (spec.md §3 `PipelineStage`, §4.4). Scheduling is delegated entirely to
/// the operating system; this struct only tracks the child handles so
/// they can be waited on or torn down.
pub struct Pipeline {
    stages: Vec<SpawnedStage>,
    final_stdout: Option<std::process::ChildStdout>,
}

impl Pipeline {
    /// Take the final stage's stdout handle, when `build` was given
    /// `Stdio::piped()` as `final_stdout` (e.g. so the caller can read the
    /// pipeline's output directly rather than letting it go to an
    /// inherited fd).
    pub fn take_final_stdout(&mut self) -> Option<std::process::ChildStdout> {
        self.final_stdout.take()
    }

    /// OS process IDs of every spawned stage, in stage order. Lets an
    /// external watcher (e.g. a wall-clock `--timeout`) signal the stages
    /// directly without needing mutable access to the `Child` handles that
    /// `run()` holds on its own thread.
    pub fn stage_pids(&self) -> Vec<u32> {
        self.stages.iter().map(|s| s.child.id()).collect()
    }
}

/// Wire `specs` together with OS pipes and spawn every stage (spec.md
/// §4.4 `build`). `initial_stdin` feeds stage 0; `final_stdout` receives
/// stage N−1's output. Every interior stage's stdout becomes the next
/// stage's stdin directly via [`Stdio::from`], which hands the pipe's
/// write-end fd to the child at spawn time and drops the parent's copy —
/// satisfying step 4's "close every pipe endpoint you don't need" without
/// any manual fd bookkeeping.
///
/// On a spawn failure partway through, every stage already spawned is
/// cancelled (killed and reaped) before the error is returned, per spec.md
/// §7's spawn-failure policy.
pub fn build(
    specs: &[StageSpec],
    initial_stdin: Stdio,
    final_stdout: Stdio,
) -> Result<Pipeline, PipelineError> {
    if specs.is_empty() {
        return Err(PipelineError::Empty);
    }

    let last = specs.len() - 1;
    let mut stages: Vec<SpawnedStage> = Vec::with_capacity(specs.len());
    let mut next_stdin = Some(initial_stdin);
    let mut final_stdout_source = Some(final_stdout);
    let mut final_stdout_handle = None;

    for (i, spec) in specs.iter().enumerate() {
        let mut cmd = spec.to_command();
        cmd.stdin(next_stdin.take().expect("stdin source available for every stage"));
        cmd.stdout(if i == last {
            final_stdout_source.take().expect("final_stdout consumed exactly once")
        } else {
            Stdio::piped()
        });
        // Plugins share the orchestrator's controlling terminal for
        // stderr by default (spec.md §5); the parent does no per-stage
        // interleaving of its own.
        cmd.stderr(Stdio::inherit());

        match cmd.spawn() {
            Ok(mut child) => {
                if i == last {
                    final_stdout_handle = child.stdout.take();
                } else {
                    next_stdin = Some(Stdio::from(
                        child.stdout.take().expect("interior stage stdout is piped"),
                    ));
                }
                stages.push(SpawnedStage { name: spec.name.clone(), child });
            }
            Err(source) => {
                tracing::error!(stage = %spec.name, error = %source, "failed to spawn pipeline stage");
                cancel_spawned(&mut stages, "spawn failure in a later stage");
                return Err(PipelineError::Spawn {
                    stage: spec.name.clone(),
                    executable: spec.resolved.plugin.executable.clone(),
                    source,
                });
            }
        }
    }

    Ok(Pipeline { stages, final_stdout: final_stdout_handle })
}

/// Wait for every stage to finish and aggregate the result (spec.md §4.4
/// `run`). Stages are reaped in spawn order; because the chain's flow is
/// entirely pipe-driven, order of reaping doesn't affect when any
/// individual `wait()` call actually returns.
pub fn run(mut pipeline: Pipeline) -> Result<PipelineResult, PipelineError> {
    let mut statuses = Vec::with_capacity(pipeline.stages.len());
    for stage in &mut pipeline.stages {
        let exit_status = stage.child.wait().map_err(|source| PipelineError::Wait {
            stage: stage.name.clone(),
            source,
        })?;
        let broken_pipe = is_broken_pipe(&exit_status);
        if broken_pipe {
            tracing::debug!(stage = %stage.name, "stage terminated by broken pipe (normal early termination)");
        } else if !exit_status.success() {
            tracing::error!(stage = %stage.name, status = %exit_status, "stage exited with failure");
        }
        statuses.push(StageStatus { name: stage.name.clone(), exit_status, broken_pipe });
    }
    Ok(PipelineResult::from_statuses(statuses))
}

/// Cancel a pipeline: kill every still-running stage and reap it (spec.md
/// §4.4 `cancel`). Cancellation itself is structural (closing pipes) per
/// spec.md §5, but a caller that already observed a hard failure elsewhere
/// and wants to tear down promptly uses this instead of waiting out the
/// remaining stages naturally.
pub fn cancel(mut pipeline: Pipeline, reason: &str) {
    tracing::warn!(reason, stages = pipeline.stages.len(), "cancelling pipeline");
    cancel_spawned(&mut pipeline.stages, reason);
}

fn cancel_spawned(stages: &mut [SpawnedStage], reason: &str) {
    for stage in stages {
        if let Err(e) = stage.child.kill() {
            // Already exited is the common case here, not an error.
            tracing::debug!(stage = %stage.name, error = %e, reason, "kill during cancellation (stage may have already exited)");
        }
        let _ = stage.child.wait();
    }
}

impl Drop for Pipeline {
    /// Resource discipline (spec.md §4.4 "Resource discipline"): a
    /// `Pipeline` dropped without `run()` or `cancel()` having reaped its
    /// children (e.g. an early error return elsewhere in the caller) still
    /// must not leak child processes.
    fn drop(&mut self) {
        for stage in &mut self.stages {
            if let Ok(None) = stage.child.try_wait() {
                let _ = stage.child.kill();
                let _ = stage.child.wait();
            }
        }
    }
}
