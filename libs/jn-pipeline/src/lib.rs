//! Spawns plugin subprocesses, wires them together with OS pipes, and
//! propagates termination correctly (spec.md §3 `PipelineStage`, §4.4 C4).
//!
//! The orchestrator is deliberately synchronous: spec.md §5 says the
//! orchestrator process itself is single-threaded and blocks only at
//! `spawn`, blocking waits, and pipe closure — there is no record-level
//! I/O multiplexing to do here, so plain `std::process` blocking calls are
//! the whole mechanism, not a stopgap for an async one.

mod error;
mod pipeline;
mod stage;
mod status;

pub use error::PipelineError;
pub use pipeline::{build, cancel, run, Pipeline};
pub use stage::StageSpec;
pub use status::{PipelineResult, StageStatus};
