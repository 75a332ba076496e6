use std::path::PathBuf;

/// Errors raised while building or running a pipeline (spec.md §4.4, §7).
/// Distinct from [`jn_resolver::ResolveError`]: addressing errors prevent
/// a pipeline from being built at all, while these happen during or after
/// spawning.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to spawn stage '{stage}' ({executable}): {source}")]
    Spawn {
        stage: String,
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait on stage '{stage}': {source}")]
    Wait {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pipeline has no stages")]
    Empty,
}
