/// Top-level error type for the `jn` CLI (spec.md §7 "Taxonomy"), carrying
/// enough to pick an exit code: addressing errors (syntax, missing plugin,
/// ambiguous match) exit 2; everything else that prevents a result exits 1.
#[derive(Debug, thiserror::Error)]
pub enum JnError {
    #[error("{0}")]
    Resolve(#[from] jn_resolver::ResolveError),

    #[error("{0}")]
    Registry(#[from] jn_registry::RegistryError),

    #[error("invalid merge source '{0}': expected SRC:label=NAME")]
    InvalidMergeSyntax(String),

    #[error("{0}")]
    Pipeline(#[from] jn_pipeline::PipelineError),

    #[error("pipeline exceeded its {0}s timeout and was cancelled")]
    Timeout(u64),

    #[error("{0}")]
    InvalidMode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl JnError {
    pub fn exit_code(&self) -> i32 {
        match self {
            JnError::Resolve(_) | JnError::InvalidMergeSyntax(_) => 2,
            _ => 1,
        }
    }
}
