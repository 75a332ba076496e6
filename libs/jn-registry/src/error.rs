use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("cannot read plugin directory '{path}': {source}")]
    Discovery { path: PathBuf, #[source] source: std::io::Error },

    #[error("malformed manifest '{path}': {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("no plugin matches '{address}'")]
    NotFound { address: String },

    #[error("inspecting plugin '{path}' failed: {message}")]
    Inspect { path: PathBuf, message: String },

    #[error(
        "ambiguous plugin match for '{address}': both '{first}' and '{second}' claim it with equal precedence"
    )]
    Ambiguous { address: String, first: String, second: String },
}
