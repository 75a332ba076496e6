#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no plugin named '{0}' is registered")]
    PluginNotFound(String),

    #[error("no protocol plugin handles scheme '{0}'")]
    ProtocolUnsupported(String),

    #[error("profile '{0}' could not be resolved: {1}")]
    ProfileMissing(String, String),

    #[error("ambiguous match resolving '{0}': {1}")]
    AmbiguousMatch(String, String),

    #[error("plugin '{plugin}' does not support mode '{mode}'")]
    ModeUnsupported { plugin: String, mode: String },
}

impl From<jn_registry::RegistryError> for ResolveError {
    fn from(e: jn_registry::RegistryError) -> Self {
        match e {
            jn_registry::RegistryError::Ambiguous { address, first, second } => {
                ResolveError::AmbiguousMatch(address, format!("'{first}' and '{second}'"))
            }
            jn_registry::RegistryError::NotFound { address } => ResolveError::PluginNotFound(address),
            other => ResolveError::PluginNotFound(other.to_string()),
        }
    }
}
