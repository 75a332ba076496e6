use std::path::PathBuf;

use jn_core::Scope;
use jn_registry::{Registry, RegistryError};

/// Discover every plugin across the three search scopes in precedence
/// order (spec.md §4.2, §6.5), consulting and refreshing the on-disk cache
/// under the user scope (spec.md §6.7).
pub fn discover() -> Result<Registry, RegistryError> {
    let roots: Vec<(Scope, PathBuf)> = Scope::ALL_IN_PRECEDENCE
        .into_iter()
        .filter_map(|scope| scope.root_dir().map(|root| (scope, root)))
        .collect();

    let cache_path = Scope::User.root_dir().map(|home| home.join("cache/plugins.json"));

    Registry::discover(&roots, cache_path.as_deref())
}
