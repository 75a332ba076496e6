use std::path::{Path, PathBuf};

use jn_core::{Mode, PluginMeta, Scope};
use regex::Regex;

use crate::cache::{Cache, CacheKey};
use crate::error::RegistryError;
use crate::{inspect, manifest};

/// A single discovered plugin, tagged with the scope it was found in and
/// its discovery order (both feed the precedence rules of spec.md §4.2).
#[derive(Debug, Clone)]
struct Entry {
    scope: Scope,
    order: usize,
    meta: PluginMeta,
}

/// In-memory view of every plugin discovered across the three search
/// scopes, in project > user > system precedence order.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Walk `plugins/` under each of `roots` (already given in precedence
    /// order; typically [Project, User, System]), parsing sidecar
    /// manifests and falling back to `--mode inspect` for self-contained
    /// plugins without one. `cache_path`, if given, is consulted first and
    /// updated with freshly derived entries.
    pub fn discover(roots: &[(Scope, PathBuf)], cache_path: Option<&Path>) -> Result<Self, RegistryError> {
        let mut cache = cache_path.map(Cache::load).unwrap_or_default();
        let mut entries = Vec::new();
        let mut order = 0usize;

        for (scope, root) in roots {
            let plugins_dir = root.join("plugins");
            if !plugins_dir.is_dir() {
                continue;
            }

            let mut manifests = Vec::new();
            let mut all_files = Vec::new();
            for entry in walkdir::WalkDir::new(&plugins_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path().to_path_buf();
                if path.to_string_lossy().ends_with(".jnplugin.toml") {
                    manifests.push(path.clone());
                }
                all_files.push(path);
            }

            for manifest_path in &manifests {
                let meta = load_with_cache(&mut cache, manifest_path, |p| manifest::parse_manifest(p))?;
                entries.push(Entry { scope: *scope, order, meta });
                order += 1;
            }

            for path in &all_files {
                if path.to_string_lossy().ends_with(".jnplugin.toml") {
                    continue;
                }
                let has_sidecar = manifests.iter().any(|m| sibling_of(m) == *path);
                if has_sidecar || !is_executable(path) {
                    continue;
                }
                let meta = load_with_cache(&mut cache, path, |p| inspect::invoke_inspect(p))?;
                entries.push(Entry { scope: *scope, order, meta });
                order += 1;
            }
        }

        if let Some(cache_path) = cache_path {
            if let Err(e) = cache.save(cache_path) {
                tracing::warn!(path = %cache_path.display(), error = %e, "failed to persist plugin cache");
            }
        }

        Ok(Self { entries })
    }

    /// Look up a plugin by exact name, respecting scope precedence
    /// (project wins over user wins over system) — spec.md §4.2.
    pub fn find_by_name(&self, name: &str) -> Option<&PluginMeta> {
        self.entries.iter().find(|e| e.meta.name == name).map(|e| &e.meta)
    }

    /// Look up a protocol plugin whose `matches` accept `scheme` (spec.md §4.3 step 2).
    pub fn find_protocol(&self, scheme: &str) -> Option<&PluginMeta> {
        self.entries
            .iter()
            .filter(|e| e.meta.role == jn_core::Role::Protocol)
            .find(|e| e.meta.matches.iter().any(|pat| regex_matches(pat, scheme)))
            .map(|e| &e.meta)
    }

    /// Match `base` against every candidate's `matches` regexes and select
    /// the winner per spec.md §4.2 precedence for distinct plugins: longest
    /// anchored match wins, earliest discovered breaks ties. Scope only
    /// matters for same-name collisions, handled separately by
    /// `find_by_name` — it plays no part in this ranking.
    pub fn find_for_address(&self, base: &str, mode: Mode) -> Result<&PluginMeta, RegistryError> {
        let mut candidates: Vec<(&Entry, usize)> = Vec::new();
        for entry in &self.entries {
            if !entry.meta.supports_mode(mode) {
                continue;
            }
            if let Some(len) = entry
                .meta
                .matches
                .iter()
                .filter_map(|pat| regex_matches(pat, base).then(|| pat.len()))
                .max()
            {
                candidates.push((entry, len));
            }
        }

        candidates.sort_by(|(a, a_len), (b, b_len)| b_len.cmp(a_len).then(a.order.cmp(&b.order)));

        match candidates.as_slice() {
            [] => Err(RegistryError::NotFound { address: base.to_string() }),
            [(only, _)] => Ok(&only.meta),
            [(first, first_len), (second, second_len), ..] => {
                if first_len == second_len {
                    Err(RegistryError::Ambiguous {
                        address: base.to_string(),
                        first: first.meta.name.clone(),
                        second: second.meta.name.clone(),
                    })
                } else {
                    Ok(&first.meta)
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginMeta> {
        self.entries.iter().map(|e| &e.meta)
    }
}

fn sibling_of(manifest_path: &Path) -> PathBuf {
    let dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = manifest_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = file_name.strip_suffix(".jnplugin.toml").unwrap_or(file_name);
    dir.join(stem)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

fn regex_matches(pattern: &str, haystack: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(haystack)).unwrap_or(false)
}

fn load_with_cache(
    cache: &mut Cache,
    identity_path: &Path,
    derive: impl FnOnce(&Path) -> Result<PluginMeta, RegistryError>,
) -> Result<PluginMeta, RegistryError> {
    let metadata = std::fs::metadata(identity_path).map_err(|e| RegistryError::Discovery {
        path: identity_path.to_path_buf(),
        source: e,
    })?;
    let key = CacheKey::from_metadata(identity_path, &metadata).map_err(|e| RegistryError::Discovery {
        path: identity_path.to_path_buf(),
        source: e,
    })?;

    if let Some(meta) = cache.get(&key) {
        return Ok(meta);
    }

    let meta = derive(identity_path)?;
    cache.insert(key, meta.clone());
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    fn write_manifest(dir: &Path, stem: &str, matches: &[&str], role: &str) {
        let manifest_path = dir.join(format!("{stem}.jnplugin.toml"));
        let mut f = std::fs::File::create(&manifest_path).unwrap();
        let matches_toml = matches.iter().map(|m| format!("{m:?}")).collect::<Vec<_>>().join(", ");
        writeln!(
            f,
            r#"
name = "{stem}"
version = "1.0.0"
role = "{role}"
modes = ["read", "write"]
matches = [{matches_toml}]
"#
        )
        .unwrap();
        std::fs::write(dir.join(stem), "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        std::fs::set_permissions(dir.join(stem), std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn discovers_manifests_and_matches_by_extension() {
        let project = tempfile::tempdir().unwrap();
        let plugins_dir = project.path().join("plugins");
        std::fs::create_dir_all(&plugins_dir).unwrap();
        write_manifest(&plugins_dir, "jn-fmt-csv", &[r"^.*\.csv$"], "format");

        let registry =
            Registry::discover(&[(Scope::Project, project.path().to_path_buf())], None).unwrap();

        let found = registry.find_for_address("orders.csv", Mode::Read).unwrap();
        assert_eq!(found.name, "jn-fmt-csv");
    }

    #[test]
    fn ambiguous_equal_length_matches_is_an_error() {
        let project = tempfile::tempdir().unwrap();
        let plugins_dir = project.path().join("plugins");
        std::fs::create_dir_all(&plugins_dir).unwrap();
        write_manifest(&plugins_dir, "jn-fmt-csv-a", &[r"^.*\.csv$"], "format");
        write_manifest(&plugins_dir, "jn-fmt-csv-b", &[r"^.*\.csv$"], "format");

        let registry =
            Registry::discover(&[(Scope::Project, project.path().to_path_buf())], None).unwrap();

        let err = registry.find_for_address("orders.csv", Mode::Read).unwrap_err();
        assert!(matches!(err, RegistryError::Ambiguous { .. }));
    }

    /// Scope precedence only disambiguates same-name collisions
    /// (`find_by_name`); distinct plugins tying on match length across
    /// scopes are still ambiguous (spec.md §4.2).
    #[test]
    fn distinct_plugins_tying_across_scopes_is_still_ambiguous() {
        let project = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(project.path().join("plugins")).unwrap();
        std::fs::create_dir_all(user.path().join("plugins")).unwrap();
        write_manifest(&project.path().join("plugins"), "jn-fmt-csv-project", &[r"^.*\.csv$"], "format");
        write_manifest(&user.path().join("plugins"), "jn-fmt-csv-user", &[r"^.*\.csv$"], "format");

        let registry = Registry::discover(
            &[
                (Scope::Project, project.path().to_path_buf()),
                (Scope::User, user.path().to_path_buf()),
            ],
            None,
        )
        .unwrap();

        let err = registry.find_for_address("orders.csv", Mode::Read).unwrap_err();
        assert!(matches!(err, RegistryError::Ambiguous { .. }));
    }

    #[test]
    fn longest_match_wins_regardless_of_scope() {
        let project = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(project.path().join("plugins")).unwrap();
        std::fs::create_dir_all(user.path().join("plugins")).unwrap();
        write_manifest(&project.path().join("plugins"), "jn-fmt-csv-generic", &[r"^.*\.csv$"], "format");
        write_manifest(&user.path().join("plugins"), "jn-fmt-csv-specific", &[r"^orders\.csv$"], "format");

        let registry = Registry::discover(
            &[
                (Scope::Project, project.path().to_path_buf()),
                (Scope::User, user.path().to_path_buf()),
            ],
            None,
        )
        .unwrap();

        let found = registry.find_for_address("orders.csv", Mode::Read).unwrap();
        assert_eq!(found.name, "jn-fmt-csv-specific");
    }

    #[test]
    fn no_match_returns_not_found() {
        let project = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(project.path().join("plugins")).unwrap();
        write_manifest(&project.path().join("plugins"), "jn-fmt-csv", &[r"^.*\.csv$"], "format");

        let registry =
            Registry::discover(&[(Scope::Project, project.path().to_path_buf())], None).unwrap();

        let err = registry.find_for_address("orders.json", Mode::Read).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }
}
