use std::path::{Path, PathBuf};

use jn_core::{Mode, PluginMeta, Role};
use serde::Deserialize;

use crate::error::RegistryError;

/// Shape of a sidecar `<name>.jnplugin.toml` manifest. Declarative: parsed,
/// never executed, the reference implementation's in-source header block
/// reborn as a file a compiled binary can carry alongside itself.
#[derive(Debug, Deserialize)]
struct ManifestFile {
    name: String,
    version: String,
    role: Role,
    modes: Vec<Mode>,
    matches: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    defaults: std::collections::BTreeMap<String, String>,
    /// Path to the executable, relative to the manifest's own directory.
    /// Defaults to a sibling file sharing the manifest's stem.
    #[serde(default)]
    executable: Option<String>,
}

/// Parse a sidecar manifest at `manifest_path` into a [`PluginMeta`].
pub fn parse_manifest(manifest_path: &Path) -> Result<PluginMeta, RegistryError> {
    let content = std::fs::read_to_string(manifest_path).map_err(|e| RegistryError::Manifest {
        path: manifest_path.to_path_buf(),
        message: e.to_string(),
    })?;
    let parsed: ManifestFile = toml::from_str(&content).map_err(|e| RegistryError::Manifest {
        path: manifest_path.to_path_buf(),
        message: e.to_string(),
    })?;

    let executable = match &parsed.executable {
        Some(rel) => manifest_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(rel),
        None => sibling_executable(manifest_path),
    };

    Ok(PluginMeta {
        name: parsed.name,
        version: parsed.version,
        role: parsed.role,
        modes: parsed.modes,
        matches: parsed.matches,
        dependencies: parsed.dependencies,
        defaults: parsed.defaults.into_iter().collect(),
        executable,
    })
}

/// `foo.jnplugin.toml` → `foo`, in the same directory.
fn sibling_executable(manifest_path: &Path) -> PathBuf {
    let dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = manifest_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = file_name.strip_suffix(".jnplugin.toml").unwrap_or(file_name);
    dir.join(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_manifest_with_default_executable() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("jn-fmt-csv.jnplugin.toml");
        let mut f = std::fs::File::create(&manifest_path).unwrap();
        writeln!(
            f,
            r#"
name = "csv"
version = "1.0.0"
role = "format"
modes = ["read", "write"]
matches = ["^.*\\.csv$"]
"#
        )
        .unwrap();

        let meta = parse_manifest(&manifest_path).unwrap();
        assert_eq!(meta.name, "csv");
        assert_eq!(meta.role, Role::Format);
        assert_eq!(meta.executable, dir.path().join("jn-fmt-csv"));
    }

    #[test]
    fn parses_manifest_with_explicit_executable() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("thing.jnplugin.toml");
        let mut f = std::fs::File::create(&manifest_path).unwrap();
        writeln!(
            f,
            r#"
name = "thing"
version = "0.1.0"
role = "filter"
modes = ["read"]
matches = []
executable = "bin/thing-runner"
"#
        )
        .unwrap();

        let meta = parse_manifest(&manifest_path).unwrap();
        assert_eq!(meta.executable, dir.path().join("bin/thing-runner"));
    }
}
