use std::io::BufRead;
use std::path::Path;
use std::process::{Command, Stdio};

use jn_core::PluginMeta;
use serde::Deserialize;

use crate::error::RegistryError;

/// Metadata as written by a self-contained plugin's single NDJSON record
/// under `--mode inspect` (spec.md §4.2, §6). Shape matches [`PluginMeta`]
/// minus the `executable` field, which the registry fills in itself.
#[derive(Debug, Deserialize)]
struct InspectRecord {
    name: String,
    version: String,
    role: jn_core::Role,
    modes: Vec<jn_core::Mode>,
    matches: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

/// Invoke `executable --mode inspect`, read the single NDJSON record it
/// writes to stdout, and fold it into a [`PluginMeta`]. Used for
/// "self-contained" plugins that carry no sidecar manifest (spec.md §4.2).
pub fn invoke_inspect(executable: &Path) -> Result<PluginMeta, RegistryError> {
    let mut child = Command::new(executable)
        .arg("--mode")
        .arg("inspect")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RegistryError::Inspect { path: executable.to_path_buf(), message: e.to_string() })?;

    let stdout = child.stdout.take().expect("piped stdout");
    let mut line = String::new();
    std::io::BufReader::new(stdout)
        .read_line(&mut line)
        .map_err(|e| RegistryError::Inspect { path: executable.to_path_buf(), message: e.to_string() })?;

    let status = child.wait().map_err(|e| RegistryError::Inspect {
        path: executable.to_path_buf(),
        message: e.to_string(),
    })?;
    if !status.success() {
        return Err(RegistryError::Inspect {
            path: executable.to_path_buf(),
            message: format!("exited with status {status}"),
        });
    }

    let record: InspectRecord = serde_json::from_str(line.trim_end()).map_err(|e| RegistryError::Inspect {
        path: executable.to_path_buf(),
        message: format!("invalid inspect record: {e}"),
    })?;

    Ok(PluginMeta {
        name: record.name,
        version: record.version,
        role: record.role,
        modes: record.modes,
        matches: record.matches,
        dependencies: record.dependencies,
        defaults: Vec::new(),
        executable: executable.to_path_buf(),
    })
}
