use serde::{Deserialize, Serialize};

/// A plugin's declared role (spec.md §3, §6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Format,
    Protocol,
    Filter,
    Display,
    Shell,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Format => "format",
            Role::Protocol => "protocol",
            Role::Filter => "filter",
            Role::Display => "display",
            Role::Shell => "shell",
        };
        write!(f, "{s}")
    }
}

/// A mode a plugin supports invoking under (spec.md §3, §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Read,
    Write,
    Inspect,
    Raw,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mode::Read => "read",
            Mode::Write => "write",
            Mode::Inspect => "inspect",
            Mode::Raw => "raw",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Mode::Read),
            "write" => Ok(Mode::Write),
            "inspect" => Ok(Mode::Inspect),
            "raw" => Ok(Mode::Raw),
            other => Err(format!("unknown mode: {other:?}")),
        }
    }
}

/// Declared plugin metadata (spec.md §3 `PluginMeta`, §6.3).
///
/// Produced either by parsing a plugin's sidecar `.jnplugin.toml` manifest
/// (`jn-registry::manifest`) or by invoking a self-contained plugin with
/// `--mode inspect` (`jn-registry::inspect`) — see DESIGN.md for why both
/// paths exist and converge on this one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMeta {
    pub name: String,
    pub version: String,
    pub role: Role,
    pub modes: Vec<Mode>,
    /// Ordered list of anchored regular expressions over `Address.base`.
    pub matches: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Plugin-declared default config values, textual (type inference
    /// happens at merge time like any other raw parameter). Lowest
    /// priority in the merge chain of spec.md §4.3.
    #[serde(default)]
    pub defaults: Vec<(String, String)>,
    /// Absolute path to the executable backing this plugin. Not part of
    /// the wire/manifest schema — filled in by the registry at discovery
    /// time, hence `#[serde(skip)]` with a placeholder default.
    #[serde(skip)]
    pub executable: std::path::PathBuf,
}

impl PluginMeta {
    pub fn supports_mode(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }
}
