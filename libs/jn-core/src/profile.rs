use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;

/// The three profile/plugin search scopes, in precedence order (spec.md
/// §4.2, §6.5): project beats user beats system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Project,
    User,
    System,
}

impl Scope {
    pub const ALL_IN_PRECEDENCE: [Scope; 3] = [Scope::Project, Scope::User, Scope::System];

    /// Root directory for this scope, if it applies in the current
    /// environment (e.g. `System` always applies; `User` depends on
    /// `JN_HOME`/`$HOME` being resolvable).
    pub fn root_dir(self) -> Option<PathBuf> {
        match self {
            Scope::Project => Some(PathBuf::from("./.jn")),
            Scope::User => {
                if let Ok(home) = std::env::var("JN_HOME") {
                    Some(PathBuf::from(home))
                } else {
                    std::env::var("HOME").ok().map(|h| Path::new(&h).join(".jn"))
                }
            }
            Scope::System => Some(PathBuf::from("/usr/share/jn")),
        }
    }
}

/// `_meta.json`: connection-level configuration for a profile namespace.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileMeta {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub defaults: serde_json::Map<String, Value>,
}

/// A component file (`<component>.json`) supplying per-operation defaults.
/// `.sql`/`.jq` component files are read as opaque text (they are bodies
/// for out-of-scope protocol/filter plugins, not JN-core data) and carry
/// no `defaults`.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    pub defaults: serde_json::Map<String, Value>,
    pub body: Option<String>,
}

/// A fully loaded profile reference: `@namespace/component`.
#[derive(Debug, Clone)]
pub struct ProfileDescriptor {
    pub namespace: String,
    pub component: Option<String>,
    pub meta: ProfileMeta,
    pub component_def: Option<ComponentDescriptor>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile namespace '{0}' not found in any scope")]
    NamespaceMissing(String),
    #[error("profile component '{component}' not found under namespace '{namespace}'")]
    ComponentMissing { namespace: String, component: String },
    #[error("profile '{0}': {1}")]
    Parse(String, String),
    #[error("io error reading profile '{0}': {1}")]
    Io(String, std::io::Error),
}

/// Locate and load `@namespace[/component]` across the three scopes in
/// precedence order (spec.md §4.3 step 3, §6.5).
pub fn load_profile(
    role: &str,
    namespace: &str,
    component: Option<&str>,
) -> Result<ProfileDescriptor, ProfileError> {
    for scope in Scope::ALL_IN_PRECEDENCE {
        let Some(root) = scope.root_dir() else { continue };
        let ns_dir = root.join("profiles").join(role).join(namespace);
        if !ns_dir.is_dir() {
            continue;
        }

        let meta_path = ns_dir.join("_meta.json");
        let meta = read_meta(&meta_path)?;

        let component_def = match component {
            Some(c) => Some(read_component(&ns_dir, c)?),
            None => None,
        };

        return Ok(ProfileDescriptor {
            namespace: namespace.to_string(),
            component: component.map(str::to_string),
            meta,
            component_def,
        });
    }
    Err(ProfileError::NamespaceMissing(namespace.to_string()))
}

fn read_meta(path: &Path) -> Result<ProfileMeta, ProfileError> {
    if !path.is_file() {
        // A namespace without _meta.json still has an implicit "type"
        // equal to the namespace — callers that need base_url/command
        // will fail naturally when those are absent.
        return Ok(ProfileMeta {
            kind: String::new(),
            base_url: None,
            command: None,
            defaults: serde_json::Map::new(),
        });
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ProfileError::Io(path.display().to_string(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| ProfileError::Parse(path.display().to_string(), e.to_string()))
}

fn read_component(ns_dir: &Path, component: &str) -> Result<ComponentDescriptor, ProfileError> {
    for ext in ["json", "sql", "jq"] {
        let path = ns_dir.join(format!("{component}.{ext}"));
        if !path.is_file() {
            continue;
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ProfileError::Io(path.display().to_string(), e))?;
        if ext == "json" {
            let defaults: serde_json::Map<String, Value> = serde_json::from_str(&content)
                .map_err(|e| ProfileError::Parse(path.display().to_string(), e.to_string()))?;
            return Ok(ComponentDescriptor { defaults, body: None });
        }
        return Ok(ComponentDescriptor {
            defaults: serde_json::Map::new(),
            body: Some(content),
        });
    }
    Err(ProfileError::ComponentMissing {
        namespace: ns_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        component: component.to_string(),
    })
}

/// Convert a JSON defaults map into a typed [`Config`] (values are already
/// typed JSON, no textual inference needed — unlike address parameters).
pub fn defaults_to_config(defaults: &serde_json::Map<String, Value>) -> Config {
    let mut cfg = Config::new();
    for (k, v) in defaults {
        let cv = match v {
            Value::String(s) => crate::value::ConfigValue::String(s.clone()),
            Value::Number(n) if n.is_i64() => crate::value::ConfigValue::Integer(n.as_i64().unwrap()),
            Value::Number(n) => crate::value::ConfigValue::Float(n.as_f64().unwrap_or_default()),
            Value::Bool(b) => crate::value::ConfigValue::Boolean(*b),
            other => crate::value::ConfigValue::String(other.to_string()),
        };
        cfg.set(k.clone(), cv);
    }
    cfg
}
