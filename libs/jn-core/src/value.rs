use serde::{Deserialize, Serialize};

/// A typed configuration value, as produced by [`infer_value`] from raw
/// textual address parameters, or supplied directly by a profile/plugin
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Render the value back to its textual form (inverse of [`infer_value`]
    /// for values that originated as text; used when re-serializing a
    /// `Config` for display/logging).
    pub fn to_text(&self) -> String {
        match self {
            ConfigValue::String(s) => s.clone(),
            ConfigValue::Integer(i) => i.to_string(),
            ConfigValue::Float(f) => f.to_string(),
            ConfigValue::Boolean(b) => b.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Infer a [`ConfigValue`] from raw text per spec: digits → integer, digits
/// with a `.` → float, `true`/`false` → boolean, otherwise string.
pub fn infer_value(raw: &str) -> ConfigValue {
    if raw == "true" {
        return ConfigValue::Boolean(true);
    }
    if raw == "false" {
        return ConfigValue::Boolean(false);
    }
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit() || c == '-') {
        if let Ok(i) = raw.parse::<i64>() {
            return ConfigValue::Integer(i);
        }
    }
    if raw.contains('.')
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
    {
        if let Ok(f) = raw.parse::<f64>() {
            return ConfigValue::Float(f);
        }
    }
    ConfigValue::String(raw.to_string())
}
