use serde_json::Value;

/// True if `key` is a reserved metadata key (spec.md §3: keys beginning
/// with `_` are metadata injected by readers, e.g. `_source`, `_label`,
/// `_path`, `_line_index`, `_error`).
pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with('_')
}

/// True if `record` is a data error record (`_error: true`), which flows
/// through the pipeline as data rather than terminating it (spec.md §7).
pub fn is_error_record(record: &Value) -> bool {
    record
        .as_object()
        .and_then(|o| o.get("_error"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Build an `_error: true` record carrying a human-readable `message` and
/// any original raw text that failed to parse.
pub fn error_record(message: impl Into<String>, raw: Option<&str>) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("_error".to_string(), Value::Bool(true));
    obj.insert("_message".to_string(), Value::String(message.into()));
    if let Some(raw) = raw {
        obj.insert("_raw".to_string(), Value::String(raw.to_string()));
    }
    Value::Object(obj)
}

/// Serialize `value` as a single NDJSON line (JSON value + trailing `\n`).
pub fn to_line(value: &Value) -> Result<String, serde_json::Error> {
    let mut s = serde_json::to_string(value)?;
    s.push('\n');
    Ok(s)
}
