//! Renders a `serde_json::Value::Object` back to TOML text (spec.md
//! §4.5.2 "Write mode"). A two-pass walk per table: scalar leaves first,
//! then nested tables and arrays-of-tables, each introduced by its own
//! `[prefix.key]` / `[[prefix.key]]` header and recursed into.
//!
//! Grounded on `gauss-engine::plugin_host::flatten_toml_value`/
//! `serialize_value`'s shape: a match over every value variant, scalars
//! rendered directly, composites recursed (see DESIGN.md).

use serde_json::{Map, Value};

use crate::error::TomlError;

pub fn write_document(value: &Value) -> Result<String, TomlError> {
    let object = value.as_object().ok_or_else(|| TomlError { line: 0, message: "root record must be a JSON object".to_string() })?;
    let mut out = String::new();
    write_table(object, &[], &mut out)?;
    Ok(out)
}

fn write_table(object: &Map<String, Value>, prefix: &[String], out: &mut String) -> Result<(), TomlError> {
    for (key, value) in object {
        if is_scalar_like(value) {
            out.push_str(&quote_key(key));
            out.push_str(" = ");
            out.push_str(&render_value(value)?);
            out.push('\n');
        }
    }

    for (key, value) in object {
        let mut child_prefix = prefix.to_vec();
        child_prefix.push(key.clone());
        let header = child_prefix.iter().map(|p| quote_key(p)).collect::<Vec<_>>().join(".");

        match value {
            Value::Object(nested) => {
                out.push('\n');
                out.push('[');
                out.push_str(&header);
                out.push_str("]\n");
                write_table(nested, &child_prefix, out)?;
            }
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                for item in items {
                    out.push('\n');
                    out.push_str("[[");
                    out.push_str(&header);
                    out.push_str("]]\n");
                    write_table(item.as_object().unwrap(), &child_prefix, out)?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Scalars, plus arrays that aren't entirely tables (those render inline,
/// each object element becoming an inline table per spec.md §4.5.2).
fn is_scalar_like(value: &Value) -> bool {
    match value {
        Value::Object(_) => false,
        Value::Array(items) => !(!items.is_empty() && items.iter().all(Value::is_object)),
        _ => true,
    }
}

fn render_value(value: &Value) -> Result<String, TomlError> {
    Ok(match value {
        Value::Null => "\"\"".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => render_string(s),
        Value::Array(items) => {
            let rendered: Result<Vec<String>, TomlError> = items.iter().map(render_value).collect();
            format!("[{}]", rendered?.join(", "))
        }
        Value::Object(map) => render_inline_table(map)?,
    })
}

fn render_inline_table(map: &Map<String, Value>) -> Result<String, TomlError> {
    if map.is_empty() {
        return Ok("{}".to_string());
    }
    let mut parts = Vec::with_capacity(map.len());
    for (k, v) in map {
        parts.push(format!("{} = {}", quote_key(k), render_value(v)?));
    }
    Ok(format!("{{ {} }}", parts.join(", ")))
}

fn render_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Keys need quoting when empty or containing anything outside
/// `[A-Za-z0-9_-]` (spec.md §4.5.2).
fn quote_key(key: &str) -> String {
    let needs_quoting = key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if needs_quoting {
        render_string(key)
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_render_as_key_equals_value() {
        let v = serde_json::json!({"name": "alice", "age": 30, "active": true});
        let out = write_document(&v).unwrap();
        assert!(out.contains("name = \"alice\"\n"));
        assert!(out.contains("age = 30\n"));
        assert!(out.contains("active = true\n"));
    }

    #[test]
    fn nested_object_becomes_a_table_header() {
        let v = serde_json::json!({"server": {"host": "localhost", "port": 8080}});
        let out = write_document(&v).unwrap();
        assert!(out.contains("[server]\n"));
        assert!(out.contains("host = \"localhost\"\n"));
    }

    #[test]
    fn array_of_objects_becomes_array_of_tables() {
        let v = serde_json::json!({"fruit": [{"name": "apple"}, {"name": "banana"}]});
        let out = write_document(&v).unwrap();
        assert_eq!(out.matches("[[fruit]]").count(), 2);
    }

    #[test]
    fn null_becomes_empty_string() {
        let v = serde_json::json!({"a": null});
        assert_eq!(write_document(&v).unwrap(), "a = \"\"\n");
    }

    #[test]
    fn object_inside_a_plain_array_is_inlined() {
        let v = serde_json::json!({"points": [{"x": 1}, {"x": 2}, 3]});
        let out = write_document(&v).unwrap();
        assert!(out.contains("points = [{ x = 1 }, { x = 2 }, 3]"));
    }

    #[test]
    fn keys_needing_quoting() {
        let v = serde_json::json!({"has space": 1});
        assert_eq!(write_document(&v).unwrap(), "\"has space\" = 1\n");
    }

    #[test]
    fn non_object_root_is_rejected() {
        let v = serde_json::json!([1, 2]);
        assert!(write_document(&v).is_err());
    }
}
