use std::io::{BufRead, Read, Write};

use crate::error::TomlError;
use crate::parser;

/// TOML → NDJSON read mode. TOML's grammar isn't meaningfully streamable
/// across table boundaries, so the whole document is read before parsing;
/// the result is a single NDJSON record for the root table (spec.md
/// §4.5.2 "Read mode").
pub fn run<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> Result<(), TomlError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    let value = parser::parse_document(&input)?;
    serde_json::to_writer(&mut writer, &value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_a_document_to_one_ndjson_record() {
        let mut out = Vec::new();
        run("name = \"alice\"\nage = 30\n".as_bytes(), &mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert_eq!(line.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(v, serde_json::json!({"name": "alice", "age": 30}));
    }

    #[test]
    fn grammar_error_is_reported_with_line_number() {
        let mut out = Vec::new();
        let err = run("a = 1\nb 2\n".as_bytes(), &mut out).unwrap_err();
        assert_eq!(err.line, 2);
    }
}
