use std::io::{BufRead, Write};

use crate::error::TomlError;
use crate::render;

/// NDJSON → TOML write mode. Each input line is a root object rendered as
/// its own TOML document (spec.md §4.5.2 "Write mode"); documents are
/// separated by a blank line since TOML has no native multi-document
/// framing.
pub fn run<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<(), TomlError> {
    let mut first = true;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)?;
        let document = render::write_document(&value)?;
        if !first {
            writer.write_all(b"\n")?;
        }
        first = false;
        writer.write_all(document.as_bytes())?;
        writer.flush()?;
    }
    Ok(())
}
