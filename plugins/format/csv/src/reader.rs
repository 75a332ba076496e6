use std::io::{BufRead, Write};

use serde_json::{Map, Value};

use crate::args::Args;
use crate::delimiter::{self, SAMPLE_SIZE};
use crate::error::CsvError;
use crate::quote::FieldIndex;

/// Streaming CSV → NDJSON read mode (spec.md §4.5.1 "Read mode").
///
/// Delimiter resolution: an explicit `--delimiter` (anything but the
/// literal string `"auto"`) is used as-is; omitting the flag, or passing
/// `"auto"` explicitly, triggers sampling-based auto-detection over the
/// first [`SAMPLE_SIZE`] lines. Sampled lines are buffered and replayed
/// into the same row-processing loop as everything read afterward, so
/// auto-detection never drops input (spec.md §4.5.1 "Sample lines are
/// buffered, then replayed into the parse path").
pub fn run<R: BufRead, W: Write>(args: &Args, mut reader: R, mut writer: W) -> Result<(), CsvError> {
    let mut line_buf = String::new();
    let mut next_line = |line_buf: &mut String| -> Result<Option<String>, CsvError> {
        line_buf.clear();
        let n = reader.read_line(line_buf)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(strip_newline_and_cr(line_buf)))
    };

    let auto_detect = !matches!(args.delimiter.as_deref(), Some(d) if d != "auto");

    let mut pending: Vec<String> = Vec::new();
    let delimiter = if auto_detect {
        while pending.len() < SAMPLE_SIZE {
            match next_line(&mut line_buf)? {
                Some(line) => pending.push(line),
                None => break,
            }
        }
        delimiter::detect(&pending)
    } else {
        parse_delimiter(args.delimiter.as_deref().unwrap())?
    };

    let header_enabled = args.header_enabled();
    let mut headers: Option<Vec<String>> = None;
    let mut warned_truncated = false;
    let mut index = FieldIndex::new();

    let mut pending = pending.into_iter();
    loop {
        let line = match pending.next() {
            Some(line) => line,
            None => match next_line(&mut line_buf)? {
                Some(line) => line,
                None => break,
            },
        };
        if line.is_empty() {
            continue;
        }

        index.split(&line, delimiter, args.max_fields_per_row);
        if index.truncated() && !warned_truncated {
            eprintln!(
                "jn-fmt-csv: row exceeds max_fields_per_row ({}); excess fields truncated",
                args.max_fields_per_row
            );
            warned_truncated = true;
        }

        if header_enabled && headers.is_none() {
            headers = Some((0..index.len()).map(|i| index.field(&line, i).trim().to_string()).collect());
            continue;
        }

        let value = row_to_value(headers.as_deref(), &index, &line);
        serde_json::to_writer(&mut writer, &value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    Ok(())
}

fn row_to_value(headers: Option<&[String]>, index: &FieldIndex, line: &str) -> Value {
    let mut map = Map::new();
    for i in 0..index.len() {
        let key = match headers {
            Some(h) if i < h.len() => h[i].clone(),
            Some(h) => format!("_extra{}", i - h.len()),
            None => format!("col{i}"),
        };
        map.insert(key, Value::String(index.field(line, i).into_owned()));
    }
    Value::Object(map)
}

fn strip_newline_and_cr(line: &str) -> String {
    line.trim_end_matches('\n').trim_end_matches('\r').to_string()
}

fn parse_delimiter(s: &str) -> Result<char, CsvError> {
    Ok(match s {
        "\\t" | "\t" => '\t',
        "\\n" => '\n',
        other if other.chars().count() == 1 => other.chars().next().unwrap(),
        other => other.chars().next().unwrap_or_else(|| {
            tracing::warn!(delimiter = other, "delimiter longer than one character, using first");
            ','
        }),
    })
}
