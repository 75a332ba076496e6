use std::collections::HashSet;
use std::io::{BufRead, Write};

use serde_json::Value;

use crate::args::Args;
use crate::error::CsvError;
use crate::quote::quote_field;

/// NDJSON → CSV write mode (spec.md §4.5.1 "Write mode").
///
/// The output header is the ordered union of every key seen across every
/// input record, so the full input must be buffered before the first byte
/// of output is written — this codec is the one documented non-streaming
/// direction in the pipeline (spec.md §4.5.1 "Write mode ... requires
/// buffering the full input").
pub fn run<R: BufRead, W: Write>(args: &Args, reader: R, mut writer: W) -> Result<(), CsvError> {
    let delimiter = args
        .delimiter
        .as_deref()
        .filter(|d| *d != "auto")
        .and_then(|d| d.chars().next())
        .unwrap_or(',');

    let mut records: Vec<serde_json::Map<String, Value>> = Vec::new();
    let mut header: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (row, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)?;
        let object = value.as_object().cloned().ok_or(CsvError::NotAnObject(value))?;
        for key in object.keys() {
            if seen.insert(key.clone()) {
                header.push(key.clone());
            }
        }
        for nested in object.values() {
            if let Some(kind) = nested_kind(nested) {
                if args.strict_nested {
                    return Err(CsvError::NestedValueForbidden { row, kind });
                }
            }
        }
        records.push(object);
    }

    if header.is_empty() {
        return Ok(());
    }

    write_row(&mut writer, header.iter().map(String::as_str), delimiter)?;
    for record in &records {
        let row: Vec<String> = header
            .iter()
            .map(|key| match record.get(key) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        write_row(&mut writer, row.iter().map(String::as_str), delimiter)?;
    }

    Ok(())
}

fn write_row<'a, W: Write>(writer: &mut W, fields: impl Iterator<Item = &'a str>, delimiter: char) -> Result<(), CsvError> {
    let mut first = true;
    for field in fields {
        if !first {
            write!(writer, "{delimiter}")?;
        }
        first = false;
        write!(writer, "{}", quote_field(field, delimiter))?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}

fn nested_kind(value: &Value) -> Option<&'static str> {
    match value {
        Value::Object(_) => Some("object"),
        Value::Array(_) => Some("array"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn run_str(args: &Args, input: &str) -> String {
        let mut out = Vec::new();
        run(args, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_is_ordered_union_of_all_keys() {
        let a = args::parse(vec!["--mode".into(), "write".into()].into_iter());
        let input = "{\"a\":1,\"b\":2}\n{\"b\":3,\"c\":4}\n";
        let out = run_str(&a, input);
        let mut lines = out.lines();
        assert_eq!(lines.next().unwrap(), "a,b,c");
        assert_eq!(lines.next().unwrap(), "1,2,");
        assert_eq!(lines.next().unwrap(), ",3,4");
    }

    #[test]
    fn null_becomes_empty_field() {
        let a = args::parse(vec!["--mode".into(), "write".into()].into_iter());
        let out = run_str(&a, "{\"a\":null,\"b\":1}\n");
        assert_eq!(out, "a,b\n,1\n");
    }

    #[test]
    fn values_needing_quotes_are_quoted() {
        let a = args::parse(vec!["--mode".into(), "write".into()].into_iter());
        let out = run_str(&a, "{\"a\":\"x,y\",\"b\":\"say \\\"hi\\\"\"}\n");
        let mut lines = out.lines();
        lines.next();
        assert_eq!(lines.next().unwrap(), "\"x,y\",\"say \"\"hi\"\"\"");
    }

    #[test]
    fn nested_object_is_json_repr_when_not_strict() {
        let a = args::parse(vec!["--mode".into(), "write".into()].into_iter());
        let out = run_str(&a, "{\"a\":{\"x\":1}}\n");
        let mut lines = out.lines();
        lines.next();
        assert!(lines.next().unwrap().contains("\"x\":1"));
    }

    #[test]
    fn nested_object_is_hard_error_when_strict() {
        let a = args::parse(
            vec!["--mode".into(), "write".into(), "--strict-nested".into(), "true".into()].into_iter(),
        );
        let err = run(&a, "{\"a\":{\"x\":1}}\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(matches!(err, CsvError::NestedValueForbidden { row: 0, kind: "object" }));
    }

    #[test]
    fn non_object_record_is_rejected() {
        let a = args::parse(vec!["--mode".into(), "write".into()].into_iter());
        let err = run(&a, "[1,2]\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(matches!(err, CsvError::NotAnObject(_)));
    }

    #[test]
    fn empty_input_produces_no_output() {
        let a = args::parse(vec!["--mode".into(), "write".into()].into_iter());
        assert_eq!(run_str(&a, ""), "");
    }
}
