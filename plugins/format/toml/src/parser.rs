//! Hand-written TOML parser (spec.md §4.5.2). TOML's grammar isn't
//! meaningfully streamable across table boundaries, so this reads a whole
//! document and returns its root table as one [`serde_json::Value::Object`].
//!
//! Values parse directly into `serde_json::Value` rather than a dedicated
//! TOML value type: the only consumer is the NDJSON record this plugin
//! emits, so there's no second representation to keep in sync.

use serde_json::{Map, Value};

use crate::error::TomlError;

pub fn parse_document(input: &str) -> Result<Value, TomlError> {
    let mut parser = Parser::new(input);
    let mut root = Map::new();
    let mut current_path: Vec<String> = Vec::new();

    parser.skip_newlines_and_blank();
    while !parser.eof() {
        if parser.peek() == Some('[') {
            parser.parse_table_header(&mut root, &mut current_path)?;
        } else {
            parser.parse_key_value(&mut root, &current_path)?;
        }
        parser.skip_line_ws();
        parser.skip_comment_if_any();
        match parser.peek() {
            None | Some('\n') | Some('\r') => {}
            Some(other) => return Err(parser.err(format!("unexpected character '{other}' after statement"))),
        }
        parser.skip_newlines_and_blank();
    }

    Ok(Value::Object(root))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self { chars: input.chars().collect(), pos: 0, line: 1 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn err(&self, message: impl Into<String>) -> TomlError {
        TomlError { line: self.line, message: message.into() }
    }

    fn skip_line_ws(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
    }

    fn skip_comment_if_any(&mut self) {
        if self.peek() == Some('#') {
            while !matches!(self.peek(), Some('\n') | None) {
                self.bump();
            }
        }
    }

    fn skip_newlines_and_blank(&mut self) {
        loop {
            self.skip_line_ws();
            self.skip_comment_if_any();
            match self.peek() {
                Some('\n') | Some('\r') => {
                    self.bump();
                }
                _ => break,
            }
        }
    }

    /// Whitespace, newlines, and comments are all insignificant inside
    /// `[...]`/`{...}` — TOML lets multi-line arrays wrap freely.
    fn skip_ws_newlines_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\n') | Some('\r') => {
                    self.bump();
                }
                Some('#') => {
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_table_header(&mut self, root: &mut Map<String, Value>, current_path: &mut Vec<String>) -> Result<(), TomlError> {
        self.bump(); // '['
        let is_array = if self.peek() == Some('[') {
            self.bump();
            true
        } else {
            false
        };
        self.skip_line_ws();
        let path = self.parse_dotted_key()?;
        self.skip_line_ws();
        if self.peek() != Some(']') {
            return Err(self.err("expected ']' closing table header"));
        }
        self.bump();
        if is_array {
            if self.peek() != Some(']') {
                return Err(self.err("expected ']]' closing array-of-table header"));
            }
            self.bump();
        }

        if is_array {
            append_array_table(root, &path, self.line)?;
        } else {
            create_table(root, &path, self.line)?;
        }
        *current_path = path;
        Ok(())
    }

    fn parse_key_value(&mut self, root: &mut Map<String, Value>, current_path: &[String]) -> Result<(), TomlError> {
        let key_path = self.parse_dotted_key()?;
        self.skip_line_ws();
        if self.peek() != Some('=') {
            return Err(self.err("expected '=' after key"));
        }
        self.bump();
        self.skip_line_ws();
        let value = self.parse_value()?;

        let mut full_path = current_path.to_vec();
        full_path.extend(key_path);
        insert_dotted(root, &full_path, value, self.line)
    }

    fn parse_dotted_key(&mut self) -> Result<Vec<String>, TomlError> {
        let mut parts = vec![self.parse_key_segment()?];
        loop {
            self.skip_line_ws();
            if self.peek() == Some('.') {
                self.bump();
                self.skip_line_ws();
                parts.push(self.parse_key_segment()?);
            } else {
                break;
            }
        }
        Ok(parts)
    }

    fn parse_key_segment(&mut self) -> Result<String, TomlError> {
        match self.peek() {
            Some('"') => self.parse_basic_string(),
            Some('\'') => self.parse_literal_string(),
            Some(c) if is_bare_key_char(c) => {
                let mut s = String::new();
                while let Some(c) = self.peek() {
                    if is_bare_key_char(c) {
                        s.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                Ok(s)
            }
            _ => Err(self.err("expected a key")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, TomlError> {
        match self.peek() {
            Some('"') if self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') => self.parse_multiline_basic_string(),
            Some('"') => self.parse_basic_string().map(Value::String),
            Some('\'') if self.peek_at(1) == Some('\'') && self.peek_at(2) == Some('\'') => self.parse_multiline_literal_string(),
            Some('\'') => self.parse_literal_string().map(Value::String),
            Some('[') => self.parse_inline_array(),
            Some('{') => self.parse_inline_table(),
            Some(_) => self.parse_bare_value(),
            None => Err(self.err("expected a value")),
        }
    }

    fn parse_basic_string(&mut self) -> Result<String, TomlError> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_multiline_basic_string(&mut self) -> Result<Value, TomlError> {
        self.bump();
        self.bump();
        self.bump();
        if self.peek() == Some('\r') {
            self.bump();
        }
        if self.peek() == Some('\n') {
            self.bump();
        }
        let mut out = String::new();
        loop {
            if self.peek() == Some('"') && self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') {
                self.bump();
                self.bump();
                self.bump();
                return Ok(Value::String(out));
            }
            match self.bump() {
                None => return Err(self.err("unterminated multi-line string")),
                Some('\\') if matches!(self.peek(), Some('\n') | Some('\r') | Some(' ') | Some('\t')) => {
                    // Line-ending backslash: trim the newline and any
                    // leading whitespace on the continuation line.
                    while matches!(self.peek(), Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
                        self.bump();
                    }
                }
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_literal_string(&mut self) -> Result<String, TomlError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated literal string")),
                Some('\'') => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_multiline_literal_string(&mut self) -> Result<Value, TomlError> {
        self.bump();
        self.bump();
        self.bump();
        if self.peek() == Some('\r') {
            self.bump();
        }
        if self.peek() == Some('\n') {
            self.bump();
        }
        let mut out = String::new();
        loop {
            if self.peek() == Some('\'') && self.peek_at(1) == Some('\'') && self.peek_at(2) == Some('\'') {
                self.bump();
                self.bump();
                self.bump();
                return Ok(Value::String(out));
            }
            match self.bump() {
                None => return Err(self.err("unterminated multi-line literal string")),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, TomlError> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('u') => self.parse_unicode_escape(4),
            Some('U') => self.parse_unicode_escape(8),
            Some(other) => Err(self.err(format!("invalid escape '\\{other}'"))),
            None => Err(self.err("unterminated escape sequence")),
        }
    }

    fn parse_unicode_escape(&mut self, digits: usize) -> Result<char, TomlError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let c = self.bump().ok_or_else(|| self.err("unterminated unicode escape"))?;
            let d = c.to_digit(16).ok_or_else(|| self.err("invalid hex digit in unicode escape"))?;
            code = code * 16 + d;
        }
        char::from_u32(code).ok_or_else(|| self.err("escape is not a valid unicode scalar value"))
    }

    fn parse_inline_array(&mut self) -> Result<Value, TomlError> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws_newlines_comments();
            if self.peek() == Some(']') {
                self.bump();
                break;
            }
            items.push(self.parse_value()?);
            self.skip_ws_newlines_comments();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.err("expected ',' or ']' in array")),
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_inline_table(&mut self) -> Result<Value, TomlError> {
        self.bump(); // '{'
        let mut map = Map::new();
        self.skip_line_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_line_ws();
            let key_path = self.parse_dotted_key()?;
            self.skip_line_ws();
            if self.peek() != Some('=') {
                return Err(self.err("expected '=' in inline table"));
            }
            self.bump();
            self.skip_line_ws();
            let value = self.parse_value()?;
            insert_dotted(&mut map, &key_path, value, self.line)?;
            self.skip_line_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.err("expected ',' or '}' in inline table")),
            }
        }
        Ok(Value::Object(map))
    }

    fn parse_bare_value(&mut self) -> Result<Value, TomlError> {
        let mut token = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, ',' | ']' | '}' | '#' | '\n' | '\r') {
                break;
            }
            token.push(c);
            self.bump();
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(self.err("expected a value"));
        }
        Ok(bare_token_to_value(token))
    }
}

fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Integers, floats, booleans, and anything else (spec.md §4.5.1's sibling
/// rule in §4.5.2: "strings that do not parse as bool/integer/float are
/// kept as strings" — this is also how date/time literals survive without
/// a dedicated date type).
///
/// TOML's `inf`/`nan` floats have no JSON number representation, so they're
/// kept as the literal token text rather than attempting a lossy `f64`
/// round-trip through a format that can't hold non-finite numbers.
fn bare_token_to_value(token: &str) -> Value {
    if token == "true" {
        return Value::Bool(true);
    }
    if token == "false" {
        return Value::Bool(false);
    }
    if let Some(n) = parse_toml_integer(token) {
        return Value::Number(n.into());
    }
    let cleaned = token.replace('_', "");
    match cleaned.as_str() {
        "inf" | "+inf" | "-inf" | "nan" | "+nan" | "-nan" => return Value::String(token.to_string()),
        _ => {}
    }
    if looks_like_float(&cleaned) {
        if let Ok(f) = cleaned.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(token.to_string())
}

fn looks_like_float(cleaned: &str) -> bool {
    (cleaned.contains('.') || cleaned.to_ascii_lowercase().contains('e'))
        && cleaned.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

fn parse_toml_integer(token: &str) -> Option<i64> {
    let (neg, rest) = match token.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let cleaned = rest.replace('_', "");
    let value = if let Some(hex) = cleaned.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = cleaned.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()?
    } else if let Some(bin) = cleaned.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        cleaned.parse::<i64>().ok()?
    };
    Some(if neg { -value } else { value })
}

fn navigate_table<'a>(root: &'a mut Map<String, Value>, path: &[String], line: usize) -> Result<&'a mut Map<String, Value>, TomlError> {
    let mut current = root;
    for seg in path {
        let slot = current.entry(seg.clone()).or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(map) => map,
            Value::Array(arr) => {
                if arr.is_empty() {
                    arr.push(Value::Object(Map::new()));
                }
                match arr.last_mut().unwrap() {
                    Value::Object(map) => map,
                    _ => return Err(TomlError { line, message: format!("`{seg}` is not a table") }),
                }
            }
            _ => return Err(TomlError { line, message: format!("`{seg}` is not a table") }),
        };
    }
    Ok(current)
}

fn create_table(root: &mut Map<String, Value>, path: &[String], line: usize) -> Result<(), TomlError> {
    navigate_table(root, path, line).map(|_| ())
}

fn append_array_table(root: &mut Map<String, Value>, path: &[String], line: usize) -> Result<(), TomlError> {
    let (parent_path, last) = path.split_at(path.len() - 1);
    let parent = navigate_table(root, parent_path, line)?;
    let slot = parent.entry(last[0].clone()).or_insert_with(|| Value::Array(Vec::new()));
    match slot {
        Value::Array(arr) => {
            arr.push(Value::Object(Map::new()));
            Ok(())
        }
        _ => Err(TomlError { line, message: format!("`{}` is already defined as a non-array", last[0]) }),
    }
}

fn insert_dotted(root: &mut Map<String, Value>, path: &[String], value: Value, line: usize) -> Result<(), TomlError> {
    let (prefix, last) = path.split_at(path.len() - 1);
    let table = navigate_table(root, prefix, line)?;
    if table.contains_key(&last[0]) {
        return Err(TomlError { line, message: format!("key `{}` already defined", last[0]) });
    }
    table.insert(last[0].clone(), value);
    Ok(())
}
