use std::borrow::Cow;

/// Reusable per-row field index: `split` overwrites these vectors in place
/// rather than allocating a fresh `Vec<String>` per row, so parsing a
/// multi-million-row stream costs one allocation for the index arrays, not
/// one per row (spec.md §4.5.1 "zero allocation per row for the
/// field-boundary index"; DESIGN.md's arena-style note).
#[derive(Default)]
pub struct FieldIndex {
    starts: Vec<usize>,
    ends: Vec<usize>,
    quoted: Vec<bool>,
    truncated: bool,
}

impl FieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Split `line` (already CR-stripped) on `delimiter` per RFC 4180,
    /// recording each field's byte range and whether it was quote-enclosed.
    /// Stops recording once `max_fields` is reached; `truncated()` reports
    /// whether that happened (spec.md §4.5.1 "field cap").
    pub fn split(&mut self, line: &str, delimiter: char, max_fields: usize) {
        self.starts.clear();
        self.ends.clear();
        self.quoted.clear();
        self.truncated = false;

        let bytes = line.as_bytes();
        let mut i = 0usize;

        loop {
            if self.starts.len() >= max_fields {
                self.truncated = true;
                return;
            }

            if i < bytes.len() && bytes[i] == b'"' {
                // Quoted field (RFC 4180 rules 5-7): scan to the closing
                // quote, treating `""` as an escaped literal quote.
                let field_start = i;
                i += 1;
                loop {
                    match bytes.get(i) {
                        Some(b'"') => {
                            if bytes.get(i + 1) == Some(&b'"') {
                                i += 2;
                            } else {
                                i += 1;
                                break;
                            }
                        }
                        Some(_) => i += 1,
                        None => break, // unterminated quote at EOF: best effort
                    }
                }
                self.starts.push(field_start);
                self.ends.push(i);
                self.quoted.push(true);
                // Skip any stray bytes up to the next delimiter (RFC 4180
                // forbids them, but real-world data isn't always clean).
                while i < bytes.len() && bytes[i] != delimiter as u8 {
                    i += 1;
                }
            } else {
                let field_start = i;
                while i < bytes.len() && bytes[i] != delimiter as u8 {
                    i += 1;
                }
                self.starts.push(field_start);
                self.ends.push(i);
                self.quoted.push(false);
            }

            if i < bytes.len() && bytes[i] == delimiter as u8 {
                i += 1;
                if i == bytes.len() {
                    // Trailing delimiter: one more empty field follows.
                    self.starts.push(i);
                    self.ends.push(i);
                    self.quoted.push(false);
                    return;
                }
                continue;
            }
            return;
        }
    }

    /// Borrowed field text when unescaping isn't needed, owned text when a
    /// quoted field actually contains a doubled quote to collapse.
    pub fn field<'a>(&self, line: &'a str, i: usize) -> Cow<'a, str> {
        let raw = &line[self.starts[i]..self.ends[i]];
        if !self.quoted[i] {
            return Cow::Borrowed(raw);
        }
        let inner = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(raw);
        if inner.contains('"') {
            Cow::Owned(inner.replace("\"\"", "\""))
        } else {
            Cow::Borrowed(inner)
        }
    }
}

/// Quote `field` for CSV write mode iff it contains the delimiter, a
/// quote, a newline, or a carriage return (spec.md §4.5.1 "Write mode").
/// Quotes inside are doubled.
pub fn quote_field(field: &str, delimiter: char) -> Cow<'_, str> {
    let needs_quoting = field.contains(delimiter) || field.contains('"') || field.contains('\n') || field.contains('\r');
    if !needs_quoting {
        return Cow::Borrowed(field);
    }
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(index: &FieldIndex, line: &str) -> Vec<String> {
        (0..index.len()).map(|i| index.field(line, i).into_owned()).collect()
    }

    #[test]
    fn splits_unquoted_fields() {
        let mut idx = FieldIndex::new();
        idx.split("a,b,c", ',', 4096);
        assert_eq!(fields(&idx, "a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn unescapes_doubled_quotes() {
        let mut idx = FieldIndex::new();
        let line = r#"a,"he said ""hi""",c"#;
        idx.split(line, ',', 4096);
        assert_eq!(fields(&idx, line), vec!["a", r#"he said "hi""#, "c"]);
    }

    #[test]
    fn quoted_field_containing_delimiter() {
        let mut idx = FieldIndex::new();
        let line = r#"a,"b,c",d"#;
        idx.split(line, ',', 4096);
        assert_eq!(fields(&idx, line), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn trailing_delimiter_yields_empty_final_field() {
        let mut idx = FieldIndex::new();
        idx.split("a,b,", ',', 4096);
        assert_eq!(fields(&idx, "a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn field_cap_truncates_and_reports() {
        let mut idx = FieldIndex::new();
        idx.split("a,b,c,d,e", ',', 3);
        assert_eq!(idx.len(), 3);
        assert!(idx.truncated());
    }

    #[test]
    fn reused_index_does_not_grow_between_equal_width_rows() {
        let mut idx = FieldIndex::new();
        idx.split("a,b,c", ',', 4096);
        let cap_after_first = idx.starts.capacity();
        idx.split("x,y,z", ',', 4096);
        assert_eq!(idx.starts.capacity(), cap_after_first);
    }

    #[test]
    fn quoting_rule_covers_delimiter_quote_and_newline() {
        assert_eq!(quote_field("plain", ','), "plain");
        assert_eq!(quote_field("a,b", ','), "\"a,b\"");
        assert_eq!(quote_field("a\"b", ','), "\"a\"\"b\"");
        assert_eq!(quote_field("a\nb", ','), "\"a\nb\"");
    }
}
