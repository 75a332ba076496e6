/// A TOML grammar violation, located by line (spec.md §4.5.2 "Failure with
/// `ParseError{line, message}`"). Named `TomlError` here to avoid colliding
/// with the `toml` crate's own error type, which this hand-written parser
/// deliberately does not use.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct TomlError {
    pub line: usize,
    pub message: String,
}

impl From<std::io::Error> for TomlError {
    fn from(err: std::io::Error) -> Self {
        TomlError { line: 0, message: err.to_string() }
    }
}

impl From<serde_json::Error> for TomlError {
    fn from(err: serde_json::Error) -> Self {
        TomlError { line: 0, message: err.to_string() }
    }
}
