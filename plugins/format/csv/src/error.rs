#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {0}: not valid UTF-8")]
    Utf8(usize),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("write mode requires NDJSON objects, got {0}")]
    NotAnObject(serde_json::Value),

    #[error("field at row {row} contains a nested {kind} value and strict mode forbids rendering it inline")]
    NestedValueForbidden { row: usize, kind: &'static str },
}
