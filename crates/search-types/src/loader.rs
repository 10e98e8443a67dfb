//! Loading raw result sets from disk.
//!
//! Two layouts are accepted:
//! - a single JSON array of objects
//! - JSON lines, one object per line (blank lines are skipped)
//!
//! The in-memory search backend and the CLI use this to get fixtures into
//! the processor; production search engines hand over records directly.

use crate::error::{LoadError, Result};
use crate::types::ResultRecord;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a file, mapping a missing file to `LoadError::FileNotFound`.
pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => LoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LoadError::IoError(err),
    })
}

/// Load a result set from a JSON or JSON-lines file.
pub fn load_result_set(path: &Path) -> Result<Vec<ResultRecord>> {
    let content = read_to_string(path)?;
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let records = parse_result_set(&content, &file)?;
    tracing::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse a result set from a string.
///
/// `file` is only used to label errors.
pub fn parse_result_set(content: &str, file: &str) -> Result<Vec<ResultRecord>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        parse_json_array(content, file)
    } else {
        parse_json_lines(content, file)
    }
}

fn parse_json_array(content: &str, file: &str) -> Result<Vec<ResultRecord>> {
    let values: Vec<Value> =
        serde_json::from_str(content).map_err(|err| LoadError::ParseError {
            file: file.to_string(),
            line: err.line(),
            reason: err.to_string(),
        })?;

    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| into_record(value, file, idx + 1))
        .collect()
}

fn parse_json_lines(content: &str, file: &str) -> Result<Vec<ResultRecord>> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let value: Value =
            serde_json::from_str(line_trimmed).map_err(|err| LoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: err.to_string(),
            })?;
        records.push(into_record(value, file, line_no)?);
    }

    Ok(records)
}

fn into_record(value: Value, file: &str, line: usize) -> Result<ResultRecord> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoadError::NotAnObject {
            file: file.to_string(),
            line,
            found: json_kind(&other).to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_json_lines() {
        let content = r#"{"id": "course-1", "title": "Intro"}

{"id": "course-2", "title": "Advanced"}
"#;
        let records = parse_result_set(content, "results.jsonl").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], json!("course-1"));
        assert_eq!(records[1]["title"], json!("Advanced"));
    }

    #[test]
    fn test_parse_json_array() {
        let content = r#"[{"id": "course-1"}, {"id": "course-2"}]"#;
        let records = parse_result_set(content, "results.json").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = "{\"id\": \"course-1\"}\n{not json}\n";
        let err = parse_result_set(content, "broken.jsonl").unwrap_err();

        match err {
            LoadError::ParseError { file, line, .. } => {
                assert_eq!(file, "broken.jsonl");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_result_set("[1, {\"id\": \"x\"}]", "mixed.json").unwrap_err();
        assert!(matches!(err, LoadError::NotAnObject { line: 1, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_result_set(Path::new("does/not/exist.jsonl")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "course-1", "title": "Intro"}}"#).unwrap();

        let records = load_result_set(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], json!("Intro"));
    }
}
