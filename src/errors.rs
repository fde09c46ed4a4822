use std::fmt;
use std::io;

/// Run-level error type for configuration, IO, and whole-input failures.
///
/// Per-record problems never surface here; they are converted to report
/// entries at the record boundary.
///
/// `Display`, `Error`, and `From` are implemented by hand (rather than via
/// `thiserror`) because the `source` field name on the struct variants would
/// otherwise be inferred as the error source.
#[derive(Debug)]
pub enum QaError {
    SourceUnreadable { source: String, reason: String },
    DocumentInvalid { source: String, details: String },
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Configuration(String),
}

impl fmt::Display for QaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QaError::SourceUnreadable { source, reason } => {
                write!(f, "annotation source '{source}' is unreadable: {reason}")
            }
            QaError::DocumentInvalid { source, details } => {
                write!(
                    f,
                    "annotation source '{source}' is structurally invalid: {details}"
                )
            }
            QaError::Io(err) => fmt::Display::fmt(err, f),
            QaError::Csv(err) => write!(f, "csv failure: {err}"),
            QaError::Json(err) => write!(f, "json failure: {err}"),
            QaError::Configuration(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for QaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QaError::Io(err) => err.source(),
            QaError::Csv(err) => Some(err),
            QaError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for QaError {
    fn from(err: io::Error) -> Self {
        QaError::Io(err)
    }
}

impl From<csv::Error> for QaError {
    fn from(err: csv::Error) -> Self {
        QaError::Csv(err)
    }
}

impl From<serde_json::Error> for QaError {
    fn from(err: serde_json::Error) -> Self {
        QaError::Json(err)
    }
}
