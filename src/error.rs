//! Error types for streaming subset runs.

use thiserror::Error;

/// Errors surfaced by detection, reading, and region resolution.
///
/// Unparsable individual timestamp or coordinate values are *not* errors;
/// they are silently excluded from a record's derived points.
#[derive(Error, Debug)]
pub enum SiftError {
    /// Unrecognized input shape, or the records key was never found.
    /// Raised before any output is written.
    #[error("unrecognized input format: {0}")]
    Format(String),

    /// A record or line failed to decode, or the stream ended inside an
    /// open object. Fatal; there is no partial-record recovery.
    #[error("{}", Self::parse_display(.line, .msg))]
    Parse {
        /// 1-based line number for NDJSON inputs, `None` for array inputs.
        line: Option<u64>,
        msg: String,
    },

    /// The region query matched no known region.
    #[error("region not found for query: {0:?}")]
    RegionNotFound(String),

    /// I/O failure on the input or output stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiftError {
    /// Parse error at a known line.
    pub fn parse_at(line: u64, msg: impl Into<String>) -> Self {
        SiftError::Parse {
            line: Some(line),
            msg: msg.into(),
        }
    }

    /// Parse error with no line attribution (array-mode inputs).
    pub fn parse(msg: impl Into<String>) -> Self {
        SiftError::Parse {
            line: None,
            msg: msg.into(),
        }
    }

    fn parse_display(line: &Option<u64>, msg: &str) -> String {
        match line {
            Some(n) => format!("parse error on line {n}: {msg}"),
            None => format!("parse error: {msg}"),
        }
    }
}

/// Result type for subset operations.
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_line() {
        let e = SiftError::parse_at(3, "expected value");
        assert_eq!(e.to_string(), "parse error on line 3: expected value");
    }

    #[test]
    fn parse_error_without_line() {
        let e = SiftError::parse("truncated record");
        assert_eq!(e.to_string(), "parse error: truncated record");
    }
}
