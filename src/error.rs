// error.rs - Error types for MAF parsing and matrix computation

use std::io;

/// Result type used throughout mafdist
pub type Result<T> = std::result::Result<T, MafError>;

/// Every failure mafdist can report
#[derive(thiserror::Error, Debug)]
pub enum MafError {
    /// Input could not be opened or read
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The stream does not start with the `##maf` marker
    #[error("missing ##maf header (first line: {found:?})")]
    MissingHeader { found: String },

    /// An `s` line could not be split into its seven fields
    #[error("line {line}: malformed sequence record: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A record is longer or shorter than the first record of its block
    #[error("line {line}: sequence of '{identity}' has length {found}, expected {expected}")]
    LengthMismatch {
        line: usize,
        identity: String,
        expected: usize,
        found: usize,
    },

    /// Two aligned sequences handed to the comparator differ in length
    #[error("cannot compare sequences of length {0} and {1}")]
    UnequalSequences(usize, usize),

    /// Raw distance reached 0.75 under the `fail` saturation policy
    #[error("distance between '{a}' and '{b}' is saturated (p = {raw:.4})")]
    SaturatedDistance { a: String, b: String, raw: f64 },

    /// Configuration file could not be read or parsed
    #[error("configuration: {0}")]
    Config(String),

    /// Command line value out of range or unknown
    #[error("{0}")]
    InvalidArgument(String),

    /// Writing the rendered matrix failed
    #[error("write error: {0}")]
    Output(#[from] io::Error),
}

impl MafError {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        MafError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the content of an input stream
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            MafError::MissingHeader { .. }
                | MafError::MalformedRecord { .. }
                | MafError::LengthMismatch { .. }
                | MafError::UnequalSequences(..)
        )
    }
}

impl From<csv::Error> for MafError {
    fn from(e: csv::Error) -> Self {
        MafError::Output(io::Error::other(e))
    }
}

impl From<serde_json::Error> for MafError {
    fn from(e: serde_json::Error) -> Self {
        MafError::Output(io::Error::other(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_classification() {
        let header = MafError::MissingHeader {
            found: "hello".to_string(),
        };
        assert!(header.is_format_error());

        let io = MafError::io("a.maf", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(!io.is_format_error());
        assert_eq!(io.to_string(), "a.maf: gone");
    }

    #[test]
    fn test_messages_carry_line_numbers() {
        let err = MafError::MalformedRecord {
            line: 7,
            reason: "expected 7 fields, found 3".to_string(),
        };
        assert!(err.to_string().starts_with("line 7:"));
    }
}
