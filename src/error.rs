//! Error types for schema building, field conversion and per-line reporting

use std::sync::Arc;
use thiserror::Error;

/// Result type for schema construction
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while building a [`Schema`](crate::schema::Schema)
///
/// A schema that builds successfully never produces these at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Schema declares no columns
    #[error("Schema must declare at least one column")]
    NoColumns,

    /// The same field name is bound to more than one column
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// A converter was bound to a name no column carries
    #[error("Converter bound to unknown column: {0}")]
    UnknownColumn(String),

    /// The column's type cannot be converted without a custom converter
    #[error("Unsupported type {field_type} for column {column}")]
    UnsupportedType {
        /// Column name
        column: String,
        /// Display form of the rejected type
        field_type: String,
    },

    /// Separator, quote or line-break configuration is unusable
    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),
}

/// Failure to convert one raw field into a typed value
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    /// Text could not be parsed as the target type
    #[error("Invalid {target} value: {text:?}")]
    InvalidValue {
        /// Name of the target type
        target: &'static str,
        /// Decoded field text
        text: String,
    },

    /// Field bytes are not valid UTF-8 (strict decoder only)
    #[error("Invalid UTF-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Record construction asked for a field the schema does not bind
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Record construction found a value of the wrong kind
    #[error("Field {field} holds {found}, expected {expected}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Requested kind
        expected: &'static str,
        /// Stored kind
        found: &'static str,
    },

    /// Message from a custom converter
    #[error("{0}")]
    Custom(String),

    /// Error from a custom converter
    #[error(transparent)]
    Other(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConvertError {
    /// Create an error for text that does not parse as `target`
    pub fn invalid(target: &'static str, text: impl Into<String>) -> Self {
        ConvertError::InvalidValue {
            target,
            text: text.into(),
        }
    }

    /// Create an error with a free-form message
    pub fn custom(message: impl Into<String>) -> Self {
        ConvertError::Custom(message.into())
    }

    /// Wrap any error raised by a custom converter
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConvertError::Other(Arc::new(err))
    }
}

/// Problem found in one line of input
///
/// Delivered through the `on_error` callback of
/// [`ParseOptions`](crate::options::ParseOptions). Line and column numbers
/// are 1-based.
#[derive(Debug, Clone, Error)]
pub enum LineError {
    /// Input ended while a required column was expected; parsing stops
    #[error("Line {line}: unexpected end of input")]
    UnexpectedEnd {
        /// Line number
        line: usize,
    },

    /// A field failed to convert; the row is skipped
    #[error("Line {line}, column {column}: {cause}")]
    ParseError {
        /// Line number
        line: usize,
        /// Column number
        column: usize,
        /// Conversion failure
        #[source]
        cause: ConvertError,
        /// Raw field text, present for character buffers only
        raw: Option<String>,
    },

    /// A row has more fields than the schema; the row is skipped
    #[error("Line {line}: too many columns, expected {expected}")]
    TooManyColumns {
        /// Line number
        line: usize,
        /// Schema column count
        expected: usize,
    },

    /// A row ended before all columns were filled; the row is skipped
    #[error("Line {line}: not enough columns, column {column} missing of {expected}")]
    NotEnoughColumns {
        /// Line number
        line: usize,
        /// First column without a field
        column: usize,
        /// Schema column count
        expected: usize,
    },
}

impl LineError {
    /// Line the error was found on
    pub fn line(&self) -> usize {
        match self {
            LineError::UnexpectedEnd { line }
            | LineError::ParseError { line, .. }
            | LineError::TooManyColumns { line, .. }
            | LineError::NotEnoughColumns { line, .. } => *line,
        }
    }

    /// Whether parsing stops after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, LineError::UnexpectedEnd { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_error_accessors() {
        let err = LineError::NotEnoughColumns {
            line: 2,
            column: 2,
            expected: 2,
        };
        assert_eq!(err.line(), 2);
        assert!(!err.is_fatal());
        assert!(LineError::UnexpectedEnd { line: 7 }.is_fatal());
    }

    #[test]
    fn test_display() {
        let err = LineError::ParseError {
            line: 3,
            column: 1,
            cause: ConvertError::invalid("int", "abc"),
            raw: Some("abc".to_string()),
        };
        assert_eq!(err.to_string(), "Line 3, column 1: Invalid int value: \"abc\"");

        let err = LineError::TooManyColumns {
            line: 1,
            expected: 4,
        };
        assert_eq!(err.to_string(), "Line 1: too many columns, expected 4");
    }

    #[test]
    fn test_parse_error_source() {
        use std::error::Error;

        let err = LineError::ParseError {
            line: 1,
            column: 1,
            cause: ConvertError::custom("bad"),
            raw: None,
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("bad".to_string()));
    }
}
