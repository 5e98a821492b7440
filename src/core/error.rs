/// myquery Error Module
///
/// This module defines the error type shared by every layer of myquery.
/// Driver failures are wrapped as-is; result-set access failures carry
/// enough context (row, column, target type) to be reported directly.
use thiserror::Error;

/// Error type for the myquery crate.
///
/// This enum covers:
/// - Driver errors (connect, prepare, execute, row reads)
/// - Typed accessor failures on a buffered result set
/// - Connection handler misuse
/// - Configuration loading and command-line usage
#[derive(Error, Debug)]
pub enum MyqueryError {
    /// Errors reported by the MySQL driver
    #[error("Database error: {0}")]
    Database(#[from] mysql::Error),

    /// A stored value could not be converted to the requested type
    #[error("Conversion error: cannot read column '{column}' of row {row} as {target} (value: {value})")]
    Conversion {
        row: usize,
        column: String,
        target: &'static str,
        value: String,
    },

    /// A column label or index that does not exist in the result set
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A row index past the end of the result set
    #[error("Row {index} out of range (result has {row_count} rows)")]
    RowOutOfRange { index: usize, row_count: usize },

    /// The connection handler is not usable
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command-line usage
    #[error("Usage error: {0}")]
    Usage(String),
}

/// Type alias for Result to use MyqueryError as the error type.
pub type Result<T> = std::result::Result<T, MyqueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let conv_err = MyqueryError::Conversion {
            row: 2,
            column: "username".to_string(),
            target: "i64",
            value: "Zarkrey".to_string(),
        };
        let msg = conv_err.to_string();
        assert!(msg.contains("Conversion error"));
        assert!(msg.contains("'username'"));
        assert!(msg.contains("row 2"));
        assert!(msg.contains("i64"));

        let range_err = MyqueryError::RowOutOfRange { index: 5, row_count: 3 };
        assert_eq!(range_err.to_string(), "Row 5 out of range (result has 3 rows)");

        let config_err = MyqueryError::Config("Invalid config".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MyqueryError = io_err.into();
        match err {
            MyqueryError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }

        let json_err: std::result::Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{ invalid json }");
        let err: MyqueryError = json_err.unwrap_err().into();
        match err {
            MyqueryError::Json(_) => {}
            _ => panic!("Expected JSON error"),
        }
    }
}
