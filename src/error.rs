//! Error types for copytune
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in copytune
#[derive(Debug, Error)]
pub enum CopytuneError {
    /// Template is missing a slot, names an unknown slot, or has unbalanced braces
    #[error("Format error: {0}")]
    Format(String),

    /// Text-generation service call failed
    #[error("Service error: {0}")]
    Service(String),

    /// Operation needs at least one element
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Argument outside its accepted range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for copytune operations
pub type Result<T> = std::result::Result<T, CopytuneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        let err = CopytuneError::Format("missing slot {n}".to_string());
        assert_eq!(err.to_string(), "Format error: missing slot {n}");
    }

    #[test]
    fn test_service_error() {
        let err = CopytuneError::Service("rate limited".to_string());
        assert_eq!(err.to_string(), "Service error: rate limited");
    }

    #[test]
    fn test_empty_input_error() {
        let err = CopytuneError::EmptyInput("no scored candidates".to_string());
        assert_eq!(err.to_string(), "Empty input: no scored candidates");
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CopytuneError::InvalidArgument("count must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: count must be positive");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CopytuneError = io_err.into();
        assert!(matches!(err, CopytuneError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: CopytuneError = json_err.into();
        assert!(matches!(err, CopytuneError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(CopytuneError::EmptyInput("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
