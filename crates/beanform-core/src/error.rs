//! Error types for beanform-core

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::amount::AmountError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Row index out of range
    InvalidIndex,
    /// Draft failed validation
    ValidationError,
    /// Amount string could not be parsed
    InvalidAmount,
    /// Reference data could not be loaded
    ReferenceUnavailable,
    /// Mutation sink rejected the entry
    StoreError,
    /// IO error
    IoError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidIndex => write!(f, "INVALID_INDEX"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidAmount => write!(f, "INVALID_AMOUNT"),
            ErrorCode::ReferenceUnavailable => write!(f, "REFERENCE_UNAVAILABLE"),
            ErrorCode::StoreError => write!(f, "STORE_ERROR"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            suggestions: vec![],
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for beanform-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Row index {index} out of range for list of {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    #[error("Reference data unavailable: {message}")]
    ReferenceUnavailable { message: String },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("IO error occurred")]
    IoError,
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidIndex { .. } => ErrorCode::InvalidIndex,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            CoreError::ReferenceUnavailable { .. } => ErrorCode::ReferenceUnavailable,
            CoreError::StoreError { .. } => ErrorCode::StoreError,
            CoreError::IoError => ErrorCode::IoError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::InvalidIndex { .. } => ErrorSeverity::Warning,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::InvalidAmount(_) => ErrorSeverity::Warning,
            CoreError::ReferenceUnavailable { .. } => ErrorSeverity::Warning,
            CoreError::StoreError { .. } => ErrorSeverity::Error,
            CoreError::IoError => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::InvalidIndex { len, .. } => {
                details = details.with_suggestion(format!(
                    "Use a row index between 0 and {}.",
                    len.saturating_sub(1)
                ));
            }
            CoreError::ValidationError { .. } => {
                details = details.with_suggestion(
                    "Choose an account for every posting.".to_string(),
                );
                details = details.with_suggestion(
                    "Leave at most one posting amount empty.".to_string(),
                );
            }
            CoreError::InvalidAmount(_) => {
                details = details.with_suggestion(
                    "Write amounts as '<number>' or '<number> <commodity>'.".to_string(),
                );
            }
            CoreError::ReferenceUnavailable { .. } => {
                details = details.with_suggestion(
                    "Check the reference data file configured under data.reference_file.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(_error: io::Error) -> Self {
        CoreError::IoError
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::InvalidIndex.to_string(), "INVALID_INDEX");
        assert_eq!(ErrorCode::ValidationError.to_string(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::StoreError.to_string(), "STORE_ERROR");
    }

    #[test]
    fn test_core_error_code() {
        let error = CoreError::InvalidIndex { index: 5, len: 2 };
        assert_eq!(error.code(), ErrorCode::InvalidIndex);

        let error = CoreError::StoreError {
            message: "disk full".to_string(),
        };
        assert_eq!(error.code(), ErrorCode::StoreError);
    }

    #[test]
    fn test_core_error_severity() {
        let error = CoreError::ValidationError {
            message: "test".to_string(),
        };
        assert_eq!(error.severity(), ErrorSeverity::Warning);

        let error = CoreError::IoError;
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_error_details_invalid_index() {
        let error = CoreError::InvalidIndex { index: 7, len: 3 };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::InvalidIndex);
        assert!(details.message.contains('7'));
        assert!(!details.suggestions.is_empty());
    }
}
