//! Error types for the CNC quote core library
//!
//! Errors are split into two categories: validation errors, which are
//! collected and reported before any processing starts, and internal
//! errors, which are faults raised while a batch is being processed.

use thiserror::Error;

pub mod internal;
pub mod validation;

pub use internal::InternalError;
pub use validation::ValidationError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the CNC quote core library
#[derive(Error, Debug)]
pub enum Error {
    /// Input and configuration validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Faults raised while a batch is being processed
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    /// Whether this error was raised before processing started
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_batch_rejected_displays_joined_message() {
        let error = Error::Validation(ValidationError::batch_rejected(
            vec![
                "Unsupported file format: xyz".to_string(),
                "File name too long: a.step".to_string(),
            ],
            "; ",
        ));

        assert_eq!(
            error.to_string(),
            "Unsupported file format: xyz; File name too long: a.step"
        );
        assert!(error.is_validation());
    }

    #[test]
    fn test_stage_failure_error() {
        let error = Error::Internal(InternalError::stage_failed("geometry", "mesh unreadable"));

        assert!(matches!(
            error,
            Error::Internal(InternalError::StageFailed { .. })
        ));
        assert!(error.to_string().contains("geometry"));
        assert!(error.to_string().contains("mesh unreadable"));
        assert!(!error.is_validation());
    }

    #[test]
    fn test_invalid_configuration_error() {
        let message = "Analysis step weights must sum to 1.0";
        let error = Error::Validation(ValidationError::invalid_configuration(message));

        assert!(error.to_string().contains("Invalid configuration"));
        assert!(error.to_string().contains("weights"));
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = Error::Internal(InternalError::assertion("Test error"));

        let _: &dyn StdError = &error;
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_error() -> Result<()> {
            Err(Error::Internal(InternalError::missing_stage_output(
                "cost estimation",
                "material recommendation",
            )))
        }

        let result = returns_error();
        assert!(result.is_err());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_display_formatting() {
        let errors = vec![
            Error::Validation(ValidationError::invalid_configuration("Invalid setting")),
            Error::Validation(ValidationError::missing_field("email")),
            Error::Validation(ValidationError::invalid_parameter("quantity", "must be >= 1")),
            Error::Internal(InternalError::stage_failed("upload", "connection reset")),
            Error::Internal(InternalError::incomplete_record("part.step", "features")),
            Error::Internal(InternalError::assertion("unreachable")),
        ];

        for error in errors {
            let display_string = error.to_string();
            assert!(!display_string.is_empty());
        }
    }
}
