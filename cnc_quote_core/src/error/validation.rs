//! Validation related error types

use thiserror::Error;

/// Validation and configuration errors
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Invalid input parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A file batch failed validation; `message` is the joined error list
    #[error("{message}")]
    BatchRejected { errors: Vec<String>, message: String },

    /// A submitted form failed validation
    #[error("{form} form rejected: {message}")]
    FormRejected {
        form: String,
        errors: Vec<String>,
        message: String,
    },
}

impl ValidationError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: &str) -> Self {
        Self::InvalidConfiguration {
            message: message.to_string(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    /// Create a batch rejection from the flattened error list
    pub fn batch_rejected(errors: Vec<String>, delimiter: &str) -> Self {
        let message = errors.join(delimiter);
        Self::BatchRejected { errors, message }
    }

    /// Create a form rejection from the collected error list
    pub fn form_rejected(form: &str, errors: Vec<String>) -> Self {
        let message = errors.join("; ");
        Self::FormRejected {
            form: form.to_string(),
            errors,
            message,
        }
    }

    /// The individual messages carried by this error
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::BatchRejected { errors, .. } | Self::FormRejected { errors, .. } => {
                errors.clone()
            }
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_error() {
        let error = ValidationError::invalid_configuration("Bad config");
        assert!(error.to_string().contains("Invalid configuration"));
        assert!(error.to_string().contains("Bad config"));
    }

    #[test]
    fn test_invalid_parameter_error() {
        let error = ValidationError::invalid_parameter("max_files", "must be positive");
        assert!(error.to_string().contains("Invalid parameter"));
        assert!(error.to_string().contains("max_files"));
        assert!(error.to_string().contains("must be positive"));
    }

    #[test]
    fn test_missing_field_error() {
        let error = ValidationError::missing_field("email");
        assert!(error.to_string().contains("Missing required field"));
        assert!(error.to_string().contains("email"));
    }

    #[test]
    fn test_batch_rejected_uses_delimiter() {
        let error = ValidationError::batch_rejected(vec!["a".into(), "b".into()], " | ");
        assert_eq!(error.to_string(), "a | b");
        assert_eq!(error.messages(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_form_rejected_names_form() {
        let error = ValidationError::form_rejected("contact", vec!["Name is required".into()]);
        assert!(error.to_string().starts_with("contact form rejected"));
        assert_eq!(error.messages().len(), 1);
    }
}
