//! Processing fault types

use thiserror::Error;

/// Faults raised while a batch is uploading or being analyzed
#[derive(Error, Debug)]
pub enum InternalError {
    /// An analysis step failed
    #[error("Analysis step '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    /// A step ran before the step whose output it consumes
    #[error("Analysis step '{stage}' requires the output of '{requires}'")]
    MissingStageOutput { stage: String, requires: String },

    /// The step sequence finished without producing every record block
    #[error("Analysis of '{file}' finished without: {missing}")]
    IncompleteRecord { file: String, missing: String },

    /// Internal assertion failure
    #[error("Internal assertion failed: {message}")]
    Assertion { message: String },
}

impl InternalError {
    /// Create a step failure error
    pub fn stage_failed(stage: &str, message: &str) -> Self {
        Self::StageFailed {
            stage: stage.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a missing step output error
    pub fn missing_stage_output(stage: &str, requires: &str) -> Self {
        Self::MissingStageOutput {
            stage: stage.to_string(),
            requires: requires.to_string(),
        }
    }

    /// Create an incomplete record error
    pub fn incomplete_record(file: &str, missing: &str) -> Self {
        Self::IncompleteRecord {
            file: file.to_string(),
            missing: missing.to_string(),
        }
    }

    /// Create an internal assertion failure error
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failed_error() {
        let error = InternalError::stage_failed("geometry feature recognition", "bad mesh");
        assert!(error.to_string().contains("geometry feature recognition"));
        assert!(error.to_string().contains("bad mesh"));
    }

    #[test]
    fn test_missing_stage_output_error() {
        let error = InternalError::missing_stage_output("cost estimation", "manufacturing");
        assert!(error.to_string().contains("requires the output"));
        assert!(error.to_string().contains("manufacturing"));
    }

    #[test]
    fn test_incomplete_record_error() {
        let error = InternalError::incomplete_record("bracket.step", "materials");
        assert!(error.to_string().contains("bracket.step"));
        assert!(error.to_string().contains("materials"));
    }

    #[test]
    fn test_assertion_error() {
        let error = InternalError::assertion("Invariant violated");
        assert!(error.to_string().contains("Internal assertion failed"));
        assert!(error.to_string().contains("Invariant violated"));
    }
}
