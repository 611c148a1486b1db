//! CNC Quote Core Library
//!
//! This is the core library for the CNC quote simulator, providing batch
//! validation, simulated upload and analysis, cost synthesis and quote
//! assembly, reported through a progress observer.

pub mod analyzer;
pub mod error;
pub mod file;
pub mod forms;
pub mod pacing;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod quote;
pub mod record;
pub mod upload;
pub mod validation;

// Re-export main types
pub use error::{Error, Result};
pub use file::CandidateFile;
pub use pipeline::{AnalysisStage, PricingConfig, StepDescriptor};
pub use processor::{QuoteProcessor, process_batch};
pub use progress::{
    Callbacks, ChannelObserver, NullObserver, PipelineEvent, ProgressEvent, ProgressObserver,
    SharedObserver, Stage,
};
pub use quote::Quote;
pub use record::FileAnalysisRecord;
pub use validation::{BatchValidation, FileViolation, ValidationLimits, validate_batch};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Core pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Length of one simulated time unit in microseconds
    pub time_unit_micros: u64,
    /// Fixed RNG seed; runs are reproducible when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Joins collected validation errors into one message
    pub error_delimiter: String,
    pub limits: ValidationLimits,
    pub pricing: PricingConfig,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            time_unit_micros: 1000,
            seed: None,
            error_delimiter: "; ".to_string(),
            limits: ValidationLimits::default(),
            pricing: PricingConfig::default(),
        }
    }
}

impl QuoteConfig {
    /// Create a test configuration: no delays and a fixed seed
    pub fn test() -> Self {
        Self {
            time_unit_micros: 0,
            seed: Some(42),
            ..Default::default()
        }
    }

    pub fn time_unit(&self) -> Duration {
        Duration::from_micros(self.time_unit_micros)
    }
}
