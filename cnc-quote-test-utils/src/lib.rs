//! Test utilities for the CNC quote pipeline
//!
//! This crate provides batch builders, recording observers and mock
//! analysis stages for testing the quote pipeline.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::BatchBuilder;
pub use mocks::{FailingStage, Recorded, RecordingObserver, SilentStage};
