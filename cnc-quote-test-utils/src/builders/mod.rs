//! Builders for test batches

mod batch;

pub use batch::BatchBuilder;
