//! Mock implementations for testing

mod observer;
mod stage;

pub use observer::{Recorded, RecordingObserver};
pub use stage::{FailingStage, SilentStage};
