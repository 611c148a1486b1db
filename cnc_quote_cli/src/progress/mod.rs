//! Progress reporting for the CLI
//!
//! The core emits pipeline events through a channel observer; a spawned task
//! draws them as one bar per stage.

pub mod provider;
pub mod renderer;
pub mod utils;

pub use provider::{ProgressInfrastructure, create_progress_infrastructure};
pub use renderer::{ProgressRenderer, RenderOutcome, render_progress};
pub use utils::{format_bytes, format_elapsed, format_lead_time};
