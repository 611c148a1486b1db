//! Command line front end for the CNC quote simulator
//!
//! The binary lives in `main.rs`; everything it needs to resolve inputs,
//! layer configuration, draw progress and format results is exposed here
//! so integration tests can drive it directly.

pub mod config;
pub mod error;
pub mod file_discovery;
pub mod output;
pub mod paths;
pub mod progress;
pub mod terminal;

pub use config::{AppConfig, ConfigManager};
pub use error::{CliError, CliResult, ExitCode};
