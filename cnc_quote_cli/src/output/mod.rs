mod formatters;

pub use formatters::{CsvFormatter, JsonFormatter, TextFormatter};

use anyhow::Result;
use cnc_quote_core::forms::{FormKind, FormValidation};
use cnc_quote_core::{BatchValidation, Quote};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Outcome of checking one form payload
#[derive(Debug, Clone)]
pub struct FormReport {
    pub kind: FormKind,
    pub validation: FormValidation,
    /// Assigned submission id when the form was accepted
    pub submission_id: Option<String>,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    fn format_quote(&self, quote: &Quote) -> Result<String>;

    fn format_validation(&self, validation: &BatchValidation) -> Result<String>;

    fn format_form(&self, report: &FormReport) -> Result<String>;
}

/// Create a formatter based on output format
pub fn create_formatter(format: OutputFormat, use_color: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(use_color)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Csv => Box::new(CsvFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string() {
        assert_eq!(OutputFormat::from_string("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_string(" csv "), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_string("template"), None);
    }
}
