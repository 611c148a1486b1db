use crate::file_discovery::DiscoveryError;
use colored::*;
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Configuration keys accepted by `config set`
pub const KNOWN_CONFIG_KEYS: &[&str] = &[
    "output.color_enabled",
    "output.default_format",
    "output.progress_enabled",
    "pipeline.error_delimiter",
    "pipeline.limits.max_file_size_bytes",
    "pipeline.limits.max_files",
    "pipeline.limits.max_name_length",
    "pipeline.pricing.market_multiplier",
    "pipeline.pricing.minimum_shipping",
    "pipeline.pricing.optimization_savings_rate",
    "pipeline.pricing.process_savings_rate",
    "pipeline.pricing.quality_control_rate",
    "pipeline.pricing.shipping_rate",
    "pipeline.pricing.surface_treatment_rate",
    "pipeline.seed",
    "pipeline.time_unit_micros",
];

/// CLI-specific error type with semantic exit codes
#[derive(Debug)]
pub struct CliError {
    message: String,

    category: ErrorCategory,

    context: Vec<(String, String)>,

    /// Suggestions for recovery
    pub suggestions: Vec<String>,

    source: Option<Box<dyn StdError + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCategory {
    General,
    Misuse,
    Validation,
    Filesystem,
}

/// Semantic exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Misuse = 2,
    ValidationError = 3,
    FilesystemError = 4,
}

pub type CliResult<T> = Result<T, CliError>;

/// Extension trait for adding context to errors
pub trait ErrorContext {
    fn with_context(self, key: &str, value: &str) -> Self;
    fn with_suggestion(self, suggestion: &str) -> Self;
}

impl CliError {
    fn new(message: &str, category: ErrorCategory) -> Self {
        Self {
            message: message.to_string(),
            category,
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn general(message: &str) -> Self {
        Self::new(message, ErrorCategory::General)
    }

    /// Create a command misuse error
    pub fn misuse(message: &str) -> Self {
        let mut error = Self::new(message, ErrorCategory::Misuse);
        error
            .suggestions
            .push("Run 'cncquote --help' for usage information".to_string());
        error
    }

    /// Unknown `config` key, with a hint when a known key is close
    pub fn unknown_config_key(key: &str) -> Self {
        let mut error = Self::misuse(&format!("Unknown configuration key: {key}"));
        if let Some(known) = KNOWN_CONFIG_KEYS
            .iter()
            .min_by_key(|known| levenshtein_distance(key, known))
            .filter(|known| levenshtein_distance(key, known) <= 3)
        {
            error.suggestions.insert(0, format!("Did you mean '{known}'?"));
        }
        error
            .suggestions
            .push("Run 'cncquote config list' to see every key".to_string());
        error
    }

    /// Rejected batch or form
    pub fn validation(message: &str) -> Self {
        Self::new(message, ErrorCategory::Validation)
    }

    /// Create a filesystem error
    pub fn filesystem(message: &str) -> Self {
        let mut error = Self::new(message, ErrorCategory::Filesystem);
        if message.contains("not found") || message.contains("No such file") {
            error
                .suggestions
                .push("Check if the file or directory exists".to_string());
            error
                .suggestions
                .push("Use NAME:SIZE to quote a file that is not on disk".to_string());
        } else if message.contains("permission") || message.contains("denied") {
            error.suggestions.push("Check file permissions".to_string());
        }
        error
    }

    /// Create an error from an IO error
    pub fn from_io_error(error: io::Error, path: &str) -> Self {
        let message = format!("IO error on '{path}': {error}");
        let mut cli_error = match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                Self::filesystem(&message)
            }
            _ => Self::general(&message),
        };

        cli_error.source = Some(Box::new(error));
        cli_error
            .context
            .push(("path".to_string(), path.to_string()));
        cli_error
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::General => ExitCode::GeneralError,
            ErrorCategory::Misuse => ExitCode::Misuse,
            ErrorCategory::Validation => ExitCode::ValidationError,
            ErrorCategory::Filesystem => ExitCode::FilesystemError,
        }
    }

    fn label(&self) -> &'static str {
        match self.category {
            ErrorCategory::General => "Error",
            ErrorCategory::Misuse => "Usage Error",
            ErrorCategory::Validation => "Validation Error",
            ErrorCategory::Filesystem => "File Error",
        }
    }

    /// Format the error for user display
    pub fn format_for_user(&self, debug: bool) -> String {
        let mut output = String::new();

        let prefix = match self.category {
            ErrorCategory::Misuse | ErrorCategory::Validation => self.label().yellow(),
            _ => self.label().red(),
        };
        output.push_str(&format!("{}: {}\n", prefix, self.message));

        if !self.context.is_empty() {
            output.push_str("\nContext:\n");
            for (key, value) in &self.context {
                output.push_str(&format!("  {}: {}\n", key.bold(), value));
            }
        }

        if debug && let Some(source) = &self.source {
            output.push_str("\nCaused by:\n");
            let mut current: Option<&dyn StdError> = Some(source.as_ref());
            let mut level = 1;

            while let Some(err) = current {
                output.push_str(&format!("  {level}: {err}\n"));
                current = err.source();
                level += 1;
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message)?;
        for (key, value) in &self.context {
            write!(f, " ({key}: {value})")?;
        }
        Ok(())
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl ErrorContext for CliError {
    fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.push((key.to_string(), value.to_string()));
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }
}

impl From<cnc_quote_core::Error> for CliError {
    fn from(error: cnc_quote_core::Error) -> Self {
        if error.is_validation() {
            Self::validation(&error.to_string())
        } else {
            Self::general(&error.to_string())
        }
    }
}

/// Classify an anyhow chain by the most specific error it carries
impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<CliError>() {
            Ok(cli) => return cli,
            Err(other) => other,
        };
        let error = match error.downcast::<cnc_quote_core::Error>() {
            Ok(core) => return core.into(),
            Err(other) => other,
        };
        match error.downcast_ref::<DiscoveryError>() {
            Some(DiscoveryError::PathNotFound(_)) => return Self::filesystem(&error.to_string()),
            Some(DiscoveryError::InvalidSize { .. }) => {
                return Self::misuse(&error.to_string())
                    .with_suggestion("Sizes take a B, K, M or G suffix, e.g. part.step:2M");
            }
            _ => {}
        }
        if error.chain().any(|e| e.is::<io::Error>()) {
            return Self::filesystem(&format!("{error:#}"));
        }
        let mut cli = Self::general(&format!("{error:#}"));
        cli.source = Some(error.into());
        cli
    }
}

/// Simple Levenshtein distance for key suggestions
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len2 = s2_chars.len();

    let mut previous: Vec<usize> = (0..=len2).collect();
    for (i, c1) in s1_chars.iter().enumerate() {
        let mut current = vec![i + 1; len2 + 1];
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[len2]
}
