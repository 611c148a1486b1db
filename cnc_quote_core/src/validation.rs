//! Batch file validation
//!
//! Every file in a batch is checked independently against the configured
//! [`ValidationLimits`]. Violations are collected rather than raised one by
//! one, and a single rejected file invalidates the whole batch.

use crate::error::ValidationError;
use crate::file::{CandidateFile, MIB};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Formats accepted by default
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "step", "stp", "stl", "iges", "igs", "dwg", "dxf", "obj", "ply", "3mf",
];

/// Total declared batch size above which a slow-upload warning is added
pub const LARGE_BATCH_WARNING_BYTES: u64 = 100 * MIB;

/// Constraints a candidate batch must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Per-file size ceiling in bytes
    pub max_file_size_bytes: u64,
    /// Maximum number of files in one batch
    pub max_files: usize,
    /// Maximum file name length in characters
    pub max_name_length: usize,
    /// Lowercase extensions without the leading dot
    pub allowed_extensions: Vec<String>,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 50 * MIB,
            max_files: 10,
            max_name_length: 100,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl ValidationLimits {
    fn allows_extension(&self, extension: &str) -> bool {
        !extension.is_empty()
            && self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Check that the limits themselves are usable
    pub fn check(&self) -> Result<()> {
        if self.max_files == 0 {
            return Err(Error::Validation(ValidationError::invalid_parameter(
                "max_files",
                "must be at least 1",
            )));
        }
        if self.allowed_extensions.is_empty() {
            return Err(Error::Validation(ValidationError::invalid_parameter(
                "allowed_extensions",
                "at least one extension must be allowed",
            )));
        }
        Ok(())
    }
}

/// A single rule a file broke
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileViolation {
    #[error("File {name} exceeds the {} size limit", format_limit(.limit))]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("Unsupported file format: {}", display_extension(.extension))]
    UnsupportedFormat { extension: String },

    #[error("File name too long: {name}")]
    NameTooLong {
        name: String,
        length: usize,
        max: usize,
    },
}

fn format_limit(bytes: &u64) -> String {
    let bytes = *bytes;
    if bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

fn display_extension(extension: &str) -> &str {
    if extension.is_empty() {
        "(none)"
    } else {
        extension
    }
}

/// Outcome of checking one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileValidation {
    pub violations: Vec<FileViolation>,
}

impl FileValidation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// A file that failed validation, with everything it broke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub file: CandidateFile,
    pub violations: Vec<FileViolation>,
}

/// Outcome of checking a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchValidation {
    /// Files that passed, in submission order
    pub accepted: Vec<CandidateFile>,
    pub rejected: Vec<RejectedFile>,
    /// Flattened error messages; the batch may proceed only when empty
    pub errors: Vec<String>,
    /// Advisory messages that never block the batch
    pub warnings: Vec<String>,
}

impl BatchValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn the outcome into the accepted files or one aggregated error
    pub fn into_accepted(self, delimiter: &str) -> Result<Vec<CandidateFile>> {
        if self.is_valid() {
            Ok(self.accepted)
        } else {
            Err(Error::Validation(ValidationError::batch_rejected(
                self.errors,
                delimiter,
            )))
        }
    }
}

/// Check one file against the limits, reporting every rule it breaks
pub fn validate_file(file: &CandidateFile, limits: &ValidationLimits) -> FileValidation {
    let mut violations = Vec::new();

    if file.size() > limits.max_file_size_bytes {
        violations.push(FileViolation::TooLarge {
            name: file.name().to_string(),
            size: file.size(),
            limit: limits.max_file_size_bytes,
        });
    }

    let extension = file.extension();
    if !limits.allows_extension(&extension) {
        violations.push(FileViolation::UnsupportedFormat { extension });
    }

    let length = file.name().chars().count();
    if length > limits.max_name_length {
        violations.push(FileViolation::NameTooLong {
            name: file.name().to_string(),
            length,
            max: limits.max_name_length,
        });
    }

    FileValidation { violations }
}

/// Check a batch of files
///
/// A batch larger than `max_files` fails with a single error and no file is
/// inspected. An empty batch fails the same way.
pub fn validate_batch(files: &[CandidateFile], limits: &ValidationLimits) -> BatchValidation {
    let mut outcome = BatchValidation::default();

    if files.is_empty() {
        outcome
            .errors
            .push("Select at least one file to upload".to_string());
        return outcome;
    }

    if files.len() > limits.max_files {
        outcome.errors.push(format!(
            "At most {} files can be uploaded at once",
            limits.max_files
        ));
        return outcome;
    }

    for file in files {
        let validation = validate_file(file, limits);
        if validation.is_valid() {
            outcome.accepted.push(file.clone());
        } else {
            outcome.errors.extend(validation.messages());
            outcome.rejected.push(RejectedFile {
                file: file.clone(),
                violations: validation.violations,
            });
        }

        if !has_plain_name(file.name()) {
            outcome.warnings.push(format!(
                "File name {} contains special characters that may affect processing",
                file.name()
            ));
        }
    }

    let total = files
        .iter()
        .map(CandidateFile::size)
        .fold(0u64, u64::saturating_add);
    if total > LARGE_BATCH_WARNING_BYTES {
        outcome.warnings.push(format!(
            "Total upload size {:.1} MB is large; uploading may take a while",
            total as f64 / MIB as f64
        ));
    }

    outcome
}

fn has_plain_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn limits() -> ValidationLimits {
        ValidationLimits::default()
    }

    #[test]
    fn test_valid_file_passes() {
        let file = CandidateFile::new("bracket.step", 2 * MIB);
        assert!(validate_file(&file, &limits()).is_valid());
    }

    #[test]
    fn test_all_violations_collected_without_short_circuit() {
        let name = format!("{}.xyz", "a".repeat(120));
        let file = CandidateFile::new(name.clone(), 60 * MIB);
        let validation = validate_file(&file, &limits());

        assert_eq!(validation.violations.len(), 3);
        assert!(matches!(
            validation.violations[0],
            FileViolation::TooLarge { .. }
        ));
        assert_eq!(
            validation.violations[1],
            FileViolation::UnsupportedFormat {
                extension: "xyz".to_string()
            }
        );
        assert!(matches!(
            validation.violations[2],
            FileViolation::NameTooLong { length: 124, .. }
        ));
    }

    #[test]
    fn test_size_exactly_at_limit_passes() {
        let file = CandidateFile::new("part.stl", 50 * MIB);
        assert!(validate_file(&file, &limits()).is_valid());
    }

    #[test]
    fn test_violation_messages() {
        let too_large = FileViolation::TooLarge {
            name: "big.step".into(),
            size: 60 * MIB,
            limit: 50 * MIB,
        };
        assert_eq!(too_large.to_string(), "File big.step exceeds the 50 MB size limit");

        let no_extension = FileViolation::UnsupportedFormat {
            extension: String::new(),
        };
        assert_eq!(no_extension.to_string(), "Unsupported file format: (none)");
    }

    #[test]
    fn test_huge_declared_sizes_do_not_overflow_total() {
        let size = u64::MAX / 2 + 1;
        let files = vec![
            CandidateFile::new("a.step", size),
            CandidateFile::new("b.step", size),
        ];

        let outcome = validate_batch(&files, &limits());

        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(
            outcome.errors,
            vec![
                "File a.step exceeds the 50 MB size limit",
                "File b.step exceeds the 50 MB size limit",
            ]
        );
        assert!(outcome.warnings.iter().any(|w| w.starts_with("Total upload size")));
    }

    #[test]
    fn test_uppercase_extension_accepted() {
        let file = CandidateFile::new("HOUSING.IGES", MIB);
        assert!(validate_file(&file, &limits()).is_valid());
    }

    #[test]
    fn test_configured_extension_with_leading_dot() {
        let limits = ValidationLimits {
            allowed_extensions: vec![".sldprt".to_string()],
            ..ValidationLimits::default()
        };
        assert!(validate_file(&CandidateFile::new("a.SLDPRT", 1), &limits).is_valid());
        assert!(!validate_file(&CandidateFile::new("a.step", 1), &limits).is_valid());
    }

    #[test]
    fn test_too_many_files_skips_per_file_checks() {
        let files: Vec<_> = (0..11)
            .map(|i| CandidateFile::new(format!("part{i}.xyz"), 100 * MIB))
            .collect();
        let outcome = validate_batch(&files, &limits());

        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors, vec!["At most 10 files can be uploaded at once"]);
        assert!(outcome.accepted.is_empty());
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_empty_batch_rejected() {
        let outcome = validate_batch(&[], &limits());
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_one_bad_file_invalidates_batch() {
        let files = vec![
            CandidateFile::new("good.step", MIB),
            CandidateFile::new("model.xyz", MIB),
            CandidateFile::new("also-good.stl", MIB),
        ];
        let outcome = validate_batch(&files, &limits());

        assert!(!outcome.is_valid());
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.accepted[0].name(), "good.step");
        assert_eq!(outcome.accepted[1].name(), "also-good.stl");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].file.name(), "model.xyz");

        let error = outcome.into_accepted("; ").unwrap_err();
        assert!(error.to_string().contains("Unsupported file format: xyz"));
    }

    #[test]
    fn test_warnings_do_not_block() {
        let files = vec![
            CandidateFile::new("bracket (v2).step", 40 * MIB),
            CandidateFile::new("plate.step", 40 * MIB),
            CandidateFile::new("cover.step", 40 * MIB),
        ];
        let outcome = validate_batch(&files, &limits());

        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings[0].contains("bracket (v2).step"));
        assert!(outcome.warnings[1].contains("120.0 MB"));
    }

    #[test]
    fn test_limits_check() {
        assert!(limits().check().is_ok());

        let bad = ValidationLimits {
            max_files: 0,
            ..ValidationLimits::default()
        };
        assert!(bad.check().is_err());
    }

    proptest! {
        #[test]
        fn prop_oversized_batch_reports_single_error(count in 11usize..40, size in 0u64..(200 * MIB)) {
            let files: Vec<_> = (0..count)
                .map(|i| CandidateFile::new(format!("f{i}.step"), size))
                .collect();
            let outcome = validate_batch(&files, &limits());

            prop_assert_eq!(outcome.errors.len(), 1);
            prop_assert!(outcome.accepted.is_empty());
            prop_assert!(outcome.rejected.is_empty());
        }

        #[test]
        fn prop_unsupported_extension_always_named(
            stem in "[a-z]{1,20}",
            extension in "[a-z]{2,5}",
            size in 0u64..(200 * MIB),
        ) {
            prop_assume!(!DEFAULT_ALLOWED_EXTENSIONS.contains(&extension.as_str()));
            let file = CandidateFile::new(format!("{stem}.{extension}"), size);
            let validation = validate_file(&file, &limits());

            prop_assert!(!validation.is_valid());
            let expected = format!("Unsupported file format: {extension}");
            prop_assert!(validation.messages().contains(&expected));
        }
    }
}
