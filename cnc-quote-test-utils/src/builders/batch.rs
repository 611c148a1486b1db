//! Candidate batch builder

use cnc_quote_core::CandidateFile;
use cnc_quote_core::file::MIB;

/// Builder for candidate file batches
///
/// # Examples
///
/// ```rust
/// use cnc_quote_test_utils::BatchBuilder;
///
/// let batch = BatchBuilder::new()
///     .with_file("bracket.step", 2 * 1024 * 1024)
///     .with_parts(3, "stl")
///     .build();
/// assert_eq!(batch.len(), 4);
/// ```
#[derive(Debug, Default, Clone)]
pub struct BatchBuilder {
    files: Vec<CandidateFile>,
}

impl BatchBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file
    pub fn with_file(mut self, name: &str, size: u64) -> Self {
        self.files.push(CandidateFile::new(name, size));
        self
    }

    /// Add `count` 1 MiB files named `part<i>.<extension>`
    pub fn with_parts(mut self, count: usize, extension: &str) -> Self {
        let start = self.files.len();
        for i in start..start + count {
            self.files
                .push(CandidateFile::new(format!("part{i}.{extension}"), MIB));
        }
        self
    }

    /// Add a file over the default 50 MiB ceiling
    pub fn with_oversized(self, name: &str) -> Self {
        self.with_file(name, 51 * MIB)
    }

    /// Add a file whose name exceeds the default 100 character ceiling
    pub fn with_long_name(self, extension: &str) -> Self {
        let name = format!("{}.{extension}", "x".repeat(101));
        self.with_file(&name, MIB)
    }

    pub fn build(self) -> Vec<CandidateFile> {
        self.files
    }
}
