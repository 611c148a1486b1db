//! Candidate files submitted for quoting

use serde::{Deserialize, Serialize};

/// One MiB, the upload chunk size and the unit for size limits
pub const MIB: u64 = 1024 * 1024;

/// A user-selected file as declared by the caller
///
/// Only the name and declared size are known; file content is never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    name: String,
    size: u64,
}

impl CandidateFile {
    /// Create a candidate file from its name and declared byte size
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Lowercased suffix after the last `.`, empty when the name has none
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// Number of 1 MiB chunks the upload simulation splits this file into
    pub fn chunk_count(&self) -> u64 {
        self.size.div_ceil(MIB)
    }
}
