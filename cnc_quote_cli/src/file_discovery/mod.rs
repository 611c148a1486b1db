//! Input discovery for the quote commands
//!
//! An input is either a path on disk (a file, or a directory walked for CAD
//! files) or a synthetic `NAME:SIZE` entry describing a file that does not
//! exist locally. Only names and sizes are collected; content is never read.

mod walker;

pub use walker::{FileDiscovery, FileDiscoveryOptions};

use cnc_quote_core::CandidateFile;
use std::path::{Path, PathBuf};

/// A file found on disk
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
}

impl DiscoveredFile {
    /// Candidate named after the file's final path component
    pub fn to_candidate(&self) -> CandidateFile {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned());
        CandidateFile::new(name, self.size)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Invalid size '{size}' for {name}")]
    InvalidSize { name: String, size: String },
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Resolve command line inputs into candidate files, in input order
///
/// Existing paths win over the `NAME:SIZE` form, so a local file whose name
/// contains a colon is still read from disk.
pub fn collect_candidates(
    inputs: &[String],
    options: &FileDiscoveryOptions,
) -> Result<Vec<CandidateFile>> {
    let mut candidates = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.exists() {
            for file in FileDiscovery::new(path, options.clone())? {
                candidates.push(file?.to_candidate());
            }
            continue;
        }

        match input.rsplit_once(':') {
            Some((name, size)) if !name.is_empty() => {
                let size = parse_size(size).ok_or_else(|| DiscoveryError::InvalidSize {
                    name: name.to_string(),
                    size: size.to_string(),
                })?;
                candidates.push(CandidateFile::new(name, size));
            }
            _ => return Err(DiscoveryError::PathNotFound(path.to_path_buf())),
        }
    }

    Ok(candidates)
}

/// Parse a byte count with an optional binary suffix: `512`, `64K`, `2MiB`, `1.5G`
pub fn parse_size(text: &str) -> Option<u64> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number.parse().ok()?;

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        _ => return None,
    };

    let bytes = value * multiplier as f64;
    (bytes.is_finite() && bytes >= 0.0 && bytes < u64::MAX as f64).then(|| bytes.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("512"), Some(512));
        assert_eq!(parse_size("64K"), Some(64 * 1024));
        assert_eq!(parse_size("2MiB"), Some(2 * 1024 * 1024));
        assert_eq!(parse_size("1.5g"), Some(1_610_612_736));
        assert_eq!(parse_size("ten"), None);
        assert_eq!(parse_size("5 parsecs"), None);
        assert_eq!(parse_size(""), None);
    }

    #[test]
    fn test_synthetic_inputs() {
        let inputs = vec!["bracket.step:2M".to_string(), "notes.txt:10".to_string()];
        let files = collect_candidates(&inputs, &FileDiscoveryOptions::default()).unwrap();
        assert_eq!(files[0], CandidateFile::new("bracket.step", 2 * 1024 * 1024));
        assert_eq!(files[1], CandidateFile::new("notes.txt", 10));
    }

    #[test]
    fn test_missing_path_and_bad_size() {
        let options = FileDiscoveryOptions::default();
        let err = collect_candidates(&["no/such/file.step".to_string()], &options).unwrap_err();
        assert!(matches!(err, DiscoveryError::PathNotFound(_)));

        let err = collect_candidates(&["a.step:lots".to_string()], &options).unwrap_err();
        assert_eq!(err.to_string(), "Invalid size 'lots' for a.step");
    }

    #[test]
    fn test_existing_file_uses_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("housing.stl");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let inputs = vec![path.to_string_lossy().into_owned()];
        let files = collect_candidates(&inputs, &FileDiscoveryOptions::default()).unwrap();
        assert_eq!(files, vec![CandidateFile::new("housing.stl", 2048)]);
    }
}
