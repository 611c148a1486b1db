//! Directory walker for input discovery

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use super::{DiscoveredFile, DiscoveryError, Result};

/// Options for file discovery
#[derive(Debug, Clone)]
pub struct FileDiscoveryOptions {
    /// Lowercase extensions to keep when walking a directory; `None` keeps all
    pub extensions: Option<Vec<String>>,
    pub recursive: bool,
    pub follow_links: bool,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
}

impl Default for FileDiscoveryOptions {
    fn default() -> Self {
        Self {
            extensions: None,
            recursive: true,
            follow_links: false,
            skip_hidden: true,
        }
    }
}

impl FileDiscoveryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep files with one of these extensions when walking directories
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = Some(
            extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        );
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }
}

/// Iterator over files under one input path
///
/// A path naming a file yields that file whatever its extension, so the
/// validator gets to report it. Directories are walked in file name order.
pub struct FileDiscovery {
    walker: walkdir::IntoIter,
    root_is_file: bool,
    options: FileDiscoveryOptions,
}

impl FileDiscovery {
    pub fn new(path: &Path, options: FileDiscoveryOptions) -> Result<Self> {
        if !path.exists() {
            return Err(DiscoveryError::PathNotFound(path.to_path_buf()));
        }

        let mut walker = WalkDir::new(path)
            .follow_links(options.follow_links)
            .sort_by_file_name();
        if !options.recursive {
            walker = walker.max_depth(1);
        }

        Ok(Self {
            walker: walker.into_iter(),
            root_is_file: path.is_file(),
            options,
        })
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    }

    fn should_include(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_file() {
            return false;
        }
        if self.root_is_file {
            return true;
        }
        match &self.options.extensions {
            None => true,
            Some(allowed) => entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext))),
        }
    }
}

impl Iterator for FileDiscovery {
    type Item = Result<DiscoveredFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let io = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    return Some(Err(DiscoveryError::Io(io)));
                }
            };

            if self.options.skip_hidden && Self::is_hidden(&entry) {
                if entry.file_type().is_dir() {
                    self.walker.skip_current_dir();
                }
                continue;
            }

            if !self.should_include(&entry) {
                continue;
            }

            return Some(
                entry
                    .metadata()
                    .map(|metadata| DiscoveredFile {
                        path: entry.path().to_path_buf(),
                        size: metadata.len(),
                    })
                    .map_err(|err| {
                        DiscoveryError::Io(
                            err.into_io_error()
                                .unwrap_or_else(|| std::io::Error::other("metadata unavailable")),
                        )
                    }),
            );
        }
    }
}
