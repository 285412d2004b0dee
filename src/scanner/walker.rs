//! Expands command-line paths into candidate files.

use crate::core::error::{Error, Result};
use crate::scanner::allowlist::Allowlist;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Turns one input path into the files the dispatcher should see.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathWalker {
    recursive: bool,
}

impl PathWalker {
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }

    /// Candidate files for `path`.
    ///
    /// A file is returned as-is, whatever its extension; the dispatcher
    /// decides what to do with it. A directory yields the allowlisted files
    /// directly inside it, or anywhere below it when recursive. Order follows
    /// directory enumeration and is not stable.
    pub fn walk(&self, path: &Path, allowlist: &Allowlist) -> Result<Vec<PathBuf>> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::PathNotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(Error::DirectoryAccess {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if !metadata.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut walker = WalkDir::new(path).min_depth(1);
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::debug!("Skipping unreadable entry under {:?}: {}", path, e);
                    continue;
                }
            };

            let file_path = entry.path();
            if !file_path.is_file() {
                continue;
            }

            if allowlist.matches(file_path) {
                files.push(entry.into_path());
            } else {
                log::trace!("Not on the allowlist: {:?}", file_path);
            }
        }

        log::debug!("{:?}: {} candidate file(s)", path, files.len());
        Ok(files)
    }
}
