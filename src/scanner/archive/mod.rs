//! Archive expansion into per-call scratch areas.
//!
//! Each archive kind has one [`Extractor`] backend. Backends never decide
//! whether a failure is fatal; they report an [`ExpansionStatus`] and the
//! dispatcher maps it onto a warning or error.

pub mod gzip;
pub mod sevenzip;
pub mod zip;

use crate::core::error::{Error, Result};
use crate::core::types::ArchiveKind;
use crate::scanner::allowlist::WildcardSet;
use crate::scanner::capability::Capabilities;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use walkdir::WalkDir;

pub use self::gzip::GzipExtractor;
pub use self::sevenzip::SevenZipExtractor;
pub use self::zip::ZipExtractor;

/// Prefix of every scratch directory name.
const SCRATCH_PREFIX: &str = "romsum-";

/// Outcome of one expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionStatus {
    /// Every selected entry was extracted
    Complete,
    /// Some entries could not be extracted; the rest are usable
    Partial,
    /// Nothing usable was produced
    Failed(String),
}

/// Files produced by an expansion, plus how it went.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub files: Vec<PathBuf>,
    pub status: ExpansionStatus,
}

impl Expansion {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            status: ExpansionStatus::Failed(reason.into()),
        }
    }

    /// Build an expansion from whatever landed in `scratch`.
    pub fn from_scratch(scratch: &Path, status: ExpansionStatus) -> Self {
        Self {
            files: collect_files(scratch),
            status,
        }
    }
}

/// One extraction backend.
pub trait Extractor {
    /// The archive kind this backend handles.
    fn kind(&self) -> ArchiveKind;

    /// Extract `archive` into `scratch`.
    ///
    /// With `wildcards` set only matching entries are extracted; with `None`
    /// every entry is.
    fn expand(&self, archive: &Path, scratch: &Path, wildcards: Option<&WildcardSet>)
        -> Expansion;
}

/// Regular files below `dir`, sorted by path.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Render an error and its sources on one line.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Uniquely named temporary directory owned by one expansion call.
///
/// Dropping the area removes it; [`ScratchArea::close`] does the same but
/// surfaces removal failures.
#[derive(Debug)]
pub struct ScratchArea {
    dir: TempDir,
}

impl ScratchArea {
    /// Create a fresh scratch directory under the system temp dir.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(|source| Error::ScratchCreate { source })?;
        log::debug!("Created scratch area {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the scratch directory and everything extracted into it.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| Error::ScratchRemove {
                path: path.clone(),
                source,
            })?;
        log::debug!("Removed scratch area {:?}", path);
        Ok(())
    }
}

/// Available backends, keyed by archive kind.
///
/// A kind with no backend is silently skipped by the dispatcher.
#[derive(Default)]
pub struct ExtractorSet {
    extractors: HashMap<ArchiveKind, Box<dyn Extractor>>,
}

impl ExtractorSet {
    /// A set with no backends.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Backends for every capability that was detected.
    pub fn from_capabilities(capabilities: &Capabilities, timeout: Option<Duration>) -> Self {
        let mut set = Self::empty();
        if capabilities.zip {
            set = set.with(ZipExtractor);
        }
        if capabilities.gzip {
            set = set.with(GzipExtractor);
        }
        if let Some(binary) = &capabilities.sevenzip {
            set = set.with(SevenZipExtractor::new(binary.clone()).with_timeout(timeout));
        }
        set
    }

    /// Register (or replace) the backend for its kind.
    pub fn with<E: Extractor + 'static>(mut self, extractor: E) -> Self {
        self.extractors.insert(extractor.kind(), Box::new(extractor));
        self
    }

    pub fn get(&self, kind: ArchiveKind) -> Option<&dyn Extractor> {
        self.extractors.get(&kind).map(|e| e.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_area_close_removes_dir() {
        let scratch = ScratchArea::create().unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("file.nes"), b"data").unwrap();
        assert!(path.exists());

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_area_drop_removes_dir() {
        let path = {
            let scratch = ScratchArea::create().unwrap();
            std::fs::create_dir_all(scratch.path().join("nested")).unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_areas_are_unique() {
        let a = ScratchArea::create().unwrap();
        let b = ScratchArea::create().unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(SCRATCH_PREFIX));
    }

    #[test]
    fn test_collect_files_recurses_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top.nes"), b"1").unwrap();
        std::fs::write(dir.path().join("a/b/deep.nes"), b"2").unwrap();

        let files = collect_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.is_file()));
    }

    #[test]
    fn test_extractor_set_from_capabilities() {
        let caps = Capabilities {
            crc32: true,
            zip: true,
            gzip: false,
            sevenzip: None,
        };
        let set = ExtractorSet::from_capabilities(&caps, None);
        assert!(set.get(ArchiveKind::Zip).is_some());
        assert!(set.get(ArchiveKind::Gzip).is_none());
        assert!(set.get(ArchiveKind::SevenZip).is_none());
        assert_eq!(set.get(ArchiveKind::Zip).unwrap().kind(), ArchiveKind::Zip);
    }
}
