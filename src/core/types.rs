//! Core type definitions used throughout romsum.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Archive formats the expander knows how to unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    Zip,
    Gzip,
    SevenZip,
}

impl ArchiveKind {
    /// All kinds, in dispatch order.
    pub const ALL: [ArchiveKind; 3] = [ArchiveKind::Zip, ArchiveKind::Gzip, ArchiveKind::SevenZip];

    /// File extension (without dot) that selects this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Gzip => "gz",
            ArchiveKind::SevenZip => "7z",
        }
    }

    /// Select an archive kind from a path's extension.
    ///
    /// Matching is case-sensitive: `game.zip` is an archive candidate,
    /// `GAME.ZIP` is not.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveKind::Zip => write!(f, "ZIP"),
            ArchiveKind::Gzip => write!(f, "GZIP"),
            ArchiveKind::SevenZip => write!(f, "7-Zip"),
        }
    }
}

/// Digest algorithms the checksum engine can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Crc32,
    Md5,
    Sha1,
}

impl ChecksumAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Crc32 => "CRC32",
            ChecksumAlgorithm::Md5 => "MD5",
            ChecksumAlgorithm::Sha1 => "SHA-1",
        }
    }
}

/// Whether a digest covers the whole file or the ROM body after its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumScope {
    File,
    Rom,
}

impl ChecksumScope {
    pub fn label(&self) -> &'static str {
        match self {
            ChecksumScope::File => "File",
            ChecksumScope::Rom => "ROM",
        }
    }
}

/// One computed digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub scope: ChecksumScope,
    pub algorithm: ChecksumAlgorithm,
    /// Lowercase hex digest
    pub value: String,
}

impl Checksum {
    /// Label shown in reports, e.g. `ROM CRC32`.
    pub fn label(&self) -> String {
        format!("{} {}", self.scope.label(), self.algorithm.name())
    }
}

/// Separator between a name and its enclosing archives in a rendered chain.
pub const CHAIN_SEPARATOR: &str = " < ";

/// Checksums for one resolved file together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumReport {
    /// Path on disk (a scratch path for extracted files)
    pub path: PathBuf,
    /// Name shown to the user
    pub display_name: String,
    /// Ancestor archives, innermost first; empty for top-level files
    pub chain: Vec<String>,
    pub checksums: Vec<Checksum>,
}

impl ChecksumReport {
    /// Display name followed by the archive chain, e.g.
    /// `mario.nes < inner.zip < outer.zip`.
    pub fn heading(&self) -> String {
        let mut heading = self.display_name.clone();
        for archive in &self.chain {
            heading.push_str(CHAIN_SEPARATOR);
            heading.push_str(archive);
        }
        heading
    }

    /// Look up a digest by scope and algorithm.
    pub fn get(&self, scope: ChecksumScope, algorithm: ChecksumAlgorithm) -> Option<&str> {
        self.checksums
            .iter()
            .find(|c| c.scope == scope && c.algorithm == algorithm)
            .map(|c| c.value.as_str())
    }
}

/// Severity of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Input skipped, run continues
    Warning,
    /// Input could not be processed, run continues
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Why an input was skipped or could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    TooManyRecursions,
    MagicMismatch(ArchiveKind),
    TarGzUnsupported,
    ExtractionFailed(String),
    UnknownExtension,
    PathNotFound,
    ChecksumFailed(String),
}

/// A recoverable warning or error attached to one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Name of the input as shown to the user (with chain)
    pub subject: String,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, subject: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            subject: subject.into(),
        }
    }

    pub fn error(kind: DiagnosticKind, subject: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            subject: subject.into(),
        }
    }

    /// Human-readable message without the severity marker.
    pub fn message(&self) -> String {
        match &self.kind {
            DiagnosticKind::TooManyRecursions => {
                format!("{}: too many recursions, not unpacking", self.subject)
            }
            DiagnosticKind::MagicMismatch(kind) => {
                format!("{}: not a {} archive, skipping", self.subject, kind)
            }
            DiagnosticKind::TarGzUnsupported => {
                format!("{}: tar.gz archives are not supported", self.subject)
            }
            DiagnosticKind::ExtractionFailed(reason) => {
                format!("{}: extraction failed: {}", self.subject, reason)
            }
            DiagnosticKind::UnknownExtension => {
                format!("{}: unknown file extension", self.subject)
            }
            DiagnosticKind::PathNotFound => format!("{}: no such file or directory", self.subject),
            DiagnosticKind::ChecksumFailed(reason) => {
                format!("{}: could not compute checksums: {}", self.subject, reason)
            }
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message())
    }
}
