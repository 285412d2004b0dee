//! File classification using magic bytes and extensions.

use crate::core::error::{Error, Result};
use crate::core::types::ArchiveKind;
use crate::scanner::allowlist::Allowlist;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Maximum bytes to read for magic detection.
pub const MAGIC_BYTES_SIZE: u64 = 4;

/// Bytes inspected when deciding whether a file is text.
const TEXT_SNIFF_SIZE: u64 = 512;

/// Extensions shared by ROM formats and common text formats (`.md` is both
/// a Mega Drive ROM and Markdown). Files with these extensions are only
/// hashed when their content does not look like text.
pub const TEXT_LIKELY_EXTENSIONS: &[&str] = &["md"];

/// A ROM format identified by its header magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomSignature {
    /// System the ROM belongs to
    pub system: &'static str,
    /// Leading bytes of the header
    pub magic: &'static [u8],
    /// Bytes to skip before the ROM body starts
    pub header_size: u64,
}

/// Known ROM headers.
pub const ROM_SIGNATURES: &[RomSignature] = &[RomSignature {
    system: "NES",
    magic: b"NES\x1a",
    header_size: 16,
}];

/// How the dispatcher should treat a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClassification {
    /// Selected by extension; the magic still has to confirm the kind
    Archive(ArchiveKind),
    /// Header-bearing ROM, checksummed whole and from `offset`
    RomHeader { system: &'static str, offset: u64 },
    /// Extension is on the allowlist
    PlainRecognized,
    Unrecognized,
}

impl FileClassification {
    /// Classify `path` given its sniffed magic.
    ///
    /// Archive extensions win over everything else, then ROM magic, then the
    /// extension allowlist.
    pub fn classify(path: &Path, magic: &[u8], allowlist: &Allowlist) -> Self {
        if let Some(kind) = ArchiveKind::from_path(path) {
            return FileClassification::Archive(kind);
        }

        if let Some(signature) = MagicSniffer::detect_rom(magic) {
            return FileClassification::RomHeader {
                system: signature.system,
                offset: signature.header_size,
            };
        }

        if allowlist.matches(path) {
            FileClassification::PlainRecognized
        } else {
            FileClassification::Unrecognized
        }
    }
}

/// Reads and interprets leading file signatures.
pub struct MagicSniffer;

impl MagicSniffer {
    /// Read at most the first four bytes of `path`, with NUL bytes removed.
    ///
    /// Failure to open or read is reported as [`Error::FileRead`], which the
    /// dispatcher treats as fatal.
    pub fn read_magic(path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        let mut magic = Vec::with_capacity(MAGIC_BYTES_SIZE as usize);
        file.take(MAGIC_BYTES_SIZE)
            .read_to_end(&mut magic)
            .map_err(|e| Error::file_read(path, e))?;

        magic.retain(|&b| b != 0);
        Ok(magic)
    }

    /// Check that `magic` confirms an archive kind claimed by extension.
    pub fn matches_archive(kind: ArchiveKind, magic: &[u8]) -> bool {
        match kind {
            ArchiveKind::SevenZip => magic == b"7z\xbc\xaf",
            ArchiveKind::Zip => magic == b"PK\x03\x04",
            ArchiveKind::Gzip => magic.starts_with(b"\x1f\x8b"),
        }
    }

    /// Look up a ROM header signature.
    pub fn detect_rom(magic: &[u8]) -> Option<&'static RomSignature> {
        ROM_SIGNATURES.iter().find(|sig| magic == sig.magic)
    }

    /// Whether the path's extension needs a text sniff before hashing.
    pub fn is_text_likely_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                TEXT_LIKELY_EXTENSIONS
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Sniff the start of a file and report whether it looks like text.
    pub fn looks_like_text(path: &Path) -> Result<bool> {
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        let mut buffer = Vec::with_capacity(TEXT_SNIFF_SIZE as usize);
        file.take(TEXT_SNIFF_SIZE)
            .read_to_end(&mut buffer)
            .map_err(|e| Error::file_read(path, e))?;

        Ok(Self::is_likely_text(&buffer))
    }

    /// Check if bytes are likely text (not binary).
    fn is_likely_text(bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return false;
        }

        // Any NUL byte means binary
        if bytes.contains(&0) {
            return false;
        }

        let non_text_count = bytes
            .iter()
            .filter(|&&b| !(b == 9 || b == 10 || b == 13 || (32..=126).contains(&b) || b >= 128))
            .count();

        // If more than 10% non-text, it's probably binary
        (non_text_count as f64 / bytes.len() as f64) < 0.1
    }
}
