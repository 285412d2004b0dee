//! ZIP backend, extracted in-process with the `zip` crate.

use super::{error_chain, Expansion, ExpansionStatus, Extractor};
use crate::core::error::{Error, Result};
use crate::core::types::ArchiveKind;
use crate::scanner::allowlist::WildcardSet;
use ::zip::result::ZipError;
use ::zip::ZipArchive;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

/// Extracts ZIP archives entry by entry.
///
/// Entries that cannot be read (unsupported compression method, encryption,
/// corrupt data, names escaping the scratch area) are skipped and turn the
/// result into [`ExpansionStatus::Partial`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    fn extract(
        &self,
        archive: &Path,
        scratch: &Path,
        wildcards: Option<&WildcardSet>,
    ) -> Result<ExpansionStatus> {
        let file = File::open(archive).map_err(|e| Error::archive(archive, e))?;
        let mut zip =
            ZipArchive::new(BufReader::new(file)).map_err(|e| Error::archive(archive, e))?;

        let mut skipped = 0usize;

        for i in 0..zip.len() {
            let mut entry = match zip.by_index(i) {
                Ok(entry) => entry,
                Err(ZipError::UnsupportedArchive(reason)) => {
                    log::debug!("Skipping entry #{} in {:?}: {}", i, archive, reason);
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(Error::archive(archive, e)),
            };

            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            if let Some(wildcards) = wildcards {
                if !wildcards.matches_name(&name) {
                    log::trace!("Not extracting {} from {:?}", name, archive);
                    continue;
                }
            }

            let relative = match entry.enclosed_name() {
                Some(relative) => relative.to_path_buf(),
                None => {
                    log::warn!("Refusing unsafe entry name {:?} in {:?}", name, archive);
                    skipped += 1;
                    continue;
                }
            };

            let target = scratch.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::file_write(parent, e))?;
            }

            let mut out = File::create(&target).map_err(|e| Error::file_write(&target, e))?;
            if let Err(e) = io::copy(&mut entry, &mut out) {
                log::debug!("Failed to extract {} from {:?}: {}", name, archive, e);
                drop(out);
                let _ = fs::remove_file(&target);
                skipped += 1;
            }
        }

        if skipped > 0 {
            log::debug!("{} entries of {:?} could not be extracted", skipped, archive);
            Ok(ExpansionStatus::Partial)
        } else {
            Ok(ExpansionStatus::Complete)
        }
    }
}

impl Extractor for ZipExtractor {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Zip
    }

    fn expand(
        &self,
        archive: &Path,
        scratch: &Path,
        wildcards: Option<&WildcardSet>,
    ) -> Expansion {
        match self.extract(archive, scratch, wildcards) {
            Ok(status) => Expansion::from_scratch(scratch, status),
            Err(e) => Expansion::failed(error_chain(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::allowlist::Allowlist;
    use std::io::{Cursor, Write};

    fn create_test_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ::zip::ZipWriter::new(&mut buffer);
            let options = ::zip::write::FileOptions::default()
                .compression_method(::zip::CompressionMethod::Stored);

            for (name, data) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }

            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    fn write_zip(dir: &Path, entries: &[(&str, &[u8])]) -> std::path::PathBuf {
        let path = dir.join("test.zip");
        fs::write(&path, create_test_zip(entries)).unwrap();
        path
    }

    const ENTRIES: &[(&str, &[u8])] = &[
        ("mario.nes", b"NES\x1a rom"),
        ("roms/zelda.sfc", b"snes rom"),
        ("readme.txt", b"hello"),
        ("notes/info.txt", b"world"),
        ("inner.zip", b"PK\x03\x04"),
    ];

    #[test]
    fn test_expand_with_allowlist() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let archive = write_zip(dir.path(), ENTRIES);
        let extensions = vec!["nes".to_string(), "sfc".to_string(), "zip".to_string()];
        let allow = Allowlist::new(&extensions).unwrap();

        let expansion = ZipExtractor.expand(&archive, scratch.path(), Some(allow.wildcards()));

        assert_eq!(expansion.status, ExpansionStatus::Complete);
        assert_eq!(expansion.files.len(), 3);
        assert!(scratch.path().join("roms/zelda.sfc").is_file());
        assert!(!scratch.path().join("readme.txt").exists());
    }

    #[test]
    fn test_expand_without_allowlist_extracts_everything() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let archive = write_zip(dir.path(), ENTRIES);

        let expansion = ZipExtractor.expand(&archive, scratch.path(), None);

        assert_eq!(expansion.status, ExpansionStatus::Complete);
        assert_eq!(expansion.files.len(), ENTRIES.len());
        assert_eq!(
            fs::read(scratch.path().join("mario.nes")).unwrap(),
            b"NES\x1a rom".to_vec()
        );
    }

    #[test]
    fn test_expand_corrupt_archive_fails() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"PK\x03\x04 definitely not a zip").unwrap();

        let expansion = ZipExtractor.expand(&archive, scratch.path(), None);

        assert!(matches!(expansion.status, ExpansionStatus::Failed(_)));
        assert!(expansion.files.is_empty());
    }

    #[test]
    fn test_unsafe_entry_is_partial() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let archive = write_zip(
            dir.path(),
            &[("../escape.nes", &b"x"[..]), ("ok.nes", &b"y"[..])],
        );

        let expansion = ZipExtractor.expand(&archive, scratch.path(), None);

        assert_eq!(expansion.status, ExpansionStatus::Partial);
        assert_eq!(expansion.files, vec![scratch.path().join("ok.nes")]);
        assert!(!dir.path().join("escape.nes").exists());
    }

    /// Overwrite the compression method of the `nth` entry in both headers.
    fn set_compression_method(bytes: &mut [u8], nth: usize, method: u16) {
        let headers: [(&[u8], usize); 2] = [(b"PK\x03\x04", 8), (b"PK\x01\x02", 10)];
        for (signature, field) in headers {
            let offset = bytes
                .windows(4)
                .enumerate()
                .filter(|(_, window)| *window == signature)
                .map(|(i, _)| i)
                .nth(nth)
                .unwrap();
            bytes[offset + field..offset + field + 2].copy_from_slice(&method.to_le_bytes());
        }
    }

    #[test]
    fn test_unsupported_method_is_partial() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let mut bytes =
            create_test_zip(&[("aaaa.nes", &b"first"[..]), ("bbbb.nes", &b"second"[..])]);
        set_compression_method(&mut bytes, 1, 200);
        let archive = dir.path().join("mixed.zip");
        fs::write(&archive, bytes).unwrap();

        let expansion = ZipExtractor.expand(&archive, scratch.path(), None);

        assert_eq!(expansion.status, ExpansionStatus::Partial);
        assert_eq!(expansion.files, vec![scratch.path().join("aaaa.nes")]);
        assert!(!scratch.path().join("bbbb.nes").exists());
    }
}
