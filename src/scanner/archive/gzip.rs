//! GZIP backend. A gzip file holds exactly one logical file, named after the
//! archive without its `.gz` suffix. Concatenated members (pigz, bgzip) are
//! decoded back to back, as `gunzip` does.

use super::{error_chain, Expansion, ExpansionStatus, Extractor};
use crate::core::error::{Error, Result};
use crate::core::types::ArchiveKind;
use crate::scanner::allowlist::WildcardSet;
use flate2::read::MultiGzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Fallback name when the archive is literally called `.gz`.
const UNNAMED_OUTPUT: &str = "gzip-contents";

#[derive(Debug, Clone, Copy, Default)]
pub struct GzipExtractor;

impl GzipExtractor {
    /// Name of the single decompressed file.
    pub fn output_name(archive: &Path) -> String {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match name.strip_suffix(".gz") {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => UNNAMED_OUTPUT.to_string(),
        }
    }

    fn extract(&self, archive: &Path, target: &Path) -> Result<()> {
        let file = File::open(archive).map_err(|e| Error::archive(archive, e))?;
        let mut decoder = MultiGzDecoder::new(BufReader::new(file));
        let mut out = File::create(target).map_err(|e| Error::file_write(target, e))?;

        if let Err(e) = io::copy(&mut decoder, &mut out) {
            drop(out);
            let _ = fs::remove_file(target);
            return Err(Error::archive(archive, e));
        }
        Ok(())
    }
}

impl Extractor for GzipExtractor {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Gzip
    }

    fn expand(
        &self,
        archive: &Path,
        scratch: &Path,
        wildcards: Option<&WildcardSet>,
    ) -> Expansion {
        let name = Self::output_name(archive);

        if let Some(wildcards) = wildcards {
            if !wildcards.matches_name(&name) {
                log::debug!("{:?} would produce {}, not on the allowlist", archive, name);
                return Expansion {
                    files: Vec::new(),
                    status: ExpansionStatus::Complete,
                };
            }
        }

        let target: PathBuf = scratch.join(&name);
        match self.extract(archive, &target) {
            Ok(()) => Expansion {
                files: vec![target],
                status: ExpansionStatus::Complete,
            },
            Err(e) => Expansion::failed(error_chain(&e)),
        }
    }
}
