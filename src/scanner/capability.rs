//! Capability probe, run once at startup.

use crate::core::config::Config;
use crate::core::types::ChecksumAlgorithm;
use serde::Serialize;
use std::path::PathBuf;

/// Binary names tried, in order, when no 7-Zip path is configured.
const SEVENZIP_BINARIES: &[&str] = &["7z", "7zz", "7za"];

/// Which optional features are usable in this run.
///
/// MD5 and SHA-1 are always available; everything else may be missing,
/// which disables the matching archive kind or checksum silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub crc32: bool,
    pub zip: bool,
    pub gzip: bool,
    /// Resolved path of the 7-Zip binary
    pub sevenzip: Option<PathBuf>,
}

impl Capabilities {
    /// Detect capabilities for the given configuration.
    pub fn probe(config: &Config) -> Self {
        let sevenzip = Self::find_sevenzip(config.tools.sevenzip_path.as_ref());

        let capabilities = Self {
            crc32: config.checksums.crc32,
            zip: true,
            gzip: true,
            sevenzip,
        };
        log::debug!("Capabilities: {:?}", capabilities);
        capabilities
    }

    fn find_sevenzip(configured: Option<&PathBuf>) -> Option<PathBuf> {
        if let Some(path) = configured {
            return match which::which(path) {
                Ok(resolved) => Some(resolved),
                Err(e) => {
                    log::warn!("Configured 7-Zip binary {:?} is not usable: {}", path, e);
                    None
                }
            };
        }

        SEVENZIP_BINARIES
            .iter()
            .find_map(|name| which::which(name).ok())
    }

    /// Algorithms to compute, in report order.
    pub fn algorithms(&self) -> Vec<ChecksumAlgorithm> {
        let mut algorithms = Vec::with_capacity(3);
        if self.crc32 {
            algorithms.push(ChecksumAlgorithm::Crc32);
        }
        algorithms.push(ChecksumAlgorithm::Md5);
        algorithms.push(ChecksumAlgorithm::Sha1);
        algorithms
    }
}
