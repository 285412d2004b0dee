//! Configuration management for romsum.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions recognised when neither the config file nor `-e` overrides them.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "nes", "fds", "unf", "unif", "sfc", "smc", "swc", "fig", "gb", "gbc", "gba", "nds", "n64",
    "z64", "v64", "md", "gen", "smd", "sms", "gg", "sg", "pce", "a26", "a52", "a78", "lnx", "ws",
    "wsc", "ngp", "ngc", "col", "int", "vb", "32x", "zip", "gz", "7z",
];

/// Upper bound accepted for `scan.max_archive_depth`.
const MAX_ARCHIVE_DEPTH_LIMIT: u32 = 16;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan-related settings
    pub scan: ScanConfig,
    /// Checksum selection
    pub checksums: ChecksumConfig,
    /// External tool settings
    pub tools: ToolsConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigLoad(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config file: {}", e)))
    }

    /// Load the configuration for a run.
    ///
    /// An explicit `path` must load. At the default location a missing file
    /// means defaults, and a malformed one means defaults plus the load error,
    /// handed back so it can be logged once logging is set up.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, Option<Error>)> {
        if let Some(path) = path {
            return Ok((Self::load(path)?, None));
        }

        let config_path = Self::default_config_path();
        if !config_path.exists() {
            return Ok((Self::default(), None));
        }

        match Self::load(&config_path) {
            Ok(config) => Ok((config, None)),
            Err(e) => Ok((Self::default(), Some(e))),
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("romsum")
            .join("config.json")
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.is_empty() {
            return Err(Error::ConfigInvalid {
                field: "scan.extensions".to_string(),
                message: "Must contain at least one extension".to_string(),
            });
        }

        if let Some(bad) = self
            .scan
            .extensions
            .iter()
            .find(|ext| !is_valid_extension(ext))
        {
            return Err(Error::ConfigInvalid {
                field: "scan.extensions".to_string(),
                message: format!("Invalid extension {:?}", bad),
            });
        }

        if self.scan.max_archive_depth > MAX_ARCHIVE_DEPTH_LIMIT {
            return Err(Error::ConfigInvalid {
                field: "scan.max_archive_depth".to_string(),
                message: format!("Must be at most {}", MAX_ARCHIVE_DEPTH_LIMIT),
            });
        }

        if self.tools.extraction_timeout_secs == Some(0) {
            return Err(Error::ConfigInvalid {
                field: "tools.extraction_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Extensions are matched inside a regex and passed to 7-Zip as wildcards,
/// so only a conservative character set is accepted.
fn is_valid_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Scan-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum nesting depth for archives inside archives
    pub max_archive_depth: u32,
    /// Descend into subdirectories of directory arguments
    pub recursive: bool,
    /// Recognised file extensions (without dot)
    pub extensions: Vec<String>,
    /// Only extract archive entries whose extension is recognised
    pub filter_archive_entries: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_archive_depth: 1,
            recursive: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            filter_archive_entries: true,
        }
    }
}

/// Checksum selection. MD5 and SHA-1 are always computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksumConfig {
    /// Compute CRC32 digests
    pub crc32: bool,
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self { crc32: true }
    }
}

/// External tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Explicit path to a 7-Zip binary; searched on PATH when unset
    pub sevenzip_path: Option<PathBuf>,
    /// Kill external extractors that run longer than this
    pub extraction_timeout_secs: Option<u64>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Prefix log lines with a timestamp
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            timestamps: false,
        }
    }
}
