//! Error types and result handling for romsum.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for romsum operations.
#[derive(Error, Debug)]
pub enum Error {
    // ===== I/O Errors =====
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to access directory: {path}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // ===== Scratch Area Errors =====
    #[error("Failed to create scratch directory")]
    ScratchCreate {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove scratch directory: {path}")]
    ScratchRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===== Configuration Errors =====
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("Invalid configuration value: {field} - {message}")]
    ConfigInvalid { field: String, message: String },

    #[error("Invalid extension pattern")]
    InvalidPattern(#[from] regex::Error),

    // ===== Archive Errors =====
    #[error("Archive extraction failed: {path}")]
    ArchiveError {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{tool} failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("{tool} did not finish within {timeout_secs}s")]
    ToolTimeout { tool: String, timeout_secs: u64 },

    // ===== Checksum Errors =====
    #[error("Failed to compute checksums: {path}")]
    Checksum {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===== Serialization Errors =====
    #[error("JSON serialization error")]
    JsonSerialize(#[from] serde_json::Error),

    // ===== Generic Errors =====
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl Error {
    /// Create a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Create an archive error wrapping any backend failure.
    pub fn archive(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ArchiveError {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create an external tool failure.
    pub fn tool_failed(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Errors that abort the whole run.
    ///
    /// An unreadable input and a scratch directory that cannot be created or
    /// removed leave the environment in a state the run cannot recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. } | Error::ScratchCreate { .. } | Error::ScratchRemove { .. }
        )
    }

    /// Get a user-friendly suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::FileRead { .. } => Some("Check that the file is readable by the current user"),
            Error::PathNotFound(_) => Some("Check that the path exists and is accessible"),
            Error::ScratchCreate { .. } | Error::ScratchRemove { .. } => {
                Some("Check free space and permissions of the temporary directory (TMPDIR)")
            }
            Error::ConfigLoad(_) | Error::ConfigInvalid { .. } => {
                Some("Check your configuration file for syntax errors or missing fields")
            }
            Error::InvalidPattern(_) => {
                Some("Extensions may only contain letters, digits, '_' and '-'")
            }
            Error::ToolTimeout { .. } => {
                Some("Raise tools.extraction_timeout_secs or remove it from the configuration")
            }
            _ => None,
        }
    }
}
