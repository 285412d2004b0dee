//! romsum: file and ROM checksums, including files nested inside archives.
//!
//! This crate provides the recursive archive-resolution and file
//! classification engine. Inputs are walked, archives (ZIP, GZIP, 7-Zip) are
//! unpacked into scratch areas up to a configured depth, and every resolved
//! file is checksummed whole and, for header-bearing ROMs, without its header.

pub mod core;
pub mod scanner;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use crate::core::types::*;
