//! Utility functions and helpers.

pub mod hash;
pub mod logging;

pub use hash::{FileHasher, HashCalculator, Hasher};
pub use logging::{init_logging, LogConfig};
