//! Archive resolution and file classification.
//!
//! This module provides the checksum engine's orchestration:
//! - Path walking over files and directories
//! - Magic byte sniffing and classification
//! - Archive expansion (ZIP, GZIP, 7-Zip) into scratch areas
//! - Recursion depth and provenance tracking
//! - Dispatch to checksumming

pub mod allowlist;
pub mod archive;
pub mod capability;
pub mod dispatch;
pub mod filetype;
pub mod recursion;
pub mod walker;

pub use allowlist::{Allowlist, WildcardSet};
pub use archive::{Expansion, ExpansionStatus, Extractor, ExtractorSet, ScratchArea};
pub use capability::Capabilities;
pub use dispatch::Dispatcher;
pub use filetype::{FileClassification, MagicSniffer};
pub use recursion::{RecursionContext, RecursionPolicy};
pub use walker::PathWalker;
