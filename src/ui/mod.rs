//! User interface components.
//!
//! This module provides:
//! - CLI interface
//! - Report output (text blocks, JSON lines)

pub mod cli;
pub mod report;

pub use cli::Cli;
pub use report::{create_sink, CollectingSink, ReportFormat, ReportSink, RunSummary};
