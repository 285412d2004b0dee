//! Result reporting.
//!
//! The dispatcher hands every checksum report and diagnostic to a
//! [`ReportSink`]. Sinks own all output state (block separation, counters),
//! so nothing about reporting lives in globals.
//! - Text blocks for terminals
//! - Newline-delimited JSON
//! - In-memory collection for tests and library callers

pub mod json;
pub mod text;

use crate::core::error::Result;
use crate::core::types::{ChecksumReport, Diagnostic, Severity};
use serde::Serialize;
use std::io::Write;

pub use json::JsonReporter;
pub use text::TextReporter;

/// Report format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Receives results as the dispatcher produces them.
pub trait ReportSink {
    /// Emit the checksums of one resolved file.
    fn report(&mut self, report: &ChecksumReport) -> Result<()>;

    /// Record a recoverable warning or error.
    fn diagnostic(&mut self, diagnostic: &Diagnostic);

    /// Counters for the run so far.
    fn summary(&self) -> RunSummary;
}

/// Build the sink for `format` writing to `out`.
pub fn create_sink<W: Write + 'static>(format: ReportFormat, out: W) -> Box<dyn ReportSink> {
    match format {
        ReportFormat::Text => Box::new(TextReporter::new(out)),
        ReportFormat::Json => Box::new(JsonReporter::new(out)),
    }
}

/// Counts of what a run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_checksummed: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl RunSummary {
    pub(crate) fn count_report(&mut self) {
        self.files_checksummed += 1;
    }

    pub(crate) fn count_diagnostic(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s) checksummed, {} warning(s), {} error(s)",
            self.files_checksummed, self.warnings, self.errors
        )
    }
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub reports: Vec<ChecksumReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }
}

impl ReportSink for CollectingSink {
    fn report(&mut self, report: &ChecksumReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }

    fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            files_checksummed: self.reports.len(),
            ..RunSummary::default()
        };
        for diagnostic in &self.diagnostics {
            summary.count_diagnostic(diagnostic);
        }
        summary
    }
}
