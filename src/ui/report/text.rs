//! Plain-text checksum blocks.
//!
//! ```text
//! mario.nes < set.zip
//! File CRC32: 3C1A7B2E
//! File MD5: ...
//! ```

use super::{ReportSink, RunSummary};
use crate::core::error::Result;
use crate::core::types::{ChecksumReport, Diagnostic};
use std::io::Write;

/// Writes one block per resolved file, blank line between blocks.
pub struct TextReporter<W: Write> {
    out: W,
    /// Whether a block has been written yet
    started: bool,
    summary: RunSummary,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            started: false,
            summary: RunSummary::default(),
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReporter<W> {
    fn report(&mut self, report: &ChecksumReport) -> Result<()> {
        if self.started {
            writeln!(self.out)?;
        }
        self.started = true;

        writeln!(self.out, "{}", report.heading())?;
        for checksum in &report.checksums {
            writeln!(
                self.out,
                "{}: {}",
                checksum.label(),
                checksum.value.to_uppercase()
            )?;
        }
        self.out.flush()?;

        self.summary.count_report();
        Ok(())
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.summary.count_diagnostic(diagnostic);
    }

    fn summary(&self) -> RunSummary {
        self.summary
    }
}
