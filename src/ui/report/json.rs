//! Newline-delimited JSON output, one object per resolved file.

use super::{ReportSink, RunSummary};
use crate::core::error::Result;
use crate::core::types::{ChecksumReport, Diagnostic};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct JsonRecord<'a> {
    name: &'a str,
    /// Only for top-level files; extracted files live in a scratch dir that
    /// is gone by the time the record is read.
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a Path>,
    chain: &'a [String],
    checksums: BTreeMap<String, String>,
}

impl<'a> From<&'a ChecksumReport> for JsonRecord<'a> {
    fn from(report: &'a ChecksumReport) -> Self {
        Self {
            name: &report.display_name,
            path: report.chain.is_empty().then_some(report.path.as_path()),
            chain: &report.chain,
            checksums: report
                .checksums
                .iter()
                .map(|c| (c.label(), c.value.to_uppercase()))
                .collect(),
        }
    }
}

pub struct JsonReporter<W: Write> {
    out: W,
    summary: RunSummary,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            summary: RunSummary::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonReporter<W> {
    fn report(&mut self, report: &ChecksumReport) -> Result<()> {
        let line = serde_json::to_string(&JsonRecord::from(report))?;
        writeln!(self.out, "{}", line)?;
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
