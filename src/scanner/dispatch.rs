//! File classifier and dispatcher.
//!
//! [`Dispatcher::process`] is the only place that decides whether something
//! that went wrong is fatal, a warning, or a recoverable error. Fatal errors
//! are returned as `Err` and abort the run; everything else becomes a
//! [`Diagnostic`] handed to the report sink.

use crate::core::error::{Error, Result};
use crate::core::types::{
    ArchiveKind, Checksum, ChecksumAlgorithm, ChecksumReport, ChecksumScope, Diagnostic,
    DiagnosticKind, Severity,
};
use crate::scanner::allowlist::Allowlist;
use crate::scanner::archive::{error_chain, ExpansionStatus, ExtractorSet, ScratchArea};
use crate::scanner::filetype::{FileClassification, MagicSniffer};
use crate::scanner::recursion::{RecursionContext, RecursionPolicy};
use crate::scanner::walker::PathWalker;
use crate::ui::report::ReportSink;
use crate::utils::hash::Hasher;
use std::path::Path;

/// Routes each path to archive expansion or checksumming.
pub struct Dispatcher<'a> {
    allowlist: &'a Allowlist,
    extractors: &'a ExtractorSet,
    hasher: &'a dyn Hasher,
    algorithms: Vec<ChecksumAlgorithm>,
    policy: RecursionPolicy,
    filter_archive_entries: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        allowlist: &'a Allowlist,
        extractors: &'a ExtractorSet,
        hasher: &'a dyn Hasher,
        algorithms: Vec<ChecksumAlgorithm>,
    ) -> Self {
        Self {
            allowlist,
            extractors,
            hasher,
            algorithms,
            policy: RecursionPolicy::default(),
            filter_archive_entries: true,
        }
    }

    pub fn with_policy(mut self, policy: RecursionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Extract only allowlisted archive entries (the default), or everything.
    pub fn with_entry_filter(mut self, enabled: bool) -> Self {
        self.filter_archive_entries = enabled;
        self
    }

    /// Process one command-line argument, file or directory.
    ///
    /// A path that does not exist is reported and skipped.
    pub fn process_input(
        &self,
        path: &Path,
        walker: &PathWalker,
        sink: &mut dyn ReportSink,
    ) -> Result<()> {
        let files = match walker.walk(path, self.allowlist) {
            Ok(files) => files,
            Err(Error::PathNotFound(_)) => {
                let subject = path.display().to_string();
                emit(sink, Diagnostic::error(DiagnosticKind::PathNotFound, subject));
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let root = RecursionContext::root();
        for file in &files {
            self.process(file, &root, sink)?;
        }
        Ok(())
    }

    /// Classify `path` and process it.
    ///
    /// Returns `Err` only for fatal conditions: an unreadable file or a
    /// scratch directory that cannot be created or removed.
    pub fn process(
        &self,
        path: &Path,
        ctx: &RecursionContext,
        sink: &mut dyn ReportSink,
    ) -> Result<()> {
        let magic = MagicSniffer::read_magic(path)?;

        match FileClassification::classify(path, &magic, self.allowlist) {
            FileClassification::Archive(kind) => {
                self.process_archive(path, kind, &magic, ctx, sink)
            }
            FileClassification::RomHeader { system, offset } => {
                log::debug!("{:?}: {} ROM, header {} bytes", path, system, offset);
                self.checksum(path, Some(offset), ctx, sink)
            }
            FileClassification::PlainRecognized => {
                if MagicSniffer::is_text_likely_extension(path)
                    && MagicSniffer::looks_like_text(path)?
                {
                    log::debug!("{:?}: text content, skipping", path);
                    return Ok(());
                }
                self.checksum(path, None, ctx, sink)
            }
            FileClassification::Unrecognized => {
                let diagnostic =
                    Diagnostic::error(DiagnosticKind::UnknownExtension, ctx.describe(path));
                emit(sink, diagnostic);
                Ok(())
            }
        }
    }

    fn process_archive(
        &self,
        path: &Path,
        kind: ArchiveKind,
        magic: &[u8],
        ctx: &RecursionContext,
        sink: &mut dyn ReportSink,
    ) -> Result<()> {
        if kind == ArchiveKind::Gzip && is_tar_gz(path) {
            emit(sink, Diagnostic::warning(DiagnosticKind::TarGzUnsupported, ctx.describe(path)));
            return Ok(());
        }

        if !self.policy.allows(ctx.depth()) {
            emit(sink, Diagnostic::warning(DiagnosticKind::TooManyRecursions, ctx.describe(path)));
            return Ok(());
        }

        let Some(extractor) = self.extractors.get(kind) else {
            log::debug!("{:?}: no {} extractor available, skipping", path, kind);
            return Ok(());
        };

        if !MagicSniffer::matches_archive(kind, magic) {
            let diagnostic =
                Diagnostic::warning(DiagnosticKind::MagicMismatch(kind), ctx.describe(path));
            emit(sink, diagnostic);
            return Ok(());
        }

        let scratch = ScratchArea::create()?;
        let wildcards = self
            .filter_archive_entries
            .then(|| self.allowlist.wildcards());

        log::debug!("Expanding {:?} into {:?}", path, scratch.path());
        let expansion = extractor.expand(path, scratch.path(), wildcards);

        match expansion.status {
            ExpansionStatus::Failed(reason) => {
                let kind = DiagnosticKind::ExtractionFailed(reason);
                emit(sink, Diagnostic::error(kind, ctx.describe(path)));
            }
            status => {
                if status == ExpansionStatus::Partial {
                    log::info!("{}: some entries could not be extracted", ctx.describe(path));
                }

                let nested = ctx.nested(ctx.display_name(path));
                for file in &expansion.files {
                    self.process(file, &nested, sink)?;
                }
            }
        }

        scratch.close()
    }

    fn checksum(
        &self,
        path: &Path,
        rom_offset: Option<u64>,
        ctx: &RecursionContext,
        sink: &mut dyn ReportSink,
    ) -> Result<()> {
        let checksums = match self.compute(path, rom_offset) {
            Ok(checksums) => checksums,
            Err(e) => {
                let kind = DiagnosticKind::ChecksumFailed(error_chain(&e));
                emit(sink, Diagnostic::error(kind, ctx.describe(path)));
                return Ok(());
            }
        };

        let report = ChecksumReport {
            path: path.to_path_buf(),
            display_name: ctx.display_name(path),
            chain: ctx.chain().to_vec(),
            checksums,
        };
        sink.report(&report)
    }

    fn compute(&self, path: &Path, rom_offset: Option<u64>) -> Result<Vec<Checksum>> {
        let mut checksums = self.scoped(path, 0, ChecksumScope::File)?;
        if let Some(offset) = rom_offset {
            checksums.extend(self.scoped(path, offset, ChecksumScope::Rom)?);
        }
        Ok(checksums)
    }

    fn scoped(&self, path: &Path, offset: u64, scope: ChecksumScope) -> Result<Vec<Checksum>> {
        Ok(self
            .hasher
            .digest_all(path, offset, &self.algorithms)?
            .into_iter()
            .map(|(algorithm, value)| Checksum {
                scope,
                algorithm,
                value,
            })
            .collect())
    }
}

/// Log a diagnostic and hand it to the sink.
fn emit(sink: &mut dyn ReportSink, diagnostic: Diagnostic) {
    match diagnostic.severity {
        Severity::Warning => log::warn!("{}", diagnostic.message()),
        Severity::Error => log::error!("{}", diagnostic.message()),
    }
    sink.diagnostic(&diagnostic);
}

fn is_tar_gz(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(".tar.gz"))
        .unwrap_or(false)
}
