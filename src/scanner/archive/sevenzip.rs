//! 7-Zip backend, driving an external `7z` binary.

use super::{Expansion, ExpansionStatus, Extractor};
use crate::core::error::{Error, Result};
use crate::core::types::ArchiveKind;
use crate::scanner::allowlist::WildcardSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running extractor is polled when a timeout is set.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 7-Zip exit code for "warning (non-fatal errors)".
const EXIT_WARNING: i32 = 1;

/// Runs `7z x` into the scratch area.
#[derive(Debug, Clone)]
pub struct SevenZipExtractor {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl SevenZipExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Kill the extractor if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command-line arguments for one extraction.
    pub fn build_args(
        archive: &Path,
        scratch: &Path,
        wildcards: Option<&WildcardSet>,
    ) -> Vec<OsString> {
        let mut output_switch = OsString::from("-o");
        output_switch.push(scratch.as_os_str());

        let mut args: Vec<OsString> = vec![
            "x".into(),
            "-y".into(),
            "-bd".into(),
            // Wildcards are matched case-insensitively, like the allowlist
            "-ssc-".into(),
            output_switch,
            archive.as_os_str().to_owned(),
        ];

        if let Some(wildcards) = wildcards {
            args.push("-r".into());
            args.extend(wildcards.patterns().iter().map(OsString::from));
        }

        args
    }

    fn run(
        &self,
        archive: &Path,
        scratch: &Path,
        wildcards: Option<&WildcardSet>,
    ) -> Result<ExitStatus> {
        let args = Self::build_args(archive, scratch, wildcards);
        log::debug!("Running {:?} {:?}", self.binary, args);

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::tool_failed(self.tool_name(), e.to_string()))?;

        wait_with_timeout(&mut child, self.timeout, &self.tool_name())
    }

    fn tool_name(&self) -> String {
        self.binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "7z".to_string())
    }
}

impl Extractor for SevenZipExtractor {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::SevenZip
    }

    fn expand(
        &self,
        archive: &Path,
        scratch: &Path,
        wildcards: Option<&WildcardSet>,
    ) -> Expansion {
        let status = match self.run(archive, scratch, wildcards) {
            Ok(status) => status,
            Err(e) => return Expansion::failed(e.to_string()),
        };

        match status.code() {
            Some(0) => Expansion::from_scratch(scratch, ExpansionStatus::Complete),
            Some(EXIT_WARNING) => Expansion::from_scratch(scratch, ExpansionStatus::Partial),
            Some(code) => {
                Expansion::failed(format!("{} exited with code {}", self.tool_name(), code))
            }
            None => Expansion::failed(format!("{} was terminated by a signal", self.tool_name())),
        }
    }
}

/// Wait for `child`, killing it once `timeout` has elapsed.
pub fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
    tool: &str,
) -> Result<ExitStatus> {
    let Some(timeout) = timeout else {
        return child
            .wait()
            .map_err(|e| Error::tool_failed(tool, e.to_string()));
    };

    let started = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| Error::tool_failed(tool, e.to_string()))?
        {
            return Ok(status);
        }

        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::ToolTimeout {
                tool: tool.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}
