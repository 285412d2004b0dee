//! romsum: file and ROM checksums, including files nested inside archives.
//!
//! This is the main entry point for the CLI application.

use clap::CommandFactory;
use romsum::core::config::Config;
use romsum::core::error::Result;
use romsum::scanner::{
    Allowlist, Capabilities, Dispatcher, ExtractorSet, PathWalker, RecursionPolicy,
};
use romsum::ui::cli::Cli;
use romsum::ui::report::create_sink;
use romsum::utils::hash::FileHasher;
use romsum::utils::logging::init_logging;
use std::error::Error as _;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if cli.is_empty() {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let label = if e.is_fatal() { "Fatal error" } else { "Error" };
            eprintln!("{}: {}", label, e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  Caused by: {}", cause);
                source = cause.source();
            }
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Hint: {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let (mut config, load_error) = Config::load_or_default(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    init_logging(cli.log_config(&config))?;
    log::debug!("romsum v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        log::warn!("Failed to load config, using defaults: {}", e);
    }

    if cli.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let capabilities = Capabilities::probe(&config);
    if cli.capabilities {
        println!("{}", serde_json::to_string_pretty(&capabilities)?);
        return Ok(());
    }

    let allowlist = Allowlist::from_config(&config.scan)?;
    let timeout = config.tools.extraction_timeout_secs.map(Duration::from_secs);
    let extractors = ExtractorSet::from_capabilities(&capabilities, timeout);
    let hasher = FileHasher;

    let dispatcher = Dispatcher::new(&allowlist, &extractors, &hasher, capabilities.algorithms())
        .with_policy(RecursionPolicy::new(config.scan.max_archive_depth))
        .with_entry_filter(config.scan.filter_archive_entries);
    let walker = PathWalker::new(config.scan.recursive);

    let mut sink = create_sink(cli.format.into(), std::io::stdout());
    for path in &cli.paths {
        dispatcher.process_input(path, &walker, sink.as_mut())?;
    }

    log::info!("{}", sink.summary());
    Ok(())
}
