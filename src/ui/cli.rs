//! Command-line interface definition.

use crate::core::config::Config;
use crate::scanner::allowlist::Allowlist;
use crate::ui::report::ReportFormat;
use crate::utils::logging::LogConfig;
use clap::Parser;
use std::path::PathBuf;

/// romsum: file and ROM checksums, including files inside archives
#[derive(Parser, Debug)]
#[command(name = "romsum")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to checksum
    pub paths: Vec<PathBuf>,

    /// Comma-separated extension allowlist, replacing the default list
    #[arg(short, long, value_name = "LIST")]
    pub extensions: Option<String>,

    /// Descend into subdirectories of directory arguments
    #[arg(short, long)]
    pub recursive: bool,

    /// Maximum nesting depth for archives inside archives
    #[arg(short = 'd', long, value_name = "N")]
    pub max_depth: Option<u32>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Use this configuration file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print the detected capabilities and exit
    #[arg(long)]
    pub capabilities: bool,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text blocks
    Text,
    /// Newline-delimited JSON for machine processing
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether there is nothing to do and usage should be shown.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && !self.show_config && !self.capabilities
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(list) = &self.extensions {
            config.scan.extensions = Allowlist::parse_list(list);
        }
        if self.recursive {
            config.scan.recursive = true;
        }
        if let Some(depth) = self.max_depth {
            config.scan.max_archive_depth = depth;
        }
    }

    /// Logging setup selected by `-v` / `-q`, falling back to the config.
    pub fn log_config(&self, config: &Config) -> LogConfig {
        if self.verbose {
            LogConfig::verbose()
        } else if self.quiet {
            LogConfig::quiet()
        } else {
            LogConfig::from_config(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let args = ["romsum", "-r", "-e", "nes, SFC", "-d", "2", "roms"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.recursive);
        assert_eq!(cli.max_depth, Some(2));
        assert_eq!(cli.paths, vec![PathBuf::from("roms")]);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.is_empty());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::try_parse_from(["romsum", "-e", ".nes,sfc", "-d", "3", "-r", "x"]).unwrap();
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert_eq!(config.scan.extensions, vec!["nes".to_string(), "sfc".to_string()]);
        assert_eq!(config.scan.max_archive_depth, 3);
        assert!(config.scan.recursive);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cli = Cli::try_parse_from(["romsum", "x.zip"]).unwrap();
        let mut config = Config::default();
        let before = config.scan.extensions.clone();
        cli.apply_to(&mut config);

        assert_eq!(config.scan.extensions, before);
        assert_eq!(config.scan.max_archive_depth, 1);
        assert!(!config.scan.recursive);
    }

    #[test]
    fn test_empty_invocation() {
        let cli = Cli::try_parse_from(["romsum"]).unwrap();
        assert!(cli.is_empty());

        let cli = Cli::try_parse_from(["romsum", "--capabilities"]).unwrap();
        assert!(!cli.is_empty());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["romsum", "-v", "-q", "x"]).is_err());
    }

    #[test]
    fn test_json_format() {
        let cli = Cli::try_parse_from(["romsum", "--format", "json", "x"]).unwrap();
        assert_eq!(ReportFormat::from(cli.format), ReportFormat::Json);
    }
}
