//! Command-line interface for querypad
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging
//! - Mode selection (interactive REPL vs one-shot execution)

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};
use crate::error::Result;

/// querypad - embedded document-query engine shell
#[derive(Parser, Debug)]
#[command(
    name = "querypad",
    version,
    about = "Document-query practice shell",
    long_about = "An interactive shell over the querypad document-query engine: \
shell-style queries (db.collection.operation(...)) against an in-memory, \
persisted collection store."
)]
pub struct CliArgs {
    /// Execute one query and exit instead of starting the REPL
    #[arg(short = 'e', long = "execute", value_name = "QUERY")]
    pub execute: Option<String>,

    /// Store snapshot file path (overrides the configured path)
    #[arg(short = 's', long, value_name = "FILE")]
    pub storage: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format (json, json-pretty, compact)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse arguments and load the merged configuration.
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and apply argument overrides.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = match &args.config_file {
            Some(path) => Config::from_file(path)?,
            None => Config::load(),
        };

        if let Some(path) = &args.storage {
            config.storage.snapshot_path = path.clone();
        }
        if let Some(format) = &args.format {
            match format.to_lowercase().as_str() {
                "json" => config.display.format = OutputFormat::Json,
                "json-pretty" | "jsonpretty" => {
                    config.display.format = OutputFormat::JsonPretty;
                }
                "compact" => config.display.format = OutputFormat::Compact,
                other => {
                    eprintln!(
                        "Warning: unknown format '{other}', supported: json, json-pretty, compact"
                    );
                }
            }
        }
        if args.no_color {
            config.display.color_output = false;
        }

        Ok(config)
    }

    /// The parsed arguments.
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// The merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Print the startup banner unless in quiet mode.
    pub fn print_banner(&self) {
        if self.args.quiet {
            return;
        }
        println!("querypad v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "store: {}",
            self.config.storage.snapshot_path.display()
        );
        println!("Type a query like db.users.find(), or 'help'. 'exit' to quit.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_format_override() {
        let args = CliArgs::parse_from(["querypad", "--format", "compact", "--no-color"]);
        let config = CliInterface::load_config(&args).unwrap();
        assert_eq!(config.display.format, OutputFormat::Compact);
        assert!(!config.display.color_output);
    }

    #[test]
    fn test_storage_override() {
        let args = CliArgs::parse_from(["querypad", "--storage", "/tmp/s.json"]);
        let config = CliInterface::load_config(&args).unwrap();
        assert_eq!(
            config.storage.snapshot_path,
            std::path::PathBuf::from("/tmp/s.json")
        );
    }
}
