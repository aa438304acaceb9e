//! CLI argument definitions for the IHC billing engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ihc-billing",
    version,
    about = "IHC billing engine - Price immunohistochemistry cases per institute",
    long_about = "Evaluate immunohistochemistry case records against the billing \
                  catalogue and price them for one institute.\n\n\
                  Reads the master directory (catalogue, omit list, settings) and a \
                  case CSV file, then writes a summary sheet and a per-case detail \
                  sheet as CSV and/or JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow case identifiers in log output (redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate a case file and write the billing reports.
    Run(RunArgs),

    /// List the institutes known to the catalogue.
    Institutes(MasterArgs),

    /// List the catalogue items with their stain requirements.
    Items(MasterArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the case CSV file (one row per specimen).
    #[arg(value_name = "CASE_FILE")]
    pub case_file: PathBuf,

    /// Institute to price the batch for (must match a catalogue column).
    #[arg(long = "institute", value_name = "NAME")]
    pub institute: String,

    /// Master data directory (default: $IHC_MASTER_DIR, then ./master).
    #[arg(long = "master-dir", value_name = "DIR")]
    pub master_dir: Option<PathBuf>,

    /// Output directory for generated files (default: current directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: OutputFormatArg,

    /// Evaluate and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct MasterArgs {
    /// Master data directory (default: $IHC_MASTER_DIR, then ./master).
    #[arg(long = "master-dir", value_name = "DIR")]
    pub master_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
    Both,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
