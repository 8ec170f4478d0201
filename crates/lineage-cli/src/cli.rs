//! CLI argument definitions for the lineage tracer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use lineage_cli::commands::{FitRequest, TreeRequest};
use lineage_match::PrefixMode;

#[derive(Parser)]
#[command(
    name = "column-lineage",
    version,
    about = "Trace which output columns of a preprocessing pipeline derive from which input columns",
    long_about = "Trace column lineage through fitted preprocessing pipelines.\n\n\
                  Either fit the standard numeric / categorical / text template to a CSV\n\
                  table, or load a serialized transformation tree from JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit the standard template to a CSV table and print its lineage.
    Fit(FitArgs),

    /// Print the lineage of a transformation tree stored as JSON.
    Tree(TreeArgs),
}

#[derive(Parser)]
pub struct FitArgs {
    /// CSV table with a header row.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// TOML file with pipeline parameters.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Treat this column as free text (repeatable).
    #[arg(long = "text-col", value_name = "NAME")]
    pub text_columns: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct TreeArgs {
    /// JSON file holding the tree.
    #[arg(value_name = "JSON")]
    pub tree: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct OutputArgs {
    /// How leaf input names are matched against output names.
    #[arg(long = "prefix-mode", value_enum)]
    pub prefix_mode: Option<PrefixModeArg>,

    /// Print one output -> input row per output, read from the inverted map.
    /// Fails if any output has more than one input.
    #[arg(long = "invert")]
    pub invert: bool,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

impl FitArgs {
    pub fn request(&self) -> FitRequest {
        FitRequest {
            csv: self.csv.clone(),
            config: self.config.clone(),
            text_columns: self.text_columns.clone(),
            prefix_mode: self.output.prefix_mode.map(PrefixMode::from),
            invert: self.output.invert,
        }
    }
}

impl TreeArgs {
    pub fn request(&self) -> TreeRequest {
        TreeRequest {
            tree: self.tree.clone(),
            prefix_mode: self.output.prefix_mode.map(PrefixMode::from),
            invert: self.output.invert,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PrefixModeArg {
    Regex,
    Literal,
}

impl From<PrefixModeArg> for PrefixMode {
    fn from(value: PrefixModeArg) -> Self {
        match value {
            PrefixModeArg::Regex => Self::Regex,
            PrefixModeArg::Literal => Self::Literal,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
    Csv,
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
