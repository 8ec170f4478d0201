//! Column lineage CLI.

use clap::{ColorChoice, Parser};
use lineage_cli::commands::{LineageOutcome, run_fit, run_tree};
use lineage_cli::logging::{LogConfig, LogFormat, init_logging};
use lineage_cli::summary::{render_csv, render_json, render_table};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputFormatArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let (result, format) = match &cli.command {
        Command::Fit(args) => (run_fit(&args.request()), args.output.format),
        Command::Tree(args) => (run_tree(&args.request()), args.output.format),
    };
    let exit_code = match result.and_then(|outcome| render(&outcome, format)) {
        Ok(rendered) => {
            println!("{rendered}");
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn render(outcome: &LineageOutcome, format: OutputFormatArg) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormatArg::Table => render_table(outcome),
        OutputFormatArg::Json => render_json(outcome)?,
        OutputFormatArg::Csv => render_csv(outcome)?,
    })
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
