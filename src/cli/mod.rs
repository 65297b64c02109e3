//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "replay")]
#[command(author, version, about = "Event-driven historical bar replay backtester")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "REPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a backtest over historical bars
    Backtest(BacktestArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Flags left unset fall back to the configuration file.
#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Strategy to backtest
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Symbols to trade (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Data file (single symbol) or directory of per-symbol CSV files
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Data source kind
    #[arg(long)]
    pub source: Option<String>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<String>,

    /// Strategy parameters as a JSON object
    #[arg(long)]
    pub params: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the equity curve as CSV
    #[arg(long)]
    pub save_equity: Option<PathBuf>,

    /// Save the full report as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,
}
