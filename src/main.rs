//! Event-driven backtester CLI.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use replay_monitor::setup_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    let _log_guard = setup_logging(log_level, cli.json_logs, cli.log_file.as_deref());

    match cli.command {
        Commands::Backtest(args) => cli::commands::backtest::run(args, cli.config.as_deref()),
        Commands::Strategies => cli::commands::strategies::run(),
        Commands::ValidateConfig => cli::commands::validate::run(cli.config.as_deref()),
    }
}
