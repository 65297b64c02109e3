//! Backtest command implementation.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use replay_backtest::{Backtest, BacktestReport, NaivePortfolio};
use replay_broker::SimulatedExecution;
use replay_config::{load_config, AppConfig};
use replay_core::EventQueue;
use replay_data::DataLoader;
use replay_strategies::StrategyRegistry;
use rust_decimal::Decimal;
use tracing::info;

use crate::cli::{BacktestArgs, OutputFormat};

/// Rows shown at each end of the equity table before it is elided.
const EQUITY_PREVIEW_ROWS: usize = 5;

pub fn run(args: BacktestArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut config, &args)?;
    config.validate().context("Invalid backtest configuration")?;

    let symbols = config.backtest.symbols.clone();
    info!(
        strategy = %config.strategy.name,
        symbols = ?symbols,
        capital = %config.backtest.initial_capital,
        "preparing backtest"
    );

    let queue = EventQueue::new();

    let source = config.data.source_kind()?;
    let data = DataLoader::new(symbols.clone(), source, &config.data.path)
        .and_then(|loader| loader.into_handler(queue.publisher()))
        .with_context(|| format!("Failed to load data from '{}'", config.data.path.display()))?;

    let portfolio = NaivePortfolio::new(
        symbols.clone(),
        config.backtest.initial_capital,
        queue.publisher(),
    )?;

    let registry = StrategyRegistry::new();
    let strategy = registry
        .create(
            &config.strategy.name,
            config.strategy.params.clone(),
            symbols,
            queue.publisher(),
        )
        .context("Failed to create strategy")?;

    let execution = SimulatedExecution::new(queue.publisher())
        .with_commission(config.commission.clone())
        .with_venue(config.backtest.venue.clone());

    let report = Backtest::new(queue, data, portfolio, strategy, execution)
        .run()
        .context("Backtest aborted")?;

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => {
            println!("{}", report.summary());
            print_equity_table(&report);
        }
    }

    if let Some(path) = &args.save_equity {
        std::fs::write(path, report.equity_to_csv()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Equity curve saved to {:?}", path);
    }

    if let Some(path) = &args.save {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Results saved to {:?}", path);
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &BacktestArgs) -> Result<()> {
    if let Some(strategy) = &args.strategy {
        config.strategy.name = strategy.clone();
    }
    if !args.symbols.is_empty() {
        config.backtest.symbols = args.symbols.clone();
    }
    if let Some(path) = &args.data {
        config.data.path = path.clone();
    }
    if let Some(source) = &args.source {
        config.data.source = source.clone();
    }
    if let Some(capital) = &args.capital {
        config.backtest.initial_capital = Decimal::from_str(capital)
            .with_context(|| format!("Invalid capital '{}'", capital))?;
    }
    if let Some(params) = &args.params {
        config.strategy.params =
            serde_json::from_str(params).context("Strategy parameters must be a JSON object")?;
    }
    Ok(())
}

fn print_equity_table(report: &BacktestReport) {
    let points = report.equity_curve.points();
    if points.is_empty() {
        println!("No equity history recorded.");
        return;
    }

    println!(
        "{:<12} {:>16} {:>16} {:>12} {:>12} {:>10}",
        "date", "cash", "total", "commission", "returns", "equity"
    );

    let elide = points.len() > 2 * EQUITY_PREVIEW_ROWS;
    for (i, point) in points.iter().enumerate() {
        if elide && i >= EQUITY_PREVIEW_ROWS && i < points.len() - EQUITY_PREVIEW_ROWS {
            if i == EQUITY_PREVIEW_ROWS {
                println!("{:<12} ({} rows)", "...", points.len() - 2 * EQUITY_PREVIEW_ROWS);
            }
            continue;
        }
        println!(
            "{:<12} {:>16.2} {:>16.2} {:>12.2} {:>12.6} {:>10.6}",
            point.timestamp.format("%Y-%m-%d").to_string(),
            point.cash,
            point.total,
            point.commission,
            point.returns,
            point.equity
        );
    }
}
