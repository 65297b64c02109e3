//! Backtest driver, portfolio accounting and performance statistics.

mod engine;
mod portfolio;
mod report;
mod statistics;

pub use engine::{Backtest, EventCounts};
pub use portfolio::NaivePortfolio;
pub use report::BacktestReport;
pub use statistics::{drawdowns, sharpe_ratio, EquityCurve, EquityPoint, SummaryStats, PERIODS_PER_YEAR};
