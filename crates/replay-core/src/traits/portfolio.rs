//! Portfolio traits.

use rust_decimal::Decimal;

use crate::error::BacktestResult;
use crate::traits::DataHandler;
use crate::types::{FillEvent, HoldingsSnapshot, SignalEvent};

/// Read-only portfolio queries available to strategies.
pub trait PortfolioView {
    /// Current cash balance.
    fn cash(&self) -> Decimal;

    /// Current signed share count for `symbol` (0 if untracked).
    fn position(&self, symbol: &str) -> i64;
}

/// Accounting state machine driven by market, signal, and fill events.
pub trait PortfolioHandler: PortfolioView {
    /// Append one holdings row for the current time step.
    fn update_time_index(&mut self, data: &dyn DataHandler) -> BacktestResult<()>;

    /// Translate a signal into an order and publish it.
    fn update_signal(&mut self, signal: &SignalEvent) -> BacktestResult<()>;

    /// Apply a fill to positions and cash.
    fn update_fill(&mut self, fill: &FillEvent) -> BacktestResult<()>;

    /// The append-only holdings history, one row per step.
    fn holdings(&self) -> &[HoldingsSnapshot];
}
