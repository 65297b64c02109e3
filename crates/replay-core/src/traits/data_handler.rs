//! Market data source trait.

use crate::error::BacktestResult;
use crate::types::Bar;

/// Source of historical bars replayed one step at a time.
///
/// Each tracked symbol has a cursor into its bar sequence. Only bars at or
/// before the cursor are visible through the query methods.
pub trait DataHandler {
    /// Symbols tracked by this handler, in universe order.
    fn symbols(&self) -> &[String];

    /// The most recent `n` revealed bars for `symbol`, oldest first.
    ///
    /// Returns an empty slice for an unknown symbol or before the first advance.
    fn latest_bars(&self, symbol: &str, n: usize) -> &[Bar];

    /// The most recent revealed bar for `symbol`.
    fn latest_bar(&self, symbol: &str) -> Option<&Bar> {
        self.latest_bars(symbol, 1).last()
    }

    /// Advance every symbol's cursor by one bar and publish a market event.
    ///
    /// Flips [`continue_backtest`](Self::continue_backtest) to false once any
    /// symbol has no more bars.
    fn update_bars(&mut self) -> BacktestResult<()>;

    /// Whether further steps are available.
    fn continue_backtest(&self) -> bool;
}
