//! Order execution trait.

use crate::error::BacktestResult;
use crate::traits::DataHandler;
use crate::types::Event;

/// Turns order events into fill events.
pub trait ExecutionHandler {
    /// Execute the order carried by `event` and publish its fill.
    ///
    /// Events that are not orders are ignored.
    fn execute_order(&mut self, event: &Event, data: &dyn DataHandler) -> BacktestResult<()>;
}
