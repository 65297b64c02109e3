//! Order execution for backtests.

mod simulated;

pub use simulated::{SimulatedExecution, DEFAULT_VENUE};
