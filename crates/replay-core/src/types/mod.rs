//! Core data types for the backtest engine.

mod bar;
mod commission;
mod event;
mod holdings;

pub use bar::Bar;
pub use commission::CommissionSchedule;
pub use event::{Direction, Event, FillEvent, OrderEvent, OrderKind, Side, SignalEvent};
pub use holdings::HoldingsSnapshot;
