//! Core types and traits for the backtest engine.
//!
//! This crate provides the foundational building blocks including:
//! - Bar data and the closed `Event` union (market, signal, order, fill)
//! - The per-run event channel
//! - The commission schedule used by simulated fills
//! - Component traits for data handlers, strategies, portfolios, and execution

pub mod channel;
pub mod error;
pub mod traits;
pub mod types;

pub use channel::{EventPublisher, EventQueue};
pub use error::{BacktestError, BacktestResult};
pub use traits::*;
pub use types::*;
