//! Component traits for the backtest engine.

mod data_handler;
mod execution;
mod portfolio;
mod strategy;

pub use data_handler::DataHandler;
pub use execution::ExecutionHandler;
pub use portfolio::{PortfolioHandler, PortfolioView};
pub use strategy::{Strategy, StrategyConfig};
