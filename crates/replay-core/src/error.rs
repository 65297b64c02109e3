//! Error types for the backtest engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level backtest error.
#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Event channel closed")]
    ChannelClosed,
}

/// Data handler errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol universe is empty")]
    EmptyUniverse,

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available: {0}")]
    NoDataAvailable(String),

    #[error("Unsupported data source: {0}")]
    UnsupportedSource(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Portfolio accounting errors.
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Symbol universe is empty")]
    EmptyUniverse,

    #[error("Initial capital must be positive, got {0}")]
    NonPositiveCapital(Decimal),

    #[error("Fill for symbol outside the universe: {0}")]
    UnknownSymbol(String),
}

/// Simulated execution errors.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Invalid order quantity {quantity} for {symbol}")]
    InvalidQuantity { symbol: String, quantity: u64 },

    #[error("No price available for {0}")]
    NoPrice(String),

    #[error("Price {price} for {symbol} is not representable")]
    InvalidPrice { symbol: String, price: f64 },
}

/// Strategy errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),
}

/// Result type alias for backtest operations.
pub type BacktestResult<T> = Result<T, BacktestError>;
