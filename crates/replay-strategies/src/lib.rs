//! Reference strategy implementations.
//!
//! This crate provides:
//! - Buy and Hold / Sell and Hold
//! - Trailing Stop Loss
//! - Exponential Moving Average Crossover
//! - Divide and Conquer

mod divide_conquer;
mod hold;
mod ma_crossover;
mod registry;
mod sizing;
mod stop_loss;

#[cfg(test)]
mod testing;

pub use divide_conquer::{mean_pct_change, DivideConquerConfig, DivideConquerStrategy};
pub use hold::{HoldConfig, HoldStrategy};
pub use ma_crossover::{Ema, MaCrossoverConfig, MaCrossoverStrategy};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use sizing::affordable_quantity;
pub use stop_loss::{StopLossConfig, StopLossStrategy};
