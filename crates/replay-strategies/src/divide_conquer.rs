//! Divide and Conquer Strategy.
//!
//! Scales in while the recent trend is down and scales out while it is not.
//! Each falling bar buys with a fraction of the cash, each other bar sells the
//! same fraction of the long position.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use replay_core::error::{BacktestResult, StrategyError};
use replay_core::traits::{DataHandler, PortfolioView, Strategy, StrategyConfig};
use replay_core::types::{Bar, Direction, SignalEvent};
use replay_core::EventPublisher;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sizing::affordable_quantity;

/// Configuration for the divide and conquer strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DivideConquerConfig {
    /// Symbols to trade
    pub symbols: Vec<String>,
    /// Number of closes the trend is measured over
    pub lookback: usize,
    /// Each trade commits `1 / divisor` of the cash or the position
    pub divisor: u64,
}

impl Default for DivideConquerConfig {
    fn default() -> Self {
        Self {
            symbols: vec![],
            lookback: 7,
            divisor: 2,
        }
    }
}

impl StrategyConfig for DivideConquerConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback < 2 {
            return Err(StrategyError::InvalidConfig(
                "Lookback must cover at least 2 closes".into(),
            ));
        }
        if self.divisor == 0 {
            return Err(StrategyError::InvalidConfig(
                "Divisor must be greater than 0".into(),
            ));
        }
        if self.symbols.is_empty() {
            return Err(StrategyError::InvalidConfig(
                "At least one symbol required".into(),
            ));
        }
        Ok(())
    }
}

/// Mean bar-over-bar percentage change. `None` with fewer than 2 bars.
pub fn mean_pct_change(bars: &[Bar]) -> Option<f64> {
    if bars.len() < 2 {
        return None;
    }
    let changes: Vec<f64> = bars
        .windows(2)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect();
    Some(changes.iter().sum::<f64>() / changes.len() as f64)
}

/// Divide and conquer strategy.
pub struct DivideConquerStrategy {
    config: DivideConquerConfig,
    last_seen: HashMap<String, DateTime<Utc>>,
    events: EventPublisher,
}

impl DivideConquerStrategy {
    pub fn new(config: DivideConquerConfig, events: EventPublisher) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            config,
            last_seen: HashMap::new(),
            events,
        })
    }

    pub fn config(&self) -> &DivideConquerConfig {
        &self.config
    }
}

impl Strategy for DivideConquerStrategy {
    fn name(&self) -> &str {
        "Divide And Conquer"
    }

    fn description(&self) -> &str {
        "Buys a fraction of cash on a falling trend and sells a fraction of the position otherwise"
    }

    fn calculate_signals(
        &mut self,
        data: &dyn DataHandler,
        portfolio: &dyn PortfolioView,
    ) -> BacktestResult<()> {
        for symbol in &self.config.symbols {
            let bars = data.latest_bars(symbol, self.config.lookback);
            let Some(bar) = bars.last() else {
                continue;
            };
            // A symbol whose data has run out keeps reporting its last bar.
            if self.last_seen.get(symbol) == Some(&bar.timestamp) {
                continue;
            }
            self.last_seen.insert(symbol.clone(), bar.timestamp);

            let falling = mean_pct_change(bars).is_some_and(|m| m < 0.0);
            let (direction, quantity) = if falling {
                let Some(close) = bar.close_price() else {
                    continue;
                };
                let quantity =
                    affordable_quantity(portfolio.cash(), close * Decimal::from(self.config.divisor));
                (Direction::Long, quantity)
            } else {
                let position = portfolio.position(symbol).max(0).unsigned_abs();
                (Direction::Short, position / self.config.divisor)
            };
            if quantity == 0 {
                continue;
            }

            debug!(symbol = %symbol, quantity, direction = %direction, close = bar.close, "rebalancing");
            self.events.publish(SignalEvent::new(
                symbol.clone(),
                bar.timestamp,
                direction,
                quantity,
            ))?;
        }
        Ok(())
    }
}
