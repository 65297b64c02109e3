//! Trailing Stop Loss Strategy.
//!
//! Goes long with all available cash, trails a stop at a fixed fraction of
//! the close while the price rises, and exits when the close falls to the
//! stop. After an exit it re-enters only once the close is back above the
//! level the last stop was trailing.

use std::collections::HashMap;

use replay_core::error::{BacktestResult, StrategyError};
use replay_core::traits::{DataHandler, PortfolioView, Strategy, StrategyConfig};
use replay_core::types::{Direction, SignalEvent};
use replay_core::EventPublisher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sizing::affordable_quantity;

/// Configuration for the stop loss strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StopLossConfig {
    /// Symbols to trade
    pub symbols: Vec<String>,
    /// Stop level as a fraction of the close, e.g. 0.95 for a 5% stop
    pub stop_fraction: f64,
}

impl Default for StopLossConfig {
    fn default() -> Self {
        Self {
            symbols: vec![],
            stop_fraction: 0.95,
        }
    }
}

impl StrategyConfig for StopLossConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if !(self.stop_fraction > 0.0 && self.stop_fraction < 1.0) {
            return Err(StrategyError::InvalidConfig(
                "Stop fraction must be between 0 and 1".into(),
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

#[derive(Debug, Clone, Copy)]
struct StopState {
    holding: bool,
    stop: f64,
}

/// Trailing stop loss strategy.
pub struct StopLossStrategy {
    config: StopLossConfig,
    state: HashMap<String, StopState>,
    events: EventPublisher,
}

impl StopLossStrategy {
    pub fn new(config: StopLossConfig, events: EventPublisher) -> Result<Self, StrategyError> {
        config.validate()?;
        // The initial stop makes the entry threshold a close above 1.0.
        let state = config
            .symbols
            .iter()
            .map(|s| {
                (
                    s.clone(),
                    StopState {
                        holding: false,
                        stop: config.stop_fraction,
                    },
                )
            })
            .collect();

        Ok(Self {
            config,
            state,
            events,
        })
    }

    /// Current stop level for `symbol`.
    pub fn stop_level(&self, symbol: &str) -> Option<f64> {
        self.state.get(symbol).map(|s| s.stop)
    }
}

impl Strategy for StopLossStrategy {
    fn name(&self) -> &str {
        "Stop Loss"
    }

    fn description(&self) -> &str {
        "Holds a long position behind a trailing stop"
    }

    fn calculate_signals(
        &mut self,
        data: &dyn DataHandler,
        portfolio: &dyn PortfolioView,
    ) -> BacktestResult<()> {
        let fraction = self.config.stop_fraction;

        for symbol in &self.config.symbols {
            let recent = data.latest_bars(symbol, 2);
            let Some(bar) = recent.last() else {
                continue;
            };
            let Some(state) = self.state.get_mut(symbol) else {
                continue;
            };
            let close = bar.close;

            if !state.holding {
                if close <= state.stop / fraction {
                    continue;
                }
                let Some(price) = bar.close_price() else {
                    continue;
                };
                let quantity = affordable_quantity(portfolio.cash(), price);
                if quantity == 0 {
                    continue;
                }
                self.events.publish(SignalEvent::new(
                    symbol.clone(),
                    bar.timestamp,
                    Direction::Long,
                    quantity,
                ))?;
                state.holding = true;
                state.stop = fraction * close;
                debug!(symbol = %symbol, close, stop = state.stop, "long");
            } else if close <= state.stop {
                let quantity = portfolio.position(symbol).unsigned_abs();
                self.events.publish(SignalEvent::new(
                    symbol.clone(),
                    bar.timestamp,
                    Direction::Exit,
                    quantity,
                ))?;
                state.holding = false;
                debug!(symbol = %symbol, close, stop = state.stop, "stopped out");
            } else if let [previous, _] = recent {
                let trailed = fraction * close;
                if close > previous.close && trailed > state.stop {
                    state.stop = trailed;
                }
            }
        }
        Ok(())
    }
}
