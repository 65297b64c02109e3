//! Exponential Moving Average Crossover Strategy.
//!
//! Goes long when the short EMA is above the long EMA and exits when it
//! drops below. Long-only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use replay_core::error::{BacktestResult, StrategyError};
use replay_core::traits::{DataHandler, PortfolioView, Strategy, StrategyConfig};
use replay_core::types::{Direction, SignalEvent};
use replay_core::EventPublisher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sizing::affordable_quantity;

/// Streaming exponential moving average.
///
/// Seeded with the first observation and updated recursively with
/// `alpha = 2 / (span + 1)`. No value is reported until `span` observations
/// have been seen.
#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    alpha: f64,
    current: Option<f64>,
    count: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self {
            span,
            alpha: 2.0 / (span as f64 + 1.0),
            current: None,
            count: 0,
        }
    }

    /// Feed one value and return the average if enough values have been seen.
    pub fn update(&mut self, value: f64) -> Option<f64> {
        let next = match self.current {
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
            None => value,
        };
        self.current = Some(next);
        self.count += 1;
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.count >= self.span {
            self.current
        } else {
            None
        }
    }
}

/// Configuration for the EMA crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaCrossoverConfig {
    /// Symbols to trade
    pub symbols: Vec<String>,
    /// Span of the fast average
    pub short_span: usize,
    /// Span of the slow average
    pub long_span: usize,
}

impl Default for MaCrossoverConfig {
    fn default() -> Self {
        Self {
            symbols: vec![],
            short_span: 2,
            long_span: 5,
        }
    }
}

impl StrategyConfig for MaCrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.short_span >= self.long_span {
            return Err(StrategyError::InvalidConfig(
                "Short span must be less than long span".into(),
            ));
        }
        if self.short_span == 0 {
            return Err(StrategyError::InvalidConfig(
                "Short span must be greater than 0".into(),
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

#[derive(Debug, Clone)]
struct Averages {
    short: Ema,
    long: Ema,
    last_seen: Option<DateTime<Utc>>,
    holding: bool,
}

/// EMA crossover strategy.
pub struct MaCrossoverStrategy {
    config: MaCrossoverConfig,
    averages: HashMap<String, Averages>,
    events: EventPublisher,
}

impl MaCrossoverStrategy {
    pub fn new(config: MaCrossoverConfig, events: EventPublisher) -> Result<Self, StrategyError> {
        config.validate()?;
        let averages = config
            .symbols
            .iter()
            .map(|s| {
                (
                    s.clone(),
                    Averages {
                        short: Ema::new(config.short_span),
                        long: Ema::new(config.long_span),
                        last_seen: None,
                        holding: false,
                    },
                )
            })
            .collect();

        Ok(Self {
            config,
            averages,
            events,
        })
    }

    /// Latest (short, long) averages for `symbol`, once both are defined.
    pub fn averages(&self, symbol: &str) -> Option<(f64, f64)> {
        let a = self.averages.get(symbol)?;
        Some((a.short.value()?, a.long.value()?))
    }
}

impl Strategy for MaCrossoverStrategy {
    fn name(&self) -> &str {
        "Moving Averages Long"
    }

    fn description(&self) -> &str {
        "Goes long while the short EMA is above the long EMA"
    }

    fn calculate_signals(
        &mut self,
        data: &dyn DataHandler,
        portfolio: &dyn PortfolioView,
    ) -> BacktestResult<()> {
        for symbol in &self.config.symbols {
            let Some(bar) = data.latest_bar(symbol) else {
                continue;
            };
            let Some(state) = self.averages.get_mut(symbol) else {
                continue;
            };
            // A symbol whose data has run out keeps reporting its last bar.
            if state.last_seen == Some(bar.timestamp) {
                continue;
            }
            state.last_seen = Some(bar.timestamp);

            let short = state.short.update(bar.close);
            let long = state.long.update(bar.close);
            let (Some(short), Some(long)) = (short, long) else {
                continue;
            };

            if !state.holding && short > long {
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
                debug!(symbol = %symbol, short, long, close = bar.close, "long");
            } else if state.holding && short < long {
                let quantity = portfolio.position(symbol).unsigned_abs();
                self.events.publish(SignalEvent::new(
                    symbol.clone(),
                    bar.timestamp,
                    Direction::Exit,
                    quantity,
                ))?;
                state.holding = false;
                debug!(symbol = %symbol, short, long, close = bar.close, "exit");
            }
        }
        Ok(())
    }
}
