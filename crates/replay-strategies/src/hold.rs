//! Buy and Hold / Sell and Hold.
//!
//! Commits all available cash to one position per symbol on the first bar
//! that can afford at least one share, then never trades again.

use std::collections::HashSet;

use replay_core::error::{BacktestResult, StrategyError};
use replay_core::traits::{DataHandler, PortfolioView, Strategy, StrategyConfig};
use replay_core::types::{Direction, SignalEvent};
use replay_core::EventPublisher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sizing::affordable_quantity;

/// Configuration for the hold strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldConfig {
    /// Symbols to trade
    pub symbols: Vec<String>,
    /// `long` buys and holds, `short` sells and holds
    pub direction: Direction,
}

impl HoldConfig {
    pub fn buy(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            direction: Direction::Long,
        }
    }

    pub fn sell(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            direction: Direction::Short,
        }
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self::buy(vec![])
    }
}

impl StrategyConfig for HoldConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.direction == Direction::Exit {
            return Err(StrategyError::InvalidConfig(
                "Hold direction must be long or short".into(),
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

/// Enters once per symbol and holds to the end of the data.
pub struct HoldStrategy {
    config: HoldConfig,
    entered: HashSet<String>,
    events: EventPublisher,
}

impl HoldStrategy {
    pub fn new(config: HoldConfig, events: EventPublisher) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            config,
            entered: HashSet::new(),
            events,
        })
    }

    pub fn config(&self) -> &HoldConfig {
        &self.config
    }
}

impl Strategy for HoldStrategy {
    fn name(&self) -> &str {
        match self.config.direction {
            Direction::Short => "Sell and Hold",
            _ => "Buy and Hold",
        }
    }

    fn description(&self) -> &str {
        match self.config.direction {
            Direction::Short => "Shorts as many shares as cash covers on the first bar and holds",
            _ => "Buys as many shares as cash allows on the first bar and holds",
        }
    }

    fn calculate_signals(
        &mut self,
        data: &dyn DataHandler,
        portfolio: &dyn PortfolioView,
    ) -> BacktestResult<()> {
        for symbol in &self.config.symbols {
            if self.entered.contains(symbol) {
                continue;
            }
            let Some(bar) = data.latest_bar(symbol) else {
                continue;
            };
            let Some(close) = bar.close_price() else {
                continue;
            };

            let quantity = affordable_quantity(portfolio.cash(), close);
            if quantity == 0 {
                continue;
            }

            debug!(symbol = %symbol, quantity, direction = %self.config.direction, "entering");
            self.events.publish(SignalEvent::new(
                symbol.clone(),
                bar.timestamp,
                self.config.direction,
                quantity,
            ))?;
            self.entered.insert(symbol.clone());
        }
        Ok(())
    }
}
