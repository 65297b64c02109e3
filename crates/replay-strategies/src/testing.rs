//! Fixtures shared by the strategy tests.

use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use replay_core::traits::{DataHandler, PortfolioView};
use replay_core::types::{Bar, Event, SignalEvent};
use replay_core::EventQueue;
use replay_data::HistoricBars;
use rust_decimal::Decimal;

/// Portfolio view with fixed cash and editable positions.
pub struct StubPortfolio {
    pub cash: Decimal,
    pub positions: HashMap<String, i64>,
}

impl StubPortfolio {
    pub fn with_cash(cash: Decimal) -> Self {
        Self {
            cash,
            positions: HashMap::new(),
        }
    }
}

impl PortfolioView for StubPortfolio {
    fn cash(&self) -> Decimal {
        self.cash
    }

    fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }
}

/// Daily bars for `AAA` starting 2024-01-01.
pub fn handler(queue: &EventQueue, closes: &[f64]) -> HistoricBars {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), c))
        .collect();
    let mut data = HashMap::new();
    data.insert("AAA".to_string(), bars);
    HistoricBars::from_map(data, queue.publisher()).unwrap()
}

/// Advance one step, discarding the market event.
pub fn advance(queue: &EventQueue, data: &mut HistoricBars) {
    data.update_bars().unwrap();
    drain(queue);
}

/// Signals currently queued; market events are skipped.
pub fn drain(queue: &EventQueue) -> Vec<SignalEvent> {
    let mut signals = Vec::new();
    while let Some(event) = queue.try_take() {
        if let Event::Signal(signal) = event {
            signals.push(signal);
        }
    }
    signals
}
