//! In-memory historical bar replay.

use std::collections::HashMap;

use replay_core::error::{BacktestResult, DataError};
use replay_core::traits::DataHandler;
use replay_core::types::{Bar, Event};
use replay_core::EventPublisher;
use tracing::{debug, warn};

/// Bars for one symbol plus the replay cursor into them.
#[derive(Debug)]
struct Feed {
    symbol: String,
    bars: Vec<Bar>,
    /// Number of bars revealed so far
    cursor: usize,
}

impl Feed {
    fn revealed(&self) -> &[Bar] {
        &self.bars[..self.cursor]
    }
}

/// Replays pre-loaded bars one step at a time.
///
/// Every call to [`update_bars`](DataHandler::update_bars) reveals the next bar
/// of every symbol. As soon as any symbol runs out, the whole backtest is told
/// to stop; the remaining symbols are not replayed on their own.
#[derive(Debug)]
pub struct HistoricBars {
    symbols: Vec<String>,
    feeds: Vec<Feed>,
    index: HashMap<String, usize>,
    continue_backtest: bool,
    events: EventPublisher,
}

impl HistoricBars {
    /// Create a handler for `symbols`, taking bars from `data`.
    ///
    /// Bars are sorted by timestamp. A symbol with no entry in `data` is
    /// tracked with an empty series.
    pub fn new(
        symbols: Vec<String>,
        mut data: HashMap<String, Vec<Bar>>,
        events: EventPublisher,
    ) -> Result<Self, DataError> {
        if symbols.is_empty() {
            return Err(DataError::EmptyUniverse);
        }

        let mut feeds = Vec::with_capacity(symbols.len());
        let mut index = HashMap::with_capacity(symbols.len());
        for symbol in &symbols {
            let mut bars = data.remove(symbol).unwrap_or_default();
            bars.sort_by_key(|b| b.timestamp);
            index.insert(symbol.clone(), feeds.len());
            feeds.push(Feed {
                symbol: symbol.clone(),
                bars,
                cursor: 0,
            });
        }

        Ok(Self {
            symbols,
            feeds,
            index,
            continue_backtest: true,
            events,
        })
    }

    /// Create a handler over every symbol in `data`, in sorted order.
    pub fn from_map(data: HashMap<String, Vec<Bar>>, events: EventPublisher) -> Result<Self, DataError> {
        let mut symbols: Vec<String> = data.keys().cloned().collect();
        symbols.sort();
        Self::new(symbols, data, events)
    }

    /// Total number of bars held for `symbol`, revealed or not.
    pub fn series_len(&self, symbol: &str) -> usize {
        self.index
            .get(symbol)
            .map_or(0, |&i| self.feeds[i].bars.len())
    }
}

impl DataHandler for HistoricBars {
    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn latest_bars(&self, symbol: &str, n: usize) -> &[Bar] {
        match self.index.get(symbol) {
            Some(&i) => {
                let revealed = self.feeds[i].revealed();
                &revealed[revealed.len().saturating_sub(n)..]
            }
            None => {
                warn!(symbol, "not a valid symbol");
                &[]
            }
        }
    }

    fn update_bars(&mut self) -> BacktestResult<()> {
        let mut advanced = false;
        for feed in &mut self.feeds {
            if feed.cursor < feed.bars.len() {
                feed.cursor += 1;
                advanced = true;
            } else {
                if self.continue_backtest {
                    debug!(symbol = %feed.symbol, bars = feed.bars.len(), "data exhausted");
                }
                self.continue_backtest = false;
            }
        }

        // A step where nothing moved has no new time index to report.
        if advanced {
            self.events.publish(Event::Market)?;
        }
        Ok(())
    }

    fn continue_backtest(&self) -> bool {
        self.continue_backtest
    }
}
