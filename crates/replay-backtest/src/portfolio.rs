//! Naive portfolio accounting.
//!
//! Orders are sized straight from the signal (no risk overlay), fills are
//! booked at their reported price, and one holdings row is recorded per
//! market event.

use replay_core::error::{BacktestResult, DataError, PortfolioError};
use replay_core::traits::{DataHandler, PortfolioHandler, PortfolioView};
use replay_core::types::{Direction, FillEvent, HoldingsSnapshot, OrderEvent, Side, SignalEvent};
use replay_core::EventPublisher;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::statistics::{EquityCurve, SummaryStats};

/// Running balances between snapshots.
#[derive(Debug, Clone, Copy)]
struct CurrentHoldings {
    cash: Decimal,
    commission: Decimal,
    total: Decimal,
}

/// Portfolio that turns signals into market orders one-to-one.
pub struct NaivePortfolio {
    symbols: Vec<String>,
    initial_capital: Decimal,
    positions: HashMap<String, i64>,
    current: CurrentHoldings,
    history: Vec<HoldingsSnapshot>,
    fills_processed: usize,
    events: EventPublisher,
}

impl NaivePortfolio {
    /// Create a portfolio over `symbols` holding `initial_capital` in cash.
    pub fn new(
        symbols: Vec<String>,
        initial_capital: Decimal,
        events: EventPublisher,
    ) -> Result<Self, PortfolioError> {
        if symbols.is_empty() {
            return Err(PortfolioError::EmptyUniverse);
        }
        if initial_capital <= Decimal::ZERO {
            return Err(PortfolioError::NonPositiveCapital(initial_capital));
        }

        let positions = symbols.iter().map(|s| (s.clone(), 0)).collect();

        Ok(Self {
            symbols,
            initial_capital,
            positions,
            current: CurrentHoldings {
                cash: initial_capital,
                commission: Decimal::ZERO,
                total: initial_capital,
            },
            history: Vec::new(),
            fills_processed: 0,
            events,
        })
    }

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Commission paid so far.
    pub fn total_commission(&self) -> Decimal {
        self.current.commission
    }

    /// Cash baseline minus everything spent since construction.
    pub fn current_total(&self) -> Decimal {
        self.current.total
    }

    pub fn fills_processed(&self) -> usize {
        self.fills_processed
    }

    /// Derive the equity curve from the holdings history.
    pub fn create_equity_curve(&self) -> EquityCurve {
        EquityCurve::from_holdings(&self.history)
    }

    /// Headline statistics over the holdings history.
    pub fn summary_stats(&self) -> SummaryStats {
        SummaryStats::from_curve(&self.create_equity_curve())
    }

    /// Size a signal into an order. `Exit` on a flat position yields nothing.
    fn generate_naive_order(&self, signal: &SignalEvent) -> Option<OrderEvent> {
        let symbol = signal.symbol();
        match signal.direction() {
            Direction::Long => Some(OrderEvent::market(symbol, Side::Buy, signal.quantity())),
            Direction::Short => Some(OrderEvent::market(symbol, Side::Sell, signal.quantity())),
            Direction::Exit => {
                let current = self.position(symbol);
                let quantity = current.unsigned_abs();
                match current.signum() {
                    1 => Some(OrderEvent::market(symbol, Side::Sell, quantity)),
                    -1 => Some(OrderEvent::market(symbol, Side::Buy, quantity)),
                    _ => None,
                }
            }
        }
    }
}

impl PortfolioView for NaivePortfolio {
    fn cash(&self) -> Decimal {
        self.current.cash
    }

    fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }
}

impl PortfolioHandler for NaivePortfolio {
    fn update_time_index(&mut self, data: &dyn DataHandler) -> BacktestResult<()> {
        let timestamp = self
            .symbols
            .iter()
            .find_map(|s| data.latest_bar(s).map(|b| b.timestamp));
        // Nothing has been replayed yet.
        let Some(timestamp) = timestamp else {
            return Ok(());
        };

        let mut total = self.current.cash;
        let mut market_values = BTreeMap::new();
        let mut positions = BTreeMap::new();

        for symbol in &self.symbols {
            let quantity = self.position(symbol);
            positions.insert(symbol.clone(), quantity);

            let value = match data.latest_bar(symbol) {
                Some(bar) => {
                    let close = bar.close_price().ok_or_else(|| {
                        DataError::ParseError(format!("invalid close {} for {}", bar.close, symbol))
                    })?;
                    Decimal::from(quantity) * close
                }
                None => Decimal::ZERO,
            };
            total += value;
            market_values.insert(symbol.clone(), value);
        }

        self.history.push(HoldingsSnapshot {
            timestamp,
            cash: self.current.cash,
            commission: self.current.commission,
            total,
            market_values,
            positions,
        });
        Ok(())
    }

    fn update_signal(&mut self, signal: &SignalEvent) -> BacktestResult<()> {
        match self.generate_naive_order(signal) {
            Some(order) => {
                debug!(%order, "order generated");
                self.events.publish(order)
            }
            None => {
                debug!(symbol = signal.symbol(), "exit on flat position ignored");
                Ok(())
            }
        }
    }

    fn update_fill(&mut self, fill: &FillEvent) -> BacktestResult<()> {
        let position = self
            .positions
            .get_mut(fill.symbol())
            .ok_or_else(|| PortfolioError::UnknownSymbol(fill.symbol().to_string()))?;
        *position += fill.side().signed_quantity(fill.quantity());

        let cost = fill.signed_notional() + fill.commission();
        self.current.cash -= cost;
        self.current.commission += fill.commission();
        self.current.total -= cost;
        self.fills_processed += 1;

        debug!(
            symbol = fill.symbol(),
            side = %fill.side(),
            quantity = fill.quantity(),
            position = *position,
            cash = %self.current.cash,
            "fill applied"
        );
        Ok(())
    }

    fn holdings(&self) -> &[HoldingsSnapshot] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use replay_core::error::BacktestError;
    use replay_core::types::{Bar, Event};
    use replay_core::EventQueue;
    use replay_data::HistoricBars;
    use rust_decimal_macros::dec;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()
    }

    fn portfolio(queue: &EventQueue, symbols: &[&str]) -> NaivePortfolio {
        let symbols = symbols.iter().map(|s| s.to_string()).collect();
        NaivePortfolio::new(symbols, dec!(100000), queue.publisher()).unwrap()
    }

    fn fill(side: Side, quantity: u64, price: Decimal) -> FillEvent {
        FillEvent::new(ts(), "AAA", "ARCA", quantity, side, price)
    }

    fn take_order(queue: &EventQueue) -> Option<OrderEvent> {
        match queue.try_take() {
            Some(Event::Order(order)) => Some(order),
            Some(other) => panic!("unexpected event: {:?}", other),
            None => None,
        }
    }

    /// Data handler over its own queue, advanced `steps` times.
    fn replay(data: Vec<(&str, Vec<f64>)>, steps: usize) -> (EventQueue, HistoricBars) {
        let queue = EventQueue::new();
        let symbols = data.iter().map(|(s, _)| s.to_string()).collect();
        let map = data
            .into_iter()
            .map(|(s, closes)| {
                let bars = closes
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| Bar::new(ts() + Duration::days(i as i64), c))
                    .collect();
                (s.to_string(), bars)
            })
            .collect();
        let mut handler = HistoricBars::new(symbols, map, queue.publisher()).unwrap();
        for _ in 0..steps {
            handler.update_bars().unwrap();
        }
        (queue, handler)
    }

    #[test]
    fn test_construction_errors() {
        let queue = EventQueue::new();
        assert!(matches!(
            NaivePortfolio::new(vec![], dec!(1000), queue.publisher()),
            Err(PortfolioError::EmptyUniverse)
        ));
        assert!(matches!(
            NaivePortfolio::new(vec!["AAA".into()], Decimal::ZERO, queue.publisher()),
            Err(PortfolioError::NonPositiveCapital(_))
        ));
        assert!(matches!(
            NaivePortfolio::new(vec!["AAA".into()], dec!(-5), queue.publisher()),
            Err(PortfolioError::NonPositiveCapital(_))
        ));
    }

    #[test]
    fn test_initial_state() {
        let queue = EventQueue::new();
        let p = portfolio(&queue, &["AAA", "BBB"]);
        assert_eq!(p.cash(), dec!(100000));
        assert_eq!(p.current_total(), dec!(100000));
        assert_eq!(p.position("AAA"), 0);
        assert_eq!(p.position("BBB"), 0);
        assert!(p.holdings().is_empty());
    }

    #[test]
    fn test_long_and_short_signals() {
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["AAA"]);

        p.update_signal(&SignalEvent::new("AAA", ts(), Direction::Long, 50)).unwrap();
        let order = take_order(&queue).unwrap();
        assert_eq!((order.side(), order.quantity()), (Side::Buy, 50));

        p.update_signal(&SignalEvent::new("AAA", ts(), Direction::Short, 20)).unwrap();
        let order = take_order(&queue).unwrap();
        assert_eq!((order.side(), order.quantity()), (Side::Sell, 20));
        assert!(take_order(&queue).is_none());

        // translation alone never touches the books
        assert_eq!(p.position("AAA"), 0);
        assert_eq!(p.cash(), dec!(100000));
    }

    #[test]
    fn test_exit_long_position() {
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["AAA"]);
        p.update_fill(&fill(Side::Buy, 100, dec!(10))).unwrap();

        p.update_signal(&SignalEvent::new("AAA", ts(), Direction::Exit, 0)).unwrap();
        let order = take_order(&queue).unwrap();
        assert_eq!(order.side(), Side::Sell);
        assert_eq!(order.quantity(), 100);
        assert!(take_order(&queue).is_none());
    }

    #[test]
    fn test_exit_short_position() {
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["AAA"]);
        p.update_fill(&fill(Side::Sell, 40, dec!(10))).unwrap();

        p.update_signal(&SignalEvent::new("AAA", ts(), Direction::Exit, 999)).unwrap();
        let order = take_order(&queue).unwrap();
        assert_eq!(order.side(), Side::Buy);
        assert_eq!(order.quantity(), 40);
    }

    #[test]
    fn test_exit_flat_position_produces_nothing() {
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["AAA"]);

        p.update_signal(&SignalEvent::new("AAA", ts(), Direction::Exit, 10)).unwrap();
        assert!(take_order(&queue).is_none());
    }

    #[test]
    fn test_fill_updates_cash_and_commission() {
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["AAA"]);

        let buy = fill(Side::Buy, 100, dec!(10)).with_commission(dec!(1.3));
        p.update_fill(&buy).unwrap();
        assert_eq!(p.position("AAA"), 100);
        assert_eq!(p.cash(), dec!(100000) - dec!(1000) - dec!(1.3));
        assert_eq!(p.total_commission(), dec!(1.3));

        let sell = fill(Side::Sell, 60, dec!(12)).with_commission(dec!(1.3));
        p.update_fill(&sell).unwrap();
        assert_eq!(p.position("AAA"), 40);
        assert_eq!(p.cash(), dec!(98998.7) + dec!(720) - dec!(1.3));
        assert_eq!(p.total_commission(), dec!(2.6));
        assert_eq!(p.current_total(), p.cash());
        assert_eq!(p.fills_processed(), 2);
    }

    #[test]
    fn test_fill_for_unknown_symbol() {
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["BBB"]);
        let result = p.update_fill(&fill(Side::Buy, 1, dec!(1)));
        assert!(matches!(
            result,
            Err(BacktestError::Portfolio(PortfolioError::UnknownSymbol(_)))
        ));
    }

    #[test]
    fn test_no_snapshot_before_first_bar() {
        let (_data_queue, data) = replay(vec![("AAA", vec![10.0])], 0);
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["AAA"]);

        p.update_time_index(&data).unwrap();
        assert!(p.holdings().is_empty());
    }

    #[test]
    fn test_snapshot_values_positions() {
        let (_data_queue, data) = replay(vec![("AAA", vec![10.0, 12.0]), ("BBB", vec![5.0, 4.0])], 2);
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["AAA", "BBB"]);
        p.update_fill(&fill(Side::Buy, 100, dec!(10)).with_commission(dec!(1))).unwrap();
        p.update_fill(
            &FillEvent::new(ts(), "BBB", "ARCA", 50, Side::Sell, dec!(5)).with_commission(dec!(1)),
        )
        .unwrap();

        p.update_time_index(&data).unwrap();
        let row = &p.holdings()[0];
        assert_eq!(row.timestamp, ts() + Duration::days(1));
        assert_eq!(row.market_values["AAA"], dec!(1200));
        assert_eq!(row.market_values["BBB"], dec!(-200));
        assert_eq!(row.positions["BBB"], -50);
        assert_eq!(row.cash, dec!(100000) - dec!(1000) + dec!(250) - dec!(2));
        assert_eq!(row.commission, dec!(2));
        assert_eq!(row.total, row.cash + row.market_value());
    }

    #[test]
    fn test_snapshot_skips_symbols_without_bars() {
        let (_data_queue, data) = replay(vec![("AAA", vec![10.0]), ("BBB", vec![])], 1);
        let queue = EventQueue::new();
        let mut p = portfolio(&queue, &["AAA", "BBB"]);

        p.update_time_index(&data).unwrap();
        let row = &p.holdings()[0];
        assert_eq!(row.market_values["BBB"], Decimal::ZERO);
        assert_eq!(row.total, dec!(100000));
    }

    fn arb_fill() -> impl Strategy<Value = (bool, u64, i64)> {
        (any::<bool>(), 1u64..10_000, 1i64..100_000)
    }

    proptest! {
        /// cash moves by exactly the signed notional plus commission, and the
        /// position equals the signed sum of all fills.
        #[test]
        fn fills_conserve_cash_and_reconcile(fills in prop::collection::vec(arb_fill(), 1..40)) {
            let queue = EventQueue::new();
            let mut p = portfolio(&queue, &["AAA"]);
            let mut expected_position = 0i64;

            for (is_buy, quantity, cents) in fills {
                let side = if is_buy { Side::Buy } else { Side::Sell };
                let f = fill(side, quantity, Decimal::new(cents, 2));
                let before = p.cash();

                p.update_fill(&f).unwrap();
                expected_position += side.signed_quantity(quantity);

                let expected_cash = before
                    - side.sign() * Decimal::from(quantity) * f.fill_price()
                    - f.commission();
                prop_assert_eq!(p.cash(), expected_cash);
                prop_assert_eq!(p.position("AAA"), expected_position);
            }
        }

        /// Marking to market at the fill price leaves value unchanged except commission.
        #[test]
        fn fill_at_market_only_costs_commission(quantity in 1u64..10_000, cents in 1i64..100_000, is_buy in any::<bool>()) {
            let (_data_queue, data) = replay(vec![("AAA", vec![cents as f64 / 100.0])], 1);
            let queue = EventQueue::new();
            let mut p = portfolio(&queue, &["AAA"]);
            p.update_time_index(&data).unwrap();
            let before = p.holdings()[0].total;

            let side = if is_buy { Side::Buy } else { Side::Sell };
            let f = fill(side, quantity, data.latest_bar("AAA").unwrap().close_price().unwrap());
            p.update_fill(&f).unwrap();
            p.update_time_index(&data).unwrap();

            prop_assert_eq!(p.holdings()[1].total, before - f.commission());
        }
    }
}
