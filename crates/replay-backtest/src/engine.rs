//! Backtest driver.

use replay_core::error::BacktestResult;
use replay_core::traits::{DataHandler, ExecutionHandler, PortfolioHandler, Strategy};
use replay_core::types::Event;
use replay_core::EventQueue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::report::BacktestReport;
use crate::statistics::{EquityCurve, SummaryStats};

/// Where the driver is in its advance/drain cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Ask the data handler for the next bar of every symbol
    Advancing,
    /// Dispatch queued events until the queue is empty
    Draining,
    /// Data exhausted and queue drained
    Done,
}

/// Number of events dispatched per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub market: usize,
    pub signal: usize,
    pub order: usize,
    pub fill: usize,
}

impl EventCounts {
    fn record(&mut self, event: &Event) {
        match event {
            Event::Market => self.market += 1,
            Event::Signal(_) => self.signal += 1,
            Event::Order(_) => self.order += 1,
            Event::Fill(_) => self.fill += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.market + self.signal + self.order + self.fill
    }
}

/// Event-driven backtest over one data handler, portfolio, strategy and broker.
///
/// Every component must publish onto `queue`; the driver is the only consumer.
pub struct Backtest<D, P, S, E> {
    queue: EventQueue,
    data: D,
    portfolio: P,
    strategy: S,
    execution: E,
    phase: Phase,
    counts: EventCounts,
    commission_paid: Decimal,
}

impl<D, P, S, E> Backtest<D, P, S, E>
where
    D: DataHandler,
    P: PortfolioHandler,
    S: Strategy,
    E: ExecutionHandler,
{
    pub fn new(queue: EventQueue, data: D, portfolio: P, strategy: S, execution: E) -> Self {
        Self {
            queue,
            data,
            portfolio,
            strategy,
            execution,
            phase: Phase::Advancing,
            counts: EventCounts::default(),
            commission_paid: Decimal::ZERO,
        }
    }

    /// Replay the data to exhaustion and report the results.
    ///
    /// Any component error aborts the run.
    pub fn run(mut self) -> BacktestResult<BacktestReport> {
        info!(
            strategy = self.strategy.name(),
            symbols = ?self.data.symbols(),
            "starting backtest"
        );

        loop {
            match self.phase {
                Phase::Advancing => {
                    self.data.update_bars()?;
                    self.phase = Phase::Draining;
                }
                Phase::Draining => {
                    self.drain()?;
                    self.phase = if self.data.continue_backtest() {
                        Phase::Advancing
                    } else {
                        Phase::Done
                    };
                }
                Phase::Done => break,
            }
        }

        let report = self.finish();
        info!(
            strategy = %report.strategy,
            steps = report.counts.market,
            fills = report.counts.fill,
            total_return_pct = report.stats.total_return_pct,
            sharpe_ratio = report.stats.sharpe_ratio,
            max_drawdown = report.stats.max_drawdown,
            drawdown_duration = report.stats.drawdown_duration,
            "backtest complete"
        );
        Ok(report)
    }

    /// Dispatch until the queue is empty, including events published meanwhile.
    fn drain(&mut self) -> BacktestResult<()> {
        while let Some(event) = self.queue.try_take() {
            self.dispatch(event)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> BacktestResult<()> {
        trace!(event = event.kind(), "dispatch");
        self.counts.record(&event);

        match &event {
            Event::Market => {
                self.strategy.calculate_signals(&self.data, &self.portfolio)?;
                self.portfolio.update_time_index(&self.data)?;
            }
            Event::Signal(signal) => self.portfolio.update_signal(signal)?,
            Event::Order(_) => self.execution.execute_order(&event, &self.data)?,
            Event::Fill(fill) => {
                self.commission_paid += fill.commission();
                self.portfolio.update_fill(fill)?;
            }
        }
        Ok(())
    }

    fn finish(self) -> BacktestReport {
        let equity_curve = EquityCurve::from_holdings(self.portfolio.holdings());
        let stats = SummaryStats::from_curve(&equity_curve);
        let final_cash = self.portfolio.cash();
        let final_total = equity_curve.last().map_or(final_cash, |p| p.total);

        BacktestReport {
            strategy: self.strategy.name().to_string(),
            stats,
            counts: self.counts,
            final_cash,
            commission_paid: self.commission_paid,
            final_total,
            equity_curve,
        }
    }
}
