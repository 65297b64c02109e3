//! Equity curve and performance statistics.

use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use replay_core::types::HoldingsSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Trading periods per year used to annualise the Sharpe ratio.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// One row of the equity-curve table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub cash: Decimal,
    pub commission: Decimal,
    pub total: Decimal,
    pub market_values: BTreeMap<String, Decimal>,
    pub positions: BTreeMap<String, i64>,
    /// `total[t] / total[t-1] - 1`, NaN on the first row
    pub returns: f64,
    /// Cumulative product of `1 + returns`, NaN on the first row
    pub equity: f64,
}

/// Equity curve derived from a holdings history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    /// Derive the curve from an ordered holdings history.
    pub fn from_holdings(holdings: &[HoldingsSnapshot]) -> Self {
        let mut points = Vec::with_capacity(holdings.len());
        let mut prev_total: Option<f64> = None;
        let mut growth = 1.0_f64;

        for row in holdings {
            let total = row.total.to_f64().unwrap_or(f64::NAN);
            let returns = match prev_total {
                Some(prev) => total / prev - 1.0,
                None => f64::NAN,
            };
            // An undefined return leaves the running product untouched.
            let equity = if returns.is_nan() {
                f64::NAN
            } else {
                growth *= 1.0 + returns;
                growth
            };
            prev_total = Some(total);

            points.push(EquityPoint {
                timestamp: row.timestamp,
                cash: row.cash,
                commission: row.commission,
                total: row.total,
                market_values: row.market_values.clone(),
                positions: row.positions.clone(),
                returns,
                equity,
            });
        }

        Self { points }
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }

    /// Per-step returns, NaN first.
    pub fn returns(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.returns).collect()
    }

    /// Per-step cumulative equity, NaN first.
    pub fn equity(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.equity).collect()
    }

    /// Symbols that appear in any row, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .points
            .iter()
            .flat_map(|p| p.market_values.keys().cloned())
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }
}

/// Headline statistics of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// `(equity[last] - 1) * 100`
    pub total_return_pct: f64,
    /// Annualised Sharpe ratio (risk-free rate of 0); NaN without variance
    pub sharpe_ratio: f64,
    /// Largest drop from the running equity peak, as a fraction of starting equity
    pub max_drawdown: f64,
    /// Longest run of consecutive steps below the running peak
    pub drawdown_duration: usize,
}

impl SummaryStats {
    /// Compute the statistics of an equity curve.
    pub fn from_curve(curve: &EquityCurve) -> Self {
        let returns = curve.returns();
        let equity = curve.equity();
        let final_equity = equity.last().copied().unwrap_or(f64::NAN);
        let (max_drawdown, drawdown_duration) = drawdowns(&equity);

        Self {
            total_return_pct: (final_equity - 1.0) * 100.0,
            sharpe_ratio: sharpe_ratio(&returns, PERIODS_PER_YEAR),
            max_drawdown,
            drawdown_duration,
        }
    }

    /// Item/value pairs for tabular display.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Return", format!("{:.2}%", self.total_return_pct)),
            ("Sharpe Ratio", format!("{:.2}", self.sharpe_ratio)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown * 100.0)),
            ("Drawdown Duration", format!("{}", self.drawdown_duration)),
        ]
    }
}

/// Annualised Sharpe ratio of `returns`, skipping undefined entries.
///
/// Uses the population standard deviation. Returns NaN when it is exactly 0.
pub fn sharpe_ratio(returns: &[f64], periods: f64) -> f64 {
    let defined: Vec<f64> = returns.iter().copied().filter(|r| !r.is_nan()).collect();
    let std_dev = defined.iter().population_std_dev();
    if std_dev == 0.0 {
        return f64::NAN;
    }
    periods.sqrt() * defined.iter().mean() / std_dev
}

/// Maximum drawdown and longest drawdown duration of an equity series.
///
/// The first row carries no comparison and is skipped; the high-water mark
/// starts at 0.
pub fn drawdowns(equity: &[f64]) -> (f64, usize) {
    let mut high_water_mark = 0.0_f64;
    let mut duration = 0usize;
    let mut max_drawdown = 0.0_f64;
    let mut max_duration = 0usize;

    for &value in equity.iter().skip(1) {
        high_water_mark = high_water_mark.max(value);
        let drawdown = high_water_mark - value;
        duration = if drawdown == 0.0 { 0 } else { duration + 1 };
        max_drawdown = max_drawdown.max(drawdown);
        max_duration = max_duration.max(duration);
    }

    (max_drawdown, max_duration)
}
