//! Backtest report generation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::EventCounts;
use crate::statistics::{EquityCurve, SummaryStats};

/// Complete backtest report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Name of the strategy that ran
    pub strategy: String,
    /// Headline statistics
    pub stats: SummaryStats,
    /// Dispatched events per kind
    pub counts: EventCounts,
    /// Cash after the last fill
    pub final_cash: Decimal,
    /// Commission over every fill
    pub commission_paid: Decimal,
    /// Total of the last holdings row
    pub final_total: Decimal,
    /// One row per time step
    pub equity_curve: EquityCurve,
}

impl BacktestReport {
    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Strategy:            {}\n\n", self.strategy));

        s.push_str("PERFORMANCE\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        for (item, value) in self.stats.rows() {
            s.push_str(&format!("  {:<21}{}\n", format!("{}:", item), value));
        }
        s.push('\n');

        s.push_str("ACCOUNT\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Final Total:         ${:.2}\n", self.final_total));
        s.push_str(&format!("  Final Cash:          ${:.2}\n", self.final_cash));
        s.push_str(&format!("  Commission Paid:     ${:.2}\n", self.commission_paid));
        s.push('\n');

        s.push_str("EXECUTION\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Steps:               {}\n", self.counts.market));
        s.push_str(&format!("  Signals:             {}\n", self.counts.signal));
        s.push_str(&format!("  Orders:              {}\n", self.counts.order));
        s.push_str(&format!("  Fills:               {}\n", self.counts.fill));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render the equity curve as CSV.
    ///
    /// Columns: timestamp, one market-value column per symbol, cash,
    /// commission, total, returns, equity. Undefined values are left empty.
    pub fn equity_to_csv(&self) -> Result<String, csv::Error> {
        let symbols = self.equity_curve.symbols();
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["timestamp".to_string()];
        header.extend(symbols.iter().cloned());
        header.extend(
            ["cash", "commission", "total", "returns", "equity"]
                .iter()
                .map(|s| s.to_string()),
        );
        writer.write_record(&header)?;

        for point in self.equity_curve.points() {
            let mut record = vec![point.timestamp.to_rfc3339()];
            for symbol in &symbols {
                let value = point.market_values.get(symbol).copied().unwrap_or_default();
                record.push(value.to_string());
            }
            record.push(point.cash.to_string());
            record.push(point.commission.to_string());
            record.push(point.total.to_string());
            record.push(format_ratio(point.returns));
            record.push(format_ratio(point.equity));
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn format_ratio(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use replay_core::types::HoldingsSnapshot;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn report() -> BacktestReport {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let rows: Vec<HoldingsSnapshot> = [dec!(1000), dec!(1010)]
            .iter()
            .enumerate()
            .map(|(i, &total)| HoldingsSnapshot {
                timestamp: start + Duration::days(i as i64),
                cash: dec!(500),
                commission: dec!(1.3),
                total,
                market_values: BTreeMap::from([("AAA".to_string(), total - dec!(500))]),
                positions: BTreeMap::from([("AAA".to_string(), 50)]),
            })
            .collect();
        let equity_curve = EquityCurve::from_holdings(&rows);

        BacktestReport {
            strategy: "Buy and Hold".to_string(),
            stats: SummaryStats::from_curve(&equity_curve),
            counts: EventCounts {
                market: 2,
                signal: 1,
                order: 1,
                fill: 1,
            },
            final_cash: dec!(500),
            commission_paid: dec!(1.3),
            final_total: dec!(1010),
            equity_curve,
        }
    }

    #[test]
    fn test_summary_lists_stats() {
        let summary = report().summary();
        assert!(summary.contains("BACKTEST REPORT"));
        assert!(summary.contains("Buy and Hold"));
        assert!(summary.contains("Total Return:"));
        assert!(summary.contains("1.00%"));
        assert!(summary.contains("Drawdown Duration:"));
        assert!(summary.contains("Commission Paid:     $1.30"));
        assert!(summary.contains("Fills:               1"));
    }

    #[test]
    fn test_equity_csv() {
        let csv = report().equity_to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,AAA,cash,commission,total,returns,equity");
        assert!(lines[1].starts_with("2024-01-02T00:00:00+00:00,500,500,1.3,1000,,"));
        assert!(lines[2].contains(",1010,"));
    }

    #[test]
    fn test_json_export() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["strategy"], "Buy and Hold");
        assert_eq!(value["counts"]["fill"], 1);
    }
}
