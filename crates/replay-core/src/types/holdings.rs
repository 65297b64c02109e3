//! Per-step holdings records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Portfolio state captured at one simulated time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    /// Timestamp of the step
    pub timestamp: DateTime<Utc>,
    /// Cash balance
    pub cash: Decimal,
    /// Commission paid so far
    pub commission: Decimal,
    /// Cash plus the market value of every position
    pub total: Decimal,
    /// Market value per symbol (position * close)
    pub market_values: BTreeMap<String, Decimal>,
    /// Signed share count per symbol
    pub positions: BTreeMap<String, i64>,
}

impl HoldingsSnapshot {
    /// Sum of all per-symbol market values.
    pub fn market_value(&self) -> Decimal {
        self.market_values.values().copied().sum()
    }
}
