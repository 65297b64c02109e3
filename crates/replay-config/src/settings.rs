//! Configuration structures.

use std::path::PathBuf;

use replay_core::error::BacktestError;
use replay_core::types::CommissionSchedule;
use replay_data::DataSourceKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub commission: CommissionSchedule,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
}

impl AppConfig {
    /// Reject settings no run could start from.
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.backtest.initial_capital <= Decimal::ZERO {
            return Err(BacktestError::Config(format!(
                "initial capital must be positive, got {}",
                self.backtest.initial_capital
            )));
        }
        if self.backtest.symbols.is_empty() {
            return Err(BacktestError::Config(
                "at least one symbol is required".to_string(),
            ));
        }
        self.data.source_kind()?;
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "replay".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Backtest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub initial_capital: Decimal,
    /// Venue recorded on simulated fills
    pub venue: String,
    pub symbols: Vec<String>,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            initial_capital: dec!(100000),
            venue: "ARCA".to_string(),
            symbols: Vec::new(),
        }
    }
}

/// Historical data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Source kind name, e.g. `csv`
    pub source: String,
    /// File or directory the source reads from
    pub path: PathBuf,
}

impl DataSettings {
    pub fn source_kind(&self) -> Result<DataSourceKind, BacktestError> {
        Ok(self.source.parse::<DataSourceKind>()?)
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source: "csv".to_string(),
            path: PathBuf::from("data"),
        }
    }
}

/// Strategy selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Registry key
    pub name: String,
    /// Strategy parameters; empty means the strategy's defaults
    pub params: serde_json::Value,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            name: "buy_and_hold".to_string(),
            params: serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_toml_str;
    use replay_core::error::DataError;
    use rust_decimal_macros::dec;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.backtest.symbols = vec!["000001".to_string()];
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backtest.initial_capital, dec!(100000));
        assert_eq!(config.backtest.venue, "ARCA");
        assert_eq!(config.commission, CommissionSchedule::default());
        assert_eq!(config.strategy.name, "buy_and_hold");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let mut config = valid();
        config.backtest.initial_capital = Decimal::ZERO;
        assert!(matches!(config.validate(), Err(BacktestError::Config(_))));

        let mut config = valid();
        config.backtest.symbols.clear();
        assert!(matches!(config.validate(), Err(BacktestError::Config(_))));

        let mut config = valid();
        config.data.source = "akshare".to_string();
        assert!(matches!(
            config.validate(),
            Err(BacktestError::Data(DataError::UnsupportedSource(_)))
        ));
    }

    #[test]
    fn test_parse_toml() {
        let config = from_toml_str(
            r#"
            [backtest]
            initial_capital = 2000000
            symbols = ["000001", "600000"]

            [commission]
            minimum = 5.0

            [data]
            path = "fixtures"

            [strategy]
            name = "stop_loss"
            params = { stop_fraction = 0.9 }
            "#,
        )
        .unwrap();

        assert_eq!(config.backtest.initial_capital, dec!(2000000));
        assert_eq!(config.backtest.symbols.len(), 2);
        assert_eq!(config.backtest.venue, "ARCA");
        assert_eq!(config.commission.minimum, dec!(5));
        assert_eq!(config.commission.tier_threshold, 500);
        assert_eq!(config.data.source, "csv");
        assert_eq!(config.data.path, PathBuf::from("fixtures"));
        assert_eq!(config.strategy.params["stop_fraction"], 0.9);
        assert!(config.validate().is_ok());
    }
}
