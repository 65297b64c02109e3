//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, BacktestSettings, DataSettings, LoggingConfig, StrategySettings};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from an optional file and the environment.
///
/// Environment variables use the `REPLAY__` prefix with `__` between path
/// segments, e.g. `REPLAY__BACKTEST__INITIAL_CAPITAL=50000`. List values such
/// as `REPLAY__BACKTEST__SYMBOLS` are comma-separated.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix("REPLAY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("backtest.symbols"),
        )
        .build()?;

    config.try_deserialize()
}

/// Parse configuration from a TOML string, without environment overrides.
pub fn from_toml_str(contents: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(contents)
}
