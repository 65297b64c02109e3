//! Strategy registry for selecting strategies by name.

use std::collections::BTreeMap;

use replay_core::error::StrategyError;
use replay_core::traits::{Strategy, StrategyConfig};
use replay_core::types::Direction;
use replay_core::EventPublisher;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{
    DivideConquerConfig, DivideConquerStrategy, HoldConfig, HoldStrategy, MaCrossoverConfig, MaCrossoverStrategy, StopLossConfig,
    StopLossStrategy,
};

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry key
    pub key: String,
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry of the built-in strategies.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a registry with all built-in strategies.
    pub fn new() -> Self {
        let mut registry = Self {
            strategies: BTreeMap::new(),
        };

        registry.register(
            "buy_and_hold",
            "Buy and Hold",
            "Buys as many shares as cash allows on the first bar and holds",
            HoldConfig::default(),
        );
        registry.register(
            "sell_and_hold",
            "Sell and Hold",
            "Shorts as many shares as cash covers on the first bar and holds",
            HoldConfig::sell(vec![]),
        );
        registry.register(
            "stop_loss",
            "Stop Loss",
            "Holds a long position behind a trailing stop",
            StopLossConfig::default(),
        );
        registry.register(
            "ma_crossover",
            "Moving Averages Long",
            "Goes long while the short EMA is above the long EMA",
            MaCrossoverConfig::default(),
        );
        registry.register(
            "divide_and_conquer",
            "Divide And Conquer",
            "Buys a fraction of cash on a falling trend and sells a fraction of the position otherwise",
            DivideConquerConfig::default(),
        );

        registry
    }

    fn register<C: Serialize>(&mut self, key: &str, name: &str, description: &str, config: C) {
        self.strategies.insert(
            key.to_string(),
            StrategyInfo {
                key: key.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                default_config: serde_json::to_value(config).unwrap_or_default(),
            },
        );
    }

    /// List all available strategies, sorted by key.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    /// Get strategy info by key.
    pub fn get(&self, key: &str) -> Option<&StrategyInfo> {
        self.strategies.get(key)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, key: &str) -> bool {
        self.strategies.contains_key(key)
    }

    /// Get all strategy keys.
    pub fn names(&self) -> Vec<&String> {
        self.strategies.keys().collect()
    }

    /// Create a strategy from a JSON configuration.
    ///
    /// `symbols` replaces whatever symbol list the configuration carries.
    pub fn create(
        &self,
        key: &str,
        config: serde_json::Value,
        symbols: Vec<String>,
        events: EventPublisher,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        match key {
            "buy_and_hold" | "sell_and_hold" => {
                let mut config: HoldConfig = parse(config)?;
                config.symbols = symbols;
                config.direction = if key == "buy_and_hold" {
                    Direction::Long
                } else {
                    Direction::Short
                };
                Ok(Box::new(HoldStrategy::new(config, events)?))
            }
            "stop_loss" => {
                let mut config: StopLossConfig = parse(config)?;
                config.symbols = symbols;
                Ok(Box::new(StopLossStrategy::new(config, events)?))
            }
            "ma_crossover" => {
                let mut config: MaCrossoverConfig = parse(config)?;
                config.symbols = symbols;
                Ok(Box::new(MaCrossoverStrategy::new(config, events)?))
            }
            "divide_and_conquer" => {
                let mut config: DivideConquerConfig = parse(config)?;
                config.symbols = symbols;
                Ok(Box::new(DivideConquerStrategy::new(config, events)?))
            }
            _ => Err(StrategyError::NotFound(key.to_string())),
        }
    }

    /// Create a strategy with its default configuration.
    pub fn create_default(
        &self,
        key: &str,
        symbols: Vec<String>,
        events: EventPublisher,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let info = self
            .get(key)
            .ok_or_else(|| StrategyError::NotFound(key.to_string()))?;
        self.create(key, info.default_config.clone(), symbols, events)
    }

    /// Check a configuration without building the strategy.
    pub fn validate(&self, key: &str, config: serde_json::Value) -> Result<(), StrategyError> {
        // Symbols are supplied at creation time, so only parameters are checked here.
        let placeholder = vec!["_".to_string()];
        match key {
            "buy_and_hold" | "sell_and_hold" => {
                let mut config: HoldConfig = parse(config)?;
                config.symbols = placeholder;
                config.validate()
            }
            "stop_loss" => {
                let mut config: StopLossConfig = parse(config)?;
                config.symbols = placeholder;
                config.validate()
            }
            "ma_crossover" => {
                let mut config: MaCrossoverConfig = parse(config)?;
                config.symbols = placeholder;
                config.validate()
            }
            "divide_and_conquer" => {
                let mut config: DivideConquerConfig = parse(config)?;
                config.symbols = placeholder;
                config.validate()
            }
            _ => Err(StrategyError::NotFound(key.to_string())),
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse<C: DeserializeOwned>(config: serde_json::Value) -> Result<C, StrategyError> {
    // An absent parameter table means "use the defaults".
    let config = if config.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        config
    };
    serde_json::from_value(config).map_err(|e| StrategyError::InvalidConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_core::EventQueue;

    fn symbols() -> Vec<String> {
        vec!["000001".to_string()]
    }

    #[test]
    fn test_registry_list() {
        let registry = StrategyRegistry::new();
        let keys: Vec<&str> = registry.list().iter().map(|i| i.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["buy_and_hold", "divide_and_conquer", "ma_crossover", "sell_and_hold", "stop_loss"]
        );
        let names: Vec<&str> = registry.names().into_iter().map(String::as_str).collect();
        assert_eq!(names, keys);
    }

    #[test]
    fn test_registry_get() {
        let registry = StrategyRegistry::new();
        assert!(registry.get("stop_loss").is_some());
        assert!(registry.exists("ma_crossover"));
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_create_default() {
        let registry = StrategyRegistry::new();
        let queue = EventQueue::new();

        for key in registry.names() {
            let strategy = registry
                .create_default(key, symbols(), queue.publisher())
                .unwrap();
            assert_eq!(strategy.name(), registry.get(key).unwrap().name);
        }
    }

    #[test]
    fn test_create_with_config() {
        let registry = StrategyRegistry::new();
        let queue = EventQueue::new();

        let config = serde_json::json!({ "short_span": 3, "long_span": 8 });
        assert!(registry
            .create("ma_crossover", config, symbols(), queue.publisher())
            .is_ok());

        let empty = registry.create("stop_loss", serde_json::Value::Null, symbols(), queue.publisher());
        assert!(empty.is_ok());
    }

    #[test]
    fn test_create_invalid_config() {
        let registry = StrategyRegistry::new();
        let queue = EventQueue::new();

        let config = serde_json::json!({ "short_span": 8, "long_span": 3 });
        let result = registry.create("ma_crossover", config, symbols(), queue.publisher());
        assert!(matches!(result, Err(StrategyError::InvalidConfig(_))));

        let config = serde_json::json!({ "stop_fraction": "tight" });
        let result = registry.create("stop_loss", config, symbols(), queue.publisher());
        assert!(matches!(result, Err(StrategyError::InvalidConfig(_))));

        let result = registry.create_default("ma_crossover", vec![], queue.publisher());
        assert!(matches!(result, Err(StrategyError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_strategy() {
        let registry = StrategyRegistry::new();
        let queue = EventQueue::new();
        let result = registry.create_default("martingale", symbols(), queue.publisher());
        assert!(matches!(result, Err(StrategyError::NotFound(_))));
    }

    #[test]
    fn test_validate_parameters_only() {
        let registry = StrategyRegistry::new();
        assert!(registry.validate("stop_loss", serde_json::json!({ "stop_fraction": 0.9 })).is_ok());
        assert!(registry.validate("stop_loss", serde_json::json!({ "stop_fraction": 1.5 })).is_err());
        assert!(registry.validate("divide_and_conquer", serde_json::json!({ "lookback": 10 })).is_ok());
        assert!(registry.validate("divide_and_conquer", serde_json::json!({ "divisor": 0 })).is_err());
    }
}
