//! Validate configuration command.

use anyhow::Result;
use replay_config::load_config;
use replay_strategies::StrategyRegistry;
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {:?}", path),
        None => println!("Validating default configuration and REPLAY__* environment"),
    }

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let checks = config.validate().map_err(anyhow::Error::from).and_then(|_| {
        StrategyRegistry::new()
            .validate(&config.strategy.name, config.strategy.params.clone())
            .map_err(anyhow::Error::from)
    });
    if let Err(e) = checks {
        println!("Configuration error: {}", e);
        return Err(e);
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Initial capital: {}", config.backtest.initial_capital);
    println!("Symbols: {}", config.backtest.symbols.join(", "));
    println!("Data: {} ({})", config.data.path.display(), config.data.source);
    println!("Strategy: {}", config.strategy.name);
    println!("Minimum commission: {}", config.commission.minimum);

    Ok(())
}
