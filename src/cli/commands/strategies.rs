//! List strategies command.

use anyhow::Result;
use replay_strategies::StrategyRegistry;

pub fn run() -> Result<()> {
    let registry = StrategyRegistry::new();

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ({})", info.name, info.key);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  Default parameters: {}", info.default_config);
        println!();
    }

    println!("Use --strategy <key> to select a strategy and --params '<json>' to tune it.");

    Ok(())
}
