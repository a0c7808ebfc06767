//! Strategies command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::strategy::StrategyRegistry;

/// List the registered strategies.
pub fn run_strategies(settings: &Settings) {
    let registry = StrategyRegistry::builtin();
    let default = settings.agent.strategy.trim().to_lowercase();

    Output::header("Strategies");
    for (name, description) in registry.describe() {
        Output::strategy(name, description, name == default);
    }

    if !registry.contains(&default) {
        Output::warning(&format!(
            "Configured default strategy '{}' is not registered",
            settings.agent.strategy
        ));
    }
}
