//! Strategy trait definitions.

use crate::error::{BacktestResult, StrategyError};
use crate::traits::{DataHandler, PortfolioView};

/// Configuration trait for strategies.
pub trait StrategyConfig: Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Core strategy trait.
///
/// A strategy is called once per market event. It reads recent bars and the
/// current portfolio state and publishes zero or more signal events on the
/// publisher it was constructed with.
pub trait Strategy {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// React to a new time step.
    fn calculate_signals(
        &mut self,
        data: &dyn DataHandler,
        portfolio: &dyn PortfolioView,
    ) -> BacktestResult<()>;

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn calculate_signals(
        &mut self,
        data: &dyn DataHandler,
        portfolio: &dyn PortfolioView,
    ) -> BacktestResult<()> {
        (**self).calculate_signals(data, portfolio)
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
