//! Simulated broker for backtesting.

use replay_core::error::{BacktestResult, ExecutionError};
use replay_core::traits::{DataHandler, ExecutionHandler};
use replay_core::types::{CommissionSchedule, Event, FillEvent};
use replay_core::EventPublisher;
use tracing::debug;

/// Venue recorded on simulated fills unless overridden.
pub const DEFAULT_VENUE: &str = "ARCA";

/// Fills every order in full at the latest close.
///
/// No partial fills, no rejections, no slippage. Commission comes from the
/// configured [`CommissionSchedule`].
pub struct SimulatedExecution {
    events: EventPublisher,
    commission: CommissionSchedule,
    venue: String,
}

impl SimulatedExecution {
    /// Create a simulated broker publishing fills on `events`.
    pub fn new(events: EventPublisher) -> Self {
        Self {
            events,
            commission: CommissionSchedule::default(),
            venue: DEFAULT_VENUE.to_string(),
        }
    }

    /// Set the commission schedule.
    pub fn with_commission(mut self, commission: CommissionSchedule) -> Self {
        self.commission = commission;
        self
    }

    /// Set the venue recorded on fills.
    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = venue.into();
        self
    }
}

impl ExecutionHandler for SimulatedExecution {
    fn execute_order(&mut self, event: &Event, data: &dyn DataHandler) -> BacktestResult<()> {
        let Event::Order(order) = event else {
            return Ok(());
        };

        if order.quantity() == 0 {
            return Err(ExecutionError::InvalidQuantity {
                symbol: order.symbol().to_string(),
                quantity: order.quantity(),
            }
            .into());
        }

        let bar = data
            .latest_bar(order.symbol())
            .ok_or_else(|| ExecutionError::NoPrice(order.symbol().to_string()))?;
        let fill_price = bar.close_price().ok_or_else(|| ExecutionError::InvalidPrice {
            symbol: order.symbol().to_string(),
            price: bar.close,
        })?;

        let commission = self.commission.commission(order.quantity(), fill_price);
        let fill = FillEvent::new(
            bar.timestamp,
            order.symbol(),
            self.venue.as_str(),
            order.quantity(),
            order.side(),
            fill_price,
        )
        .with_commission(commission)
        .for_order(order.id());

        debug!(
            symbol = order.symbol(),
            side = %order.side(),
            quantity = order.quantity(),
            price = %fill_price,
            commission = %commission,
            "order executed"
        );

        self.events.publish(fill)
    }
}
