//! Per-run event channel.
//!
//! One `EventQueue` exists per backtest run. The driver owns it and drains it;
//! every producer (data handler, strategy, portfolio, execution) holds a cloned
//! [`EventPublisher`] handed out at construction time. Events come out in the
//! exact order they were published.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::error::{BacktestError, BacktestResult};
use crate::types::Event;

/// Multi-producer, single-consumer FIFO of events.
pub struct EventQueue {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl EventQueue {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Get a publishing handle for a producer.
    pub fn publisher(&self) -> EventPublisher {
        EventPublisher {
            tx: self.tx.clone(),
        }
    }

    /// Take the oldest unconsumed event without blocking.
    ///
    /// Returns `None` when the queue is empty.
    pub fn try_take(&self) -> Option<Event> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            // The queue holds its own sender, so it cannot disconnect while alive.
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").finish_non_exhaustive()
    }
}

/// Producer handle onto an [`EventQueue`].
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: Sender<Event>,
}

impl EventPublisher {
    /// Append an event to the tail of the queue.
    pub fn publish(&self, event: impl Into<Event>) -> BacktestResult<()> {
        self.tx
            .send(event.into())
            .map_err(|_| BacktestError::ChannelClosed)
    }
}
