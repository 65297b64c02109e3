//! Events exchanged over the event channel.
//!
//! Every variant carries a fixed record shape. Fields are private and exposed
//! through getters so an event cannot change after it has been published.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CommissionSchedule;

/// Directional intent carried by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
    /// Flatten the position to zero, whatever its sign
    Exit,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
            Direction::Exit => write!(f, "EXIT"),
        }
    }
}

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Get the sign for cash calculations (+1 for buy, -1 for sell).
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => -Decimal::ONE,
        }
    }

    /// Signed share delta for a fill of `quantity` on this side.
    pub fn signed_quantity(&self, quantity: u64) -> i64 {
        let qty = i64::try_from(quantity).unwrap_or(i64::MAX);
        match self {
            Side::Buy => qty,
            Side::Sell => -qty,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Market,
    Limit,
    Stop,
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::Stop => write!(f, "STOP"),
        }
    }
}

/// A strategy's request for action, before position sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    symbol: String,
    timestamp: DateTime<Utc>,
    direction: Direction,
    quantity: u64,
}

impl SignalEvent {
    /// Create a new signal.
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        direction: Direction,
        quantity: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            direction,
            quantity,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Requested share count. Ignored for `Exit`.
    pub fn quantity(&self) -> u64 {
        self.quantity
    }
}

/// A sized, directional instruction derived from a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    id: Uuid,
    symbol: String,
    kind: OrderKind,
    quantity: u64,
    side: Side,
}

impl OrderEvent {
    /// Create a new order with a fresh id.
    pub fn new(symbol: impl Into<String>, kind: OrderKind, quantity: u64, side: Side) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            kind,
            quantity,
            side,
        }
    }

    /// Create a market order.
    pub fn market(symbol: impl Into<String>, side: Side, quantity: u64) -> Self {
        Self::new(symbol, OrderKind::Market, quantity, side)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

impl std::fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order: Symbol={}, Type={}, Quantity={}, Direction={}",
            self.symbol, self.kind, self.quantity, self.side
        )
    }
}

/// Simulated execution outcome of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    timestamp: DateTime<Utc>,
    symbol: String,
    venue: String,
    quantity: u64,
    side: Side,
    fill_price: Decimal,
    commission: Decimal,
    order_id: Option<Uuid>,
}

impl FillEvent {
    /// Create a fill, charging the default commission schedule.
    pub fn new(
        timestamp: DateTime<Utc>,
        symbol: impl Into<String>,
        venue: impl Into<String>,
        quantity: u64,
        side: Side,
        fill_price: Decimal,
    ) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            venue: venue.into(),
            quantity,
            side,
            fill_price,
            commission: CommissionSchedule::default().commission(quantity, fill_price),
            order_id: None,
        }
    }

    /// Replace the default commission with an explicit amount.
    pub fn with_commission(mut self, commission: Decimal) -> Self {
        self.commission = commission;
        self
    }

    /// Link the fill to the order it executes.
    pub fn for_order(mut self, order_id: Uuid) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn fill_price(&self) -> Decimal {
        self.fill_price
    }

    pub fn commission(&self) -> Decimal {
        self.commission
    }

    pub fn order_id(&self) -> Option<Uuid> {
        self.order_id
    }

    /// `side_sign * quantity * fill_price`.
    pub fn signed_notional(&self) -> Decimal {
        self.side.sign() * Decimal::from(self.quantity) * self.fill_price
    }
}

/// Tagged union of everything that travels over the event channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// A new time step is available
    Market,
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Market => "market",
            Event::Signal(_) => "signal",
            Event::Order(_) => "order",
            Event::Fill(_) => "fill",
        }
    }
}

impl From<SignalEvent> for Event {
    fn from(signal: SignalEvent) -> Self {
        Event::Signal(signal)
    }
}

impl From<OrderEvent> for Event {
    fn from(order: OrderEvent) -> Self {
        Event::Order(order)
    }
}

impl From<FillEvent> for Event {
    fn from(fill: FillEvent) -> Self {
        Event::Fill(fill)
    }
}
