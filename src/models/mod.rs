use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DataError;

/// One OHLCV bar for a single time interval
///
/// Bars arrive from the venue in strictly increasing timestamp order and
/// are immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Trading signal, one per bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Order side as the venue understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side that closes an exposure opened on this side.
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderSide::Buy => "Buy",
            OrderSide::Sell => "Sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Stop,
    Limit,
}

impl OrderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Market => "Market",
            OrderKind::Stop => "Stop",
            OrderKind::Limit => "Limit",
        }
    }
}

/// A single order request handed to the venue gateway
///
/// Intents are transient: created per decision point, logged, and discarded
/// after submission. `client_id` is stamped here so a half-open bracket can
/// be reconciled against the venue's order log by hand if the run dies
/// between legs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub kind: OrderKind,
    pub side: OrderSide,
    pub quantity: f64,
    pub trigger_price: Option<f64>,
    pub client_id: Uuid,
}

impl OrderIntent {
    pub fn market(symbol: &str, side: OrderSide, quantity: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: OrderKind::Market,
            side,
            quantity,
            trigger_price: None,
            client_id: Uuid::new_v4(),
        }
    }

    pub fn stop(symbol: &str, side: OrderSide, quantity: f64, trigger_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: OrderKind::Stop,
            side,
            quantity,
            trigger_price: Some(trigger_price),
            client_id: Uuid::new_v4(),
        }
    }

    pub fn limit(symbol: &str, side: OrderSide, quantity: f64, trigger_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: OrderKind::Limit,
            side,
            quantity,
            trigger_price: Some(trigger_price),
            client_id: Uuid::new_v4(),
        }
    }
}

/// What the venue reported back for a create-order call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Accepted,
    Filled,
}

/// Venue acknowledgement of a submitted order
///
/// `fill_price` is optional: market orders may report it, stop/limit orders
/// that have not triggered never do. Callers must not assume it is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub status: OrderStatus,
    pub fill_price: Option<f64>,
}

/// Validate that a bar history is usable by the indicator layer
///
/// Timestamps must be strictly increasing. Equal or backwards timestamps
/// mean the venue handed us garbage rather than a warm-up problem, so this
/// is an error and not a `None` slot.
pub fn validate_bar_sequence(bars: &[Bar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::Empty);
    }

    for (i, window) in bars.windows(2).enumerate() {
        if window[1].timestamp <= window[0].timestamp {
            return Err(DataError::UnorderedBars { index: i + 1 });
        }
    }

    Ok(())
}
