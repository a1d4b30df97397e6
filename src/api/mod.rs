// Venue access module
pub mod bybit;

pub use bybit::BybitClient;

use crate::error::VenueError;
use crate::models::{Bar, OrderAck, OrderIntent};

/// Order-placement surface of the execution venue
///
/// One create-order call per intent; there is no atomic multi-order
/// transaction, which is why bracket placement upstream has to cope with
/// partial failure.
pub trait VenueGateway {
    async fn create_order(&self, intent: &OrderIntent) -> Result<OrderAck, VenueError>;
}

/// Historical bar source
///
/// Implementations must return bars in strictly increasing timestamp
/// order, at most `limit` of them.
pub trait BarSource {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Bar>, VenueError>;
}

/// The venue's notion of "now", in unix milliseconds
pub trait TimeSource {
    async fn server_time_ms(&self) -> Result<i64, VenueError>;
}
