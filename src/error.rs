use thiserror::Error;

/// Failures reported by the venue gateway
///
/// Partial bracket placement is not represented here: a market fill with a
/// failed protective leg is a result the executor reports as data, not an
/// error that unwinds the fill.
#[derive(Debug, Error)]
pub enum VenueError {
    #[error("transport failure talking to venue: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rate limited by venue: {0}")]
    RateLimited(String),

    #[error("venue rejected the request: {0}")]
    Rejected(String),

    #[error("malformed venue response: {0}")]
    Malformed(String),
}

/// Problems with a bar history before it reaches the indicator layer
///
/// Insufficient warm-up history is deliberately not a `DataError`; the
/// indicator layer encodes it as undefined slots and signals degrade to
/// Hold.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("bar history is empty")]
    Empty,

    #[error("bar timestamps not strictly increasing at index {index}")]
    UnorderedBars { index: usize },
}
