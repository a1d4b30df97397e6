// Trading strategy module
pub mod signals;

pub use signals::{generate_signals, SignalConfig};
