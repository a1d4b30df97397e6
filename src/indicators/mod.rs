// Technical indicators module
// Implements SMA, EMA, MACD, RSI series plus simple chart-pattern flags

pub mod frame;
pub mod macd;
pub mod moving_average;
pub mod patterns;
pub mod rsi;

pub use frame::{IndicatorConfig, IndicatorFrame};
pub use macd::{calculate_macd_series, MacdSeries};
pub use moving_average::{calculate_ema_series, calculate_sma_series};
pub use patterns::{detect_double_top, detect_head_and_shoulders};
pub use rsi::calculate_rsi_series;
