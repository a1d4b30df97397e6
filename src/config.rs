use std::fmt::Debug;
use std::str::FromStr;

/// Runtime configuration, sourced from environment variables
///
/// Every field has a default so the bot runs out of the box against
/// BTCUSDT hourly bars with the bracket percentages the strategy was tuned
/// for. `.env` files are honored by the binaries before this is read.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub symbol: String,
    pub timeframe: String,
    pub bar_limit: usize,
    pub order_quantity: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            timeframe: "1h".to_string(),
            bar_limit: 100,
            order_quantity: 0.001,
            stop_loss_pct: 0.05,
            take_profit_pct: 0.10,
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            symbol: std::env::var("TRADE_SYMBOL").unwrap_or(defaults.symbol),
            timeframe: std::env::var("TRADE_TIMEFRAME").unwrap_or(defaults.timeframe),
            bar_limit: env_or("BAR_LIMIT", defaults.bar_limit),
            order_quantity: env_or("ORDER_QUANTITY", defaults.order_quantity),
            stop_loss_pct: env_or("STOP_LOSS_PCT", defaults.stop_loss_pct),
            take_profit_pct: env_or("TAKE_PROFIT_PCT", defaults.take_profit_pct),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Debug,
{
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("ignoring unparseable {key}={raw}, using {default:?}");
                default
            }
        },
        Err(_) => default,
    }
}
