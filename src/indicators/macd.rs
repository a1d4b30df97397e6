use super::moving_average::calculate_ema_series;

/// MACD line and its signal line, index-aligned with the input series
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Calculate MACD over a full close series
///
/// MACD = EMA(fast) - EMA(slow); the signal line is an EMA of the MACD
/// itself. Because every EMA is seeded from its first input, both lines are
/// defined from index 0.
pub fn calculate_macd_series(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    let ema_fast = calculate_ema_series(prices, fast_period);
    let ema_slow = calculate_ema_series(prices, slow_period);

    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();

    let signal = calculate_ema_series(&macd, signal_period);

    MacdSeries { macd, signal }
}
