/// Calculate Simple Moving Average over a full close series
///
/// Returns one slot per input price. Slots before index `period - 1` have
/// no full window yet and are `None`, never zero.
pub fn calculate_sma_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return out;
    }

    let mut window_sum: f64 = prices[..period].iter().sum();
    out[period - 1] = Some(window_sum / period as f64);

    for i in period..prices.len() {
        window_sum += prices[i] - prices[i - period];
        out[i] = Some(window_sum / period as f64);
    }

    out
}

/// Calculate Exponential Moving Average over a full close series
///
/// Seeded with the first close, so every slot from index 0 is defined:
/// `ema[i] = price[i] * k + ema[i-1] * (1 - k)` with `k = 2 / (period + 1)`.
pub fn calculate_ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(prices.len());
    let Some(&first) = prices.first() else {
        return out;
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = first;
    out.push(ema);

    for &price in &prices[1..] {
        ema = price * k + ema * (1.0 - k);
        out.push(ema);
    }

    out
}
