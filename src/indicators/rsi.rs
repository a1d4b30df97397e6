/// Calculate Relative Strength Index over a full close series
///
/// Gains and loss magnitudes are averaged separately over a simple rolling
/// window of the last `period` price deltas, RS = avgGain / avgLoss and
/// RSI = 100 - 100 / (1 + RS). A window with zero average loss is defined
/// as RSI 100 rather than left to divide by zero.
///
/// Slots without a full window of deltas (indices < `period`) are `None`.
pub fn calculate_rsi_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() <= period {
        return out;
    }

    // One delta per consecutive pair, index-aligned so deltas[i-1] is the
    // move into bar i.
    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    for i in period..prices.len() {
        let window = &deltas[i - period..i];

        let avg_gain: f64 =
            window.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
        let avg_loss: f64 = window
            .iter()
            .filter(|d| **d < 0.0)
            .map(|d| d.abs())
            .sum::<f64>()
            / period as f64;

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        };

        out[i] = Some(rsi);
    }

    out
}
