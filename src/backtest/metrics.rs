use serde::Serialize;

/// Performance summary of one simulated run
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub initial_balance: f64,
    /// Cash plus any open position valued at the last close.
    pub final_balance: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    /// Completed round trips (an open position at the end is not one).
    pub trades: usize,
    pub ended_long: bool,
}

/// Worst peak-to-trough decline of the close series, as a percentage of
/// the highest close seen.
pub fn max_drawdown_pct(closes: &[f64]) -> f64 {
    let mut running_max = f64::MIN;
    let mut worst_gap: f64 = 0.0;

    for &close in closes {
        running_max = running_max.max(close);
        worst_gap = worst_gap.max(running_max - close);
    }

    if closes.is_empty() || running_max <= 0.0 {
        return 0.0;
    }
    (worst_gap / running_max) * 100.0
}
