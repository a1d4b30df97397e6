use crate::models::Bar;

use super::macd::calculate_macd_series;
use super::moving_average::calculate_sma_series;
use super::rsi::calculate_rsi_series;

/// Indicator periods used to build an [`IndicatorFrame`]
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    pub sma_fast_period: usize,
    pub sma_slow_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_fast_period: 50,
            sma_slow_period: 200,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            rsi_period: 14,
        }
    }
}

/// Derived indicator series, index-aligned 1:1 with the bars they came from
///
/// Slots inside an indicator's warm-up window are `None`. MACD and its
/// signal line are EMA-based and seeded from the first close, so they are
/// plain `f64` series defined from index 0.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub sma_fast: Vec<Option<f64>>,
    pub sma_slow: Vec<Option<f64>>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub rsi: Vec<Option<f64>>,
    len: usize,
}

impl IndicatorFrame {
    /// Compute every series in one pass over the closes.
    ///
    /// Pure function of its input: the same bars always produce the same
    /// frame, and the frame length always equals the bar count.
    pub fn compute(bars: &[Bar], config: &IndicatorConfig) -> Self {
        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();

        let macd_series = calculate_macd_series(
            &closes,
            config.macd_fast_period,
            config.macd_slow_period,
            config.macd_signal_period,
        );

        Self {
            sma_fast: calculate_sma_series(&closes, config.sma_fast_period),
            sma_slow: calculate_sma_series(&closes, config.sma_slow_period),
            macd: macd_series.macd,
            macd_signal: macd_series.signal,
            rsi: calculate_rsi_series(&closes, config.rsi_period),
            len: closes.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: base + Duration::hours(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    fn small_config() -> IndicatorConfig {
        IndicatorConfig {
            sma_fast_period: 3,
            sma_slow_period: 5,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            rsi_period: 14,
        }
    }

    #[test]
    fn test_frame_length_matches_bars() {
        let bars = bars_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let frame = IndicatorFrame::compute(&bars, &small_config());

        assert_eq!(frame.len(), bars.len());
        assert_eq!(frame.sma_fast.len(), bars.len());
        assert_eq!(frame.sma_slow.len(), bars.len());
        assert_eq!(frame.macd.len(), bars.len());
        assert_eq!(frame.macd_signal.len(), bars.len());
        assert_eq!(frame.rsi.len(), bars.len());
    }

    #[test]
    fn test_frame_warm_up_slots_undefined() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let frame = IndicatorFrame::compute(&bars_from_closes(&closes), &small_config());

        // SMA-3 fills from index 2, SMA-5 from index 4, RSI-14 never (only
        // 10 bars of history here).
        assert!(frame.sma_fast[1].is_none());
        assert!(frame.sma_fast[2].is_some());
        assert!(frame.sma_slow[3].is_none());
        assert!(frame.sma_slow[4].is_some());
        assert!(frame.rsi.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_frame_empty_bars() {
        let frame = IndicatorFrame::compute(&[], &IndicatorConfig::default());
        assert!(frame.is_empty());
    }

    #[test]
    fn test_default_config_warm_up_with_short_history() {
        // 100 bars against the default SMA-200: the slow series must be all
        // undefined rather than zero-filled.
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + (i % 7) as f64).collect();
        let frame = IndicatorFrame::compute(&bars_from_closes(&closes), &IndicatorConfig::default());

        assert!(frame.sma_slow.iter().all(|v| v.is_none()));
        assert!(frame.sma_fast[49].is_some());
    }
}
