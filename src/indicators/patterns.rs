use crate::models::Bar;

/// Flag bars that complete a head-and-shoulders shape
///
/// A bar is flagged when its previous bar is a local high above both of its
/// neighbours and the mirrored structure shows in the lows. Output is
/// index-aligned with the input; the first three and last slots can never
/// be flagged.
pub fn detect_head_and_shoulders(bars: &[Bar]) -> Vec<bool> {
    let mut flags = vec![false; bars.len()];
    if bars.len() < 4 {
        return flags;
    }

    for i in 2..bars.len() - 1 {
        let highs_peak = bars[i - 2].high < bars[i - 1].high
            && bars[i - 1].high > bars[i].high
            && bars[i - 1].high > bars[i + 1].high;
        let lows_trough = bars[i - 2].low > bars[i - 1].low
            && bars[i - 1].low < bars[i].low
            && bars[i - 1].low < bars[i + 1].low;

        if highs_peak && lows_trough {
            flags[i] = true;
        }
    }

    flags
}

/// Flag bars forming a double top: a local high repeated exactly by the
/// next bar, both above the bar before the pair.
pub fn detect_double_top(bars: &[Bar]) -> Vec<bool> {
    let mut flags = vec![false; bars.len()];
    if bars.len() < 3 {
        return flags;
    }

    for i in 1..bars.len() - 1 {
        if bars[i - 1].high < bars[i].high && bars[i].high == bars[i + 1].high {
            flags[i] = true;
        }
    }

    flags
}
