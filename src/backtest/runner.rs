use crate::backtest::metrics::{max_drawdown_pct, BacktestReport};
use crate::execution::{PositionStateMachine, TradeDecision};
use crate::models::{Bar, Signal};

/// Simulates the signal sequence against historical bars with no venue
///
/// All-in/all-out accounting: a Buy converts the whole quote balance into
/// position at that bar's close, any exit converts it back. Stop-loss and
/// take-profit exits flow through the same state machine the live runner
/// uses, so the simulation and live behavior cannot drift apart.
pub struct BacktestRunner {
    initial_balance: f64,
    stop_loss_pct: f64,
    take_profit_pct: f64,
}

impl BacktestRunner {
    pub fn new(initial_balance: f64, stop_loss_pct: f64, take_profit_pct: f64) -> Self {
        Self {
            initial_balance,
            stop_loss_pct,
            take_profit_pct,
        }
    }

    pub fn run(&self, bars: &[Bar], signals: &[Signal]) -> anyhow::Result<BacktestReport> {
        anyhow::ensure!(
            bars.len() == signals.len(),
            "signal series must align with bars ({} signals for {} bars)",
            signals.len(),
            bars.len()
        );
        let last_close = match bars.last() {
            Some(bar) => bar.close,
            None => anyhow::bail!("no bars to simulate"),
        };

        let mut machine = PositionStateMachine::new(self.stop_loss_pct, self.take_profit_pct);
        let mut balance = self.initial_balance;
        let mut position_qty = 0.0;
        let mut trades = 0;

        for (bar, signal) in bars.iter().zip(signals) {
            match machine.on_bar(*signal, bar.close) {
                Some(TradeDecision::Enter { entry_price, .. }) => {
                    position_qty = balance / entry_price;
                    balance = 0.0;
                    tracing::info!(ts = %bar.timestamp, entry_price, qty = position_qty, "buy");
                }
                Some(TradeDecision::Exit { reason, price }) => {
                    balance = position_qty * price;
                    position_qty = 0.0;
                    trades += 1;
                    tracing::info!(ts = %bar.timestamp, price, ?reason, "sell");
                }
                None => {}
            }
        }

        let ended_long = machine.is_long();
        let final_balance = balance + position_qty * last_close;
        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();

        Ok(BacktestReport {
            initial_balance: self.initial_balance,
            final_balance,
            total_return_pct: (final_balance - self.initial_balance) / self.initial_balance
                * 100.0,
            max_drawdown_pct: max_drawdown_pct(&closes),
            trades,
            ended_long,
        })
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
                timestamp: base + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_round_trip_grows_balance() {
        let bars = bars_from_closes(&[100.0, 100.0, 125.0, 125.0]);
        let signals = [Signal::Hold, Signal::Buy, Signal::Sell, Signal::Hold];

        let report = BacktestRunner::new(1000.0, 0.5, 1.0)
            .run(&bars, &signals)
            .unwrap();

        // 1000 buys 10 units at 100; sold at 125 => 1250.
        assert_eq!(report.final_balance, 1250.0);
        assert_eq!(report.total_return_pct, 25.0);
        assert_eq!(report.trades, 1);
        assert!(!report.ended_long);
    }

    #[test]
    fn test_all_hold_keeps_balance() {
        let bars = bars_from_closes(&[100.0, 110.0, 90.0]);
        let signals = [Signal::Hold; 3];

        let report = BacktestRunner::new(1000.0, 0.05, 0.10)
            .run(&bars, &signals)
            .unwrap();

        assert_eq!(report.final_balance, 1000.0);
        assert_eq!(report.total_return_pct, 0.0);
        assert_eq!(report.trades, 0);
    }

    #[test]
    fn test_open_position_valued_at_last_close() {
        let bars = bars_from_closes(&[100.0, 100.0, 110.0]);
        let signals = [Signal::Hold, Signal::Buy, Signal::Hold];

        let report = BacktestRunner::new(1000.0, 0.5, 1.0)
            .run(&bars, &signals)
            .unwrap();

        // Still holding 10 units, marked at the final close of 110.
        assert!(report.ended_long);
        assert_eq!(report.trades, 0);
        assert_eq!(report.final_balance, 1100.0);
    }

    #[test]
    fn test_stop_loss_exit_flows_through_simulation() {
        // Entry at 100 with a 25% stop: the 70 close forces a stop exit.
        let bars = bars_from_closes(&[100.0, 100.0, 70.0, 80.0]);
        let signals = [Signal::Hold, Signal::Buy, Signal::Hold, Signal::Hold];

        let report = BacktestRunner::new(1000.0, 0.25, 1.0)
            .run(&bars, &signals)
            .unwrap();

        assert_eq!(report.trades, 1);
        assert_eq!(report.final_balance, 700.0);
        assert!(!report.ended_long);
    }

    #[test]
    fn test_empty_bars_is_an_error() {
        let report = BacktestRunner::new(1000.0, 0.05, 0.10).run(&[], &[]);
        assert!(report.is_err());
    }
}
