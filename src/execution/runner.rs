use anyhow::Context;

use crate::api::VenueGateway;
use crate::execution::executor::RiskManagedOrderExecutor;
use crate::execution::state_machine::{PositionStateMachine, TradeDecision};
use crate::models::{Bar, OrderSide, Signal};

/// Tally of one pass over a bar sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub bars_processed: usize,
    pub entries: usize,
    pub exits: usize,
    /// Entries whose bracket came back without a working stop or target.
    pub partial_brackets: usize,
    /// The run finished with the position still open. Nothing liquidates
    /// it; the operator decides what to do with it.
    pub ended_long: bool,
}

/// Drives the position state machine over a bar series and hands every
/// decision to the order executor
///
/// Strictly serial: a bar's full order sequence completes (or fails)
/// before the next bar is looked at, so the position can never be mutated
/// by two bars at once. A hard venue failure on the entry or exit market
/// order halts the run; partial bracket failures are counted and the run
/// continues.
pub struct TradeRunner {
    state_machine: PositionStateMachine,
}

impl TradeRunner {
    pub fn new(stop_loss_pct: f64, take_profit_pct: f64) -> Self {
        Self {
            state_machine: PositionStateMachine::new(stop_loss_pct, take_profit_pct),
        }
    }

    pub async fn run<G: VenueGateway>(
        &mut self,
        bars: &[Bar],
        signals: &[Signal],
        executor: &RiskManagedOrderExecutor<G>,
    ) -> anyhow::Result<RunSummary> {
        anyhow::ensure!(
            bars.len() == signals.len(),
            "signal series must align with bars ({} signals for {} bars)",
            signals.len(),
            bars.len()
        );

        let mut summary = RunSummary::default();

        for (bar, signal) in bars.iter().zip(signals) {
            summary.bars_processed += 1;

            let Some(decision) = self.state_machine.on_bar(*signal, bar.close) else {
                continue;
            };

            match decision {
                TradeDecision::Enter {
                    entry_price,
                    stop_loss,
                    take_profit,
                } => {
                    tracing::info!(
                        ts = %bar.timestamp,
                        entry_price,
                        stop_loss,
                        take_profit,
                        "📈 entering long"
                    );
                    let report = executor
                        .submit_entry(OrderSide::Buy)
                        .await
                        .context("entry market order failed, halting run")?;
                    summary.entries += 1;
                    if report.is_partial() {
                        summary.partial_brackets += 1;
                    }
                }
                TradeDecision::Exit { reason, price } => {
                    tracing::info!(ts = %bar.timestamp, price, ?reason, "📉 exiting long");
                    executor
                        .submit_exit(OrderSide::Buy)
                        .await
                        .context("exit market order failed, halting run")?;
                    summary.exits += 1;
                }
            }
        }

        summary.ended_long = self.state_machine.is_long();
        if summary.ended_long {
            tracing::info!("run finished with the position still open (no implicit liquidation)");
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VenueError;
    use crate::models::{OrderAck, OrderIntent, OrderStatus};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Mutex;

    struct FillingVenue {
        calls: Mutex<Vec<OrderIntent>>,
        fail_protective: bool,
    }

    impl FillingVenue {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_protective: false,
            }
        }

        fn failing_protective() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_protective: true,
            }
        }
    }

    impl VenueGateway for &FillingVenue {
        async fn create_order(&self, intent: &OrderIntent) -> Result<OrderAck, VenueError> {
            self.calls.lock().unwrap().push(intent.clone());
            if self.fail_protective && intent.trigger_price.is_some() {
                return Err(VenueError::Rejected("protective leg rejected".to_string()));
            }
            Ok(OrderAck {
                order_id: format!("ord-{}", self.calls.lock().unwrap().len()),
                status: OrderStatus::Filled,
                fill_price: Some(intent.trigger_price.unwrap_or(50000.0)),
            })
        }
    }

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

    #[tokio::test]
    async fn test_run_rejects_misaligned_signals() {
        let venue = FillingVenue::new();
        let executor = RiskManagedOrderExecutor::new(&venue, "BTCUSDT", 0.001, 0.05, 0.10);
        let mut runner = TradeRunner::new(0.05, 0.10);

        let bars = bars_from_closes(&[100.0, 101.0]);
        let result = runner.run(&bars, &[Signal::Hold], &executor).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_executes_entry_and_exit() {
        let venue = FillingVenue::new();
        let executor = RiskManagedOrderExecutor::new(&venue, "BTCUSDT", 0.001, 0.05, 0.10);
        let mut runner = TradeRunner::new(0.05, 0.10);

        let bars = bars_from_closes(&[100.0, 101.0, 102.0, 103.0]);
        let signals = [Signal::Hold, Signal::Buy, Signal::Hold, Signal::Sell];

        let summary = runner.run(&bars, &signals, &executor).await.unwrap();

        assert_eq!(summary.entries, 1);
        assert_eq!(summary.exits, 1);
        assert_eq!(summary.partial_brackets, 0);
        assert!(!summary.ended_long);

        // Market entry + stop + limit + market exit.
        assert_eq!(venue.calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_run_counts_partial_brackets_and_continues() {
        let venue = FillingVenue::failing_protective();
        let executor = RiskManagedOrderExecutor::new(&venue, "BTCUSDT", 0.001, 0.05, 0.10);
        let mut runner = TradeRunner::new(0.05, 0.10);

        let bars = bars_from_closes(&[100.0, 101.0, 102.0, 103.0]);
        let signals = [Signal::Hold, Signal::Buy, Signal::Hold, Signal::Hold];

        let summary = runner.run(&bars, &signals, &executor).await.unwrap();

        assert_eq!(summary.entries, 1);
        assert_eq!(summary.partial_brackets, 1);
        assert_eq!(summary.bars_processed, 4);
    }

    #[tokio::test]
    async fn test_run_reports_position_left_open() {
        let venue = FillingVenue::new();
        let executor = RiskManagedOrderExecutor::new(&venue, "BTCUSDT", 0.001, 0.05, 0.10);
        let mut runner = TradeRunner::new(0.05, 0.10);

        let bars = bars_from_closes(&[100.0, 101.0, 102.0]);
        let signals = [Signal::Hold, Signal::Buy, Signal::Hold];

        let summary = runner.run(&bars, &signals, &executor).await.unwrap();
        assert!(summary.ended_long);
        assert_eq!(summary.exits, 0);
    }
}
