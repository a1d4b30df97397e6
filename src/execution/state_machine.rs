use crate::models::Signal;

/// Why a long position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StrategySell,
    StopLoss,
    TakeProfit,
}

/// Current exposure: flat, or one long position with its protective levels
///
/// Price fields only exist while long, so "entry price defined only when in
/// a position" holds by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Long {
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
    },
}

/// Decision emitted for a single bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeDecision {
    Enter {
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
    },
    Exit {
        reason: ExitReason,
        price: f64,
    },
}

/// Long-only position state machine
///
/// Consumes the signal sequence one bar at a time and holds at most one
/// open position. Per bar, the first matching rule fires and no other:
/// flat + Buy opens; long + Sell closes; otherwise a close at or beyond
/// the stop-loss closes (checked before the take-profit, the conservative
/// precedence when one bar touches both); then a close at or beyond the
/// take-profit closes.
///
/// There is no terminal state. A position still open when the bar sequence
/// ends stays open; callers surface that, nothing liquidates it.
#[derive(Debug)]
pub struct PositionStateMachine {
    state: PositionState,
    stop_loss_pct: f64,
    take_profit_pct: f64,
}

impl PositionStateMachine {
    pub fn new(stop_loss_pct: f64, take_profit_pct: f64) -> Self {
        Self {
            state: PositionState::Flat,
            stop_loss_pct,
            take_profit_pct,
        }
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    pub fn is_long(&self) -> bool {
        matches!(self.state, PositionState::Long { .. })
    }

    /// Advance the machine by one bar.
    ///
    /// Returns the single transition that fired, if any. A Buy while
    /// already long and a Sell while flat are both ignored.
    pub fn on_bar(&mut self, signal: Signal, close: f64) -> Option<TradeDecision> {
        match self.state {
            PositionState::Flat => {
                if signal != Signal::Buy {
                    return None;
                }

                let stop_loss = close * (1.0 - self.stop_loss_pct);
                let take_profit = close * (1.0 + self.take_profit_pct);
                self.state = PositionState::Long {
                    entry_price: close,
                    stop_loss,
                    take_profit,
                };
                Some(TradeDecision::Enter {
                    entry_price: close,
                    stop_loss,
                    take_profit,
                })
            }
            PositionState::Long {
                stop_loss,
                take_profit,
                ..
            } => {
                let reason = if signal == Signal::Sell {
                    Some(ExitReason::StrategySell)
                } else if close <= stop_loss {
                    Some(ExitReason::StopLoss)
                } else if close >= take_profit {
                    Some(ExitReason::TakeProfit)
                } else {
                    None
                };

                let reason = reason?;
                self.state = PositionState::Flat;
                Some(TradeDecision::Exit {
                    reason,
                    price: close,
                })
            }
        }
    }
}
