use crate::api::VenueGateway;
use crate::error::VenueError;
use crate::models::{OrderAck, OrderIntent, OrderSide};

/// Outcome of one protective leg of a bracket
#[derive(Debug)]
pub enum ProtectiveLeg {
    Placed(OrderAck),
    /// Submission failed after the entry had already filled. The fill is
    /// not rolled back; the position is live without this leg.
    Failed(VenueError),
    /// Never attempted because the entry ack carried no fill price.
    Skipped,
}

impl ProtectiveLeg {
    pub fn is_placed(&self) -> bool {
        matches!(self, ProtectiveLeg::Placed(_))
    }
}

/// What came back from submitting an entry bracket
///
/// The market order succeeded if this report exists at all; a rejected
/// entry surfaces as `Err(VenueError)` instead. The two protective legs
/// carry their own outcomes so a partially placed bracket is
/// distinguishable from a fully protected one.
#[derive(Debug)]
pub struct BracketReport {
    pub entry: OrderAck,
    pub fill_price: Option<f64>,
    pub stop_loss: ProtectiveLeg,
    pub take_profit: ProtectiveLeg,
}

impl BracketReport {
    /// Entry filled and both protective orders are working.
    pub fn is_fully_protected(&self) -> bool {
        self.stop_loss.is_placed() && self.take_profit.is_placed()
    }

    /// Entry filled but at least one protective order is missing; the
    /// position needs manual protective placement.
    pub fn is_partial(&self) -> bool {
        !self.is_fully_protected()
    }
}

/// Stop-loss and take-profit trigger prices for a filled entry
///
/// Buy entries protect below and target above the fill; sell entries
/// mirror the signs.
pub fn protective_prices(
    side: OrderSide,
    fill_price: f64,
    stop_loss_pct: f64,
    take_profit_pct: f64,
) -> (f64, f64) {
    match side {
        OrderSide::Buy => (
            fill_price * (1.0 - stop_loss_pct),
            fill_price * (1.0 + take_profit_pct),
        ),
        OrderSide::Sell => (
            fill_price * (1.0 + stop_loss_pct),
            fill_price * (1.0 - take_profit_pct),
        ),
    }
}

/// Submits entry brackets and exits against the venue gateway
///
/// Entry is three dependent submissions: a market order, then a stop and a
/// limit at levels computed from the realized fill price. Submissions are
/// independent at the venue, so a failed leg is reported, never retried
/// here and never compensated by cancelling the fill.
pub struct RiskManagedOrderExecutor<G> {
    gateway: G,
    symbol: String,
    quantity: f64,
    stop_loss_pct: f64,
    take_profit_pct: f64,
}

impl<G: VenueGateway> RiskManagedOrderExecutor<G> {
    pub fn new(
        gateway: G,
        symbol: &str,
        quantity: f64,
        stop_loss_pct: f64,
        take_profit_pct: f64,
    ) -> Self {
        Self {
            gateway,
            symbol: symbol.to_string(),
            quantity,
            stop_loss_pct,
            take_profit_pct,
        }
    }

    /// Open a position with a full bracket.
    ///
    /// Errors only when the market order itself fails; everything after
    /// the fill is reported through the [`BracketReport`].
    pub async fn submit_entry(&self, side: OrderSide) -> Result<BracketReport, VenueError> {
        let entry_intent = OrderIntent::market(&self.symbol, side, self.quantity);
        tracing::info!(
            symbol = %self.symbol,
            side = side.as_str(),
            quantity = self.quantity,
            client_id = %entry_intent.client_id,
            "submitting market entry"
        );
        let entry = self.gateway.create_order(&entry_intent).await?;

        let Some(fill_price) = entry.fill_price else {
            tracing::warn!(
                symbol = %self.symbol,
                order_id = %entry.order_id,
                "entry fill price unavailable, protective orders skipped"
            );
            return Ok(BracketReport {
                entry,
                fill_price: None,
                stop_loss: ProtectiveLeg::Skipped,
                take_profit: ProtectiveLeg::Skipped,
            });
        };

        let (stop_price, target_price) =
            protective_prices(side, fill_price, self.stop_loss_pct, self.take_profit_pct);
        let exit_side = side.opposite();

        let stop_intent = OrderIntent::stop(&self.symbol, exit_side, self.quantity, stop_price);
        let stop_loss = match self.gateway.create_order(&stop_intent).await {
            Ok(ack) => ProtectiveLeg::Placed(ack),
            Err(err) => {
                tracing::error!(
                    symbol = %self.symbol,
                    side = side.as_str(),
                    entry_price = fill_price,
                    quantity = self.quantity,
                    client_id = %stop_intent.client_id,
                    "stop-loss submission failed, position has no downside protection: {err}"
                );
                ProtectiveLeg::Failed(err)
            }
        };

        let limit_intent = OrderIntent::limit(&self.symbol, exit_side, self.quantity, target_price);
        let take_profit = match self.gateway.create_order(&limit_intent).await {
            Ok(ack) => ProtectiveLeg::Placed(ack),
            Err(err) => {
                tracing::error!(
                    symbol = %self.symbol,
                    side = side.as_str(),
                    entry_price = fill_price,
                    quantity = self.quantity,
                    client_id = %limit_intent.client_id,
                    "take-profit submission failed: {err}"
                );
                ProtectiveLeg::Failed(err)
            }
        };

        let report = BracketReport {
            entry,
            fill_price: Some(fill_price),
            stop_loss,
            take_profit,
        };

        if report.is_partial() {
            tracing::warn!(
                symbol = %self.symbol,
                entry_price = fill_price,
                "entered position but part of the bracket is missing"
            );
        } else {
            tracing::info!(
                symbol = %self.symbol,
                entry_price = fill_price,
                stop = stop_price,
                target = target_price,
                "bracket fully placed"
            );
        }

        Ok(report)
    }

    /// Close the position with a single market order on the opposite side.
    /// No fill-price readback or protective logic applies to exits.
    pub async fn submit_exit(&self, entry_side: OrderSide) -> Result<OrderAck, VenueError> {
        let intent = OrderIntent::market(&self.symbol, entry_side.opposite(), self.quantity);
        tracing::info!(
            symbol = %self.symbol,
            side = intent.side.as_str(),
            quantity = self.quantity,
            client_id = %intent.client_id,
            "submitting market exit"
        );
        self.gateway.create_order(&intent).await
    }
}
