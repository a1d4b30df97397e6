use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::{BarSource, TimeSource, VenueGateway};
use crate::error::VenueError;
use crate::models::{Bar, OrderAck, OrderIntent, OrderKind, OrderStatus};

// Bybit v5 REST API
// Docs: https://bybit-exchange.github.io/docs/v5/intro
const BYBIT_API: &str = "https://api.bybit.com";
const BYBIT_TESTNET_API: &str = "https://api-testnet.bybit.com";

// The venue tolerates this much clock skew on stamped requests.
const RECV_WINDOW_MS: u32 = 10_000;

// Client-side pacing so bursts of order placements stay under the venue's
// request budget.
const REQUESTS_PER_SECOND: u32 = 5;

// retCodes Bybit uses for request throttling.
const RET_CODE_RATE_LIMIT: i64 = 10006;
const RET_CODE_IP_RATE_LIMIT: i64 = 10018;

/// Client for the Bybit v5 REST API
///
/// Public market-data endpoints plus order creation. Requests are paced
/// client-side and order payloads are stamped with the offset-corrected
/// local clock so the venue's recvWindow check passes even on a skewed
/// host.
#[derive(Clone)]
pub struct BybitClient {
    client: Client,
    base_url: String,
    time_offset_ms: i64,
    limiter: Arc<DefaultDirectRateLimiter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEnvelope<T> {
    ret_code: i64,
    ret_msg: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KlineResult {
    list: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerTimeResult {
    time_second: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest<'a> {
    category: &'a str,
    symbol: &'a str,
    side: &'a str,
    order_type: &'a str,
    qty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger_price: Option<String>,
    order_link_id: String,
    timestamp: i64,
    recv_window: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResult {
    order_id: String,
    #[serde(default)]
    order_status: Option<String>,
    #[serde(default)]
    avg_price: Option<String>,
}

impl BybitClient {
    pub fn new() -> Self {
        Self::with_base_url(BYBIT_API)
    }

    pub fn testnet() -> Self {
        Self::with_base_url(BYBIT_TESTNET_API)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(REQUESTS_PER_SECOND).expect("static nonzero"));
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            time_offset_ms: 0,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Apply a measured venue-clock offset to every stamped request.
    pub fn with_time_offset(mut self, offset_ms: i64) -> Self {
        self.time_offset_ms = offset_ms;
        self
    }

    fn stamped_now_ms(&self) -> i64 {
        Utc::now().timestamp_millis() + self.time_offset_ms
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, VenueError> {
        self.limiter.until_ready().await;
        let response = self.client.get(url).send().await?;
        let envelope: ApiEnvelope<T> = response.json().await.map_err(decode_error)?;
        unwrap_envelope(envelope)
    }
}

impl Default for BybitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for BybitClient {
    /// Fetch up to `limit` closed klines for the symbol.
    ///
    /// The venue returns rows newest-first; they are reversed here so the
    /// result is strictly ascending by open time.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Bar>, VenueError> {
        let url = format!(
            "{}/v5/market/kline?category=spot&symbol={}&interval={}&limit={}",
            self.base_url,
            symbol,
            interval_param(timeframe),
            limit
        );
        tracing::debug!(%url, "fetching klines");

        let result: KlineResult = self.get_json(&url).await?;

        let mut bars = result
            .list
            .iter()
            .map(|row| parse_kline_row(row))
            .collect::<Result<Vec<Bar>, VenueError>>()?;
        bars.reverse();

        tracing::info!(symbol, timeframe, count = bars.len(), "fetched OHLCV bars");
        Ok(bars)
    }
}

impl TimeSource for BybitClient {
    async fn server_time_ms(&self) -> Result<i64, VenueError> {
        let url = format!("{}/v5/market/time", self.base_url);
        let result: ServerTimeResult = self.get_json(&url).await?;

        let seconds: i64 = result
            .time_second
            .parse()
            .map_err(|_| VenueError::Malformed(format!("bad timeSecond: {}", result.time_second)))?;
        Ok(seconds * 1000)
    }
}

impl VenueGateway for BybitClient {
    async fn create_order(&self, intent: &OrderIntent) -> Result<OrderAck, VenueError> {
        // Limit orders quote their price outright, conditional stops carry
        // a trigger instead.
        let (price, trigger_price) = match intent.kind {
            OrderKind::Market => (None, None),
            OrderKind::Limit => (intent.trigger_price.map(|p| p.to_string()), None),
            OrderKind::Stop => (None, intent.trigger_price.map(|p| p.to_string())),
        };

        let request = CreateOrderRequest {
            category: "spot",
            symbol: &intent.symbol,
            side: intent.side.as_str(),
            order_type: intent.kind.as_str(),
            qty: intent.quantity.to_string(),
            price,
            trigger_price,
            order_link_id: intent.client_id.to_string(),
            timestamp: self.stamped_now_ms(),
            recv_window: RECV_WINDOW_MS,
        };

        let url = format!("{}/v5/order/create", self.base_url);
        tracing::info!(
            symbol = %intent.symbol,
            kind = intent.kind.as_str(),
            side = intent.side.as_str(),
            quantity = intent.quantity,
            trigger = ?intent.trigger_price,
            "placing order"
        );

        self.limiter.until_ready().await;
        let response = self.client.post(&url).json(&request).send().await?;
        let envelope: ApiEnvelope<CreateOrderResult> =
            response.json().await.map_err(decode_error)?;
        let result = unwrap_envelope(envelope)?;

        let fill_price = match result.avg_price.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<f64>()
                    .map_err(|_| VenueError::Malformed(format!("bad avgPrice: {raw}")))?,
            ),
        };

        let status = match result.order_status.as_deref() {
            Some("Filled") | Some("PartiallyFilled") => OrderStatus::Filled,
            _ => OrderStatus::Accepted,
        };

        Ok(OrderAck {
            order_id: result.order_id,
            status,
            fill_price,
        })
    }
}

fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T, VenueError> {
    match envelope.ret_code {
        0 => envelope
            .result
            .ok_or_else(|| VenueError::Malformed("missing result payload".to_string())),
        RET_CODE_RATE_LIMIT | RET_CODE_IP_RATE_LIMIT => {
            Err(VenueError::RateLimited(envelope.ret_msg))
        }
        code => Err(VenueError::Rejected(format!(
            "retCode {code}: {}",
            envelope.ret_msg
        ))),
    }
}

fn decode_error(err: reqwest::Error) -> VenueError {
    if err.is_decode() {
        VenueError::Malformed(err.to_string())
    } else {
        VenueError::Transport(err)
    }
}

/// Map a human timeframe to Bybit's interval parameter.
fn interval_param(timeframe: &str) -> &str {
    match timeframe {
        "1m" => "1",
        "3m" => "3",
        "5m" => "5",
        "15m" => "15",
        "30m" => "30",
        "1h" => "60",
        "2h" => "120",
        "4h" => "240",
        "6h" => "360",
        "12h" => "720",
        "1d" => "D",
        "1w" => "W",
        other => other,
    }
}

fn parse_kline_row(row: &[String]) -> Result<Bar, VenueError> {
    if row.len() < 6 {
        return Err(VenueError::Malformed(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let start_ms: i64 = row[0]
        .parse()
        .map_err(|_| VenueError::Malformed(format!("bad kline start time: {}", row[0])))?;
    let timestamp = Utc
        .timestamp_millis_opt(start_ms)
        .single()
        .ok_or_else(|| VenueError::Malformed(format!("kline start time out of range: {start_ms}")))?;

    Ok(Bar {
        timestamp,
        open: parse_f64("open", &row[1])?,
        high: parse_f64("high", &row[2])?,
        low: parse_f64("low", &row[3])?,
        close: parse_f64("close", &row[4])?,
        volume: parse_f64("volume", &row[5])?,
    })
}

fn parse_f64(field: &str, value: &str) -> Result<f64, VenueError> {
    value
        .parse()
        .map_err(|_| VenueError::Malformed(format!("bad {field} value: {value}")))
}
