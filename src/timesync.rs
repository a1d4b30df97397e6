use chrono::Utc;
use tokio::time::{sleep, Duration};

use crate::api::TimeSource;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_SECS: u64 = 1;

/// Measure the offset between the venue clock and the local clock
///
/// Returns venue time minus local time in milliseconds. Transient failures
/// are retried up to `max_retries` with linearly increasing backoff
/// (`backoff_secs * attempt`). Exhausted retries degrade to a zero offset
/// with an error log; clock sync is best-effort and never fails the
/// caller.
pub async fn sync_clock_offset<T: TimeSource>(
    source: &T,
    max_retries: u32,
    backoff_secs: u64,
) -> i64 {
    let mut retries = 0;
    while retries < max_retries {
        match source.server_time_ms().await {
            Ok(server_ms) => {
                let local_ms = Utc::now().timestamp_millis();
                let offset = server_ms - local_ms;
                tracing::info!(offset_ms = offset, "clock synchronized with venue");
                return offset;
            }
            Err(err) => {
                retries += 1;
                tracing::warn!("clock sync attempt {retries} failed: {err}");
                sleep(Duration::from_secs(backoff_secs * u64::from(retries))).await;
            }
        }
    }

    tracing::error!("clock sync exhausted {max_retries} retries, falling back to zero offset");
    0
}
