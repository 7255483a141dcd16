use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tokio::time::{self, Duration as TokioDuration};
use tracing::{info, warn};

use crate::config;

/// Background sweep that gives up on orders the provider never called back
/// about. Purely a bookkeeping policy: a webhook that arrives late still
/// settles through the order linkage regardless of this status.
pub fn spawn(pool: PgPool) {
    let interval = TokioDuration::from_secs(*config::ORDER_SWEEP_INTERVAL_SECS);
    let abandon_after = *config::ORDER_ABANDON_AFTER_MINUTES;

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        loop {
            ticker.tick().await;
            match process_tick(&pool, Utc::now(), abandon_after).await {
                Ok(0) => {}
                Ok(swept) => info!(swept, "marked stale orders abandoned"),
                Err(err) => warn!(?err, "order sweep tick failed"),
            }
        }
    });
}

pub async fn process_tick(
    pool: &PgPool,
    now: DateTime<Utc>,
    abandon_after_minutes: i64,
) -> Result<u64> {
    let cutoff = now - Duration::minutes(abandon_after_minutes);
    let result = sqlx::query(
        "UPDATE orders SET status = 'abandoned', updated_at = NOW() \
         WHERE status = 'created' AND created_at < $1",
    )
    .bind(cutoff)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
