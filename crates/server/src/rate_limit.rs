//! Global sliding-window rate limiting.
//!
//! The limiter admits at most `max` requests in any trailing `window`. Hits
//! are kept either in process memory or in a Postgres table shared by all
//! replicas. A store that cannot be reached lets the request through and logs
//! a warning.

use std::collections::VecDeque;
use std::sync::Mutex;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use deadpool_postgres::{Pool, PoolError, Runtime};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tokio_postgres::NoTls;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Advisory lock key serialising window checks across replicas.
const WINDOW_LOCK_KEY: i64 = 0x6e65_7773_726c;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS rate_limit_hits (
    id UUID PRIMARY KEY,
    hit_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS rate_limit_hits_hit_at_idx ON rate_limit_hits (hit_at);";

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("Failed to create connection pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    #[error("Connection pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

/// Outcome of a window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Rejected; the oldest hit in the window expires after `retry_after`
    /// seconds.
    Limited { retry_after: u64 },
}

enum Store {
    Memory(Mutex<VecDeque<OffsetDateTime>>),
    Postgres(Pool),
}

pub struct RateLimiter {
    max: u32,
    window: Duration,
    store: Store,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = match self.store {
            Store::Memory(_) => "memory",
            Store::Postgres(_) => "postgres",
        };
        f.debug_struct("RateLimiter")
            .field("max", &self.max)
            .field("window", &self.window)
            .field("store", &store)
            .finish()
    }
}

impl RateLimiter {
    pub fn in_memory(max: u32, window: std::time::Duration) -> Self {
        Self { max, window: to_window(window), store: Store::Memory(Mutex::new(VecDeque::new())) }
    }

    /// Connects to Postgres and creates the hit table if missing.
    pub async fn postgres(database_url: &str, max: u32, window: std::time::Duration) -> Result<Self, RateLimitError> {
        let mut config = deadpool_postgres::Config::new();
        config.url = Some(database_url.to_string());
        let pool = config.create_pool(Some(Runtime::Tokio1), NoTls)?;

        let client = pool.get().await?;
        client.batch_execute(SCHEMA).await?;

        Ok(Self { max, window: to_window(window), store: Store::Postgres(pool) })
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Records a hit if the window has room. Store errors admit the request.
    pub async fn check(&self) -> Decision {
        match self.check_at(OffsetDateTime::now_utc()).await {
            Ok(decision) => decision,
            Err(err) => {
                tracing::warn!(error = %err, "rate limit store unavailable, allowing request");
                Decision::Allowed
            }
        }
    }

    async fn check_at(&self, now: OffsetDateTime) -> Result<Decision, RateLimitError> {
        match &self.store {
            Store::Memory(hits) => Ok(self.check_memory(hits, now)),
            Store::Postgres(pool) => self.check_postgres(pool, now).await,
        }
    }

    fn check_memory(&self, hits: &Mutex<VecDeque<OffsetDateTime>>, now: OffsetDateTime) -> Decision {
        let mut hits = hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let cutoff = now - self.window;

        while hits.front().is_some_and(|hit| *hit <= cutoff) {
            hits.pop_front();
        }

        if hits.len() >= self.max as usize {
            let oldest = hits.front().copied().unwrap_or(now);
            return Decision::Limited { retry_after: self.retry_after(oldest, now) };
        }

        hits.push_back(now);
        Decision::Allowed
    }

    async fn check_postgres(&self, pool: &Pool, now: OffsetDateTime) -> Result<Decision, RateLimitError> {
        let mut client = pool.get().await?;
        let tx = client.transaction().await?;

        tx.execute("SELECT pg_advisory_xact_lock($1)", &[&WINDOW_LOCK_KEY]).await?;
        tx.execute("DELETE FROM rate_limit_hits WHERE hit_at <= $1", &[&(now - self.window)])
            .await?;

        let row = tx
            .query_one("SELECT count(*), min(hit_at) FROM rate_limit_hits", &[])
            .await?;
        let count: i64 = row.get(0);
        let oldest: Option<OffsetDateTime> = row.get(1);

        let decision = if count >= i64::from(self.max) {
            Decision::Limited { retry_after: self.retry_after(oldest.unwrap_or(now), now) }
        } else {
            tx.execute(
                "INSERT INTO rate_limit_hits (id, hit_at) VALUES ($1, $2)",
                &[&Uuid::new_v4(), &now],
            )
            .await?;
            Decision::Allowed
        };

        tx.commit().await?;
        Ok(decision)
    }

    /// Whole seconds until `oldest` leaves the window, at least one.
    fn retry_after(&self, oldest: OffsetDateTime, now: OffsetDateTime) -> u64 {
        let remaining = oldest + self.window - now;
        let secs = remaining.whole_seconds() + i64::from(remaining.subsec_nanoseconds() > 0);
        u64::try_from(secs).unwrap_or(0).max(1)
    }
}

fn to_window(window: std::time::Duration) -> Duration {
    Duration::try_from(window).unwrap_or(Duration::MAX)
}

/// Rejects requests once the shared window is full.
pub async fn enforce_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    if let Some(limiter) = &state.rate_limiter
        && let Decision::Limited { retry_after } = limiter.check().await
    {
        tracing::info!(retry_after, max = limiter.max(), "rate limit exceeded");
        return Err(ApiError::RateLimited { retry_after });
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32) -> RateLimiter {
        RateLimiter::in_memory(max, std::time::Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_allows_up_to_max() {
        let limiter = limiter(3);
        let now = OffsetDateTime::now_utc();

        for _ in 0..3 {
            assert_eq!(limiter.check_at(now).await.unwrap(), Decision::Allowed);
        }
        assert!(matches!(limiter.check_at(now).await.unwrap(), Decision::Limited { .. }));
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = limiter(2);
        let start = OffsetDateTime::now_utc();

        assert_eq!(limiter.check_at(start).await.unwrap(), Decision::Allowed);
        assert_eq!(limiter.check_at(start + Duration::seconds(30)).await.unwrap(), Decision::Allowed);
        assert_eq!(
            limiter.check_at(start + Duration::seconds(45)).await.unwrap(),
            Decision::Limited { retry_after: 15 }
        );

        // first hit expires at start + 60s
        assert_eq!(limiter.check_at(start + Duration::seconds(60)).await.unwrap(), Decision::Allowed);
    }

    #[tokio::test]
    async fn test_rejected_requests_do_not_consume_the_window() {
        let limiter = limiter(1);
        let start = OffsetDateTime::now_utc();

        assert_eq!(limiter.check_at(start).await.unwrap(), Decision::Allowed);
        for offset in [10, 20, 30] {
            assert!(matches!(
                limiter.check_at(start + Duration::seconds(offset)).await.unwrap(),
                Decision::Limited { .. }
            ));
        }
        assert_eq!(limiter.check_at(start + Duration::seconds(61)).await.unwrap(), Decision::Allowed);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let limiter = limiter(1);
        let now = OffsetDateTime::now_utc();
        assert_eq!(limiter.retry_after(now - Duration::milliseconds(59_500), now), 1);
        assert_eq!(limiter.retry_after(now - Duration::seconds(10), now), 50);
    }

    #[tokio::test]
    async fn test_zero_max_always_limits() {
        let limiter = limiter(0);
        assert!(matches!(limiter.check().await, Decision::Limited { .. }));
    }
}
