//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. The pool is built once
//! at startup and closed once at shutdown.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Ceiling on concurrently open connections.
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

/// Idle connections kept ready.
const DEFAULT_MIN_CONNECTIONS: u32 = 5;

/// Connections older than this are retired, so backends recycled by the
/// hosting infrastructure are never reused.
const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_lifetime: DEFAULT_MAX_LIFETIME,
        }
    }
}

impl PoolSettings {
    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .max_lifetime(self.max_lifetime)
    }
}

/// Initialize the pool, or run without one.
///
/// A missing or blank `database_url` puts the server in degraded mode:
/// no pool is created and `Ok(None)` is returned. Any other failure
/// (bad credentials, unreachable host) is an error the caller must treat
/// as fatal.
///
/// # Example
///
/// ```ignore
/// let pool = init_pool(std::env::var("DATABASE_URL").ok().as_deref()).await?;
/// ```
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    match database_url.map(str::trim) {
        Some(url) if !url.is_empty() => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(url).await?;
            tracing::info!("Connected to PostgreSQL");
            Ok(Some(pool))
        }
        _ => {
            tracing::warn!("DATABASE_URL is not set; data routes will answer 503");
            Ok(None)
        }
    }
}

/// Create a PostgreSQL connection pool with the default limits.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_settings(database_url, PoolSettings::default()).await
}

/// Create a PostgreSQL connection pool with custom limits.
///
/// Connects eagerly so a bad URL surfaces here rather than on the first
/// request.
pub async fn create_pool_with_settings(
    database_url: &str,
    settings: PoolSettings,
) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        max_lifetime_secs = settings.max_lifetime.as_secs(),
        "building connection pool"
    );
    settings.options().connect(database_url).await
}

/// Close the pool, waiting for checked-out connections to come back.
pub async fn close_pool(pool: &PgPool) {
    pool.close().await;
    tracing::info!("Database pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_connections, 25);
        assert_eq!(settings.min_connections, 5);
        assert_eq!(settings.max_lifetime, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn missing_url_is_degraded_mode() {
        assert!(init_pool(None).await.unwrap().is_none());
        assert!(init_pool(Some("")).await.unwrap().is_none());
        assert!(init_pool(Some("   ")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_url_is_an_error() {
        assert!(init_pool(Some("not a url")).await.is_err());
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p bookshelf-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
        close_pool(&pool).await;
        assert!(pool.is_closed());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_pool_access() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        // More tasks than the connection ceiling
        let handles: Vec<_> = (0..40)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let result: (i32,) = sqlx::query_as("SELECT $1::int")
                        .bind(i)
                        .fetch_one(&pool)
                        .await
                        .expect("concurrent query failed");
                    result.0
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.expect("task panicked");
            assert_eq!(result, i as i32);
        }
        assert!(pool.size() <= 25);
    }
}
