//! HTTP server command
//!
//! Connects the pool (fatal on failure), provisions the schema
//! (best-effort), serves until shutdown, then closes the pool.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use bookshelf_server::db::{close_pool, ensure_schema, init_pool, BookRepo};
use bookshelf_server::http::{run_server, ServerConfig};
use sqlx::PgPool;

use crate::config::DatabaseArgs;

/// Arguments for the serve command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout: u64,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

impl ServeArgs {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.server_config();
    tracing::info!("Starting bookshelf server on {}", config.bind_addr);

    // A configured database that cannot be reached is fatal; none at all is degraded mode
    let pool = init_pool(args.database.url())
        .await
        .context("Failed to connect to database")?;

    if let Some(pool) = &pool {
        ensure_schema(pool).await;
    }

    serve_until_shutdown(pool, config).await
}

/// Serve, then close the pool whether the server stopped cleanly or not.
async fn serve_until_shutdown(pool: Option<PgPool>, config: ServerConfig) -> Result<()> {
    let result = run_server(BookRepo::from_pool(pool.clone()), config)
        .await
        .context("Server error");

    if let Some(pool) = &pool {
        close_pool(pool).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn flags_build_server_config() {
        let harness = Harness::try_parse_from([
            "bookshelf",
            "--host",
            "127.0.0.1",
            "--port",
            "9090",
            "--request-timeout",
            "5",
        ])
        .unwrap();

        let config = harness.serve.server_config();
        assert_eq!(config.bind_addr, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(Harness::try_parse_from(["bookshelf", "--port", "99999"]).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(Harness::try_parse_from(["bookshelf", "--request-timeout", "0"]).is_err());
        assert!(Harness::try_parse_from(["bookshelf", "--request-timeout", "1"]).is_ok());
    }

    #[tokio::test]
    async fn pool_is_closed_when_bind_fails() {
        // Hold the port so the server cannot bind it
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ServerConfig {
            bind_addr: taken.local_addr().unwrap(),
            ..ServerConfig::default()
        };
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bookshelf")
            .unwrap();

        let result = serve_until_shutdown(Some(pool.clone()), config).await;

        assert!(result.is_err());
        assert!(pool.is_closed());
    }
}
