//! Schema provisioning command
//!
//! Runs the same idempotent provisioning the server does at startup, but
//! reports failures as an error exit.

use anyhow::{bail, Context, Result};
use clap::Args;

use bookshelf_server::db::{close_pool, ensure_schema, init_pool};

use crate::config::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Provision the schema and print what was applied
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let url = args
        .database
        .url()
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;

    let pool = init_pool(Some(url))
        .await
        .context("Failed to connect to database")?
        .context("DATABASE_URL not set")?;

    let report = ensure_schema(&pool).await;
    close_pool(&pool).await;

    for step in &report.applied {
        println!("ok      {step}");
    }
    for (step, error) in &report.failed {
        println!("failed  {step}: {error}");
    }

    if !report.is_complete() {
        bail!("{} schema step(s) failed", report.failed.len());
    }
    Ok(())
}
