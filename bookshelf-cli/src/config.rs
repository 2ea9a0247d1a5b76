//! Configuration shared by the subcommands
//!
//! Values come from flags, then the environment, then a `.env` file in the
//! working directory (loaded before argument parsing, never overriding
//! variables already set).

use std::path::PathBuf;

use clap::Args;

/// Load `.env` if present. Returns the file that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Database connection arguments
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// PostgreSQL connection string (unset = serve without a database)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

impl DatabaseArgs {
    /// The URL, with blank values treated as unset.
    pub fn url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
