//! bookshelf - read-only book catalog server
//!
//! Entry point for the `bookshelf` binary:
//! - `bookshelf` / `bookshelf serve`: run the HTTP API
//! - `bookshelf migrate`: provision the database schema and exit

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use commands::migrate::MigrateArgs;
use commands::serve::ServeArgs;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "bookshelf",
    author,
    version,
    about = "Read-only HTTP catalog of books and their chapters"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    /// Serve options used when no subcommand is given
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server (default)
    Serve(ServeArgs),
    /// Create the books/chapters tables and indexes if missing
    Migrate(MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = config::load_dotenv();
    let cli = Cli::parse();

    if let Err(e) = tracing_setup::init(&TracingConfig { debug: cli.debug }) {
        eprintln!("warning: logging disabled: {e}");
    }
    if let Some(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Some(Commands::Serve(args)) => commands::run_serve(args).await,
        Some(Commands::Migrate(args)) => commands::run_migrate(args).await,
        None => commands::run_serve(cli.serve).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::try_parse_from(["bookshelf", "--port", "3001"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, 3001);
    }

    #[test]
    fn migrate_subcommand_parses() {
        let cli = Cli::try_parse_from([
            "bookshelf",
            "migrate",
            "--database-url",
            "postgres://localhost/books",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Migrate(args)) => {
                assert_eq!(args.database.url(), Some("postgres://localhost/books"));
            }
            other => panic!("expected migrate, got {other:?}"),
        }
    }

    #[test]
    fn global_debug_flag() {
        let cli = Cli::try_parse_from(["bookshelf", "serve", "--debug"]).unwrap();
        assert!(cli.debug);
        let cli = Cli::try_parse_from(["bookshelf", "--debug", "migrate"]).unwrap();
        assert!(cli.debug);
    }
}
