//! # Review Gateway CLI (`rgw`)
//!
//! The `rgw` binary starts the HTTP gateway or runs a one-off review from
//! the command line.
//!
//! ## Usage
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! rgw --config ./config/rgw.toml serve
//! rgw review src/lib.rs --source "my-crate"
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rgw serve` | Start the HTTP server |
//! | `rgw review <file>` | Review a local file and print the result |

mod config;
mod gemini;
mod review;
mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Review Gateway — relay code snippets to the Gemini API for
/// AI-generated code review.
#[derive(Parser)]
#[command(
    name = "rgw",
    about = "Review Gateway — relay code snippets to the Gemini API for AI-generated review",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// All fields have defaults; a missing file is fine as long as
    /// GEMINI_API_KEY is set in the environment.
    #[arg(long, global = true, default_value = "./config/rgw.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves `GET /` and `POST /review`
    /// until terminated.
    Serve,

    /// Review a local file and print the result.
    ///
    /// Runs the same validate/call/extract path as `POST /review`
    /// without the HTTP hop.
    Review {
        /// Path to the file to review.
        file: PathBuf,

        /// Source label included in the prompt. Defaults to the file name.
        #[arg(long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Review { file, source } => {
            review::run_review_file(&cfg, &file, source).await?;
        }
    }

    Ok(())
}
