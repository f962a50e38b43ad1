// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// - config:    Configuration structs loaded from JSON
// - schema:    Movie catalog, page outcomes, blob info
// - source:    Upstream page sources (movie API)
// - collector: Sequential paginated collection
// - store:     Blob stores (Vercel Blob, local directory)
// - handler:   Scrape-and-upload entry point
// - server:    HTTP surface for the handler
// - test:      Shared test helpers
//
mod collector;
mod config;
mod handler;
mod schema;
mod server;
mod source;
mod store;

// ------------------------------------------------------------
// External dependencies
// ------------------------------------------------------------

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use log::info;
use rustls::crypto::{CryptoProvider, ring};

use config::Config;
use handler::CronHandler;
use source::build_source;
use store::build_store;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Collects paginated movie listings and uploads them as one JSON blob."
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, env = "COLLECTOR_CONFIG", default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape and upload once, print the response body (default)
    Run,

    /// Serve `/api/cron` over HTTP
    Serve {
        /// Listen address, overrides `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
}

/// rustls >= 0.23 needs an explicit process-wide provider before the
/// first TLS client is built. Succeeds if one is already installed.
pub(crate) fn install_crypto_provider() -> anyhow::Result<()> {
    if CryptoProvider::install_default(ring::default_provider()).is_err()
        && CryptoProvider::get_default().is_none()
    {
        bail!("failed to install rustls CryptoProvider");
    }
    Ok(())
}

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// - Install the rustls crypto provider
// - Load configuration
// - Initialize logging
// - Wire page source, blob store and handler
// - Run once or serve
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    install_crypto_provider()?;

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let default_level = if config.debug_log() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let handler = CronHandler::new(
        build_source(&config.upstream)?,
        build_store(&config.store)?,
        config.upstream.total_pages,
        config.store.pathname.clone(),
        config.store.access,
    );

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let response = handler.handle().await;
            println!("{}", serde_json::to_string_pretty(&response.body)?);

            if !response.is_success() {
                bail!("cron run failed with status {}", response.status);
            }
        }

        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            info!("Starting cron server");
            server::serve(handler, &bind).await?;
        }
    }

    Ok(())
}
