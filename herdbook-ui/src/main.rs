//! herdbook-ui - web front end for the herd record book
//!
//! Opens (or creates) the record store under the root folder and serves the
//! menu page plus its JSON API on the local machine.

use anyhow::{Context, Result};
use clap::Parser;
use herdbook_common::config::{self, CliOverrides};
use herdbook_common::db::init_database;
use herdbook_ui::{build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "herdbook-ui", version, about = "Cattle shipment record book")]
struct Args {
    /// Folder holding herdbook.db
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Config file instead of ~/.config/herdbook/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            root_folder: self.root_folder.clone(),
            port: self.port,
            bind_address: self.bind.clone(),
            log_level: self.log_level.clone(),
            config_file: self.config.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Level from the command line until the config file has been read
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let initial = args.log_level.clone().unwrap_or_else(|| config::DEFAULT_LOG_LEVEL.to_string());
    let (filter, filter_handle) = reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new(&initial)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting herdbook-ui v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = config::resolve(&args.overrides());
    if !from_env && config.log_level != initial {
        filter_handle
            .modify(|f| *f = EnvFilter::new(&config.log_level))
            .context("Failed to apply configured log level")?;
    }
    info!("Root folder: {}", config.root_folder.display());

    let db_path = config::ensure_root_folder(&config).context("Failed to prepare root folder")?;
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Record store ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(pool));

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("herdbook-ui listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
