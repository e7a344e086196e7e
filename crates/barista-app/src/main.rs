//! Barista server entry point.
//!
//! Loads configuration, opens the catalog database, optionally seeds the demo
//! catalog, and serves the chat API.

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use barista_api::AppState;
use barista_core::config::BaristaConfig;
use barista_storage::{apply_seed, Database, SeedData};

use cli::CliArgs;

/// How often expired sessions are swept.
const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Load before tracing so the configured level applies; report
    // any load problem once the subscriber is up.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = match BaristaConfig::load(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (BaristaConfig::default(), Some(e)),
    };
    config.general.port = args.resolve_port(config.general.port);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Barista v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) if config_file.exists() => {
            tracing::warn!(path = %config_file.display(), error = %e, "Invalid config, using defaults")
        }
        Some(_) => {
            tracing::info!(path = %config_file.display(), "No config file, using defaults")
        }
    }
    config.validate()?;

    // Storage.
    let data_dir = cli::expand_home(&config.general.data_dir);
    let database = Arc::new(Database::open_in(&data_dir)?);
    let db_location = database.location().to_string();

    let state = AppState::new(config, database);

    if args.seed_demo {
        let report = apply_seed(&SeedData::demo()?, &state.catalog, &state.knowledge)?;
        tracing::info!(
            menu = report.menu,
            art = report.art,
            workshops = report.workshops,
            knowledge = report.knowledge,
            "Demo catalog seeded"
        );
    } else {
        let entries = state.knowledge.rebuild()?;
        if entries == 0 {
            tracing::warn!("Knowledge base is empty; run with --seed-demo for sample answers");
        }
    }

    let (menu, art, workshops) = state.catalog.counts()?;
    tracing::info!(menu, art, workshops, db = %db_location, "Catalog ready");

    // Session sweeper.
    let sessions = Arc::clone(&state.sessions);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.prune_expired();
        }
    });

    barista_api::start_server(state).await?;
    Ok(())
}
