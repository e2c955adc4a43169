mod app;
mod view;

use std::{
    fs::{self, OpenOptions},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use banknotes_core::{
    config::{self, AppConfig},
    preferences::Preferences,
    repository::{CatalogStore, CatalogSync, HttpCatalogApi},
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(api = %config.api_base_url, session = config.session.is_some(), "starting");

    let store = CatalogStore::new();
    let api = Arc::new(HttpCatalogApi::from_config(&config)?);
    let prefs = Preferences::open(config.preferences_path());

    let sync = CatalogSync::new(api, store.clone(), &config);
    let (sync_tx, sync_rx) = mpsc::channel(32);
    tokio::spawn(async move {
        if let Err(err) = sync.run(sync_tx).await {
            error!("catalog sync task error: {err:#}");
        }
    });

    let mut app = app::CatalogApp::new(store, prefs);
    app.attach_sync(sync_rx);
    app.run().await
}

/// Log to `logs/banknotes.log`; stdout belongs to the terminal UI.
fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("banknotes.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
