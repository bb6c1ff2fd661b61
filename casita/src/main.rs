#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A web API for place listings.
//!
//! Casita is split into several subcrates that work in collaboration.
//!
//! - [casita-settings](../casita_settings/index.html)
//! - [casita-store](../casita_store/index.html)
//! - [casita-web](../casita_web/index.html)
//! - [casita-integration-tests](../casita_integration_tests/index.html)

use std::net::TcpListener;
use std::sync::Arc;

use anyhow::{Context, Result};
use casita_settings::{LogFormat, Settings, StorageBackend};
use casita_store::{FileStorage, MemoryStorage, Storage};
use tracing_actix_web_mozlog::MozLogFormatLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings)?;

    let storage = open_storage(&settings).context("Opening storage")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;

    tracing::info!(
        r#type = "startup",
        env = %settings.env,
        listen = %settings.http.listen,
        "Starting casita"
    );

    casita_web::run(listener, storage, settings)
        .context("Starting casita-web server")?
        .await
        .context("Running casita-web server")?;

    Ok(())
}

/// Open the storage backend named by the settings.
fn open_storage(settings: &Settings) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match settings.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => {
            Arc::new(FileStorage::open(&settings.storage.path).with_context(|| {
                format!(
                    "Opening storage file {}",
                    settings.storage.path.display()
                )
            })?)
        }
    };
    Ok(storage)
}

/// Set up logging for Casita, based on the logging settings.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();

    match settings.logging.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::MozLog => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(MozLogFormatLayer::new("casita", std::io::stdout));
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
