//! regcache - mirrors the customer registry and serves expiration views.

#![forbid(unsafe_code)]

use std::io;

use anyhow::{Context, Result};
use regcache_core::{ApiClient, CacheManager, Config};
use regcache_server::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file prefix inside `REGCACHE_LOG_DIR`
const LOG_FILE_PREFIX: &str = "regcache.log";

/// Initialize the tracing subscriber for logging.
///
/// Returns the appender guard when file logging is enabled; it must stay alive
/// for buffered lines to be flushed.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,regcache_core=info,regcache_server=info"));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Invalid configuration")?;
    let _log_guard = init_tracing(&config);
    info!(cache_file = %config.cache_file.display(), "regcache starting");

    let client = ApiClient::new(config.registry.clone())?;
    let store = CacheManager::new(config.cache_file.clone())?;
    let app = build_router(AppState::new(client, store));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("regcache listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    info!("regcache shutting down");
    Ok(())
}
