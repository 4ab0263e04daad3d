//! QueryPage Server: paginated, filterable list endpoints over SQL tables
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use querypage_api::AppState;
use querypage_cache::provider::CacheManager;
use querypage_core::config::AppConfig;
use querypage_core::error::AppError;
use querypage_core::traits::CacheProvider;
use querypage_database::DatabasePool;
use querypage_service::Paginator;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "querypage-server", version, about)]
struct Args {
    /// Directory holding `default.toml` and per-environment overrides.
    #[arg(long, env = "QUERYPAGE_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment name; selects `{config_dir}/{env}.toml`.
    #[arg(long, env = "QUERYPAGE_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppConfig::load(&args.config_dir, &args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting QueryPage v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection ──────────────────────────────
    let db_pool = DatabasePool::connect(&config.database).await?;
    let executor = Arc::new(db_pool.executor());

    // ── Step 2: Result cache ─────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = CacheManager::new(&config.cache).await?.map(Arc::new);
    if let Some(cache) = &cache {
        if !cache.health_check().await.unwrap_or(false) {
            tracing::warn!("Cache backend did not answer; results will be recomputed");
        }
    }

    // ── Step 3: Paginator ────────────────────────────────────────
    let paginator = Paginator::new(
        &config.paginate,
        executor,
        cache.as_ref().map(|c| c.provider()),
    );

    for source in &config.sources {
        tracing::info!(
            name = %source.name,
            table = %source.table,
            fields = source.fields.len(),
            cached = !source.cache_prefix.is_empty(),
            "List source registered"
        );
    }

    // ── Step 4: HTTP server ──────────────────────────────────────
    let config = Arc::new(config);
    let mut state = AppState::new(Arc::clone(&config), Arc::new(paginator))
        .with_db_pool(db_pool.clone());
    if let Some(cache) = cache {
        state = state.with_cache(cache);
    }
    let app = querypage_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("QueryPage server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db_pool.close().await;
    tracing::info!("QueryPage server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
