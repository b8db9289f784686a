//! Task Management API server.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `mongo`
//! - `MONGO_URI`: `MongoDB` connection URI (required when `STORAGE_MODE=mongo`)
//! - `MONGO_DATABASE`: database name (default: `gotask`)
//! - `MONGO_COLLECTION`: collection name (default: `tasks`)
//! - `STORE_TIMEOUT_MS`: per-call store deadline in milliseconds (default: `5000`)
//! - `HOST`: Server host address (default: `localhost`)
//! - `PORT`: Server port (default: `8080`)
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)
//! - `RUST_LOG`: Logging filter (default: `task_service=debug,tower_http=debug`)
//! - `LOG_FORMAT`: `text` (default) | `json`
//!
//! Any configuration or storage error at startup terminates the process with
//! exit status 1 before the listener is bound.

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use task_service::api::{AppConfig, AppState, create_router};
use task_service::config::{LogFormat, ServerConfig};
use task_service::infrastructure::RepositoryFactory;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const DEFAULT_LOG_FILTER: &str = "task_service=debug,tower_http=debug";

/// Reads `WORKER_THREADS`, warning on stderr and falling back to the runtime
/// default when the value is not a positive integer.
fn parse_worker_threads() -> Option<usize> {
    let value = std::env::var("WORKER_THREADS").ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<usize>() {
        Ok(0) => {
            eprintln!("Warning: WORKER_THREADS=0 is invalid (must be > 0), using default");
            None
        }
        Ok(threads) => Some(threads),
        Err(error) => {
            eprintln!(
                "Warning: WORKER_THREADS='{trimmed}' is not a valid number ({error}), using default"
            );
            None
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = parse_worker_threads() {
        builder.worker_threads(threads);
    }

    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Failed to create tokio runtime: {error}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async_main());
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn async_main() {
    let server_config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            // The subscriber is not installed yet.
            eprintln!("Configuration error: {error}");
            std::process::exit(1);
        }
    };

    init_tracing(server_config.log_format);
    tracing::info!("Starting Task Management API");

    let factory = match RepositoryFactory::from_env() {
        Ok(factory) => factory,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };

    let repository_config = factory.config();
    tracing::info!(
        storage_mode = ?repository_config.storage_mode,
        database = %repository_config.database_name,
        collection = %repository_config.collection_name,
        store_timeout = ?server_config.store_timeout,
        "Repository configuration loaded"
    );

    let task_repository = match factory.create().await {
        Ok(repository) => {
            tracing::info!("Task store initialized successfully");
            repository
        }
        Err(error) => {
            tracing::error!(%error, "Failed to initialize task store");
            std::process::exit(1);
        }
    };

    let state = AppState::with_config(
        task_repository,
        AppConfig {
            store_timeout: server_config.store_timeout,
        },
    );
    let application = create_router(state);

    let address = server_config.bind_address();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
