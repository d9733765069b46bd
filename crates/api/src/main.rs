//! API server entry point.

use std::sync::Arc;

use api::AppState;
use api::config::Config;
use event_sink::LoggingEventSink;
use metrics_exporter_prometheus::PrometheusHandle;
use read_cache::{CacheBackend, InMemoryReadCache};
use sale_store::{InMemorySaleStore, PostgresSaleStore, SaleStore};
use sales::SaleLifecycleService;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM), then cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }

    shutdown.cancel();
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Pick the sale store
    match config.database_url.clone() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await
                .expect("failed to connect to database");
            let store = PostgresSaleStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL sale store");
            with_store(config, store, metrics_handle).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sales are kept in memory");
            with_store(config, InMemorySaleStore::new(), metrics_handle).await;
        }
    }
}

/// Picks the read cache for `store`, then serves.
async fn with_store<S>(config: Config, store: S, metrics_handle: PrometheusHandle)
where
    S: SaleStore + 'static,
{
    #[cfg(feature = "redis")]
    if let Some(url) = config.redis_url.clone() {
        let cache = read_cache::RedisReadCache::connect(&url)
            .await
            .expect("failed to connect to Redis");
        tracing::info!("using Redis read cache");
        return serve(config, store, cache, metrics_handle).await;
    }

    #[cfg(not(feature = "redis"))]
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL is set but the redis feature is disabled, using in-memory cache");
    }

    serve(config, store, InMemoryReadCache::new(), metrics_handle).await;
}

async fn serve<S, C>(config: Config, store: S, cache: C, metrics_handle: PrometheusHandle)
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
{
    // 4. Build the application
    let shutdown = CancellationToken::new();
    let service = SaleLifecycleService::new(store, cache, LoggingEventSink::new());
    let state = Arc::new(AppState::new(service, shutdown.clone()));
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
