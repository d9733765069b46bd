//! HTTP API server with observability for the sales system.
//!
//! Exposes the sale lifecycle as REST endpoints, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use event_sink::{EventSink, LoggingEventSink};
use metrics_exporter_prometheus::PrometheusHandle;
use read_cache::{CacheBackend, InMemoryReadCache};
use sale_store::{InMemorySaleStore, SaleStore};
use sales::SaleLifecycleService;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::sales::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, C, E>(state: Arc<AppState<S, C, E>>, metrics_handle: PrometheusHandle) -> Router
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    use routes::sales as handlers;

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/sales",
            post(handlers::create::<S, C, E>).get(handlers::list::<S, C, E>),
        )
        .route("/sales/date-range", get(handlers::date_range::<S, C, E>))
        .route("/sales/number/{number}", get(handlers::get_by_number::<S, C, E>))
        .route(
            "/sales/{id}",
            get(handlers::get::<S, C, E>)
                .put(handlers::update::<S, C, E>)
                .delete(handlers::delete::<S, C, E>),
        )
        .route("/sales/{id}/cancel", post(handlers::cancel::<S, C, E>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Application state backed entirely by in-memory collaborators.
pub type InMemoryAppState = AppState<InMemorySaleStore, InMemoryReadCache, LoggingEventSink>;

/// Creates application state with an in-memory store and cache and a
/// logging event sink.
pub fn create_default_state(shutdown: CancellationToken) -> Arc<InMemoryAppState> {
    let service = SaleLifecycleService::new(
        InMemorySaleStore::new(),
        InMemoryReadCache::new(),
        LoggingEventSink::new(),
    );
    Arc::new(AppState::new(service, shutdown))
}
