//! HTTP serving layer
//!
//! Assembles the axum router over the store, the auth gate, and the ingest
//! pipeline, and runs the listener. Route paths mirror the original service
//! layout under `/api/v1`.

mod auth;
mod routes;

pub use auth::{AuthError, AuthGate, Identity};

use crate::config::Config;
use crate::storage::SqliteStore;
use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<Mutex<SqliteStore>>,
    pub auth: Arc<AuthGate>,
    /// Serializes triggered ingest runs
    pub ingest_gate: Arc<tokio::sync::Mutex<()>>,
    /// Cancels an in-flight ingest between categories on shutdown
    pub cancel: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore) -> Self {
        let auth = AuthGate::new(&config.auth);
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
            auth: Arc::new(auth),
            ingest_gate: Arc::new(tokio::sync::Mutex::new(())),
            cancel: CancellationToken::new(),
        }
    }
}

/// Builds the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/api/v1/auth/register", post(routes::register))
        .route("/api/v1/auth/login", post(routes::login))
        .route("/api/v1/auth/refresh", post(routes::refresh))
        .route("/api/v1/books", get(routes::list_books))
        .route("/api/v1/books/search", get(routes::search_books))
        .route("/api/v1/books/:id", get(routes::get_book))
        .route("/api/v1/categories", get(routes::list_categories))
        .route("/api/v1/stats/overview", get(routes::stats_overview))
        .route("/api/v1/stats/categories", get(routes::stats_categories))
        .route("/api/v1/ingest/trigger", post(routes::trigger_ingest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until interrupted
///
/// Ctrl-C first cancels any in-flight ingest at its next category checkpoint,
/// then stops the listener.
pub async fn run_server(config: Config, store: SqliteStore) -> crate::Result<()> {
    let bind_addr = config.server.bind_addr.clone();
    let state = AppState::new(config, store);
    let cancel = state.cancel.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
            cancel.cancel();
        })
        .await?;

    Ok(())
}
