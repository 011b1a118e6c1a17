//! HTTP server: router assembly and serve loop.

pub mod api;
pub mod auth;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::ServiceState;

/// Assemble the full application router. Everything under `/api/v0` sits
/// behind Basic authentication; the status endpoints do not.
pub fn router(state: ServiceState) -> Router {
    let api = api::v0::router(state.clone()).layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_basic_auth,
    ));

    Router::new()
        .nest("/api/v0", api)
        .nest("/_status", health::router())
        // document uploads may carry up to 256MB of content
        .layer(DefaultBodyLimit::max(
            document_store::MAX_CONTENT_SIZE + 4096,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on an already-bound listener until the task is cancelled
/// or the process receives ctrl-c.
pub async fn serve(listener: TcpListener, state: ServiceState) -> Result<(), std::io::Error> {
    info!(addr = %listener.local_addr()?, "http server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install ctrl-c handler");
    }
}
