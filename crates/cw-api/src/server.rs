//! HTTP server
//!
//! Starts and manages the axum-based HTTP server.

use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use cw_relay::WebhookDispatcher;

use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: WebhookDispatcher,
    /// Token Meta must echo back on `GET /webhook`
    pub verify_token: String,
}

impl AppState {
    pub fn new(dispatcher: WebhookDispatcher, verify_token: impl Into<String>) -> Self {
        Self {
            dispatcher,
            verify_token: verify_token.into(),
        }
    }
}

/// Build the router with all layers applied
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server on all interfaces
pub async fn start_server(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server is running on port {}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
