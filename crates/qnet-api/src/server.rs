//! Axum server setup and routing.

use std::io;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/register", post(api::nodes::register))
        .route("/nodes", get(api::nodes::list_nodes))
        .route("/node_status/{node_id}", get(api::nodes::node_status))
        .route("/entangle", post(api::entanglement::entangle))
        .route("/exchange_keys", post(api::keys::exchange_keys))
        .route("/send_message", post(api::messages::send_message))
        .route("/receive_message", post(api::messages::receive_message));

    Router::new()
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        // TODO: Make CORS configurable; restrict origins in production
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve the router until shutdown.
pub async fn serve(state: Arc<AppState>) -> io::Result<()> {
    let bind_address = state.config.bind_address;
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!("listening on http://{}", bind_address);
    axum::serve(listener, create_router(state)).await
}
