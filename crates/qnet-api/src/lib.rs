//! HTTP API for the qnet quantum network simulator.
//!
//! Exposes node registration, entanglement distribution, entanglement-based
//! key exchange, encrypted messaging and node status over JSON, all driving
//! one shared [`qnet_sim::NetworkSimulator`] behind a write lock.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qnet_api::{AppState, ServerConfig, create_router};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let bind_address = config.bind_address;
//!     let state = Arc::new(AppState::with_config(config));
//!
//!     let app = create_router(state);
//!     let listener = tokio::net::TcpListener::bind(bind_address).await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod api;
pub mod dto;
pub mod error;
pub mod server;
pub mod state;

pub use dto::{
    EntangleRequest, EntangleResponse, ExchangeKeysRequest, ExchangeKeysResponse, HealthResponse,
    NodeView, ReceiveMessageRequest, ReceiveMessageResponse, RegisterRequest, SendMessageRequest,
};
pub use error::ApiError;
pub use server::{create_router, serve};
pub use state::{AppState, ServerConfig};
