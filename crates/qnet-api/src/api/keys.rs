//! Key exchange endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::dto::{ExchangeKeysRequest, ExchangeKeysResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/exchange_keys - Agree a shared key over an entangled link.
pub async fn exchange_keys(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExchangeKeysRequest>,
) -> Result<Json<ExchangeKeysResponse>, ApiError> {
    let key_bytes = req.key_bytes.unwrap_or(state.config.default_key_bytes);
    if key_bytes == 0 {
        return Err(ApiError::BadRequest("key_bytes must be positive".into()));
    }

    let mut sim = state.sim.write().await;
    let outcome = sim.establish_key(req.node1, req.node2, key_bytes)?;
    Ok(Json(ExchangeKeysResponse {
        node1: req.node1,
        node2: req.node2,
        key_bytes: outcome.key.len(),
        rounds: outcome.rounds,
        sifted: outcome.sifted,
        checked: outcome.checked,
        qber: outcome.qber,
    }))
}
