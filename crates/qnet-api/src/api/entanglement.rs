//! Entanglement distribution endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::dto::{EntangleRequest, EntangleResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/entangle - Distribute a Bell pair between two nodes.
pub async fn entangle(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EntangleRequest>,
) -> Result<Json<EntangleResponse>, ApiError> {
    let mut sim = state.sim.write().await;
    let report = sim.entangle(req.node1, req.node2)?;
    Ok(Json(EntangleResponse {
        node1: req.node1,
        node2: req.node2,
        pair_id: report.pair.0,
        bell: report.bell,
        fidelity: report.fidelity,
    }))
}
