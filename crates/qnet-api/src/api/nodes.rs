//! Node registration and status endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use qnet_sim::NodeId;

use crate::dto::{NodeView, RegisterRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/register - Register a node on the network.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<NodeView>), ApiError> {
    let mut sim = state.sim.write().await;
    if sim.num_nodes() >= state.config.max_nodes {
        return Err(ApiError::BadRequest(format!(
            "node capacity of {} reached",
            state.config.max_nodes
        )));
    }

    let position = req.position.unwrap_or((0.0, 0.0));
    sim.add_node(req.node_id, position)?;
    let node = sim.node(req.node_id)?;
    Ok((StatusCode::CREATED, Json(NodeView::from_node(node))))
}

/// GET /api/nodes - List all registered nodes.
pub async fn list_nodes(State(state): State<Arc<AppState>>) -> Json<Vec<NodeView>> {
    let sim = state.sim.read().await;
    let mut views: Vec<NodeView> = sim.nodes().map(NodeView::from_node).collect();
    views.sort_by_key(|view| view.node_id);
    Json(views)
}

/// GET /api/node_status/{node_id} - Status of one node.
pub async fn node_status(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<NodeId>,
) -> Result<Json<NodeView>, ApiError> {
    let sim = state.sim.read().await;
    let node = sim.node(node_id)?;
    Ok(Json(NodeView::from_node(node)))
}
