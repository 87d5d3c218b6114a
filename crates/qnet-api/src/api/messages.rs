//! Encrypted messaging endpoints.

use std::sync::Arc;

use axum::{Json, extract::State};

use qnet_sim::Packet;

use crate::dto::{ReceiveMessageRequest, ReceiveMessageResponse, SendMessageRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/send_message - Encrypt a message into a packet.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Packet>, ApiError> {
    let mut sim = state.sim.write().await;
    let packet = sim.send_packet(req.sender_id, req.receiver_id, &req.message)?;
    Ok(Json(packet))
}

/// POST /api/receive_message - Open a packet at its receiver.
pub async fn receive_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReceiveMessageRequest>,
) -> Result<Json<ReceiveMessageResponse>, ApiError> {
    if req.receiver_id != req.packet.receiver {
        return Err(ApiError::BadRequest(format!(
            "packet is addressed to node {}, not node {}",
            req.packet.receiver, req.receiver_id
        )));
    }

    let sim = state.sim.read().await;
    let message = sim.receive_packet(&req.packet)?;
    Ok(Json(ReceiveMessageResponse {
        sender: req.packet.sender,
        receiver: req.packet.receiver,
        message,
    }))
}
