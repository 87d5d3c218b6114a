//! Data transfer objects for the network API.
//!
//! These types bridge internal simulator structures to JSON-serializable
//! request and response bodies.

use serde::{Deserialize, Serialize};

use qnet_core::BellState;
use qnet_sim::{NetworkNode, NodeId, Packet};

// ============================================================================
// Node DTOs
// ============================================================================

/// Request to register a node on the network.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Node identifier; must be unused.
    pub node_id: NodeId,
    /// Planar position, defaults to the origin.
    #[serde(default)]
    pub position: Option<(f64, f64)>,
}

/// One node as the API reports it.
#[derive(Debug, Serialize)]
pub struct NodeView {
    /// Node identifier.
    pub node_id: NodeId,
    /// Planar position.
    pub position: (f64, f64),
    /// Nodes this one currently shares live entanglement with.
    pub peers: Vec<NodeId>,
    /// Number of shared keys held.
    pub key_count: usize,
    /// Purity of the local data qubit (1.0 for a pure state).
    pub purity: f64,
}

impl NodeView {
    pub fn from_node(node: &NetworkNode) -> Self {
        Self {
            node_id: node.id(),
            position: node.position(),
            peers: node.peers().to_vec(),
            key_count: node.key_count(),
            purity: node.purity(),
        }
    }
}

// ============================================================================
// Entanglement DTOs
// ============================================================================

/// Request to entangle two nodes.
#[derive(Debug, Deserialize)]
pub struct EntangleRequest {
    pub node1: NodeId,
    pub node2: NodeId,
}

/// Response from a successful entanglement.
#[derive(Debug, Serialize)]
pub struct EntangleResponse {
    pub node1: NodeId,
    pub node2: NodeId,
    /// Registry id of the distributed pair.
    pub pair_id: u64,
    /// Which Bell state was prepared.
    pub bell: BellState,
    /// Fidelity against the ideal Bell state after link noise.
    pub fidelity: f64,
}

// ============================================================================
// Key exchange DTOs
// ============================================================================

/// Request to agree a shared key over an entangled link.
#[derive(Debug, Deserialize)]
pub struct ExchangeKeysRequest {
    pub node1: NodeId,
    pub node2: NodeId,
    /// Key length in bytes; server default when omitted.
    pub key_bytes: Option<usize>,
}

/// Report from a completed key exchange. Key material itself never leaves
/// the simulator.
#[derive(Debug, Serialize)]
pub struct ExchangeKeysResponse {
    pub node1: NodeId,
    pub node2: NodeId,
    /// Agreed key length in bytes.
    pub key_bytes: usize,
    /// Measurement rounds run.
    pub rounds: usize,
    /// Rounds surviving basis sifting.
    pub sifted: usize,
    /// Sifted bits sacrificed for error estimation.
    pub checked: usize,
    /// Estimated quantum bit error rate.
    pub qber: f64,
}

// ============================================================================
// Messaging DTOs
// ============================================================================

/// Request to encrypt and send a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: NodeId,
    pub receiver_id: NodeId,
    pub message: String,
}

/// Request to open a previously issued packet at its receiver.
#[derive(Debug, Deserialize)]
pub struct ReceiveMessageRequest {
    pub receiver_id: NodeId,
    pub packet: Packet,
}

/// Decrypted message as delivered to the receiver.
#[derive(Debug, Serialize)]
pub struct ReceiveMessageResponse {
    pub sender: NodeId,
    pub receiver: NodeId,
    pub message: String,
}

// ============================================================================
// Health check response
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status (always "ok" if responding).
    pub status: String,
    /// Server version.
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
