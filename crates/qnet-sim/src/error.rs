//! Error types for the network simulator.

use std::string::FromUtf8Error;

use qnet_core::StateError;
use thiserror::Error;

use crate::node::NodeId;

/// Errors surfaced by network and protocol operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// An operation addressed a node that was never registered.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// Registration collided with an existing node id.
    #[error("node {0} already registered")]
    NodeExists(NodeId),

    /// A protocol step required entanglement the registry does not hold.
    #[error("nodes {0} and {1} are not entangled")]
    NotEntangled(NodeId, NodeId),

    /// Encryption or decryption without a previously agreed key.
    #[error("no shared key between {0} and {1}")]
    NoSharedKey(NodeId, NodeId),

    /// The estimated error rate crossed the abort threshold; no key was
    /// stored on either endpoint.
    #[error("QBER {qber:.4} exceeds abort threshold {limit:.4}")]
    QberTooHigh { qber: f64, limit: f64 },

    /// A direct state transfer lost its carrier in the link.
    #[error("tunneling from {0} to {1} failed, carrier lost")]
    TunnelFailed(NodeId, NodeId),

    /// The round cap ran out before enough sifted bits survived.
    #[error("rounds exhausted with {got} of {needed} key bits sifted")]
    InsufficientKeyMaterial { needed: usize, got: usize },

    /// A caller-supplied parameter was out of range or malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The underlying state engine rejected an operation.
    #[error(transparent)]
    Core(#[from] StateError),

    /// A decrypted payload was not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    BadPayload(#[from] FromUtf8Error),
}

/// Convenience alias for simulator results.
pub type SimResult<T> = Result<T, SimError>;
