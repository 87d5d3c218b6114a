//! Network nodes and the key material they hold.

use std::collections::HashMap;
use std::fmt;

use qnet_core::QuantumState;
use serde::{Deserialize, Serialize};

use crate::cipher::keystream_xor;
use crate::error::SimResult;

/// Identifier of a node in the network.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Symmetric key agreed between two endpoints, with the quality figures of
/// the run that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedKey {
    bytes: Vec<u8>,
    qber: f64,
    pairs_used: usize,
}

impl SharedKey {
    pub(crate) fn new(bytes: Vec<u8>, qber: f64, pairs_used: usize) -> Self {
        Self {
            bytes,
            qber,
            pairs_used,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Error rate estimated on the sacrificed check bits.
    pub fn qber(&self) -> f64 {
        self.qber
    }

    /// How many Bell pairs the agreement run consumed.
    pub fn pairs_used(&self) -> usize {
        self.pairs_used
    }

    /// XOR-encrypts `plaintext` under this key.
    pub fn encrypt(&self, plaintext: &[u8]) -> SimResult<Vec<u8>> {
        keystream_xor(&self.bytes, plaintext)
    }

    /// XOR-decrypts `ciphertext` under this key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> SimResult<Vec<u8>> {
        keystream_xor(&self.bytes, ciphertext)
    }

    /// Lowercase hex rendering, for reports and logs.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// One endpoint: a local data qubit plus protocol bookkeeping.
///
/// Peer lists and stored keys are mutated only through the network and
/// simulator layers, which keeps them consistent with the entanglement
/// registry.
#[derive(Debug, Clone)]
pub struct NetworkNode {
    id: NodeId,
    position: (f64, f64),
    data_qubit: QuantumState,
    peers: Vec<NodeId>,
    keys: HashMap<NodeId, SharedKey>,
}

impl NetworkNode {
    pub fn new(id: NodeId, position: (f64, f64)) -> Self {
        Self {
            id,
            position,
            data_qubit: QuantumState::zero(1),
            peers: Vec::new(),
            keys: HashMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// The node's local one-qubit register.
    pub fn data_qubit(&self) -> &QuantumState {
        &self.data_qubit
    }

    pub(crate) fn data_qubit_mut(&mut self) -> &mut QuantumState {
        &mut self.data_qubit
    }

    /// Purity of the data qubit, 1.0 when untouched by noise.
    pub fn purity(&self) -> f64 {
        self.data_qubit.purity()
    }

    /// Nodes this one currently shares registered entanglement with.
    pub fn peers(&self) -> &[NodeId] {
        &self.peers
    }

    pub fn is_peer(&self, other: NodeId) -> bool {
        self.peers.contains(&other)
    }

    pub(crate) fn add_peer(&mut self, other: NodeId) {
        if !self.peers.contains(&other) {
            self.peers.push(other);
        }
    }

    pub(crate) fn remove_peer(&mut self, other: NodeId) {
        self.peers.retain(|&p| p != other);
    }

    /// The key agreed with `peer`, if any.
    pub fn key_for(&self, peer: NodeId) -> Option<&SharedKey> {
        self.keys.get(&peer)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn store_key(&mut self, peer: NodeId, key: SharedKey) {
        self.keys.insert(peer, key);
    }

    pub(crate) fn drop_key(&mut self, peer: NodeId) {
        self.keys.remove(&peer);
    }
}
