//! Topology: nodes, links and the entanglement registry.
//!
//! The registry keys pairs by the unordered endpoints, so
//! `entangle(a, b)` and `entangle(b, a)` address the same link. Peer lists
//! on the nodes are mutated only here, next to the registry, which keeps the
//! two views from drifting apart.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use qnet_core::{
    BellState, EntangledPair, NoiseChannel, PairHalf, PairId, QuantumState, StateError,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::node::{NetworkNode, NodeId};

/// Canonical unordered pair of node ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PairKey(NodeId, NodeId);

impl PairKey {
    /// Orders the endpoints so `(a, b)` and `(b, a)` collide.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn low(&self) -> NodeId {
        self.0
    }

    pub fn high(&self) -> NodeId {
        self.1
    }

    /// Which half of a registered pair `node` holds, `None` for outsiders.
    ///
    /// Pairs are always prepared with half A at the low endpoint.
    pub fn half_of(&self, node: NodeId) -> Option<PairHalf> {
        if node == self.0 {
            Some(PairHalf::A)
        } else if node == self.1 {
            Some(PairHalf::B)
        } else {
            None
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.0 == node || self.1 == node
    }
}

/// Per-link noise and transport parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkProfile {
    /// Depolarizing strength applied to the transmitted half of each pair.
    pub noise: f64,
    /// Success probability of a direct tunneling attempt.
    pub tunnel_success: f64,
    /// Classical bit-flip probability for coded payloads.
    pub flip_probability: f64,
}

impl Default for LinkProfile {
    fn default() -> Self {
        Self {
            noise: 0.05,
            tunnel_success: 0.5,
            flip_probability: 0.05,
        }
    }
}

impl LinkProfile {
    pub fn validate(&self) -> SimResult<()> {
        for (name, value) in [
            ("noise", self.noise),
            ("tunnel_success", self.tunnel_success),
            ("flip_probability", self.flip_probability),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(SimError::InvalidParameter(format!(
                    "link {name} {value} must lie in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// The quantum channel this link applies to a transiting qubit.
    pub fn channel(&self) -> SimResult<NoiseChannel> {
        Ok(NoiseChannel::depolarizing(self.noise).map_err(StateError::from)?)
    }

    /// A lossless, always-succeeding link, handy in tests.
    pub fn ideal() -> Self {
        Self {
            noise: 0.0,
            tunnel_success: 1.0,
            flip_probability: 0.0,
        }
    }
}

/// Nodes, per-link profiles and the live entanglement registry.
#[derive(Debug, Default)]
pub struct QuantumNetwork {
    nodes: HashMap<NodeId, NetworkNode>,
    links: HashMap<PairKey, LinkProfile>,
    pairs: HashMap<PairKey, EntangledPair>,
    default_link: LinkProfile,
    next_pair: u64,
}

impl QuantumNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node; the id must be unused.
    pub fn add_node(&mut self, id: NodeId, position: (f64, f64)) -> SimResult<&NetworkNode> {
        if self.nodes.contains_key(&id) {
            return Err(SimError::NodeExists(id));
        }
        let node = self.nodes.entry(id).or_insert(NetworkNode::new(id, position));
        debug!(node = %id, "node registered");
        Ok(node)
    }

    pub fn node(&self, id: NodeId) -> SimResult<&NetworkNode> {
        self.nodes.get(&id).ok_or(SimError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> SimResult<&mut NetworkNode> {
        self.nodes.get_mut(&id).ok_or(SimError::NodeNotFound(id))
    }

    /// Unregisters a node, dropping its pairs, links and the keys other
    /// nodes held for it.
    pub fn remove_node(&mut self, id: NodeId) -> SimResult<NetworkNode> {
        let node = self.nodes.remove(&id).ok_or(SimError::NodeNotFound(id))?;
        self.pairs.retain(|key, _| !key.touches(id));
        self.links.retain(|key, _| !key.touches(id));
        for other in self.nodes.values_mut() {
            other.remove_peer(id);
            other.drop_key(id);
        }
        debug!(node = %id, "node removed");
        Ok(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NetworkNode> {
        self.nodes.values()
    }

    /// The profile governing the link between two nodes.
    pub fn link(&self, a: NodeId, b: NodeId) -> LinkProfile {
        self.links
            .get(&PairKey::new(a, b))
            .copied()
            .unwrap_or(self.default_link)
    }

    /// Overrides the profile for one link; both endpoints must exist.
    pub fn set_link(&mut self, a: NodeId, b: NodeId, profile: LinkProfile) -> SimResult<()> {
        profile.validate()?;
        self.node(a)?;
        self.node(b)?;
        self.links.insert(PairKey::new(a, b), profile);
        Ok(())
    }

    pub fn default_link(&self) -> LinkProfile {
        self.default_link
    }

    /// Replaces the fallback profile. Validity is enforced where profiles
    /// are used, so a bad default surfaces on the first operation over it.
    pub fn set_default_link(&mut self, profile: LinkProfile) {
        self.default_link = profile;
    }

    /// Distributes a Bell pair between two registered nodes through the
    /// link's noise channel and records it.
    ///
    /// Re-entangling an already linked pair replaces the old registry entry
    /// with a fresh pair.
    pub fn entangle(&mut self, a: NodeId, b: NodeId) -> SimResult<&EntangledPair> {
        if a == b {
            return Err(SimError::InvalidParameter(format!(
                "node {a} cannot entangle with itself"
            )));
        }
        self.node(a)?;
        self.node(b)?;

        let profile = self.link(a, b);
        profile.validate()?;
        let channel = profile.channel()?;
        self.next_pair += 1;
        let id = PairId(self.next_pair);
        let pair = EntangledPair::prepare(id, BellState::PhiPlus, Some(&channel))?;

        let key = PairKey::new(a, b);
        self.node_mut(a)?.add_peer(b);
        self.node_mut(b)?.add_peer(a);
        debug!(%a, %b, pair = %id, "pair registered");
        Ok(match self.pairs.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(pair);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(pair),
        })
    }

    /// Whether a live pair is registered between the two nodes, in either
    /// argument order.
    pub fn is_entangled(&self, a: NodeId, b: NodeId) -> bool {
        self.pairs.contains_key(&PairKey::new(a, b))
    }

    /// The registered pair for this link.
    pub fn pair(&self, a: NodeId, b: NodeId) -> SimResult<&EntangledPair> {
        self.pairs
            .get(&PairKey::new(a, b))
            .ok_or(SimError::NotEntangled(a, b))
    }

    /// Removes and returns the registered pair, along with which halves the
    /// two argument nodes hold, and clears the peer marks.
    pub fn take_pair(
        &mut self,
        a: NodeId,
        b: NodeId,
    ) -> SimResult<(EntangledPair, PairHalf, PairHalf)> {
        let key = PairKey::new(a, b);
        let pair = self
            .pairs
            .remove(&key)
            .ok_or(SimError::NotEntangled(a, b))?;
        // Both nodes exist whenever a pair is registered between them.
        self.node_mut(a)?.remove_peer(b);
        self.node_mut(b)?.remove_peer(a);
        let half_a = key.half_of(a).unwrap_or(PairHalf::A);
        Ok((pair, half_a, half_a.other()))
    }

    /// Drops the registered pair without consuming it for anything.
    pub fn break_entanglement(&mut self, a: NodeId, b: NodeId) -> SimResult<()> {
        let (_, _, _) = self.take_pair(a, b)?;
        debug!(%a, %b, "entanglement broken");
        Ok(())
    }

    /// A node's qubit, detached for transport. The slot re-initializes to
    /// `|0⟩`, honoring no-cloning.
    pub fn detach_qubit(&mut self, id: NodeId) -> SimResult<QuantumState> {
        let node = self.node_mut(id)?;
        Ok(std::mem::replace(node.data_qubit_mut(), QuantumState::zero(1)))
    }

    /// Installs a transported qubit in a node's slot.
    pub fn attach_qubit(&mut self, id: NodeId, qubit: QuantumState) -> SimResult<()> {
        *self.node_mut(id)?.data_qubit_mut() = qubit;
        Ok(())
    }
}
