//! High-level protocol driver over a quantum network.
//!
//! [`NetworkSimulator`] is the single entry point the CLI and HTTP layers
//! talk to. It owns the network, one seedable RNG (so seeded runs replay
//! identically) and the lifetime counters, and sequences the per-operation
//! quantum mechanics: pair distribution, tunneling, teleportation, key
//! agreement, encrypted messaging and error repair.

use ndarray::Array1;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use qnet_core::{
    BellState, Gate, Measurement, PairId, PauliError, QuantumState, StateError,
};

use crate::correction::{RepetitionCode, classify_drift};
use crate::error::{SimError, SimResult};
use crate::network::{LinkProfile, QuantumNetwork};
use crate::node::{NetworkNode, NodeId, SharedKey};
use crate::packet::{Packet, PacketKind};
use crate::qkd::{self, QkdConfig, QkdOutcome};

/// Counters accumulated over a simulator's lifetime.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct SimStats {
    /// Bell pairs distributed: registry pairs plus key-agreement rounds.
    pub pairs_created: u64,
    pub keys_agreed: u64,
    pub packets_sent: u64,
    pub errors_injected: u64,
    pub errors_corrected: u64,
}

/// Report from a successful [`NetworkSimulator::entangle`] call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntangleReport {
    pub pair: PairId,
    pub bell: BellState,
    pub fidelity: f64,
}

/// Report from a [`NetworkSimulator::protected_send`] delivery.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectedDelivery {
    /// The coded packet as it crossed the link.
    pub packet: Packet,
    /// Majority-decoded logical bits.
    pub bits: Vec<u8>,
    /// Blocks the decoder had to repair.
    pub corrected: usize,
    /// Flips the channel actually applied.
    pub flipped: usize,
}

/// Protocol driver: the network plus randomness and counters.
#[derive(Debug)]
pub struct NetworkSimulator {
    network: QuantumNetwork,
    rng: StdRng,
    qkd: QkdConfig,
    stats: SimStats,
}

impl Default for NetworkSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSimulator {
    /// A simulator over an empty network, seeded from entropy.
    pub fn new() -> Self {
        Self {
            network: QuantumNetwork::new(),
            rng: StdRng::from_entropy(),
            qkd: QkdConfig::default(),
            stats: SimStats::default(),
        }
    }

    /// Reseeds the RNG so the whole run replays identically.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replaces the key-agreement tuning.
    #[must_use]
    pub fn with_qkd_config(mut self, config: QkdConfig) -> Self {
        self.qkd = config;
        self
    }

    /// Replaces the default link profile. An invalid profile surfaces on
    /// the first operation that uses it.
    #[must_use]
    pub fn with_default_link(mut self, link: LinkProfile) -> Self {
        self.network.set_default_link(link);
        self
    }

    // ------------------------------------------------------------------
    // Topology

    /// Registers a node at a position.
    pub fn add_node(&mut self, id: NodeId, position: (f64, f64)) -> SimResult<()> {
        self.network.add_node(id, position)?;
        info!(node = %id, ?position, "node joined the network");
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> SimResult<&NetworkNode> {
        self.network.node(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NetworkNode> {
        self.network.nodes()
    }

    pub fn num_nodes(&self) -> usize {
        self.network.len()
    }

    pub fn remove_node(&mut self, id: NodeId) -> SimResult<()> {
        self.network.remove_node(id)?;
        info!(node = %id, "node left the network");
        Ok(())
    }

    pub fn link(&self, a: NodeId, b: NodeId) -> LinkProfile {
        self.network.link(a, b)
    }

    pub fn set_link(&mut self, a: NodeId, b: NodeId, profile: LinkProfile) -> SimResult<()> {
        self.network.set_link(a, b, profile)
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn qkd_config(&self) -> QkdConfig {
        self.qkd
    }

    /// Re-initializes a node's data qubit to a pure single-qubit state.
    pub fn prepare_node(&mut self, id: NodeId, state: &Array1<Complex64>) -> SimResult<()> {
        let qubit = QuantumState::from_state_vector(state)?;
        if qubit.num_qubits() != 1 {
            return Err(SimError::InvalidParameter(
                "data registers hold a single qubit".into(),
            ));
        }
        self.network.attach_qubit(id, qubit)
    }

    // ------------------------------------------------------------------
    // Entanglement and state transfer

    /// Distributes a Bell pair between two nodes through their link.
    pub fn entangle(&mut self, a: NodeId, b: NodeId) -> SimResult<EntangleReport> {
        let pair = self.network.entangle(a, b)?;
        let report = EntangleReport {
            pair: pair.id(),
            bell: pair.bell(),
            fidelity: pair.fidelity()?,
        };
        self.stats.pairs_created += 1;
        info!(%a, %b, pair = %report.pair, fidelity = report.fidelity, "entanglement established");
        Ok(report)
    }

    pub fn is_entangled(&self, a: NodeId, b: NodeId) -> bool {
        self.network.is_entangled(a, b)
    }

    /// Drops the registered pair between two nodes.
    pub fn break_entanglement(&mut self, a: NodeId, b: NodeId) -> SimResult<()> {
        self.network.break_entanglement(a, b)?;
        info!(%a, %b, "entanglement broken");
        Ok(())
    }

    /// Probabilistic direct transfer of `a`'s data qubit to `b`.
    ///
    /// The carrier leaves `a` either way; on failure it is lost in the link
    /// and `b` is untouched.
    pub fn tunnel(&mut self, a: NodeId, b: NodeId) -> SimResult<()> {
        if a == b {
            return Err(SimError::InvalidParameter(
                "tunneling to the sending node is meaningless".into(),
            ));
        }
        self.network.node(a)?;
        self.network.node(b)?;
        let profile = self.network.link(a, b);
        profile.validate()?;
        let channel = profile.channel()?;

        let survived = self.rng.gen_bool(profile.tunnel_success);
        let mut carrier = self.network.detach_qubit(a)?;
        if !survived {
            debug!(%a, %b, "carrier lost in the link");
            return Err(SimError::TunnelFailed(a, b));
        }
        carrier.apply_channel(&channel, &[0])?;
        self.network.attach_qubit(b, carrier)?;
        info!(%a, %b, "data qubit tunneled");
        Ok(())
    }

    /// Entanglement-based transfer of `a`'s data qubit to `b`.
    ///
    /// Consumes the registered pair: Bell-measures the data qubit against
    /// `a`'s half and applies the classically conditioned X/Z corrections at
    /// `b`, so only two classical bits cross the link.
    pub fn teleport(&mut self, a: NodeId, b: NodeId) -> SimResult<()> {
        if a == b {
            return Err(SimError::InvalidParameter(
                "teleporting to the sending node is meaningless".into(),
            ));
        }
        self.network.node(a)?;
        self.network.node(b)?;
        let (pair, half_a, half_b) = self.network.take_pair(a, b)?;
        let bell = pair.bell();
        let data = self.network.detach_qubit(a)?;
        let mut joint = data.tensor(&pair.into_state()?);

        // Qubit 0 is the payload; the pair halves sit at 1 (A) and 2 (B).
        let a_q = 1 + half_a.index();
        let b_q = 1 + half_b.index();
        joint.apply(&Gate::cnot(), &[0, a_q])?;
        joint.apply(&Gate::h(), &[0])?;
        let z = Measurement::z_basis();
        let m_phase = joint.measure_with_rng(&z, &[0], &mut self.rng)?;
        let m_bit = joint.measure_with_rng(&z, &[a_q], &mut self.rng)?;
        if m_bit == 1 {
            joint.apply(&Gate::x(), &[b_q])?;
        }
        if m_phase == 1 {
            joint.apply(&Gate::z(), &[b_q])?;
        }
        // Pairs prepared in a non-PhiPlus variant need the extra local
        // Pauli that maps the variant back to PhiPlus.
        match bell {
            BellState::PhiPlus => {}
            BellState::PhiMinus => joint.apply(&Gate::z(), &[b_q])?,
            BellState::PsiPlus => joint.apply(&Gate::x(), &[b_q])?,
            BellState::PsiMinus => {
                joint.apply(&Gate::x(), &[b_q])?;
                joint.apply(&Gate::z(), &[b_q])?;
            }
        }

        let delivered = joint.reduced(&[b_q])?;
        self.network.attach_qubit(b, delivered)?;
        info!(%a, %b, m_bit, m_phase, "data qubit teleported");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Key agreement and messaging

    /// Agrees a shared key of `key_bytes` bytes over the link between two
    /// entangled nodes and stores it on both.
    ///
    /// Entanglement is the precondition; the run itself burns fresh pairs,
    /// one per round, leaving the registered pair alone.
    pub fn establish_key(
        &mut self,
        a: NodeId,
        b: NodeId,
        key_bytes: usize,
    ) -> SimResult<QkdOutcome> {
        if a == b {
            return Err(SimError::InvalidParameter(
                "a node cannot agree a key with itself".into(),
            ));
        }
        self.network.node(a)?;
        self.network.node(b)?;
        if !self.network.is_entangled(a, b) {
            return Err(SimError::NotEntangled(a, b));
        }
        let profile = self.network.link(a, b);
        profile.validate()?;
        let channel = profile.channel()?;

        let outcome = qkd::run_rounds(Some(&channel), key_bytes, &self.qkd, &mut self.rng)?;
        let key = SharedKey::new(outcome.key.clone(), outcome.qber, outcome.rounds);
        self.network.node_mut(a)?.store_key(b, key.clone());
        self.network.node_mut(b)?.store_key(a, key);
        self.stats.keys_agreed += 1;
        self.stats.pairs_created += outcome.rounds as u64;
        info!(%a, %b, bytes = outcome.key.len(), qber = outcome.qber, "shared key established");
        Ok(outcome)
    }

    /// Encrypts a message under the key `sender` shares with `receiver`.
    pub fn encrypt(
        &self,
        sender: NodeId,
        receiver: NodeId,
        plaintext: &str,
    ) -> SimResult<Vec<u8>> {
        let node = self.network.node(sender)?;
        let key = node
            .key_for(receiver)
            .ok_or(SimError::NoSharedKey(sender, receiver))?;
        key.encrypt(plaintext.as_bytes())
    }

    /// Decrypts ciphertext at `receiver` with the key shared with `sender`.
    pub fn decrypt(
        &self,
        receiver: NodeId,
        sender: NodeId,
        ciphertext: &[u8],
    ) -> SimResult<String> {
        let node = self.network.node(receiver)?;
        let key = node
            .key_for(sender)
            .ok_or(SimError::NoSharedKey(receiver, sender))?;
        let bytes = key.decrypt(ciphertext)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Encrypts a message and wraps it as an `EncryptedData` packet.
    pub fn send_packet(
        &mut self,
        sender: NodeId,
        receiver: NodeId,
        message: &str,
    ) -> SimResult<Packet> {
        self.network.node(receiver)?;
        let ciphertext = self.encrypt(sender, receiver, message)?;
        let packet = Packet::encrypted(sender, receiver, ciphertext);
        self.stats.packets_sent += 1;
        debug!(sender = %sender, receiver = %receiver, bytes = packet.payload.len(), "encrypted packet sent");
        Ok(packet)
    }

    /// Opens a packet at its receiver.
    ///
    /// Only `EncryptedData` payloads carry text; the other kinds are
    /// control traffic and are rejected here.
    pub fn receive_packet(&self, packet: &Packet) -> SimResult<String> {
        match packet.kind {
            PacketKind::EncryptedData => {
                self.decrypt(packet.receiver, packet.sender, &packet.payload)
            }
            other => Err(SimError::InvalidParameter(format!(
                "{other} packets carry no message payload"
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Error injection and repair

    /// Applies a random full-strength error channel to a node's data qubit
    /// and reports which class hit.
    pub fn inject_error(&mut self, id: NodeId) -> SimResult<PauliError> {
        self.network.node(id)?;
        let kind = match self.rng.gen_range(0..3) {
            0 => PauliError::BitFlip,
            1 => PauliError::PhaseFlip,
            _ => PauliError::Depolarizing,
        };
        let channel = kind.channel(1.0).map_err(StateError::from)?;
        self.network
            .node_mut(id)?
            .data_qubit_mut()
            .apply_channel(&channel, &[0])?;
        self.stats.errors_injected += 1;
        info!(node = %id, error = %kind, "error injected");
        Ok(kind)
    }

    /// Names the Pauli family separating a node's data qubit from the
    /// expected state, if the fidelity has dropped.
    pub fn detect_drift(
        &self,
        id: NodeId,
        expected: &Array1<Complex64>,
    ) -> SimResult<Option<PauliError>> {
        let node = self.network.node(id)?;
        classify_drift(node.data_qubit(), expected)
    }

    /// Repairs detected drift and reports whether anything was done.
    ///
    /// Deterministic flips are inverted in place; depolarizing damage holds
    /// no recoverable information, so the expected state is re-prepared.
    pub fn restore(&mut self, id: NodeId, expected: &Array1<Complex64>) -> SimResult<bool> {
        let Some(kind) = self.detect_drift(id, expected)? else {
            return Ok(false);
        };
        match kind.unitary() {
            Some(gate) => {
                self.network
                    .node_mut(id)?
                    .data_qubit_mut()
                    .apply(&gate, &[0])?;
            }
            None => {
                self.network
                    .attach_qubit(id, QuantumState::from_state_vector(expected)?)?;
            }
        }
        self.stats.errors_corrected += 1;
        info!(node = %id, error = %kind, "data qubit restored");
        Ok(true)
    }

    /// Sends logical bits across the classical side of a link under
    /// repetition-code protection and decodes them on arrival.
    pub fn protected_send(
        &mut self,
        sender: NodeId,
        receiver: NodeId,
        bits: &[u8],
    ) -> SimResult<ProtectedDelivery> {
        if sender == receiver {
            return Err(SimError::InvalidParameter(
                "coded payloads need two distinct endpoints".into(),
            ));
        }
        self.network.node(sender)?;
        self.network.node(receiver)?;
        let profile = self.network.link(sender, receiver);
        profile.validate()?;

        let code = RepetitionCode::default();
        let mut coded = code.encode(bits)?;
        let mut flipped = 0usize;
        for bit in &mut coded {
            if self.rng.gen_bool(profile.flip_probability) {
                *bit ^= 1;
                flipped += 1;
            }
        }
        let packet = Packet::error_correction(sender, receiver, coded);
        let (decoded, corrected) = code.decode(&packet.payload)?;
        self.stats.packets_sent += 1;
        self.stats.errors_corrected += corrected as u64;
        debug!(sender = %sender, receiver = %receiver, blocks = decoded.len(), corrected, flipped, "coded payload delivered");
        Ok(ProtectedDelivery {
            packet,
            bits: decoded,
            corrected,
            flipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::{DRIFT_THRESHOLD, plus_state, zero_state};

    fn ideal_sim(seed: u64) -> NetworkSimulator {
        let mut sim = NetworkSimulator::new()
            .with_seed(seed)
            .with_default_link(LinkProfile::ideal());
        sim.add_node(NodeId(1), (0.0, 0.0)).unwrap();
        sim.add_node(NodeId(2), (1.0, 0.0)).unwrap();
        sim
    }

    #[test]
    fn test_entangle_reports_the_pair() {
        let mut sim = ideal_sim(1);
        let report = sim.entangle(NodeId(1), NodeId(2)).unwrap();
        assert_eq!(report.bell, BellState::PhiPlus);
        assert!((report.fidelity - 1.0).abs() < 1e-9);
        assert_eq!(sim.stats().pairs_created, 1);
        assert!(sim.is_entangled(NodeId(2), NodeId(1)));
    }

    #[test]
    fn test_tunnel_moves_the_state() {
        let mut sim = ideal_sim(2);
        sim.prepare_node(NodeId(1), &plus_state()).unwrap();
        sim.tunnel(NodeId(1), NodeId(2)).unwrap();

        let arrived = sim.node(NodeId(2)).unwrap().data_qubit();
        assert!((arrived.fidelity(&plus_state()).unwrap() - 1.0).abs() < 1e-9);
        // The sender's slot re-initializes; no clone stays behind.
        let left = sim.node(NodeId(1)).unwrap().data_qubit();
        assert!((left.fidelity(&zero_state()).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tunnel_failure_loses_the_carrier() {
        let mut sim = ideal_sim(3);
        let dead_link = LinkProfile {
            tunnel_success: 0.0,
            ..LinkProfile::ideal()
        };
        sim.set_link(NodeId(1), NodeId(2), dead_link).unwrap();
        sim.prepare_node(NodeId(1), &plus_state()).unwrap();

        let err = sim.tunnel(NodeId(1), NodeId(2)).unwrap_err();
        assert!(matches!(err, SimError::TunnelFailed(NodeId(1), NodeId(2))));
        let left = sim.node(NodeId(1)).unwrap().data_qubit();
        assert!((left.fidelity(&zero_state()).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_teleport_delivers_and_consumes_the_pair() {
        let mut sim = ideal_sim(4);
        sim.entangle(NodeId(1), NodeId(2)).unwrap();
        sim.prepare_node(NodeId(1), &plus_state()).unwrap();

        sim.teleport(NodeId(1), NodeId(2)).unwrap();

        let arrived = sim.node(NodeId(2)).unwrap().data_qubit();
        assert!((arrived.fidelity(&plus_state()).unwrap() - 1.0).abs() < 1e-6);
        assert!(!sim.is_entangled(NodeId(1), NodeId(2)));
        assert!(matches!(
            sim.teleport(NodeId(1), NodeId(2)).unwrap_err(),
            SimError::NotEntangled(_, _)
        ));
    }

    #[test]
    fn test_key_agreement_needs_entanglement_first() {
        let mut sim = ideal_sim(5);
        assert!(matches!(
            sim.establish_key(NodeId(1), NodeId(2), 16).unwrap_err(),
            SimError::NotEntangled(_, _)
        ));
    }

    #[test]
    fn test_injected_errors_are_repaired() {
        for seed in 0..12 {
            let mut sim = ideal_sim(seed);
            sim.prepare_node(NodeId(1), &plus_state()).unwrap();
            sim.inject_error(NodeId(1)).unwrap();
            sim.restore(NodeId(1), &plus_state()).unwrap();

            let healed = sim.node(NodeId(1)).unwrap().data_qubit();
            assert!(
                healed.fidelity(&plus_state()).unwrap() >= DRIFT_THRESHOLD,
                "seed {seed} left the qubit unhealed"
            );
            assert_eq!(sim.stats().errors_injected, 1);
        }
    }

    #[test]
    fn test_control_packets_carry_no_message() {
        let sim = ideal_sim(6);
        let packet = Packet::key_exchange(NodeId(1), NodeId(2), 16);
        assert!(matches!(
            sim.receive_packet(&packet).unwrap_err(),
            SimError::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_missing_nodes_never_panic() {
        let mut sim = NetworkSimulator::new().with_seed(7);
        assert!(matches!(
            sim.entangle(NodeId(1), NodeId(2)).unwrap_err(),
            SimError::NodeNotFound(_)
        ));
        assert!(matches!(
            sim.inject_error(NodeId(1)).unwrap_err(),
            SimError::NodeNotFound(_)
        ));
        assert!(matches!(
            sim.tunnel(NodeId(1), NodeId(2)).unwrap_err(),
            SimError::NodeNotFound(_)
        ));
    }
}
