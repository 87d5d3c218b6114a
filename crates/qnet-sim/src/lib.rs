//! Quantum network model and protocol simulator.
//!
//! This crate layers a network on top of the [`qnet_core`] state engine:
//! nodes with local data qubits ([`NetworkNode`]), noisy links
//! ([`LinkProfile`]), an entanglement registry keyed by unordered node
//! pairs, entanglement-based key agreement, XOR-encrypted packet messaging
//! and repetition-coded error protection. [`NetworkSimulator`] is the
//! facade the CLI and HTTP layers drive.
//!
//! # Quick start
//!
//! ```
//! use qnet_sim::{LinkProfile, NetworkSimulator, NodeId};
//!
//! let mut sim = NetworkSimulator::new()
//!     .with_seed(7)
//!     .with_default_link(LinkProfile::ideal());
//! sim.add_node(NodeId(1), (0.0, 0.0)).unwrap();
//! sim.add_node(NodeId(2), (1.0, 0.0)).unwrap();
//!
//! sim.entangle(NodeId(1), NodeId(2)).unwrap();
//! sim.establish_key(NodeId(1), NodeId(2), 16).unwrap();
//!
//! let packet = sim.send_packet(NodeId(1), NodeId(2), "hello quantum").unwrap();
//! assert_eq!(sim.receive_packet(&packet).unwrap(), "hello quantum");
//! ```

pub mod cipher;
pub mod correction;
pub mod error;
pub mod network;
pub mod node;
pub mod packet;
pub mod qkd;
pub mod simulator;

pub use correction::{DRIFT_THRESHOLD, RepetitionCode, classify_drift, plus_state, zero_state};
pub use error::{SimError, SimResult};
pub use network::{LinkProfile, PairKey, QuantumNetwork};
pub use node::{NetworkNode, NodeId, SharedKey};
pub use packet::{Packet, PacketKind};
pub use qkd::{QkdConfig, QkdOutcome};
pub use simulator::{EntangleReport, NetworkSimulator, ProtectedDelivery, SimStats};
