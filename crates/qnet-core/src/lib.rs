//! Density-matrix quantum state engine for the qnet simulator.
//!
//! This crate holds the physics the network layer builds on: registers as
//! density matrices ([`QuantumState`]), validated unitaries ([`Gate`]),
//! generalized measurements ([`Measurement`]), Kraus noise channels
//! ([`NoiseChannel`]) and distributed Bell pairs ([`EntangledPair`]).
//! Density matrices cost more than state vectors but make mixed states from
//! noisy links first class, which is what the key-distribution and
//! error-correction protocols actually care about.
//!
//! Registers here stay small (one to three qubits per protocol step), so the
//! dense `2^n × 2^n` representation is never a concern.
//!
//! # Quick start
//!
//! ```
//! use qnet_core::{Basis, BellState, EntangledPair, PairId};
//!
//! // Distribute a pair over an ideal link and consume it for one key bit.
//! let mut pair = EntangledPair::prepare(PairId(1), BellState::PhiPlus, None).unwrap();
//! assert!(pair.is_coherent().unwrap());
//!
//! let (ours, theirs) = pair
//!     .measure_both(Basis::Computational, Basis::Computational)
//!     .unwrap();
//! assert_eq!(ours, theirs);
//! assert!(pair.is_consumed());
//! ```

pub mod bell;
pub mod channel;
pub mod error;
pub mod gate;
pub mod linalg;
pub mod measure;
pub mod state;

pub use bell::{BellState, ENTANGLEMENT_BOUND, EntangledPair, PairHalf, PairId};
pub use channel::{NoiseChannel, PauliError};
pub use error::{ChannelError, CoreResult, GateError, MeasurementError, StateError};
pub use gate::Gate;
pub use measure::{Basis, Measurement};
pub use state::QuantumState;
