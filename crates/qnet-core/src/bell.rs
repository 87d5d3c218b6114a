//! Bell pairs: preparation, health tracking and consumption.
//!
//! An [`EntangledPair`] is the unit of entanglement the network hands out.
//! It is prepared in one of the four Bell states, optionally degraded by the
//! link channel that carried its second half, and consumed exactly once by a
//! correlated measurement or by teleportation.

use std::fmt;

use ndarray::{Array1, array};
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::channel::NoiseChannel;
use crate::error::{CoreResult, StateError};
use crate::gate::Gate;
use crate::measure::Basis;
use crate::state::QuantumState;

/// Fidelity below this bound no longer certifies entanglement.
pub const ENTANGLEMENT_BOUND: f64 = 0.5;

/// Identifier of one Bell pair inside a registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PairId(pub u64);

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pair{}", self.0)
    }
}

impl From<u64> for PairId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The four maximally entangled two-qubit states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BellState {
    PhiPlus,
    PhiMinus,
    PsiPlus,
    PsiMinus,
}

impl BellState {
    /// Conventional bra-ket name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PhiPlus => "|Φ+⟩",
            Self::PhiMinus => "|Φ−⟩",
            Self::PsiPlus => "|Ψ+⟩",
            Self::PsiMinus => "|Ψ−⟩",
        }
    }

    /// Whether Z measurements of the two halves agree (`Φ` family) or
    /// disagree (`Ψ` family).
    pub fn correlated(&self) -> bool {
        matches!(self, Self::PhiPlus | Self::PhiMinus)
    }

    /// The ideal state vector, qubit 0 first.
    pub fn state_vector(&self) -> Array1<Complex64> {
        let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        let o = Complex64::new(0.0, 0.0);
        match self {
            Self::PhiPlus => array![s, o, o, s],
            Self::PhiMinus => array![s, o, o, -s],
            Self::PsiPlus => array![o, s, s, o],
            Self::PsiMinus => array![o, s, -s, o],
        }
    }
}

impl fmt::Display for BellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which half of a pair an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairHalf {
    A,
    B,
}

impl PairHalf {
    /// Register index of this half inside the pair state.
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// One distributed Bell pair, consumed at most once.
#[derive(Debug, Clone)]
pub struct EntangledPair {
    id: PairId,
    bell: BellState,
    state: QuantumState,
    consumed: bool,
}

impl EntangledPair {
    /// Prepares a fresh pair via H and CNOT, optionally degraded by the link
    /// channel that carried the B half.
    pub fn prepare(
        id: PairId,
        bell: BellState,
        link: Option<&NoiseChannel>,
    ) -> CoreResult<Self> {
        let mut state = QuantumState::zero(2);
        state.apply(&Gate::h(), &[0])?;
        state.apply(&Gate::cnot(), &[0, 1])?;
        match bell {
            BellState::PhiPlus => {}
            BellState::PhiMinus => state.apply(&Gate::z(), &[0])?,
            BellState::PsiPlus => state.apply(&Gate::x(), &[1])?,
            BellState::PsiMinus => {
                state.apply(&Gate::z(), &[0])?;
                state.apply(&Gate::x(), &[1])?;
            }
        }
        if let Some(channel) = link {
            state.apply_channel(channel, &[PairHalf::B.index()])?;
        }
        Ok(Self {
            id,
            bell,
            state,
            consumed: false,
        })
    }

    pub fn id(&self) -> PairId {
        self.id
    }

    pub fn bell(&self) -> BellState {
        self.bell
    }

    pub fn state(&self) -> &QuantumState {
        &self.state
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Overlap with the ideal Bell state this pair was prepared as.
    pub fn fidelity(&self) -> CoreResult<f64> {
        self.state.fidelity(&self.bell.state_vector())
    }

    /// True while the pair is unconsumed and its fidelity still clears the
    /// entanglement bound.
    pub fn is_coherent(&self) -> CoreResult<bool> {
        Ok(!self.consumed && self.fidelity()? > ENTANGLEMENT_BOUND)
    }

    /// Collapses both halves in the given bases and consumes the pair.
    ///
    /// Returns the two outcome bits, half A first.
    pub fn measure_both(&mut self, basis_a: Basis, basis_b: Basis) -> CoreResult<(u8, u8)> {
        self.measure_both_with_rng(basis_a, basis_b, rand::thread_rng())
    }

    /// Like [`measure_both`](Self::measure_both) with a caller-supplied RNG.
    pub fn measure_both_with_rng<R: Rng>(
        &mut self,
        basis_a: Basis,
        basis_b: Basis,
        mut rng: R,
    ) -> CoreResult<(u8, u8)> {
        if self.consumed {
            return Err(StateError::PairConsumed);
        }
        let a = self
            .state
            .measure_with_rng(&basis_a.measurement(), &[0], &mut rng)?;
        let b = self
            .state
            .measure_with_rng(&basis_b.measurement(), &[1], &mut rng)?;
        self.consumed = true;
        Ok((a as u8, b as u8))
    }

    /// Measures a single half in place without consuming the pair.
    ///
    /// This is the interceptor model: the other half stays in the registry
    /// and later measurements see the damage.
    pub fn measure_half_with_rng<R: Rng>(
        &mut self,
        half: PairHalf,
        basis: Basis,
        mut rng: R,
    ) -> CoreResult<u8> {
        if self.consumed {
            return Err(StateError::PairConsumed);
        }
        let bit = self
            .state
            .measure_with_rng(&basis.measurement(), &[half.index()], &mut rng)?;
        Ok(bit as u8)
    }

    /// Replaces the pair state with the maximally mixed state. Models link
    /// loss or storage timeout.
    pub fn decohere(&mut self) {
        self.state = QuantumState::maximally_mixed(2);
    }

    /// Consumes the pair, handing its full two-qubit state to a protocol
    /// that splices it into a larger register.
    pub fn into_state(self) -> CoreResult<QuantumState> {
        if self.consumed {
            return Err(StateError::PairConsumed);
        }
        Ok(self.state)
    }
}
