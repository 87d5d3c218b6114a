//! Density-matrix register state.
//!
//! [`QuantumState`] tracks a register of up to a handful of qubits as a
//! density matrix, which keeps mixed states from noisy links first class
//! instead of bolting probabilities onto a pure-state vector. Gates,
//! channels and measurements address qubits by index; qubit 0 owns the most
//! significant bit of a basis index.
//!
//! # Quick start
//!
//! ```
//! use qnet_core::{Gate, Measurement, QuantumState};
//!
//! // Prepare (|00⟩ + |11⟩)/√2 and check the halves are correlated.
//! let mut state = QuantumState::zero(2);
//! state.apply(&Gate::h(), &[0]).unwrap();
//! state.apply(&Gate::cnot(), &[0, 1]).unwrap();
//!
//! let a = state.measure(&Measurement::z_basis(), &[0]).unwrap();
//! let b = state.measure(&Measurement::z_basis(), &[1]).unwrap();
//! assert_eq!(a, b);
//! ```

use ndarray::linalg::kron;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::Rng;
use tracing::trace;

use crate::channel::NoiseChannel;
use crate::error::{CoreResult, StateError};
use crate::gate::Gate;
use crate::linalg::{ATOL, dagger, embed_operator, partial_trace, trace};
use crate::measure::Measurement;

/// Outcome probabilities below this floor are treated as impossible.
const PROB_FLOOR: f64 = 1e-12;

/// A register of qubits held as a density matrix.
#[derive(Debug, Clone)]
pub struct QuantumState {
    rho: Array2<Complex64>,
    num_qubits: usize,
}

impl QuantumState {
    /// The all-zeros product state `|0…0⟩⟨0…0|`.
    pub fn zero(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut rho = Array2::zeros((dim, dim));
        rho[[0, 0]] = Complex64::new(1.0, 0.0);
        Self { rho, num_qubits }
    }

    /// The maximally mixed state `I / 2^n`.
    pub fn maximally_mixed(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let weight = Complex64::new(1.0 / dim as f64, 0.0);
        Self {
            rho: Array2::eye(dim).mapv(|z: Complex64| z * weight),
            num_qubits,
        }
    }

    /// Wraps an existing density matrix, checking shape and unit trace.
    pub fn from_density_matrix(rho: Array2<Complex64>) -> CoreResult<Self> {
        let (rows, cols) = rho.dim();
        if rows != cols || rows == 0 || !rows.is_power_of_two() {
            return Err(StateError::InvalidDimension(rows.max(cols)));
        }
        let tr = trace(&rho);
        if (tr.re - 1.0).abs() > ATOL || tr.im.abs() > ATOL {
            return Err(StateError::TraceNotOne(tr.re));
        }
        Ok(Self {
            rho,
            num_qubits: rows.trailing_zeros() as usize,
        })
    }

    /// Builds the pure state `|ψ⟩⟨ψ|` from a normalized state vector.
    pub fn from_state_vector(psi: &Array1<Complex64>) -> CoreResult<Self> {
        let dim = psi.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(StateError::InvalidDimension(dim));
        }
        let norm_sqr: f64 = psi.iter().map(|z| z.norm_sqr()).sum();
        if (norm_sqr - 1.0).abs() > ATOL {
            return Err(StateError::TraceNotOne(norm_sqr));
        }
        let mut rho = Array2::zeros((dim, dim));
        for (r, zr) in psi.iter().enumerate() {
            for (c, zc) in psi.iter().enumerate() {
                rho[[r, c]] = zr * zc.conj();
            }
        }
        Ok(Self {
            rho,
            num_qubits: dim.trailing_zeros() as usize,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn density_matrix(&self) -> &Array2<Complex64> {
        &self.rho
    }

    /// Joint state `self ⊗ other`, with `other`'s qubits appended after
    /// `self`'s.
    pub fn tensor(&self, other: &Self) -> Self {
        Self {
            rho: kron(&self.rho, &other.rho),
            num_qubits: self.num_qubits + other.num_qubits,
        }
    }

    /// Applies a unitary gate to the listed qubits.
    pub fn apply(&mut self, gate: &Gate, qubits: &[usize]) -> CoreResult<()> {
        if gate.num_qubits() != qubits.len() {
            return Err(StateError::ArityMismatch {
                expected: gate.num_qubits(),
                given: qubits.len(),
            });
        }
        let u = embed_operator(gate.matrix(), qubits, self.num_qubits)?;
        self.rho = u.dot(&self.rho).dot(&dagger(&u));
        Ok(())
    }

    /// Pushes the listed qubits through a noise channel.
    pub fn apply_channel(&mut self, channel: &NoiseChannel, qubits: &[usize]) -> CoreResult<()> {
        if channel.num_qubits() != qubits.len() {
            return Err(StateError::ArityMismatch {
                expected: channel.num_qubits(),
                given: qubits.len(),
            });
        }
        let dim = self.rho.dim().0;
        let mut next = Array2::zeros((dim, dim));
        for k in channel.kraus() {
            let k_full = embed_operator(k, qubits, self.num_qubits)?;
            next = next + k_full.dot(&self.rho).dot(&dagger(&k_full));
        }
        self.rho = next;
        Ok(())
    }

    /// Outcome probabilities of a measurement on the listed qubits, without
    /// collapsing the state.
    pub fn probabilities(&self, m: &Measurement, qubits: &[usize]) -> CoreResult<Vec<f64>> {
        if m.num_qubits() != qubits.len() {
            return Err(StateError::ArityMismatch {
                expected: m.num_qubits(),
                given: qubits.len(),
            });
        }
        let mut probs = Vec::with_capacity(m.num_outcomes());
        for op in m.operators() {
            let full = embed_operator(op, qubits, self.num_qubits)?;
            let p = trace(&dagger(&full).dot(&full).dot(&self.rho)).re;
            probs.push(p.max(0.0));
        }
        Ok(probs)
    }

    /// Measures the listed qubits, collapsing the state and returning the
    /// outcome index.
    pub fn measure(&mut self, m: &Measurement, qubits: &[usize]) -> CoreResult<usize> {
        self.measure_with_rng(m, qubits, rand::thread_rng())
    }

    /// Like [`measure`](Self::measure) but samples from the supplied RNG,
    /// which makes protocol runs reproducible.
    pub fn measure_with_rng<R: Rng>(
        &mut self,
        m: &Measurement,
        qubits: &[usize],
        mut rng: R,
    ) -> CoreResult<usize> {
        if m.num_qubits() != qubits.len() {
            return Err(StateError::ArityMismatch {
                expected: m.num_qubits(),
                given: qubits.len(),
            });
        }

        let mut embedded = Vec::with_capacity(m.num_outcomes());
        let mut probs = Vec::with_capacity(m.num_outcomes());
        for op in m.operators() {
            let full = embed_operator(op, qubits, self.num_qubits)?;
            let p = trace(&dagger(&full).dot(&full).dot(&self.rho)).re;
            probs.push(p.max(0.0));
            embedded.push(full);
        }

        let u: f64 = rng.r#gen();
        let mut acc = 0.0;
        let mut chosen = None;
        for (k, &p) in probs.iter().enumerate() {
            if p < PROB_FLOOR {
                continue;
            }
            acc += p;
            if u < acc {
                chosen = Some(k);
                break;
            }
        }
        // Rounding can leave the CDF a hair short of 1; take the last viable
        // outcome in that case.
        let outcome = match chosen {
            Some(k) => k,
            None => probs
                .iter()
                .rposition(|&p| p >= PROB_FLOOR)
                .ok_or(StateError::NoViableOutcome)?,
        };

        let op = &embedded[outcome];
        let collapsed = op.dot(&self.rho).dot(&dagger(op));
        let p = probs[outcome];
        self.rho = collapsed.mapv(|z| z / p);
        trace!(outcome, probability = p, "measurement collapsed register");
        Ok(outcome)
    }

    /// `Tr(ρ²)`, 1 for pure states and `1/2^n` for maximally mixed ones.
    pub fn purity(&self) -> f64 {
        trace(&self.rho.dot(&self.rho)).re
    }

    /// Overlap `⟨ψ|ρ|ψ⟩` with a normalized pure state.
    pub fn fidelity(&self, psi: &Array1<Complex64>) -> CoreResult<f64> {
        if psi.len() != self.rho.dim().0 {
            return Err(StateError::SizeMismatch {
                left: self.num_qubits,
                right: psi.len().max(1).trailing_zeros() as usize,
            });
        }
        let rho_psi = self.rho.dot(psi);
        let overlap: Complex64 = psi
            .iter()
            .zip(rho_psi.iter())
            .map(|(a, b)| a.conj() * b)
            .sum();
        Ok(overlap.re.clamp(0.0, 1.0))
    }

    /// Reduced state over the kept qubits, tracing out the rest.
    pub fn reduced(&self, keep: &[usize]) -> CoreResult<Self> {
        let rho = partial_trace(&self.rho, self.num_qubits, keep)?;
        Ok(Self {
            rho,
            num_qubits: keep.len(),
        })
    }
}
