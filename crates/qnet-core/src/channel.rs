//! Kraus noise channels and the Pauli error taxonomy.
//!
//! Channels model what transmission over a physical link does to a qubit.
//! Every constructor validates the trace-preservation relation
//! `Σ K_k† K_k = I`, so an applied channel always yields a valid density
//! matrix.

use std::fmt;

use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::gate::Gate;
use crate::linalg::{ATOL, dagger, is_identity};

/// Discrete error classes the network layer injects and corrects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauliError {
    BitFlip,
    PhaseFlip,
    Depolarizing,
}

impl PauliError {
    /// The noise channel of this class at strength `probability`.
    pub fn channel(&self, probability: f64) -> Result<NoiseChannel, ChannelError> {
        match self {
            Self::BitFlip => NoiseChannel::bit_flip(probability),
            Self::PhaseFlip => NoiseChannel::phase_flip(probability),
            Self::Depolarizing => NoiseChannel::depolarizing(probability),
        }
    }

    /// The unitary a deterministic injection applies, or `None` when the
    /// class is stochastic and the caller must pick a Pauli itself.
    pub fn unitary(&self) -> Option<Gate> {
        match self {
            Self::BitFlip => Some(Gate::x()),
            Self::PhaseFlip => Some(Gate::z()),
            Self::Depolarizing => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BitFlip => "bit_flip",
            Self::PhaseFlip => "phase_flip",
            Self::Depolarizing => "depolarizing",
        }
    }
}

impl fmt::Display for PauliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A completely positive trace-preserving map in Kraus form.
#[derive(Debug, Clone)]
pub struct NoiseChannel {
    name: String,
    kraus: Vec<Array2<Complex64>>,
    num_qubits: usize,
}

impl NoiseChannel {
    /// Builds a channel from raw Kraus operators, enforcing shared shape and
    /// trace preservation.
    pub fn new(
        name: impl Into<String>,
        kraus: Vec<Array2<Complex64>>,
    ) -> Result<Self, ChannelError> {
        let first = kraus.first().ok_or(ChannelError::Empty)?;
        let (rows, cols) = first.dim();
        if rows != cols || rows == 0 || !rows.is_power_of_two() {
            return Err(ChannelError::MixedDimensions);
        }
        if kraus.iter().any(|k| k.dim() != (rows, cols)) {
            return Err(ChannelError::MixedDimensions);
        }

        let mut sum = Array2::zeros((rows, cols));
        for k in &kraus {
            sum = sum + dagger(k).dot(k);
        }
        if !is_identity(&sum, ATOL) {
            return Err(ChannelError::NotTracePreserving);
        }

        Ok(Self {
            name: name.into(),
            kraus,
            num_qubits: rows.trailing_zeros() as usize,
        })
    }

    /// The do-nothing channel.
    pub fn identity() -> Self {
        Self {
            name: "identity".to_owned(),
            kraus: vec![Array2::eye(2)],
            num_qubits: 1,
        }
    }

    /// Flips the qubit with probability `p`.
    pub fn bit_flip(p: f64) -> Result<Self, ChannelError> {
        let p = check_probability(p)?;
        let keep = scale(&Array2::eye(2), (1.0 - p).sqrt());
        let flip = scale(Gate::x().matrix(), p.sqrt());
        Self::new(format!("bit_flip(p={p:.4})"), vec![keep, flip])
    }

    /// Flips the qubit's phase with probability `p`.
    pub fn phase_flip(p: f64) -> Result<Self, ChannelError> {
        let p = check_probability(p)?;
        let keep = scale(&Array2::eye(2), (1.0 - p).sqrt());
        let flip = scale(Gate::z().matrix(), p.sqrt());
        Self::new(format!("phase_flip(p={p:.4})"), vec![keep, flip])
    }

    /// Applies a uniformly random Pauli with total probability `p`.
    pub fn depolarizing(p: f64) -> Result<Self, ChannelError> {
        let p = check_probability(p)?;
        let keep = scale(&Array2::eye(2), (1.0 - 0.75 * p).sqrt());
        let weight = (p / 4.0).sqrt();
        Self::new(
            format!("depolarizing(p={p:.4})"),
            vec![
                keep,
                scale(Gate::x().matrix(), weight),
                scale(Gate::y().matrix(), weight),
                scale(Gate::z().matrix(), weight),
            ],
        )
    }

    /// Relaxes `|1⟩` toward `|0⟩` with probability `gamma`.
    pub fn amplitude_damping(gamma: f64) -> Result<Self, ChannelError> {
        let gamma = check_probability(gamma)?;
        let o = Complex64::new(0.0, 0.0);
        let keep = array![
            [Complex64::new(1.0, 0.0), o],
            [o, Complex64::new((1.0 - gamma).sqrt(), 0.0)],
        ];
        let decay = array![
            [o, Complex64::new(gamma.sqrt(), 0.0)],
            [o, o],
        ];
        Self::new(format!("amplitude_damping(gamma={gamma:.4})"), vec![keep, decay])
    }

    /// Destroys phase coherence with probability `lambda` without exchanging
    /// energy.
    pub fn phase_damping(lambda: f64) -> Result<Self, ChannelError> {
        let lambda = check_probability(lambda)?;
        let o = Complex64::new(0.0, 0.0);
        let keep = array![
            [Complex64::new(1.0, 0.0), o],
            [o, Complex64::new((1.0 - lambda).sqrt(), 0.0)],
        ];
        let dephase = array![
            [o, o],
            [o, Complex64::new(lambda.sqrt(), 0.0)],
        ];
        Self::new(format!("phase_damping(lambda={lambda:.4})"), vec![keep, dephase])
    }

    /// The channel that applies `self` first and `other` second.
    pub fn then(&self, other: &Self) -> Result<Self, ChannelError> {
        if self.num_qubits != other.num_qubits {
            return Err(ChannelError::MixedDimensions);
        }
        let mut kraus = Vec::with_capacity(self.kraus.len() * other.kraus.len());
        for second in &other.kraus {
            for first in &self.kraus {
                kraus.push(second.dot(first));
            }
        }
        Self::new(format!("{} then {}", self.name, other.name), kraus)
    }

    pub fn kraus(&self) -> &[Array2<Complex64>] {
        &self.kraus
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }
}

impl fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn check_probability(p: f64) -> Result<f64, ChannelError> {
    if !(0.0..=1.0).contains(&p) || p.is_nan() {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(p)
}

fn scale(m: &Array2<Complex64>, factor: f64) -> Array2<Complex64> {
    m.mapv(|z| z * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_accept_full_probability_range() {
        for p in [0.0, 0.3, 1.0] {
            assert!(NoiseChannel::bit_flip(p).is_ok());
            assert!(NoiseChannel::phase_flip(p).is_ok());
            assert!(NoiseChannel::depolarizing(p).is_ok());
            assert!(NoiseChannel::amplitude_damping(p).is_ok());
            assert!(NoiseChannel::phase_damping(p).is_ok());
        }
    }

    #[test]
    fn test_out_of_range_probability_is_rejected() {
        assert_eq!(
            NoiseChannel::bit_flip(1.5).unwrap_err(),
            ChannelError::InvalidProbability(1.5)
        );
        assert_eq!(
            NoiseChannel::depolarizing(-0.1).unwrap_err(),
            ChannelError::InvalidProbability(-0.1)
        );
    }

    #[test]
    fn test_non_trace_preserving_set_is_rejected() {
        let doubled = Array2::from_elem((2, 2), Complex64::new(1.0, 0.0));
        assert_eq!(
            NoiseChannel::new("bad", vec![doubled]).unwrap_err(),
            ChannelError::NotTracePreserving
        );
    }

    #[test]
    fn test_composition_stays_trace_preserving() {
        let a = NoiseChannel::bit_flip(0.2).unwrap();
        let b = NoiseChannel::phase_damping(0.4).unwrap();
        let composed = a.then(&b).unwrap();
        assert_eq!(composed.kraus().len(), 4);
        assert_eq!(composed.num_qubits(), 1);
    }

    #[test]
    fn test_pauli_error_maps_to_channel_and_gate() {
        assert!(PauliError::BitFlip.channel(0.5).is_ok());
        assert_eq!(PauliError::BitFlip.unitary().unwrap().name(), "X");
        assert_eq!(PauliError::PhaseFlip.unitary().unwrap().name(), "Z");
        assert!(PauliError::Depolarizing.unitary().is_none());
        assert_eq!(PauliError::Depolarizing.to_string(), "depolarizing");
    }
}
