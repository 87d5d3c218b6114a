//! Generalized measurements and the two protocol bases.
//!
//! A [`Measurement`] is a set of operators `{M_k}` validated against the
//! completeness relation `Σ M_k† M_k = I`. Outcome `k` of a measurement is
//! the index of the operator that fired; for the protocol bases the index is
//! the encoded bit.

use std::fmt;

use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::MeasurementError;
use crate::linalg::{ATOL, dagger, is_identity};

/// Single-qubit basis choice used by the key-distribution protocols.
///
/// `Computational` measures along Z, `Hadamard` along X. Outcome 0 encodes
/// bit 0 in either basis (`|0⟩`/`|+⟩`), outcome 1 encodes bit 1 (`|1⟩`/`|−⟩`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    Computational,
    Hadamard,
}

impl Basis {
    /// The measurement operators for this basis.
    pub fn measurement(&self) -> Measurement {
        match self {
            Self::Computational => Measurement::z_basis(),
            Self::Hadamard => Measurement::x_basis(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Computational => "Z",
            Self::Hadamard => "X",
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated set of measurement operators over a fixed number of qubits.
#[derive(Debug, Clone)]
pub struct Measurement {
    operators: Vec<Array2<Complex64>>,
    num_qubits: usize,
}

impl Measurement {
    /// Builds a measurement from raw operators, enforcing shared shape and
    /// the completeness relation.
    pub fn new(operators: Vec<Array2<Complex64>>) -> Result<Self, MeasurementError> {
        let first = operators.first().ok_or(MeasurementError::Empty)?;
        let (rows, cols) = first.dim();
        if rows != cols || rows == 0 || !rows.is_power_of_two() {
            return Err(MeasurementError::MixedDimensions);
        }
        if operators.iter().any(|m| m.dim() != (rows, cols)) {
            return Err(MeasurementError::MixedDimensions);
        }

        let mut sum = Array2::zeros((rows, cols));
        for m in &operators {
            sum = sum + dagger(m).dot(m);
        }
        if !is_identity(&sum, ATOL) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self {
            operators,
            num_qubits: rows.trailing_zeros() as usize,
        })
    }

    /// Projectors onto `|0⟩` and `|1⟩`.
    pub fn z_basis() -> Self {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        Self {
            operators: vec![array![[l, o], [o, o]], array![[o, o], [o, l]]],
            num_qubits: 1,
        }
    }

    /// Projectors onto `|+⟩` and `|−⟩`.
    pub fn x_basis() -> Self {
        let h = Complex64::new(0.5, 0.0);
        Self {
            operators: vec![array![[h, h], [h, h]], array![[h, -h], [-h, h]]],
            num_qubits: 1,
        }
    }

    /// Two-qubit ZZ parity check: outcome 0 for even parity, 1 for odd.
    ///
    /// Non-destructive on the parity eigenspaces, which is what the
    /// repetition-code syndrome extraction relies on.
    pub fn zz_parity() -> Self {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        let even = array![
            [l, o, o, o],
            [o, o, o, o],
            [o, o, o, o],
            [o, o, o, l],
        ];
        let odd = array![
            [o, o, o, o],
            [o, l, o, o],
            [o, o, l, o],
            [o, o, o, o],
        ];
        Self {
            operators: vec![even, odd],
            num_qubits: 2,
        }
    }

    pub fn operators(&self) -> &[Array2<Complex64>] {
        &self.operators
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_outcomes(&self) -> usize {
        self.operators.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_measurements_are_complete() {
        for m in [
            Measurement::z_basis(),
            Measurement::x_basis(),
            Measurement::zz_parity(),
        ] {
            assert!(Measurement::new(m.operators().to_vec()).is_ok());
        }
    }

    #[test]
    fn test_incomplete_set_is_rejected() {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        let only_zero = vec![array![[l, o], [o, o]]];
        assert_eq!(
            Measurement::new(only_zero).unwrap_err(),
            MeasurementError::NotComplete
        );
    }

    #[test]
    fn test_empty_set_is_rejected() {
        assert_eq!(Measurement::new(vec![]).unwrap_err(), MeasurementError::Empty);
    }

    #[test]
    fn test_mixed_dimensions_are_rejected() {
        let one = Array2::eye(2);
        let two = Array2::eye(4);
        assert_eq!(
            Measurement::new(vec![one, two]).unwrap_err(),
            MeasurementError::MixedDimensions
        );
    }

    #[test]
    fn test_basis_round_trip_labels() {
        assert_eq!(Basis::Computational.to_string(), "Z");
        assert_eq!(Basis::Hadamard.to_string(), "X");
        assert_eq!(Basis::Computational.measurement().num_outcomes(), 2);
    }
}
