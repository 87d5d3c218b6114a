//! Unitary gates over one or two qubits.
//!
//! A [`Gate`] owns its matrix and is validated for unitarity on construction,
//! so downstream code can apply it without re-checking. The built-in set
//! covers what the network protocols need: Paulis, Hadamard, the S phase
//! gate, CNOT and SWAP.

use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use ndarray::{Array2, array};
use num_complex::Complex64;

use crate::error::GateError;
use crate::linalg::{ATOL, is_unitary};

/// A named unitary acting on a fixed number of qubits.
#[derive(Debug, Clone)]
pub struct Gate {
    name: String,
    matrix: Array2<Complex64>,
    num_qubits: usize,
}

impl Gate {
    /// Builds a gate from an arbitrary matrix, rejecting anything that is not
    /// a square power-of-two unitary.
    pub fn new(name: impl Into<String>, matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let name = name.into();
        let (rows, cols) = matrix.dim();
        if rows != cols || rows == 0 || !rows.is_power_of_two() {
            return Err(GateError::InvalidShape { rows, cols });
        }
        if !is_unitary(&matrix, ATOL) {
            return Err(GateError::NotUnitary(name));
        }
        let num_qubits = rows.trailing_zeros() as usize;
        Ok(Self {
            name,
            matrix,
            num_qubits,
        })
    }

    fn builtin(name: &str, matrix: Array2<Complex64>) -> Self {
        let num_qubits = matrix.dim().0.trailing_zeros() as usize;
        Self {
            name: name.to_owned(),
            matrix,
            num_qubits,
        }
    }

    /// Single-qubit identity.
    pub fn i() -> Self {
        Self::builtin("I", Array2::eye(2))
    }

    /// Pauli-X (bit flip).
    pub fn x() -> Self {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        Self::builtin("X", array![[o, l], [l, o]])
    }

    /// Pauli-Y.
    pub fn y() -> Self {
        let o = Complex64::new(0.0, 0.0);
        Self::builtin(
            "Y",
            array![[o, Complex64::new(0.0, -1.0)], [Complex64::new(0.0, 1.0), o]],
        )
    }

    /// Pauli-Z (phase flip).
    pub fn z() -> Self {
        let o = Complex64::new(0.0, 0.0);
        Self::builtin(
            "Z",
            array![[Complex64::new(1.0, 0.0), o], [o, Complex64::new(-1.0, 0.0)]],
        )
    }

    /// Hadamard.
    pub fn h() -> Self {
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
        Self::builtin("H", array![[s, s], [s, -s]])
    }

    /// Phase gate (square root of Z).
    pub fn s() -> Self {
        let o = Complex64::new(0.0, 0.0);
        Self::builtin(
            "S",
            array![[Complex64::new(1.0, 0.0), o], [o, Complex64::new(0.0, 1.0)]],
        )
    }

    /// Controlled-X over `[control, target]`.
    pub fn cnot() -> Self {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        Self::builtin(
            "CNOT",
            array![
                [l, o, o, o],
                [o, l, o, o],
                [o, o, o, l],
                [o, o, l, o],
            ],
        )
    }

    /// Exchanges two qubits.
    pub fn swap() -> Self {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        Self::builtin(
            "SWAP",
            array![
                [l, o, o, o],
                [o, o, l, o],
                [o, l, o, o],
                [o, o, o, l],
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Number of qubits this gate acts on.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
