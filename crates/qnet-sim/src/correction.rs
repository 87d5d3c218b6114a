//! Error protection: classical repetition coding plus qubit drift repair.
//!
//! Two complementary layers live here. [`RepetitionCode`] protects logical
//! bits in transit with majority voting, which is what `ErrorCorrection`
//! packets carry. [`classify_drift`] inspects a node's data qubit against a
//! reference state and names the Pauli family that moved it, so the
//! simulator can undo deterministic flips and re-prepare after depolarizing
//! damage.

use ndarray::{Array1, array};
use num_complex::Complex64;
use qnet_core::{PauliError, QuantumState};

use crate::error::{SimError, SimResult};

/// Fidelity below this bound counts as drift needing repair.
pub const DRIFT_THRESHOLD: f64 = 0.9;

/// `|0⟩` reference vector.
pub fn zero_state() -> Array1<Complex64> {
    array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)]
}

/// `|+⟩` reference vector, the usual probe state: bit flips leave it alone
/// but phase flips send it to the orthogonal `|−⟩`.
pub fn plus_state() -> Array1<Complex64> {
    let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    array![s, s]
}

/// Names the Pauli family separating `qubit` from `expected`, or `None`
/// when the fidelity still clears [`DRIFT_THRESHOLD`].
///
/// Deterministic flips are recognized by undoing them on a probe copy;
/// damage no single Pauli undoes is reported as depolarizing.
pub fn classify_drift(
    qubit: &QuantumState,
    expected: &Array1<Complex64>,
) -> SimResult<Option<PauliError>> {
    if qubit.fidelity(expected)? >= DRIFT_THRESHOLD {
        return Ok(None);
    }
    for kind in [PauliError::BitFlip, PauliError::PhaseFlip] {
        let Some(gate) = kind.unitary() else {
            continue;
        };
        let mut probe = qubit.clone();
        probe.apply(&gate, &[0])?;
        if probe.fidelity(expected)? >= DRIFT_THRESHOLD {
            return Ok(Some(kind));
        }
    }
    Ok(Some(PauliError::Depolarizing))
}

/// Majority-vote repetition code over classical bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepetitionCode {
    copies: usize,
}

impl Default for RepetitionCode {
    /// The triple-redundancy code used for `ErrorCorrection` payloads.
    fn default() -> Self {
        Self { copies: 3 }
    }
}

impl RepetitionCode {
    /// Builds a code with an odd number of copies (ties would be ambiguous).
    pub fn new(copies: usize) -> SimResult<Self> {
        if copies < 3 || copies % 2 == 0 {
            return Err(SimError::InvalidParameter(format!(
                "repetition factor {copies} must be odd and at least 3"
            )));
        }
        Ok(Self { copies })
    }

    pub fn copies(&self) -> usize {
        self.copies
    }

    /// Repeats every logical bit `copies` times.
    pub fn encode(&self, bits: &[u8]) -> SimResult<Vec<u8>> {
        let mut coded = Vec::with_capacity(bits.len() * self.copies);
        for &bit in bits {
            if bit > 1 {
                return Err(SimError::InvalidParameter(format!(
                    "logical bit {bit} is not 0 or 1"
                )));
            }
            coded.extend(std::iter::repeat_n(bit, self.copies));
        }
        Ok(coded)
    }

    /// True when the copies inside one block disagree.
    pub fn syndrome(&self, block: &[u8]) -> SimResult<bool> {
        self.check_block(block)?;
        Ok(block.iter().any(|&b| b != block[0]))
    }

    /// Overwrites a block with its majority value; reports whether any copy
    /// changed.
    pub fn correct(&self, block: &mut [u8]) -> SimResult<bool> {
        self.check_block(block)?;
        let majority = self.majority(block);
        let changed = block.iter().any(|&b| b != majority);
        block.fill(majority);
        Ok(changed)
    }

    /// Recovers the logical bits and counts how many blocks needed repair.
    pub fn decode(&self, coded: &[u8]) -> SimResult<(Vec<u8>, usize)> {
        if coded.len() % self.copies != 0 {
            return Err(SimError::InvalidParameter(format!(
                "coded length {} is not a multiple of {}",
                coded.len(),
                self.copies
            )));
        }
        let mut bits = Vec::with_capacity(coded.len() / self.copies);
        let mut corrected = 0;
        for block in coded.chunks_exact(self.copies) {
            let majority = self.majority(block);
            if block.iter().any(|&b| b != majority) {
                corrected += 1;
            }
            bits.push(majority);
        }
        Ok((bits, corrected))
    }

    fn majority(&self, block: &[u8]) -> u8 {
        let ones = block.iter().filter(|&&b| b == 1).count();
        u8::from(ones * 2 > self.copies)
    }

    fn check_block(&self, block: &[u8]) -> SimResult<()> {
        if block.len() != self.copies {
            return Err(SimError::InvalidParameter(format!(
                "block length {} does not match repetition factor {}",
                block.len(),
                self.copies
            )));
        }
        Ok(())
    }
}
