//! Small linear-algebra toolkit shared by gates, measurements and channels.
//!
//! Basis indices are big-endian: qubit 0 owns the most significant bit of a
//! register index, so `|q0 q1⟩ = |10⟩` is index 2 in a two-qubit register.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{CoreResult, StateError};

/// Absolute tolerance for structural checks (unitarity, completeness, trace).
pub const ATOL: f64 = 1e-9;

/// Bit position of `qubit` inside an index over `num_qubits` qubits.
#[inline]
fn bit_of(qubit: usize, num_qubits: usize) -> usize {
    num_qubits - 1 - qubit
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Trace of a square matrix.
pub fn trace(m: &Array2<Complex64>) -> Complex64 {
    m.diag().sum()
}

/// Checks `m ≈ I` entrywise within `tol`.
pub fn is_identity(m: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = m.dim();
    if rows != cols {
        return false;
    }
    m.indexed_iter().all(|((r, c), z)| {
        let expected = if r == c { 1.0 } else { 0.0 };
        (z - Complex64::new(expected, 0.0)).norm() <= tol
    })
}

/// Checks `m† m ≈ I` within `tol`.
pub fn is_unitary(m: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = m.dim();
    rows == cols && is_identity(&dagger(m).dot(m), tol)
}

/// Validates a qubit list against a register: in range, no duplicates, and
/// matching the arity of an operator over `2^qubits.len()` dimensions.
pub fn check_qubits(qubits: &[usize], num_qubits: usize) -> CoreResult<()> {
    for (i, &q) in qubits.iter().enumerate() {
        if q >= num_qubits {
            return Err(StateError::QubitOutOfRange {
                index: q,
                num_qubits,
            });
        }
        if qubits[..i].contains(&q) {
            return Err(StateError::DuplicateQubit(q));
        }
    }
    Ok(())
}

/// Gathers the bits of `index` that belong to the listed qubits, producing an
/// index over the small space in listed-qubit order.
fn extract_bits(index: usize, qubits: &[usize], num_qubits: usize) -> usize {
    let mut small = 0usize;
    for (k, &q) in qubits.iter().enumerate() {
        let bit = (index >> bit_of(q, num_qubits)) & 1;
        small |= bit << (qubits.len() - 1 - k);
    }
    small
}

/// Scatters a small-space index back onto the listed qubit positions.
fn deposit_bits(small: usize, qubits: &[usize], num_qubits: usize) -> usize {
    let mut index = 0usize;
    for (k, &q) in qubits.iter().enumerate() {
        let bit = (small >> (qubits.len() - 1 - k)) & 1;
        index |= bit << bit_of(q, num_qubits);
    }
    index
}

/// Embeds an operator over the listed qubits into the full register space.
///
/// The operator's own qubit `k` acts on register qubit `qubits[k]`; all other
/// qubits are left untouched.
pub fn embed_operator(
    op: &Array2<Complex64>,
    qubits: &[usize],
    num_qubits: usize,
) -> CoreResult<Array2<Complex64>> {
    check_qubits(qubits, num_qubits)?;
    let small_dim = 1usize << qubits.len();
    if op.dim() != (small_dim, small_dim) {
        return Err(StateError::ArityMismatch {
            expected: op.dim().0.max(1).trailing_zeros() as usize,
            given: qubits.len(),
        });
    }

    let dim = 1usize << num_qubits;
    let mut target_mask = 0usize;
    for &q in qubits {
        target_mask |= 1 << bit_of(q, num_qubits);
    }

    let mut full = Array2::zeros((dim, dim));
    for col in 0..dim {
        let small_col = extract_bits(col, qubits, num_qubits);
        let passive = col & !target_mask;
        for small_row in 0..small_dim {
            let v = op[[small_row, small_col]];
            if v.norm_sqr() == 0.0 {
                continue;
            }
            let row = passive | deposit_bits(small_row, qubits, num_qubits);
            full[[row, col]] = v;
        }
    }
    Ok(full)
}

/// Traces out every qubit not listed in `keep`, returning the reduced density
/// matrix over the kept qubits in listed order.
pub fn partial_trace(
    rho: &Array2<Complex64>,
    num_qubits: usize,
    keep: &[usize],
) -> CoreResult<Array2<Complex64>> {
    check_qubits(keep, num_qubits)?;
    let traced: Vec<usize> = (0..num_qubits).filter(|q| !keep.contains(q)).collect();
    let keep_dim = 1usize << keep.len();
    let traced_dim = 1usize << traced.len();

    let mut out = Array2::zeros((keep_dim, keep_dim));
    for i in 0..keep_dim {
        let row_kept = deposit_bits(i, keep, num_qubits);
        for j in 0..keep_dim {
            let col_kept = deposit_bits(j, keep, num_qubits);
            let mut acc = Complex64::new(0.0, 0.0);
            for t in 0..traced_dim {
                let env = deposit_bits(t, &traced, num_qubits);
                acc += rho[[row_kept | env, col_kept | env]];
            }
            out[[i, j]] = acc;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_dagger_conjugates_and_transposes() {
        let m = array![
            [Complex64::new(1.0, 2.0), Complex64::new(3.0, -1.0)],
            [Complex64::new(0.0, 5.0), Complex64::new(2.0, 0.0)],
        ];
        let d = dagger(&m);
        assert_eq!(d[[0, 1]], Complex64::new(0.0, -5.0));
        assert_eq!(d[[1, 0]], Complex64::new(3.0, 1.0));
    }

    #[test]
    fn test_pauli_x_is_unitary() {
        let x = array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]];
        assert!(is_unitary(&x, ATOL));
    }

    #[test]
    fn test_scaled_identity_is_not_unitary() {
        let m = array![[c(2.0), c(0.0)], [c(0.0), c(2.0)]];
        assert!(!is_unitary(&m, ATOL));
    }

    #[test]
    fn test_embed_x_on_second_qubit() {
        let x = array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]];
        let full = embed_operator(&x, &[1], 2).unwrap();
        // X on qubit 1 swaps |00⟩↔|01⟩ and |10⟩↔|11⟩.
        assert_eq!(full[[0, 1]], c(1.0));
        assert_eq!(full[[1, 0]], c(1.0));
        assert_eq!(full[[2, 3]], c(1.0));
        assert_eq!(full[[3, 2]], c(1.0));
        assert_eq!(full[[0, 0]], c(0.0));
    }

    #[test]
    fn test_embed_rejects_out_of_range_qubit() {
        let x = array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]];
        let err = embed_operator(&x, &[2], 2).unwrap_err();
        assert!(matches!(err, StateError::QubitOutOfRange { index: 2, .. }));
    }

    #[test]
    fn test_embed_rejects_duplicate_qubit() {
        let swap = Array2::eye(4);
        let err = embed_operator(&swap, &[0, 0], 2).unwrap_err();
        assert!(matches!(err, StateError::DuplicateQubit(0)));
    }

    #[test]
    fn test_partial_trace_of_product_state() {
        // |0⟩⟨0| ⊗ |1⟩⟨1| reduced to either side.
        let mut rho = Array2::zeros((4, 4));
        rho[[1, 1]] = c(1.0);
        let left = partial_trace(&rho, 2, &[0]).unwrap();
        assert!((left[[0, 0]] - c(1.0)).norm() < ATOL);
        let right = partial_trace(&rho, 2, &[1]).unwrap();
        assert!((right[[1, 1]] - c(1.0)).norm() < ATOL);
    }

    #[test]
    fn test_partial_trace_of_bell_pair_is_maximally_mixed() {
        // ρ for (|00⟩ + |11⟩)/√2.
        let mut rho = Array2::zeros((4, 4));
        for (r, col) in [(0, 0), (0, 3), (3, 0), (3, 3)] {
            rho[[r, col]] = c(0.5);
        }
        let reduced = partial_trace(&rho, 2, &[1]).unwrap();
        assert!((reduced[[0, 0]] - c(0.5)).norm() < ATOL);
        assert!((reduced[[1, 1]] - c(0.5)).norm() < ATOL);
        assert!(reduced[[0, 1]].norm() < ATOL);
    }
}
