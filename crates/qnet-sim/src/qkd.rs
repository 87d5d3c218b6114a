//! Entanglement-based key agreement.
//!
//! Each round distributes a fresh Bell pair through the link channel and
//! measures both halves in independently random bases. Rounds where the
//! bases match contribute a sifted bit; a fraction of those is sacrificed to
//! estimate the quantum bit error rate (QBER), and the run aborts when the
//! estimate crosses the configured threshold, since that much error is
//! indistinguishable from an interceptor on the link.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qnet_core::{Basis, BellState, EntangledPair, NoiseChannel, PairId};

use crate::error::{SimError, SimResult};

/// Tuning knobs for a key-agreement run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QkdConfig {
    /// Hard cap on measurement rounds per run.
    pub rounds: usize,
    /// Fraction of sifted bits sacrificed to estimate the error rate.
    pub check_fraction: f64,
    /// QBER above which the run aborts without storing a key.
    pub abort_qber: f64,
}

impl Default for QkdConfig {
    fn default() -> Self {
        Self {
            rounds: 4096,
            check_fraction: 0.25,
            abort_qber: 0.12,
        }
    }
}

impl QkdConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.rounds == 0 {
            return Err(SimError::InvalidParameter("rounds must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.check_fraction) {
            return Err(SimError::InvalidParameter(format!(
                "check fraction {} must lie in [0, 1)",
                self.check_fraction
            )));
        }
        if !(0.0..=0.5).contains(&self.abort_qber) {
            return Err(SimError::InvalidParameter(format!(
                "abort QBER {} must lie in [0, 0.5]",
                self.abort_qber
            )));
        }
        Ok(())
    }
}

/// Figures from a completed key-agreement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QkdOutcome {
    /// The agreed key material.
    pub key: Vec<u8>,
    /// Rounds (and therefore pairs) consumed.
    pub rounds: usize,
    /// Sifted bits, where both bases matched.
    pub sifted: usize,
    /// Sifted bits sacrificed for error estimation.
    pub checked: usize,
    /// Mismatches among the checked bits.
    pub errors: usize,
    /// `errors / checked`, 0 when nothing was checked.
    pub qber: f64,
}

/// Runs sift-and-check rounds until `key_bytes` of key material survive or
/// the round cap runs out.
///
/// The link channel degrades the transmitted half of every pair, so its
/// noise shows up directly in the QBER estimate.
pub fn run_rounds<R: Rng>(
    link: Option<&NoiseChannel>,
    key_bytes: usize,
    config: &QkdConfig,
    mut rng: R,
) -> SimResult<QkdOutcome> {
    config.validate()?;
    if key_bytes == 0 {
        return Err(SimError::InvalidParameter(
            "requested key length is zero".into(),
        ));
    }

    let needed_bits = key_bytes * 8;
    let mut key_bits = Vec::with_capacity(needed_bits);
    let mut rounds = 0usize;
    let mut sifted = 0usize;
    let mut checked = 0usize;
    let mut errors = 0usize;

    while rounds < config.rounds && key_bits.len() < needed_bits {
        rounds += 1;
        let mut pair = EntangledPair::prepare(PairId(rounds as u64), BellState::PhiPlus, link)?;
        let basis_a = random_basis(&mut rng);
        let basis_b = random_basis(&mut rng);
        let (bit_a, bit_b) = pair.measure_both_with_rng(basis_a, basis_b, &mut rng)?;
        if basis_a != basis_b {
            continue;
        }
        sifted += 1;
        if rng.gen_bool(config.check_fraction) {
            checked += 1;
            if bit_a != bit_b {
                errors += 1;
            }
        } else {
            key_bits.push(bit_a);
        }
    }

    if key_bits.len() < needed_bits {
        return Err(SimError::InsufficientKeyMaterial {
            needed: needed_bits,
            got: key_bits.len(),
        });
    }

    let qber = if checked == 0 {
        0.0
    } else {
        errors as f64 / checked as f64
    };
    if qber > config.abort_qber {
        return Err(SimError::QberTooHigh {
            qber,
            limit: config.abort_qber,
        });
    }

    let key = pack_bits(&key_bits[..needed_bits]);
    debug!(rounds, sifted, checked, errors, qber, "key agreement finished");
    Ok(QkdOutcome {
        key,
        rounds,
        sifted,
        checked,
        errors,
        qber,
    })
}

fn random_basis<R: Rng>(rng: &mut R) -> Basis {
    if rng.gen_bool(0.5) {
        Basis::Computational
    } else {
        Basis::Hadamard
    }
}

/// Packs bits (MSB first) into bytes; the caller passes a multiple of 8.
fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_quiet_link_agrees_on_a_key() {
        let outcome =
            run_rounds(None, 8, &QkdConfig::default(), StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(outcome.key.len(), 8);
        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.qber, 0.0);
        assert!(outcome.sifted >= 64);
        assert!(outcome.rounds <= 4096);
    }

    #[test]
    fn test_runs_are_reproducible_under_a_seed() {
        let a = run_rounds(None, 4, &QkdConfig::default(), StdRng::seed_from_u64(9)).unwrap();
        let b = run_rounds(None, 4, &QkdConfig::default(), StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.key, b.key);
        assert_eq!(a.rounds, b.rounds);
    }

    #[test]
    fn test_noisy_link_raises_qber() {
        // 30% depolarizing puts the QBER near 15%, far above zero but under
        // the relaxed abort bound used here.
        let link = NoiseChannel::depolarizing(0.3).unwrap();
        let config = QkdConfig {
            check_fraction: 0.4,
            abort_qber: 0.5,
            ..QkdConfig::default()
        };
        let outcome = run_rounds(Some(&link), 16, &config, StdRng::seed_from_u64(3)).unwrap();
        assert!(outcome.errors > 0, "noise should leak into the check bits");
        assert!(outcome.qber < 0.5);
    }

    #[test]
    fn test_hostile_link_aborts() {
        // Full depolarizing scrambles half the sifted bits.
        let link = NoiseChannel::depolarizing(1.0).unwrap();
        let err = run_rounds(
            Some(&link),
            16,
            &QkdConfig::default(),
            StdRng::seed_from_u64(5),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::QberTooHigh { .. }));
    }

    #[test]
    fn test_round_cap_limits_the_run() {
        let config = QkdConfig {
            rounds: 10,
            ..QkdConfig::default()
        };
        let err = run_rounds(None, 16, &config, StdRng::seed_from_u64(7)).unwrap_err();
        assert!(matches!(err, SimError::InsufficientKeyMaterial { .. }));
    }

    #[test]
    fn test_zero_length_request_is_rejected() {
        let err = run_rounds(None, 0, &QkdConfig::default(), StdRng::seed_from_u64(2))
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter(_)));
    }

    #[test]
    fn test_pack_bits_is_msb_first() {
        assert_eq!(pack_bits(&[1, 0, 0, 0, 0, 0, 0, 1]), vec![0x81]);
        assert_eq!(pack_bits(&[0, 0, 0, 0, 1, 1, 1, 1]), vec![0x0f]);
    }
}
