//! Benchmarks for the density-matrix state engine
//!
//! Run with: cargo bench -p qnet-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qnet_core::{BellState, EntangledPair, Gate, Measurement, NoiseChannel, PairId, QuantumState};

/// Benchmark single-gate application across register sizes
fn bench_gate_application(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_application");

    for num_qubits in &[1, 2, 3, 4] {
        group.bench_with_input(
            BenchmarkId::new("hadamard", num_qubits),
            num_qubits,
            |b, &n| {
                let mut state = QuantumState::zero(n);
                b.iter(|| {
                    state.apply(black_box(&Gate::h()), black_box(&[0])).unwrap();
                });
            },
        );
    }

    group.bench_function("cnot_on_pair", |b| {
        let mut state = QuantumState::zero(2);
        b.iter(|| {
            state
                .apply(black_box(&Gate::cnot()), black_box(&[0, 1]))
                .unwrap();
        });
    });

    group.finish();
}

/// Benchmark Kraus-channel application across register sizes
fn bench_channel_application(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_application");

    let channel = NoiseChannel::depolarizing(0.05).unwrap();
    for num_qubits in &[1, 2, 3] {
        group.bench_with_input(
            BenchmarkId::new("depolarizing", num_qubits),
            num_qubits,
            |b, &n| {
                let mut state = QuantumState::zero(n);
                b.iter(|| {
                    state.apply_channel(black_box(&channel), black_box(&[0])).unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark Bell-pair preparation for each variant
fn bench_pair_preparation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_preparation");

    for bell in [
        BellState::PhiPlus,
        BellState::PhiMinus,
        BellState::PsiPlus,
        BellState::PsiMinus,
    ] {
        group.bench_function(bell.label(), |b| {
            b.iter(|| EntangledPair::prepare(black_box(PairId(0)), black_box(bell), None).unwrap());
        });
    }

    let noisy = NoiseChannel::depolarizing(0.05).unwrap();
    group.bench_function("phi_plus_noisy_link", |b| {
        b.iter(|| {
            EntangledPair::prepare(black_box(PairId(0)), BellState::PhiPlus, Some(&noisy)).unwrap()
        });
    });

    group.finish();
}

/// Benchmark outcome-probability evaluation on an entangled register
fn bench_probabilities(c: &mut Criterion) {
    let mut group = c.benchmark_group("probabilities");

    let mut state = QuantumState::zero(2);
    state.apply(&Gate::h(), &[0]).unwrap();
    state.apply(&Gate::cnot(), &[0, 1]).unwrap();

    group.bench_function("z_basis_half", |b| {
        b.iter(|| {
            state
                .probabilities(black_box(&Measurement::z_basis()), black_box(&[0]))
                .unwrap()
        });
    });

    group.bench_function("zz_parity", |b| {
        b.iter(|| {
            state
                .probabilities(black_box(&Measurement::zz_parity()), black_box(&[0, 1]))
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_gate_application,
    bench_channel_application,
    bench_pair_preparation,
    bench_probabilities,
);

criterion_main!(benches);
