//! Error types for the state engine.

use thiserror::Error;

/// Errors raised while constructing or validating a gate.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GateError {
    /// The matrix is not square or its dimension is not a power of two.
    #[error("gate matrix has invalid shape {rows}x{cols}")]
    InvalidShape { rows: usize, cols: usize },

    /// The matrix failed the unitarity check.
    #[error("gate '{0}' is not unitary")]
    NotUnitary(String),
}

/// Errors raised while constructing or applying a measurement.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MeasurementError {
    /// A measurement needs at least one operator.
    #[error("measurement has no operators")]
    Empty,

    /// Operators in one measurement must share a single dimension.
    #[error("measurement operators have mismatched dimensions")]
    MixedDimensions,

    /// The operators do not satisfy the completeness relation.
    #[error("measurement operators do not sum to identity")]
    NotComplete,
}

/// Errors raised while constructing or applying a noise channel.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ChannelError {
    /// A channel needs at least one Kraus operator.
    #[error("channel has no Kraus operators")]
    Empty,

    /// Kraus operators in one channel must share a single dimension.
    #[error("Kraus operators have mismatched dimensions")]
    MixedDimensions,

    /// The Kraus operators do not satisfy the trace-preservation relation.
    #[error("channel is not trace preserving")]
    NotTracePreserving,

    /// A probability parameter fell outside `[0, 1]`.
    #[error("probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
}

/// Top-level error for state operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum StateError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// A density matrix or state vector had a non power-of-two dimension.
    #[error("state dimension {0} is not a power of two")]
    InvalidDimension(usize),

    /// A qubit index addressed a qubit the register does not have.
    #[error("qubit {index} out of range for {num_qubits}-qubit register")]
    QubitOutOfRange { index: usize, num_qubits: usize },

    /// The same qubit was named twice in one operation.
    #[error("qubit {0} listed more than once")]
    DuplicateQubit(usize),

    /// An operator of the wrong arity was applied to a qubit list.
    #[error("operator acts on {expected} qubits but {given} were addressed")]
    ArityMismatch { expected: usize, given: usize },

    /// Two states of different register sizes were combined.
    #[error("register sizes differ: {left} vs {right} qubits")]
    SizeMismatch { left: usize, right: usize },

    /// A density matrix lost unit trace beyond tolerance.
    #[error("density matrix trace {0} deviates from 1")]
    TraceNotOne(f64),

    /// Every measurement outcome had vanishing probability.
    #[error("no measurement outcome has nonzero probability")]
    NoViableOutcome,

    /// An entangled pair was used after it had been consumed.
    #[error("entangled pair already consumed")]
    PairConsumed,
}

/// Convenience alias for state-engine results.
pub type CoreResult<T> = Result<T, StateError>;
