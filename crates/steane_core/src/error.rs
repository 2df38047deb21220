//! Error types for the Steane QEC engine
//!
//! Gantree: L0_Foundation → Errors
//!
//! Errors are grouped by how they propagate: configuration errors abort
//! before any shot runs, simulator failures abort the batch, and statistical
//! degeneracy is only raised where no "undefined" marker can be returned.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type
/// Gantree: SteaneError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SteaneError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Probability value out of range [0, 1]
    /// Gantree: InvalidProbability(f64) // 확률 범위
    #[error("Invalid probability {0}: must be in range [0, 1]")]
    InvalidProbability(f64),

    /// Noise parameter is negative, non-finite or inconsistent
    #[error("Invalid noise parameter '{name}' = {value}: {reason}")]
    InvalidNoiseParameter {
        name: String,
        value: f64,
        reason: String,
    },

    /// Two stabilizer generators anticommute
    /// Gantree: NonCommutingGenerators{{a,b}} // 교환 위반
    #[error("Stabilizer generators {first} and {second} do not commute")]
    NonCommutingGenerators { first: usize, second: usize },

    /// Logical operator inconsistent with the stabilizer group
    #[error("Invalid logical operator: {0}")]
    InvalidLogicalOperator(String),

    /// Qubit index out of range
    #[error("Qubit {qubit} out of range: code has {max} qubits")]
    QubitOutOfRange { qubit: usize, max: usize },

    /// Malformed code definition (empty generator, too many qubits, ...)
    #[error("Invalid stabilizer code: {0}")]
    InvalidCode(String),

    /// Two decodable errors share a syndrome
    #[error("Syndrome collision: {first} and {second} produce syndrome {syndrome}")]
    SyndromeCollision {
        first: String,
        second: String,
        syndrome: String,
    },

    /// Experiment configuration rejected
    #[error("Invalid experiment configuration: {0}")]
    InvalidConfig(String),

    /// Invalid bitstring format
    #[error("Invalid bitstring '{0}': must contain only '0' and '1'")]
    InvalidBitstring(String),

    /// Invalid Pauli character
    #[error("Invalid Pauli '{0}': must be X, Y, or Z")]
    InvalidPauli(String),

    // ========================================================================
    // Circuit Errors
    // ========================================================================
    /// Operation on non-existent qubit
    #[error("Operation references qubit {qubit} but circuit has only {num_qubits} qubits")]
    GateQubitMismatch { qubit: usize, num_qubits: usize },

    /// Two-qubit operation with identical operands
    #[error("Operation '{op}' uses qubit {qubit} twice")]
    RepeatedQubit { op: String, qubit: usize },

    /// Measurement column out of program order
    #[error("Measurement column {column} issued out of order: expected {expected}")]
    ColumnOutOfOrder { column: usize, expected: usize },

    /// Conditional operation reads a column that is not yet measured
    #[error("Condition reads column {column} but only {measured} columns are measured")]
    UnmeasuredColumn { column: usize, measured: usize },

    /// Noise channel applied to the wrong number of qubits
    #[error("Noise channel {channel} expects {expected} qubits, got {actual}")]
    NoiseArityMismatch {
        channel: String,
        expected: usize,
        actual: usize,
    },

    // ========================================================================
    // Simulator Errors
    // ========================================================================
    /// Backend cannot represent an operation; the whole batch is refused
    /// Gantree: UnsupportedOperation{{op,backend}} // 미지원 연산
    #[error("Backend '{backend}' cannot execute operation '{operation}'")]
    UnsupportedOperation { backend: String, operation: String },

    /// Generic simulator failure
    /// Gantree: SimulatorFailure(String) // 시뮬레이터
    #[error("Simulator failure: {0}")]
    SimulatorFailure(String),

    /// Shot record is shorter than the columns read from it
    #[error("Shot record has {len} columns, column {column} requested")]
    MissingColumn { column: usize, len: usize },

    /// Shots out of range
    #[error("Shots {0} out of range [{1}, {2}]")]
    ShotsOutOfRange(u64, u64, u64),

    /// Circuit needs more qubits than the backend offers
    #[error("Circuit needs {required} qubits but backend '{backend}' supports {available}")]
    BackendCapacity {
        backend: String,
        required: usize,
        available: usize,
    },

    // ========================================================================
    // Statistical Errors
    // ========================================================================
    /// Not enough usable data for a statistic
    /// Gantree: StatisticalDegenerate(String) // 통계 퇴화
    #[error("Statistically degenerate: {0}")]
    StatisticalDegenerate(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias
/// Gantree: SteaneResult<T> // type alias
pub type SteaneResult<T> = Result<T, SteaneError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for SteaneError {
    fn from(err: serde_json::Error) -> Self {
        SteaneError::JsonError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl SteaneError {
    /// Build an invalid noise parameter error
    pub fn noise_parameter(name: &str, value: f64, reason: impl Into<String>) -> Self {
        SteaneError::InvalidNoiseParameter {
            name: name.to_string(),
            value,
            reason: reason.into(),
        }
    }

    /// Check if error is a construction-time configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SteaneError::InvalidProbability(_)
                | SteaneError::InvalidNoiseParameter { .. }
                | SteaneError::NonCommutingGenerators { .. }
                | SteaneError::InvalidLogicalOperator(_)
                | SteaneError::QubitOutOfRange { .. }
                | SteaneError::InvalidCode(_)
                | SteaneError::SyndromeCollision { .. }
                | SteaneError::InvalidConfig(_)
        )
    }

    /// Check if error comes from the simulator collaborator
    pub fn is_simulator_failure(&self) -> bool {
        matches!(
            self,
            SteaneError::UnsupportedOperation { .. }
                | SteaneError::SimulatorFailure(_)
                | SteaneError::MissingColumn { .. }
                | SteaneError::ShotsOutOfRange(..)
                | SteaneError::BackendCapacity { .. }
        )
    }

    /// Check if error is a circuit construction error
    pub fn is_circuit_error(&self) -> bool {
        matches!(
            self,
            SteaneError::GateQubitMismatch { .. }
                | SteaneError::RepeatedQubit { .. }
                | SteaneError::ColumnOutOfOrder { .. }
                | SteaneError::UnmeasuredColumn { .. }
                | SteaneError::NoiseArityMismatch { .. }
        )
    }

    /// Check if a campaign may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SteaneError::StatisticalDegenerate(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
