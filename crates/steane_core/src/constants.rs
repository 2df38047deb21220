//! Constants for the Steane QEC engine
//!
//! Gantree: L0_Foundation → Constants
//!
//! Code parameters, noise-preset ratios and statistical defaults.

// ============================================================================
// Code Constants
// Gantree: code // 코드 상수
// ============================================================================

pub mod code {
    //! Steane [[7,1,3]] parameters

    /// Physical data qubits
    pub const N: usize = 7;

    /// Logical qubits
    pub const K: usize = 1;

    /// Code distance
    pub const D: usize = 3;

    /// Stabilizer generators (3 X-type + 3 Z-type)
    pub const NUM_GENERATORS: usize = 6;

    /// Generator supports shared by the X- and Z-type checks
    pub const CHECK_SUPPORTS: [[usize; 4]; 3] = [[0, 1, 2, 3], [0, 1, 4, 5], [0, 2, 4, 6]];

    /// Largest block size representable by mask-based codeword enumeration
    pub const MAX_MASK_QUBITS: usize = 64;

    /// Largest block size for brute-force distance search
    pub const MAX_DISTANCE_SEARCH_QUBITS: usize = 16;
}

// ============================================================================
// Noise Constants
// Gantree: noise // 노이즈 상수
// ============================================================================

pub mod noise {
    //! Ratios used by the noise presets

    /// Two-qubit gate error relative to single-qubit error (realistic preset)
    pub const TWO_QUBIT_FACTOR: f64 = 10.0;

    /// Measurement error relative to single-qubit error (realistic preset)
    pub const MEASUREMENT_FACTOR: f64 = 5.0;

    /// Default Z:X bias ratio for the biased preset
    pub const DEFAULT_BIAS: f64 = 10.0;

    /// Number of non-identity two-qubit Pauli pairs
    pub const TWO_QUBIT_PAULIS: usize = 15;
}

// ============================================================================
// Statistics Constants
// Gantree: stats // 통계 상수
// ============================================================================

pub mod stats {
    //! Statistical defaults

    /// Default shots per experiment
    pub const DEFAULT_SHOTS: u64 = 1000;

    /// Minimum shots per experiment
    pub const MIN_SHOTS: u64 = 1;

    /// Maximum shots per experiment
    pub const MAX_SHOTS: u64 = 10_000_000;

    /// Maximum correction rounds per experiment
    pub const MAX_ROUNDS: usize = 1000;

    /// Shots simulated per parallel chunk
    pub const SHOTS_PER_CHUNK: u64 = 256;

    /// Minimum usable points for a power-law fit
    pub const MIN_FIT_POINTS: usize = 2;

    /// Default physical error-rate sweep
    pub const DEFAULT_SWEEP: [f64; 6] = [0.001, 0.002, 0.005, 0.01, 0.02, 0.05];
}
