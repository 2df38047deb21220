//! Simulator boundary types and trait
//!
//! Gantree: L4_Backend → BackendTrait
//!
//! A backend takes a circuit, a shot count and a seed, and returns one row
//! of measurement bits per shot. Column `i` of every row is the `i`-th
//! measurement in program order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use steane_core::circuit::Circuit;
use steane_core::constants::stats::{MAX_SHOTS, MIN_SHOTS};
use steane_core::error::{SteaneError, SteaneResult};
use steane_core::operation::Operation;
use steane_core::types::{Bitstring, ColumnId};

/// Execution metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Backend name
    pub backend: String,

    /// Seed the batch was sampled with
    pub seed: u64,

    /// Number of parallel chunks
    pub chunks: usize,

    /// Wall-clock time in milliseconds
    pub execution_time_ms: Option<u64>,

    /// Whether conditional operations were executed in-circuit
    pub feedforward: bool,
}

/// Sampled shot matrix
/// Gantree: SampleBatch // 샘플 배치
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBatch {
    /// Columns per shot
    pub num_columns: usize,

    /// One row per shot
    pub shots: Vec<Bitstring>,

    /// Execution metadata
    pub metadata: ExecutionMetadata,
}

impl SampleBatch {
    /// Create a batch
    pub fn new(num_columns: usize, shots: Vec<Bitstring>, metadata: ExecutionMetadata) -> Self {
        Self {
            num_columns,
            shots,
            metadata,
        }
    }

    /// Number of shots
    pub fn len(&self) -> usize {
        self.shots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Fraction of shots with column `column` set
    pub fn column_mean(&self, column: ColumnId) -> f64 {
        if self.shots.is_empty() {
            return 0.0;
        }
        let ones = self
            .shots
            .iter()
            .filter(|s| s.get(column).unwrap_or(false))
            .count();
        ones as f64 / self.shots.len() as f64
    }

    /// Check that every row carries exactly `num_columns` bits
    pub fn check_rows(&self) -> SteaneResult<()> {
        match self
            .shots
            .iter()
            .position(|shot| shot.len() != self.num_columns)
        {
            Some(i) => Err(SteaneError::SimulatorFailure(format!(
                "shot {} has {} columns, expected {}",
                i,
                self.shots[i].len(),
                self.num_columns
            ))),
            None => Ok(()),
        }
    }

    /// Histogram of the selected columns
    pub fn counts(&self, columns: &[ColumnId]) -> SteaneResult<BTreeMap<Bitstring, u64>> {
        let mut counts = BTreeMap::new();
        for shot in &self.shots {
            *counts.entry(shot.select(columns)?).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

impl fmt::Display for SampleBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SampleBatch(shots={}, columns={}, backend={})",
            self.shots.len(),
            self.num_columns,
            self.metadata.backend
        )
    }
}

/// Simulator collaborator
/// Gantree: BackendTrait // 백엔드 인터페이스
pub trait Backend: Send + Sync {
    /// Get backend name
    fn name(&self) -> &str;

    /// Get number of qubits
    fn num_qubits(&self) -> usize;

    /// True if mid-circuit classically-controlled operations are executed
    fn supports_feedforward(&self) -> bool;

    /// True if the backend can represent `op`
    fn supports(&self, op: &Operation) -> bool;

    /// Sample `shots` rows of `circuit` with the given seed
    /// Gantree: sample(circuit, shots, seed) -> Result<SampleBatch>
    fn sample(&self, circuit: &Circuit, shots: u64, seed: u64) -> SteaneResult<SampleBatch>;

    /// Get maximum shots per call
    fn max_shots(&self) -> u64 {
        MAX_SHOTS
    }

    /// Check a request before any shot runs; one bad operation fails the batch
    fn validate(&self, circuit: &Circuit, shots: u64) -> SteaneResult<()> {
        if shots < MIN_SHOTS || shots > self.max_shots() {
            return Err(SteaneError::ShotsOutOfRange(shots, MIN_SHOTS, self.max_shots()));
        }
        if circuit.num_qubits() > self.num_qubits() {
            return Err(SteaneError::BackendCapacity {
                backend: self.name().to_string(),
                required: circuit.num_qubits(),
                available: self.num_qubits(),
            });
        }
        if let Some(op) = circuit.operations().iter().find(|op| !self.supports(op)) {
            return Err(SteaneError::UnsupportedOperation {
                backend: self.name().to_string(),
                operation: op.to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
