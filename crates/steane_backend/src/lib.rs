//! # Steane Backend
//!
//! Simulator boundary for the Steane QEC engine and a Clifford stabilizer
//! sampler that implements it.
//!
//! ## Gantree Architecture
//!
//! ```text
//! steane_backend // L4: Backend Layer (완료)
//!     BackendTrait // 백엔드 인터페이스 (완료)
//!         name(), num_qubits(), supports_feedforward()
//!         supports(), sample(), validate()
//!     SampleBatch // 샘플 배치 (완료)
//!         column_mean(), counts(), check_rows()
//!     Tableau // CHP 테이블 (완료)
//!         h(), s(), sdg(), cnot(), cz(), pauli(), measure()
//!     StabilizerSimulator // 시뮬레이터 구현 (완료)
//!         new(), without_feedforward(), with_capacity()
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use steane_backend::prelude::*;
//! use steane_core::CircuitBuilder;
//!
//! let circuit = CircuitBuilder::new(2)
//!     .h(0)
//!     .cnot(0, 1)
//!     .measure_all()
//!     .build()
//!     .unwrap();
//!
//! let backend = StabilizerSimulator::new();
//! let batch = backend.sample(&circuit, 100, 42).unwrap();
//! assert_eq!(batch.len(), 100);
//! assert!(batch.shots.iter().all(|s| s.get(0) == s.get(1)));
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Backend trait and sample types (Gantree: L4_Backend → BackendTrait)
pub mod execution;

/// Stabilizer tableau (Gantree: L4_Backend → Tableau)
pub mod tableau;

/// Tableau sampler (Gantree: L4_Backend → StabilizerSimulator)
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::{Backend, ExecutionMetadata, SampleBatch};
pub use simulator::StabilizerSimulator;
pub use tableau::Tableau;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports

    pub use crate::execution::{Backend, ExecutionMetadata, SampleBatch};
    pub use crate::simulator::StabilizerSimulator;
    pub use crate::tableau::Tableau;
}

// ============================================================================
// Integration Tests
// ============================================================================
