//! # Steane Core
//!
//! Foundation types, tagged operations and circuits for the Steane QEC engine.
//!
//! ## Gantree Architecture
//!
//! ```text
//! steane_core // L0+L1: Foundation + Circuit (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // 핵심 타입 (완료)
//!         Constants // 코드/노이즈/통계 상수 (완료)
//!         Errors // 에러 타입 (완료)
//!     L1_Circuit // 회로 구조 (완료)
//!         Operation // 연산 enum (완료)
//!         Circuit // 회로 구조체 (완료)
//!         CircuitBuilder // 빌더 패턴 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use steane_core::prelude::*;
//!
//! let circuit = CircuitBuilder::new(3)
//!     .h(0)
//!     .cnot(0, 1)
//!     .depolarize2(0, 1, 0.01)
//!     .measure_all()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(circuit.num_measurements(), 3);
//! assert_eq!(circuit.count_noise(), 1);
//! ```
//!
//! ## Feedforward
//!
//! ```rust
//! use steane_core::prelude::*;
//!
//! // Flip qubit 1 when column 0 reads 1
//! let circuit = CircuitBuilder::new(2)
//!     .h(0)
//!     .measure(0)
//!     .conditional(&[0], &[true], PauliKind::X, 1)
//!     .build()
//!     .unwrap();
//!
//! assert!(circuit.requires_feedforward());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Circuit operations (Gantree: L1_Circuit → Operation)
pub mod operation;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{code, noise, stats};
pub use error::{SteaneError, SteaneResult};
pub use operation::{Condition, NoiseChannel, Operation};
pub use types::{Bitstring, ColumnId, LogicalState, PauliKind, Probability, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use steane_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{code, noise, stats};
    pub use crate::error::{SteaneError, SteaneResult};
    pub use crate::operation::{Condition, NoiseChannel, Operation};
    pub use crate::types::{Bitstring, ColumnId, LogicalState, PauliKind, Probability, QubitId};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_check_circuit_shape() {
        // One X-type check on support {0,1,2,3} with ancilla 7
        let mut builder = CircuitBuilder::new(8).h(7);
        for q in code::CHECK_SUPPORTS[0] {
            builder = builder.cnot(7, q);
        }
        let circuit = builder.h(7).measure(7).build().unwrap();

        assert_eq!(circuit.count_2q(), 4);
        assert_eq!(circuit.num_measurements(), 1);
        assert_eq!(circuit.depth(), 7);
        assert!(circuit.is_clifford());
    }

    #[test]
    fn test_non_clifford_detected() {
        let circuit = CircuitBuilder::new(1).h(0).t(0).build().unwrap();
        assert!(!circuit.is_clifford());
    }

    #[test]
    fn test_circuit_serde_roundtrip() {
        let circuit = CircuitBuilder::with_name(2, "pair")
            .h(0)
            .cnot(0, 1)
            .depolarize1(1, 0.02)
            .measure_all()
            .build()
            .unwrap();

        let json = serde_json::to_string(&circuit).unwrap();
        let parsed: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, circuit);
        assert_eq!(parsed.name(), Some("pair"));
    }

    #[test]
    fn test_version() {
        assert!(!crate::VERSION.is_empty());
        assert_eq!(crate::NAME, "steane_core");
    }

    #[test]
    fn test_probability_validation() {
        assert!(Probability::new(0.05).is_ok());
        assert!(Probability::new(-0.05).is_err());
        assert_eq!(Probability::ZERO.value(), 0.0);
    }
}
