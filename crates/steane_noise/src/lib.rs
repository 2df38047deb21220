//! # Steane Noise
//!
//! Circuit-level noise models for the Steane QEC engine.
//!
//! ## Gantree Architecture
//!
//! ```text
//! steane_noise // L2: Noise Model (완료)
//!     NoiseModel // 통합 노이즈 (완료)
//!         gate_1q, gate_2q, measurement, storage, bias
//!         ideal(), uniform(), realistic(), biased(), scaled()
//!         inject(), specs()
//!     NoisePreset // 스윕용 프리셋 (완료)
//!     NoiseSpec // 노이즈 명세 (완료)
//!         kind, probability, applies_to, point
//!     InsertionPoint // 삽입 지점 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use steane_noise::prelude::*;
//!
//! let model = NoiseModel::realistic(0.001);
//! assert!(model.validate().is_ok());
//!
//! // One two-qubit depolarizing channel after a CNOT
//! let ops = model.inject(InsertionPoint::AfterExtractionOp, &[0, 7]);
//! assert_eq!(ops.len(), 1);
//!
//! // The ideal model never emits noise
//! assert!(NoiseModel::ideal()
//!     .inject(InsertionPoint::Storage, &[0, 1, 2])
//!     .is_empty());
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Noise model (Gantree: L2_Noise → NoiseModel)
pub mod noise_model;

/// Noise specification records (Gantree: L2_Noise → NoiseSpec)
pub mod noise_spec;

// ============================================================================
// Re-exports
// ============================================================================

pub use noise_model::{NoiseModel, NoisePreset};
pub use noise_spec::{Arity, ChannelKind, InsertionPoint, NoiseSpec};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports

    pub use crate::noise_model::{NoiseModel, NoisePreset};
    pub use crate::noise_spec::{Arity, ChannelKind, InsertionPoint, NoiseSpec};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use steane_core::prelude::*;

    #[test]
    fn test_injected_ops_fit_circuit() {
        let model = NoiseModel::realistic(0.002);
        let mut circuit = Circuit::new(3);
        circuit.push(Operation::Cnot(0, 1)).unwrap();
        circuit
            .extend(model.inject(InsertionPoint::AfterEncodingOp, &[0, 1]))
            .unwrap();
        circuit
            .extend(model.inject(InsertionPoint::BeforeMeasurement, &[2]))
            .unwrap();
        circuit.measure(2).unwrap();

        assert_eq!(circuit.count_noise(), 2);
        assert!(circuit.is_clifford());
    }

    #[test]
    fn test_sweep_presets_monotone_rates() {
        let rates: Vec<f64> = [0.001, 0.01, 0.05]
            .iter()
            .map(|&p| NoisePreset::Realistic.at(p).gate_2q())
            .collect();
        assert!(rates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_uniform_specs_are_depolarizing() {
        let specs = NoiseModel::uniform(0.01).specs().unwrap();
        assert!(specs
            .iter()
            .filter(|s| s.point == InsertionPoint::Storage)
            .all(|s| s.kind == ChannelKind::Depolarizing));
    }
}
