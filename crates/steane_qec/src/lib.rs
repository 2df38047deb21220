//! # Steane QEC
//!
//! Multi-round error-correction scheduling, shot campaigns and logical
//! error statistics for the Steane [[7,1,3]] code.
//!
//! ## Gantree Architecture
//!
//! ```text
//! steane_qec // L5: Protocol Engine (완료)
//!     ExperimentConfig // 실험 설정 (완료)
//!         FeedforwardMode, PostSelection
//!         default_memory(), quick(), ideal(), to_json()
//!     QecRoundScheduler // 라운드 스케줄러 (완료)
//!         RoundState // Encoding → RoundActive → Decoded
//!                    // → Corrected | Flagged → Readout → Done
//!         build(), build_unprotected(), replay()
//!     StatisticsEngine // 통계 (완료)
//!         ShotStatistics, PostSelectionReport, Estimate
//!         PatternHistogram // unique_patterns(), most_common(k)
//!         fit_power_law(), points_below_break_even()
//!     ExperimentRunner // 실험 실행기 (완료)
//!         run(), run_with_cancel(), sweep()
//!         compare_rounds(), compare_with_baseline()
//!         compare_noise_models()
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use steane_backend::StabilizerSimulator;
//! use steane_qec::prelude::*;
//!
//! let runner = ExperimentRunner::new(Arc::new(StabilizerSimulator::new()));
//! let config = ExperimentConfig::ideal().with_rounds(1).with_shots(100);
//!
//! let result = runner.run(&config).unwrap();
//! assert_eq!(result.raw_fidelity().value(), Some(1.0));
//! assert!(!result.degraded);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Experiment configuration (Gantree: L5_Qec → ExperimentConfig)
pub mod config;

/// Round scheduling and replay (Gantree: L5_Qec → QecRoundScheduler)
pub mod scheduler;

/// Statistics and fitting (Gantree: L5_Qec → StatisticsEngine)
pub mod stats;

/// Campaign driver (Gantree: L5_Qec → ExperimentRunner)
pub mod runner;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ExperimentConfig, FeedforwardMode, PostSelection};
pub use runner::{BaselineComparison, ExperimentResult, ExperimentRunner, SweepPoint, SweepReport};
pub use scheduler::{
    CircuitLayout, CorrectionMode, QecRoundScheduler, RoundRecord, RoundState, ScheduledCircuit,
    ShotOutcome, ShotTrace,
};
pub use stats::{
    binomial_standard_error, fit_power_law, points_below_break_even, Estimate, PatternHistogram,
    PostSelectionReport, PowerLawFit, Regime, ShotStatistics,
};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports

    pub use crate::config::{ExperimentConfig, FeedforwardMode, PostSelection};
    pub use crate::runner::{
        BaselineComparison, ExperimentResult, ExperimentRunner, SweepPoint, SweepReport,
    };
    pub use crate::scheduler::{
        CircuitLayout, CorrectionMode, QecRoundScheduler, RoundState, ShotTrace,
    };
    pub use crate::stats::{
        fit_power_law, Estimate, PatternHistogram, PowerLawFit, Regime, ShotStatistics,
    };
}

// ============================================================================
// Integration Tests
// ============================================================================
