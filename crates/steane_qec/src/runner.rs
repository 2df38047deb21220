//! Shot campaigns
//!
//! Gantree: L5_Qec → ExperimentRunner
//!
//! Builds the scheduled circuit once, issues it to the backend in batches,
//! and classifies each batch in parallel into mergeable counters.

use crate::config::{ExperimentConfig, FeedforwardMode};
use crate::scheduler::{CorrectionMode, QecRoundScheduler, ScheduledCircuit};
use crate::stats::{
    fit_power_law, points_below_break_even, Estimate, PatternHistogram, PostSelectionReport,
    PowerLawFit, ShotStatistics,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use steane_backend::Backend;
use steane_code::StabilizerCode;
use steane_core::error::{SteaneError, SteaneResult};
use steane_noise::{NoiseModel, NoisePreset};

// ============================================================================
// Results
// ============================================================================

/// Outcome of one campaign
/// Gantree: ExperimentResult // 실험 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Configuration that produced this result
    pub config: ExperimentConfig,

    /// Backend name
    pub backend: String,

    /// Correction mode actually used
    pub mode: CorrectionMode,

    /// Feedforward was requested but unavailable
    pub degraded: bool,

    /// Stopped early by the cancel flag
    pub cancelled: bool,

    /// Backend calls issued
    pub batches: usize,

    /// Counters
    pub statistics: ShotStatistics,

    /// Post-selection summary for the configured predicate
    pub post_selection: PostSelectionReport,

    /// Backend time summed over batches
    pub execution_time_ms: u64,
}

impl ExperimentResult {
    /// Raw codeword fidelity
    pub fn raw_fidelity(&self) -> Estimate {
        self.statistics.raw_fidelity()
    }

    /// Decoded logical fidelity
    pub fn decoded_fidelity(&self) -> Estimate {
        self.statistics.decoded_fidelity()
    }

    /// Decoded logical error rate
    pub fn logical_error_rate(&self) -> Estimate {
        self.statistics.logical_error_rate()
    }

    /// Corrected readout histogram
    pub fn patterns(&self) -> &PatternHistogram {
        &self.statistics.patterns
    }
}

impl fmt::Display for ExperimentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExperimentResult(shots={}, mode={}{}, raw={}, decoded={})",
            self.statistics.shots,
            self.mode,
            if self.degraded { " [degraded]" } else { "" },
            self.raw_fidelity(),
            self.decoded_fidelity()
        )
    }
}

/// One point of a physical-error-rate sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Physical error rate
    pub physical_error_rate: f64,

    /// Campaign result at this rate
    pub result: ExperimentResult,
}

/// Sweep results with the power-law fit
/// Gantree: SweepReport // 스윕 보고
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Points in sweep order
    pub points: Vec<SweepPoint>,

    /// Fit over points with p > 0 and L > 0
    pub fit: Option<PowerLawFit>,

    /// Why the fit is missing, if it is
    pub fit_error: Option<String>,

    /// Points with L < p
    pub below_break_even: usize,
}

impl SweepReport {
    /// (p, L) pairs with a defined logical error rate
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|pt| {
                pt.result
                    .logical_error_rate()
                    .value()
                    .map(|l| (pt.physical_error_rate, l))
            })
            .collect()
    }
}

/// Protected vs unprotected memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineComparison {
    /// With syndrome extraction and correction
    pub protected: ExperimentResult,

    /// Encode, idle, read out
    pub unprotected: ExperimentResult,

    /// Decoded fidelity gain of protected over unprotected
    pub improvement: Estimate,
}

// ============================================================================
// Runner
// ============================================================================

/// Campaign driver
/// Gantree: ExperimentRunner // 실험 실행기
pub struct ExperimentRunner {
    backend: Arc<dyn Backend>,
    code: StabilizerCode,
}

impl ExperimentRunner {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Runner for the Steane code on `backend`
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_code(backend, StabilizerCode::steane())
    }

    /// Runner for an arbitrary single-logical-qubit code
    pub fn with_code(backend: Arc<dyn Backend>, code: StabilizerCode) -> Self {
        Self { backend, code }
    }

    /// Backend
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    // ========================================================================
    // Campaigns
    // ========================================================================

    /// Run a campaign to completion
    /// Gantree: run(config) -> Result<ExperimentResult> // 실행
    pub fn run(&self, config: &ExperimentConfig) -> SteaneResult<ExperimentResult> {
        self.run_with_cancel(config, &AtomicBool::new(false))
    }

    /// Run a campaign, checking `cancel` before each batch
    pub fn run_with_cancel(
        &self,
        config: &ExperimentConfig,
        cancel: &AtomicBool,
    ) -> SteaneResult<ExperimentResult> {
        let scheduler = QecRoundScheduler::new(self.code.clone(), config)?;
        let required = scheduler.required_qubits();
        if required > self.backend.num_qubits() {
            return Err(SteaneError::BackendCapacity {
                backend: self.backend.name().to_string(),
                required,
                available: self.backend.num_qubits(),
            });
        }
        let (mode, degraded) = self.resolve_mode(config.feedforward);
        let scheduled = scheduler.build(mode)?;
        self.execute(config, &scheduler, &scheduled, mode, degraded, cancel)
    }

    /// Unprotected memory over `periods` storage periods
    pub fn baseline(
        &self,
        config: &ExperimentConfig,
        periods: usize,
    ) -> SteaneResult<ExperimentResult> {
        let scheduler = QecRoundScheduler::new(self.code.clone(), config)?;
        let scheduled = scheduler.build_unprotected(periods)?;
        self.execute(
            config,
            &scheduler,
            &scheduled,
            CorrectionMode::PostHoc,
            false,
            &AtomicBool::new(false),
        )
    }

    /// Same configuration with and without correction
    ///
    /// The unprotected circuit idles for as many storage periods as the
    /// protected one has rounds.
    pub fn compare_with_baseline(
        &self,
        config: &ExperimentConfig,
    ) -> SteaneResult<BaselineComparison> {
        let protected = self.run(config)?;
        let unprotected = self.baseline(config, config.rounds)?;
        let improvement = match (
            protected.decoded_fidelity().value(),
            unprotected.decoded_fidelity().value(),
        ) {
            (Some(a), Some(b)) => Estimate::Defined(a - b),
            _ => Estimate::Undefined {
                reason: "no shots".to_string(),
            },
        };
        Ok(BaselineComparison {
            protected,
            unprotected,
            improvement,
        })
    }

    /// One campaign per round count
    pub fn compare_rounds(
        &self,
        config: &ExperimentConfig,
        rounds: &[usize],
    ) -> SteaneResult<Vec<ExperimentResult>> {
        rounds
            .iter()
            .map(|&r| self.run(&config.clone().with_rounds(r)))
            .collect()
    }

    /// One campaign per noise model, everything else held fixed
    /// Gantree: compare_noise_models(config, models) -> Result<Vec<ExperimentResult>> // 노이즈 비교
    pub fn compare_noise_models(
        &self,
        config: &ExperimentConfig,
        models: &[NoiseModel],
    ) -> SteaneResult<Vec<ExperimentResult>> {
        models
            .iter()
            .map(|model| {
                let result = self.run(&config.clone().with_noise(*model))?;
                log::info!(
                    "{}: raw={}, {} distinct readouts",
                    model,
                    result.raw_fidelity(),
                    result.patterns().unique_patterns()
                );
                Ok(result)
            })
            .collect()
    }

    /// Sweep the physical error rate and fit L = a·p^β
    /// Gantree: sweep(config, preset, rates) -> Result<SweepReport> // 스윕
    pub fn sweep(
        &self,
        config: &ExperimentConfig,
        preset: NoisePreset,
        rates: &[f64],
    ) -> SteaneResult<SweepReport> {
        let mut points = Vec::with_capacity(rates.len());
        for &p in rates {
            let result = self.run(&config.clone().with_noise(preset.at(p)))?;
            log::info!("Sweep p={:.4}: L={}", p, result.logical_error_rate());
            points.push(SweepPoint {
                physical_error_rate: p,
                result,
            });
        }

        let mut report = SweepReport {
            points,
            fit: None,
            fit_error: None,
            below_break_even: 0,
        };
        let pairs = report.pairs();
        report.below_break_even = points_below_break_even(&pairs);

        match fit_power_law(&pairs) {
            Ok(fit) => {
                if !fit.excluded.is_empty() {
                    log::info!("Excluded {} sweep points from the fit", fit.excluded.len());
                }
                report.fit = Some(fit);
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("Power-law fit unavailable: {}", e);
                report.fit_error = Some(e.to_string());
            }
            Err(e) => return Err(e),
        }

        Ok(report)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Map a preference onto what the backend can do
    fn resolve_mode(&self, preference: FeedforwardMode) -> (CorrectionMode, bool) {
        match preference {
            FeedforwardMode::MeasureOnly => (CorrectionMode::PostHoc, false),
            FeedforwardMode::Auto | FeedforwardMode::Conditional => {
                if self.backend.supports_feedforward() {
                    (CorrectionMode::InCircuit, false)
                } else {
                    log::warn!(
                        "Backend '{}' has no classical feedforward; using measure-only mode",
                        self.backend.name()
                    );
                    (CorrectionMode::PostHoc, true)
                }
            }
        }
    }

    fn execute(
        &self,
        config: &ExperimentConfig,
        scheduler: &QecRoundScheduler,
        scheduled: &ScheduledCircuit,
        mode: CorrectionMode,
        degraded: bool,
        cancel: &AtomicBool,
    ) -> SteaneResult<ExperimentResult> {
        let circuit = &scheduled.circuit;
        let layout = &scheduled.layout;
        let predicate = config.post_selection;

        // Refuse before the first shot
        self.backend
            .validate(circuit, config.batch_size.min(config.shots))?;

        log::info!(
            "Campaign on '{}': {} shots, {} rounds, {} qubits, mode {}",
            self.backend.name(),
            config.shots,
            layout.rounds(),
            circuit.num_qubits(),
            mode
        );

        let mut statistics = ShotStatistics::default();
        let mut batches = 0usize;
        let mut cancelled = false;
        let mut execution_time_ms = 0u64;
        let mut remaining = config.shots;

        while remaining > 0 {
            if cancel.load(Ordering::Relaxed) {
                log::info!("Campaign cancelled after {} batches", batches);
                cancelled = true;
                break;
            }

            let shots = remaining.min(config.batch_size);
            let seed = config.seed.wrapping_add(batches as u64);
            let batch = self.backend.sample(circuit, shots, seed)?;
            if batch.num_columns != layout.num_columns() {
                return Err(SteaneError::SimulatorFailure(format!(
                    "expected {} columns, backend returned {}",
                    layout.num_columns(),
                    batch.num_columns
                )));
            }
            batch.check_rows()?;

            let partial = batch
                .shots
                .par_iter()
                .try_fold(ShotStatistics::default, |mut acc, shot| {
                    acc.record(&scheduler.replay(shot, layout)?, predicate);
                    Ok::<_, SteaneError>(acc)
                })
                .try_reduce(ShotStatistics::default, |a, b| Ok(a.merge(b)))?;

            statistics = statistics.merge(partial);
            execution_time_ms += batch.metadata.execution_time_ms.unwrap_or(0);
            remaining -= shots;
            batches += 1;

            log::debug!(
                "Batch {}: {} shots, {} remaining, raw fidelity so far {}",
                batches,
                shots,
                remaining,
                statistics.raw_fidelity()
            );
        }

        let post_selection = statistics.post_selection(predicate);
        let result = ExperimentResult {
            config: config.clone(),
            backend: self.backend.name().to_string(),
            mode,
            degraded,
            cancelled,
            batches,
            statistics,
            post_selection,
            execution_time_ms,
        };

        log::info!("Campaign finished: {}", result);
        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PostSelection;
    use steane_backend::{ExecutionMetadata, SampleBatch, StabilizerSimulator};
    use steane_core::types::Bitstring;
    use steane_core::circuit::Circuit;
    use steane_core::operation::Operation;
    use steane_core::constants::stats::MAX_ROUNDS;
    use steane_core::types::LogicalState;

    fn runner() -> ExperimentRunner {
        ExperimentRunner::new(Arc::new(StabilizerSimulator::new()))
    }

    /// Backend that accepts everything and fails every sample
    struct BrokenBackend;

    impl Backend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }
        fn num_qubits(&self) -> usize {
            1000
        }
        fn supports_feedforward(&self) -> bool {
            true
        }
        fn supports(&self, _op: &Operation) -> bool {
            true
        }
        fn sample(&self, _c: &Circuit, _shots: u64, _seed: u64) -> SteaneResult<SampleBatch> {
            Err(SteaneError::SimulatorFailure("device offline".into()))
        }
    }

    /// Backend that reports the right column count but returns empty rows
    struct ShortRowBackend;

    impl Backend for ShortRowBackend {
        fn name(&self) -> &str {
            "short_rows"
        }
        fn num_qubits(&self) -> usize {
            1000
        }
        fn supports_feedforward(&self) -> bool {
            true
        }
        fn supports(&self, _op: &Operation) -> bool {
            true
        }
        fn sample(&self, c: &Circuit, shots: u64, _seed: u64) -> SteaneResult<SampleBatch> {
            let rows = (0..shots).map(|_| Bitstring::new(vec![])).collect();
            Ok(SampleBatch::new(
                c.num_measurements(),
                rows,
                ExecutionMetadata::default(),
            ))
        }
    }

    #[test]
    fn test_noiseless_round_trip_all_modes() {
        let runner = runner();
        for mode in [FeedforwardMode::Conditional, FeedforwardMode::MeasureOnly] {
            for rounds in [0, 2] {
                for target in [LogicalState::Zero, LogicalState::One] {
                    let config = ExperimentConfig::ideal()
                        .with_rounds(rounds)
                        .with_shots(300)
                        .with_feedforward(mode)
                        .with_target(target);
                    let result = runner.run(&config).unwrap();
                    assert_eq!(result.raw_fidelity(), Estimate::Defined(1.0));
                    assert_eq!(result.decoded_fidelity(), Estimate::Defined(1.0));
                    assert_eq!(result.statistics.nontrivial_rounds, 0);
                }
            }
        }
    }

    #[test]
    fn test_batches_and_seed() {
        let config = ExperimentConfig::quick()
            .with_noise(NoiseModel::uniform(0.01))
            .with_shots(500)
            .with_batch_size(128);
        let a = runner().run(&config).unwrap();
        let b = runner().run(&config).unwrap();
        assert_eq!(a.batches, 4);
        assert_eq!(a.statistics.shots, 500);
        assert_eq!(a.statistics, b.statistics);
    }

    #[test]
    fn test_degradation_is_surfaced() {
        let runner = ExperimentRunner::new(Arc::new(
            StabilizerSimulator::new().without_feedforward(),
        ));
        let config = ExperimentConfig::ideal().with_rounds(1).with_shots(100);

        let result = runner.run(&config).unwrap();
        assert!(result.degraded);
        assert_eq!(result.mode, CorrectionMode::PostHoc);
        assert!(result.to_string().contains("degraded"));
        assert_eq!(result.raw_fidelity(), Estimate::Defined(1.0));

        let explicit = runner
            .run(&config.clone().with_feedforward(FeedforwardMode::MeasureOnly))
            .unwrap();
        assert!(!explicit.degraded);
    }

    #[test]
    fn test_cancellation_before_first_batch() {
        let cancel = AtomicBool::new(true);
        let result = runner()
            .run_with_cancel(&ExperimentConfig::quick(), &cancel)
            .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.batches, 0);
        assert!(!result.raw_fidelity().is_defined());
    }

    #[test]
    fn test_capacity_fails_before_any_shot() {
        let runner = ExperimentRunner::new(Arc::new(StabilizerSimulator::new().with_capacity(10)));
        let err = runner
            .run(&ExperimentConfig::ideal().with_rounds(2))
            .unwrap_err();
        assert!(matches!(err, SteaneError::BackendCapacity { .. }));
        assert!(err.is_simulator_failure());
    }

    #[test]
    fn test_capacity_checked_before_building() {
        let runner = runner();
        let config = ExperimentConfig::ideal().with_rounds(MAX_ROUNDS);
        match runner.run(&config).unwrap_err() {
            SteaneError::BackendCapacity {
                required,
                available,
                ..
            } => {
                assert_eq!(required, 7 + MAX_ROUNDS * 6);
                assert_eq!(available, runner.backend().num_qubits());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_simulator_failure_propagates() {
        let runner = ExperimentRunner::new(Arc::new(BrokenBackend));
        let err = runner.run(&ExperimentConfig::quick()).unwrap_err();
        assert!(err.is_simulator_failure());
    }

    #[test]
    fn test_short_rows_fail_the_campaign() {
        let runner = ExperimentRunner::new(Arc::new(ShortRowBackend));
        let err = runner
            .run(&ExperimentConfig::quick().with_shots(10))
            .unwrap_err();
        assert!(err.is_simulator_failure());
        assert!(err.to_string().contains("columns"));
    }

    #[test]
    fn test_invalid_config_aborts() {
        let err = runner()
            .run(&ExperimentConfig::quick().with_batch_size(0))
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_post_selection_improves_fidelity() {
        let config = ExperimentConfig::quick()
            .with_noise(NoiseModel::uniform(0.02))
            .with_rounds(1)
            .with_shots(3000)
            .with_batch_size(1000)
            .with_post_selection(PostSelection::AllTrivialSyndromes);
        let result = runner().run(&config).unwrap();

        let all = result.raw_fidelity().value().unwrap();
        let report = &result.post_selection;
        let kept = report.conditional_fidelity.value().unwrap();
        assert!(kept >= all, "post-selected {} < all {}", kept, all);
        assert!(report.yield_fraction.value().unwrap() < 1.0);
        assert!(report.retained > 0);
    }

    #[test]
    fn test_fidelity_monotone_in_noise() {
        let runner = runner();
        let base = ExperimentConfig::quick()
            .with_rounds(1)
            .with_shots(4000)
            .with_batch_size(1000);

        let fidelities: Vec<f64> = [0.0, 0.005, 0.01, 0.02, 0.05]
            .iter()
            .map(|&p| {
                runner
                    .run(&base.clone().with_noise(NoiseModel::uniform(p)))
                    .unwrap()
                    .raw_fidelity()
                    .value()
                    .unwrap()
            })
            .collect();

        assert_eq!(fidelities[0], 1.0);
        for pair in fidelities.windows(2) {
            assert!(pair[1] <= pair[0] + 0.02, "{:?}", fidelities);
        }
        assert!(fidelities[4] < fidelities[0]);
    }

    #[test]
    fn test_readout_patterns_of_noiseless_encoding() {
        let config = ExperimentConfig::ideal()
            .with_rounds(0)
            .with_shots(2000)
            .with_batch_size(500);
        let result = runner().run(&config).unwrap();
        let patterns = result.patterns();

        assert_eq!(patterns.total(), 2000);
        assert_eq!(patterns.unique_patterns(), 8);
        let code = StabilizerCode::steane();
        for (pattern, _) in patterns.most_common(8) {
            let bits = Bitstring::parse(&pattern).unwrap();
            assert!(code.is_codeword_of(&bits, LogicalState::Zero));
        }
    }

    #[test]
    fn test_noise_models_leave_different_readout_patterns() {
        let config = ExperimentConfig::quick()
            .with_rounds(0)
            .with_shots(4000)
            .with_batch_size(1000);
        let models = [NoiseModel::uniform(0.02), NoiseModel::z_biased(0.02)];
        let results = runner().compare_noise_models(&config, &models).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].config.noise, models[0]);
        assert_eq!(results[1].config.noise, models[1]);

        let (uniform, biased) = (&results[0], &results[1]);
        // Z-dominated noise rarely flips readout bits
        let raw_uniform = uniform.raw_fidelity().value().unwrap();
        let raw_biased = biased.raw_fidelity().value().unwrap();
        assert!(raw_biased > raw_uniform + 0.02, "{} vs {}", raw_biased, raw_uniform);

        let distance = uniform
            .patterns()
            .total_variation(biased.patterns())
            .value()
            .unwrap();
        assert!(distance > 0.03, "total variation {}", distance);

        let code = StabilizerCode::steane();
        for result in &results {
            let (top, _) = result.patterns().most_common(1).remove(0);
            let bits = Bitstring::parse(&top).unwrap();
            assert!(code.is_codeword_of(&bits, LogicalState::Zero));
        }
    }

    #[test]
    fn test_sweep_excludes_zero_rate() {
        let config = ExperimentConfig::quick().with_shots(600).with_batch_size(600);
        let report = runner()
            .sweep(&config, NoisePreset::Uniform, &[0.0, 0.02, 0.05])
            .unwrap();

        assert_eq!(report.points.len(), 3);
        let fit = report.fit.as_ref().unwrap();
        assert_eq!(fit.used, 2);
        assert_eq!(fit.excluded, vec![(0.0, 0.0)]);
        assert!(report.fit_error.is_none());
    }

    #[test]
    fn test_sweep_without_usable_points_reports_undefined_fit() {
        let config = ExperimentConfig::quick().with_shots(50).with_batch_size(50);
        let report = runner()
            .sweep(&config, NoisePreset::Uniform, &[0.0])
            .unwrap();
        assert!(report.fit.is_none());
        assert!(report.fit_error.is_some());
    }

    #[test]
    fn test_compare_rounds_and_baseline() {
        let runner = runner();
        let config = ExperimentConfig::ideal().with_shots(100);
        let results = runner.compare_rounds(&config, &[0, 1, 3]).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].statistics.rounds, 300);

        let cmp = runner.compare_with_baseline(&config).unwrap();
        assert_eq!(cmp.unprotected.raw_fidelity(), Estimate::Defined(1.0));
        assert_eq!(cmp.improvement, Estimate::Defined(0.0));
    }
}
