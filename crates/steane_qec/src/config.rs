//! Experiment configuration
//!
//! Gantree: L5_Qec → ExperimentConfig
//!
//! Everything a campaign needs besides the backend: round count, shot
//! budget, noise, protocol choices, post-selection and seed.

use serde::{Deserialize, Serialize};
use std::fmt;
use steane_code::{Coverage, EncodingStrategy};
use steane_core::constants::stats::{DEFAULT_SHOTS, MAX_ROUNDS, MAX_SHOTS, SHOTS_PER_CHUNK};
use steane_core::error::{SteaneError, SteaneResult};
use steane_core::types::LogicalState;
use steane_noise::NoiseModel;

/// How corrections reach the data qubits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FeedforwardMode {
    /// Conditional if the backend supports it, else measure-only
    #[default]
    Auto,
    /// In-circuit classically controlled corrections
    Conditional,
    /// Record syndromes, classify after sampling
    MeasureOnly,
}

impl fmt::Display for FeedforwardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedforwardMode::Auto => write!(f, "auto"),
            FeedforwardMode::Conditional => write!(f, "conditional"),
            FeedforwardMode::MeasureOnly => write!(f, "measure-only"),
        }
    }
}

/// Shot filter applied before conditional statistics
/// Gantree: PostSelection // 사후 선택
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PostSelection {
    /// Keep every shot
    #[default]
    None,
    /// Keep shots whose every round read the trivial syndrome
    AllTrivialSyndromes,
    /// Keep shots with no uncorrectable round
    NoFlaggedRounds,
}

/// Campaign configuration
/// Gantree: ExperimentConfig // 실험 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    // ========================================================================
    // Protocol
    // ========================================================================
    /// Correction rounds between encoding and readout
    pub rounds: usize,

    /// Logical state to prepare
    pub target: LogicalState,

    /// Encoder CNOT ordering
    pub encoding: EncodingStrategy,

    /// Decoder candidate set
    pub coverage: Coverage,

    /// Feedforward preference
    pub feedforward: FeedforwardMode,

    // ========================================================================
    // Noise
    // ========================================================================
    /// Circuit-level noise
    pub noise: NoiseModel,

    // ========================================================================
    // Execution
    // ========================================================================
    /// Total shots
    pub shots: u64,

    /// Shots per backend call; cancellation is checked between calls
    pub batch_size: u64,

    /// Shot filter for conditional fidelity
    pub post_selection: PostSelection,

    /// Run seed; batch `b` samples with `seed + b`
    pub seed: u64,
}

impl ExperimentConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Three-round memory experiment under realistic noise at p = 0.001
    pub fn default_memory() -> Self {
        Self {
            rounds: 3,
            target: LogicalState::Zero,
            encoding: EncodingStrategy::DepthOptimized,
            coverage: Coverage::Full,
            feedforward: FeedforwardMode::Auto,
            noise: NoiseModel::realistic(0.001),
            shots: DEFAULT_SHOTS,
            batch_size: 4 * SHOTS_PER_CHUNK,
            post_selection: PostSelection::None,
            seed: 42,
        }
    }

    /// Single round, few shots
    pub fn quick() -> Self {
        Self {
            rounds: 1,
            shots: 200,
            batch_size: 200,
            ..Self::default_memory()
        }
    }

    /// Noiseless configuration
    pub fn ideal() -> Self {
        Self {
            noise: NoiseModel::ideal(),
            ..Self::default_memory()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set round count
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set target logical state
    pub fn with_target(mut self, target: LogicalState) -> Self {
        self.target = target;
        self
    }

    /// Set encoding strategy
    pub fn with_encoding(mut self, encoding: EncodingStrategy) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set decoder coverage
    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    /// Set feedforward preference
    pub fn with_feedforward(mut self, mode: FeedforwardMode) -> Self {
        self.feedforward = mode;
        self
    }

    /// Set noise model
    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.noise = noise;
        self
    }

    /// Set shots
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots;
        self
    }

    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set post-selection predicate
    pub fn with_post_selection(mut self, post_selection: PostSelection) -> Self {
        self.post_selection = post_selection;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> SteaneResult<()> {
        if self.shots == 0 || self.shots > MAX_SHOTS {
            return Err(SteaneError::InvalidConfig(format!(
                "shots must be in [1, {}], got {}",
                MAX_SHOTS, self.shots
            )));
        }

        if self.rounds > MAX_ROUNDS {
            return Err(SteaneError::InvalidConfig(format!(
                "rounds must be at most {}, got {}",
                MAX_ROUNDS, self.rounds
            )));
        }

        if self.batch_size == 0 {
            return Err(SteaneError::InvalidConfig(
                "batch_size must be > 0".to_string(),
            ));
        }

        self.noise.validate()
    }

    /// Number of backend calls the campaign issues
    pub fn num_batches(&self) -> u64 {
        self.shots.div_ceil(self.batch_size.max(1))
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize to JSON
    pub fn to_json(&self) -> SteaneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate from JSON
    pub fn from_json(json: &str) -> SteaneResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::default_memory()
    }
}

impl fmt::Display for ExperimentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExperimentConfig(rounds={}, shots={}, target={}, feedforward={}, noise={})",
            self.rounds, self.shots, self.target, self.feedforward, self.noise
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_memory() {
        let config = ExperimentConfig::default_memory();
        assert_eq!(config.rounds, 3);
        assert_eq!(config.coverage, Coverage::Full);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(ExperimentConfig::quick().rounds, 1);
        assert!(ExperimentConfig::ideal().noise.is_ideal());
    }

    #[test]
    fn test_zero_rounds_is_valid() {
        assert!(ExperimentConfig::ideal().with_rounds(0).validate().is_ok());
    }

    #[test]
    fn test_rounds_bounded() {
        assert!(ExperimentConfig::ideal()
            .with_rounds(MAX_ROUNDS)
            .validate()
            .is_ok());
        let err = ExperimentConfig::ideal()
            .with_rounds(usize::MAX)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SteaneError::InvalidConfig(_)));
    }

    #[test]
    fn test_validation_errors() {
        let err = ExperimentConfig::default().with_shots(0).validate().unwrap_err();
        assert!(err.is_configuration_error());

        let err = ExperimentConfig::default()
            .with_batch_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SteaneError::InvalidConfig(_)));

        let bad_noise = NoiseModel::uniform(0.01).with_gate_2q(-0.5);
        assert!(ExperimentConfig::default()
            .with_noise(bad_noise)
            .validate()
            .is_err());
    }

    #[test]
    fn test_num_batches() {
        let config = ExperimentConfig::default()
            .with_shots(1000)
            .with_batch_size(300);
        assert_eq!(config.num_batches(), 4);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ExperimentConfig::quick()
            .with_feedforward(FeedforwardMode::MeasureOnly)
            .with_post_selection(PostSelection::AllTrivialSyndromes)
            .with_target(LogicalState::One);
        let json = config.to_json().unwrap();
        assert!(json.contains("MeasureOnly"));
        assert_eq!(ExperimentConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let json = ExperimentConfig::quick().with_shots(0).to_json().unwrap();
        assert!(ExperimentConfig::from_json(&json).is_err());
        assert!(matches!(
            ExperimentConfig::from_json("{"),
            Err(SteaneError::JsonError(_))
        ));
    }
}
