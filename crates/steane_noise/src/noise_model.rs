//! Circuit-level noise model
//!
//! Gantree: L2_Noise → NoiseModel
//!
//! Parametrized Pauli noise attached to a circuit at construction time.
//! `inject` only emits tagged noise operations; sampling them is left to
//! the backend that owns the random source.

use crate::noise_spec::{Arity, ChannelKind, InsertionPoint, NoiseSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use steane_core::constants::noise::{DEFAULT_BIAS, MEASUREMENT_FACTOR, TWO_QUBIT_FACTOR};
use steane_core::error::{SteaneError, SteaneResult};
use steane_core::operation::{NoiseChannel, Operation};
use steane_core::types::{Probability, QubitId};

/// Unified circuit noise model
/// Gantree: NoiseModel // 통합 노이즈
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Single-qubit gate error rate
    /// Gantree: gate_1q: f64 // 1Q 에러
    gate_1q: f64,

    /// Two-qubit gate error rate
    /// Gantree: gate_2q: f64 // 2Q 에러
    gate_2q: f64,

    /// Readout flip rate
    /// Gantree: measurement: f64 // 측정 에러
    measurement: f64,

    /// Idle error rate per storage period
    /// Gantree: storage: f64 // 저장 에러
    storage: f64,

    /// Z:X bias ratio (None = depolarizing)
    /// Gantree: bias: Option<f64> // 편향
    bias: Option<f64>,
}

impl NoiseModel {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new noise model with validation
    /// Gantree: new(e1,e2,m,s) -> Result<Self> // 생성+검증
    pub fn new(gate_1q: f64, gate_2q: f64, measurement: f64, storage: f64) -> SteaneResult<Self> {
        let model = Self {
            gate_1q,
            gate_2q,
            measurement,
            storage,
            bias: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Noiseless model
    /// Gantree: ideal() -> Self // 이상적
    pub fn ideal() -> Self {
        Self {
            gate_1q: 0.0,
            gate_2q: 0.0,
            measurement: 0.0,
            storage: 0.0,
            bias: None,
        }
    }

    /// Same depolarizing rate `p` everywhere
    pub fn uniform(p: f64) -> Self {
        Self {
            gate_1q: p,
            gate_2q: p,
            measurement: p,
            storage: p,
            bias: None,
        }
    }

    /// Gate hierarchy typical of superconducting hardware
    ///
    /// Two-qubit gates at 10p, measurement at 5p, single-qubit and storage at p.
    pub fn realistic(p: f64) -> Self {
        Self {
            gate_1q: p,
            gate_2q: p * TWO_QUBIT_FACTOR,
            measurement: p * MEASUREMENT_FACTOR,
            storage: p,
            bias: None,
        }
    }

    /// Dephasing-dominated noise: total rate `p` split so that pZ = eta · pX
    pub fn biased(p: f64, eta: f64) -> Self {
        Self {
            bias: Some(eta),
            ..Self::uniform(p)
        }
    }

    /// Biased model at the default 10:1 ratio
    pub fn z_biased(p: f64) -> Self {
        Self::biased(p, DEFAULT_BIAS)
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set single-qubit gate error
    pub fn with_gate_1q(mut self, p: f64) -> Self {
        self.gate_1q = p;
        self
    }

    /// Set two-qubit gate error
    pub fn with_gate_2q(mut self, p: f64) -> Self {
        self.gate_2q = p;
        self
    }

    /// Set measurement error
    pub fn with_measurement(mut self, p: f64) -> Self {
        self.measurement = p;
        self
    }

    /// Set storage error
    pub fn with_storage(mut self, p: f64) -> Self {
        self.storage = p;
        self
    }

    /// Set Z:X bias ratio
    pub fn with_bias(mut self, eta: f64) -> Self {
        self.bias = Some(eta);
        self
    }

    /// Multiply every rate by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            gate_1q: self.gate_1q * factor,
            gate_2q: self.gate_2q * factor,
            measurement: self.measurement * factor,
            storage: self.storage * factor,
            bias: self.bias,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get single-qubit gate error rate
    pub fn gate_1q(&self) -> f64 {
        self.gate_1q
    }

    /// Get two-qubit gate error rate
    pub fn gate_2q(&self) -> f64 {
        self.gate_2q
    }

    /// Get measurement error rate
    pub fn measurement(&self) -> f64 {
        self.measurement
    }

    /// Get storage error rate
    pub fn storage(&self) -> f64 {
        self.storage
    }

    /// Get bias ratio
    pub fn bias(&self) -> Option<f64> {
        self.bias
    }

    /// True if no channel can fire
    pub fn is_ideal(&self) -> bool {
        self.gate_1q == 0.0 && self.gate_2q == 0.0 && self.measurement == 0.0 && self.storage == 0.0
    }

    /// Largest configured rate
    pub fn max_rate(&self) -> f64 {
        [self.gate_1q, self.gate_2q, self.measurement, self.storage]
            .into_iter()
            .fold(0.0, f64::max)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate noise parameters
    /// Gantree: validate(&self) -> Result<()> // 검증
    pub fn validate(&self) -> SteaneResult<()> {
        for rate in [self.gate_1q, self.gate_2q, self.measurement, self.storage] {
            Probability::new(rate)?;
        }
        if let Some(eta) = self.bias {
            if !eta.is_finite() || eta <= 0.0 {
                return Err(SteaneError::noise_parameter(
                    "bias",
                    eta,
                    "bias ratio must be positive",
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Single-qubit channel at total rate `p`
    pub fn single_qubit_channel(&self, p: f64) -> NoiseChannel {
        match self.bias {
            Some(eta) => NoiseChannel::PauliChannel1 {
                px: p / (1.0 + eta),
                py: 0.0,
                pz: p * eta / (1.0 + eta),
            },
            None => NoiseChannel::Depolarize1 { p },
        }
    }

    /// Readout flip channel
    pub fn measurement_channel(&self) -> NoiseChannel {
        NoiseChannel::PauliChannel1 {
            px: self.measurement,
            py: 0.0,
            pz: 0.0,
        }
    }

    /// Configured channels, one per (point, arity) pair
    /// Gantree: specs(&self) -> Result<Vec<NoiseSpec>> // 명세 목록
    pub fn specs(&self) -> SteaneResult<Vec<NoiseSpec>> {
        let single = if self.bias.is_some() {
            ChannelKind::Biased
        } else {
            ChannelKind::Depolarizing
        };
        let double = if self.bias.is_some() {
            ChannelKind::Biased
        } else {
            ChannelKind::TwoQubitDepolarizing
        };

        let mut specs = Vec::new();
        for point in [InsertionPoint::AfterEncodingOp, InsertionPoint::AfterExtractionOp] {
            specs.push(NoiseSpec::new(single, self.gate_1q, Arity::One, point)?);
            specs.push(NoiseSpec::new(double, self.gate_2q, Arity::Two, point)?);
        }
        specs.push(NoiseSpec::new(
            ChannelKind::BitFlip,
            self.measurement,
            Arity::One,
            InsertionPoint::BeforeMeasurement,
        )?);
        specs.push(NoiseSpec::new(
            single,
            self.storage,
            Arity::One,
            InsertionPoint::Storage,
        )?);
        Ok(specs)
    }

    /// Noise operations for `qubits` at `point`
    ///
    /// Gate points treat a pair as one two-qubit gate and anything else as
    /// single-qubit gates. Silent channels emit nothing.
    /// Gantree: inject(&self, point, qubits) -> Vec<Operation> // 노이즈 삽입
    pub fn inject(&self, point: InsertionPoint, qubits: &[QubitId]) -> Vec<Operation> {
        let per_qubit = |channel: NoiseChannel| -> Vec<Operation> {
            if channel.is_trivial() {
                return Vec::new();
            }
            qubits
                .iter()
                .map(|&q| Operation::Noise {
                    channel,
                    qubits: vec![q],
                })
                .collect()
        };

        match point {
            InsertionPoint::BeforeMeasurement => per_qubit(self.measurement_channel()),
            InsertionPoint::Storage => per_qubit(self.single_qubit_channel(self.storage)),
            InsertionPoint::AfterEncodingOp | InsertionPoint::AfterExtractionOp => {
                if qubits.len() == 2 {
                    if self.bias.is_some() {
                        per_qubit(self.single_qubit_channel(self.gate_2q))
                    } else if self.gate_2q == 0.0 {
                        Vec::new()
                    } else {
                        vec![Operation::Noise {
                            channel: NoiseChannel::Depolarize2 { p: self.gate_2q },
                            qubits: qubits.to_vec(),
                        }]
                    }
                } else {
                    per_qubit(self.single_qubit_channel(self.gate_1q))
                }
            }
        }
    }
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self::ideal()
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NoiseModel(1q={:.2e}, 2q={:.2e}, meas={:.2e}, storage={:.2e}",
            self.gate_1q, self.gate_2q, self.measurement, self.storage
        )?;
        if let Some(eta) = self.bias {
            write!(f, ", bias={}", eta)?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// NoisePreset
// ============================================================================

/// Family of noise models indexed by one physical error rate
///
/// Used by sweeps, which need a model for every swept `p`.
/// Gantree: NoisePreset // 프리셋
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoisePreset {
    /// `NoiseModel::uniform`
    Uniform,
    /// `NoiseModel::realistic`
    Realistic,
    /// `NoiseModel::biased` with the given ratio
    Biased {
        /// Z:X ratio
        eta: f64,
    },
}

impl NoisePreset {
    /// Model at physical error rate `p`
    pub fn at(&self, p: f64) -> NoiseModel {
        match *self {
            NoisePreset::Uniform => NoiseModel::uniform(p),
            NoisePreset::Realistic => NoiseModel::realistic(p),
            NoisePreset::Biased { eta } => NoiseModel::biased(p, eta),
        }
    }
}

impl Default for NoisePreset {
    fn default() -> Self {
        NoisePreset::Uniform
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ideal_injects_nothing() {
        let model = NoiseModel::ideal();
        assert!(model.is_ideal());
        for point in InsertionPoint::ALL {
            assert!(model.inject(point, &[0, 1]).is_empty());
            assert!(model.inject(point, &[3]).is_empty());
        }
    }

    #[test]
    fn test_realistic_hierarchy() {
        let model = NoiseModel::realistic(0.001);
        assert_relative_eq!(model.gate_2q(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(model.measurement(), 0.005, epsilon = 1e-12);
        assert_relative_eq!(model.storage(), 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_probability_rejected() {
        let err = NoiseModel::new(-0.01, 0.0, 0.0, 0.0).unwrap_err();
        assert_eq!(err, SteaneError::InvalidProbability(-0.01));
        assert!(err.is_configuration_error());
        assert!(NoiseModel::uniform(0.01).with_bias(-1.0).validate().is_err());
        assert!(NoiseModel::uniform(0.2).scaled(10.0).validate().is_err());
    }

    #[test]
    fn test_gate_point_two_qubit() {
        let ops = NoiseModel::uniform(0.02).inject(InsertionPoint::AfterEncodingOp, &[0, 3]);
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            Operation::Noise { channel, qubits } => {
                assert_eq!(*channel, NoiseChannel::Depolarize2 { p: 0.02 });
                assert_eq!(qubits, &vec![0, 3]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_storage_per_qubit() {
        let ops = NoiseModel::uniform(0.01).inject(InsertionPoint::Storage, &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(ops.len(), 7);
        assert!(ops.iter().all(|op| op.qubits().len() == 1));
    }

    #[test]
    fn test_measurement_is_bit_flip() {
        let model = NoiseModel::uniform(0.03);
        match model.measurement_channel() {
            NoiseChannel::PauliChannel1 { px, py, pz } => {
                assert_relative_eq!(px, 0.03);
                assert_eq!(py, 0.0);
                assert_eq!(pz, 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_biased_split() {
        let model = NoiseModel::biased(0.011, 10.0);
        match model.single_qubit_channel(0.011) {
            NoiseChannel::PauliChannel1 { px, py, pz } => {
                assert_relative_eq!(px, 0.001, epsilon = 1e-12);
                assert_eq!(py, 0.0);
                assert_relative_eq!(pz, 0.010, epsilon = 1e-12);
            }
            other => panic!("unexpected {:?}", other),
        }
        // Biased two-qubit noise is applied qubit by qubit
        assert_eq!(
            model.inject(InsertionPoint::AfterExtractionOp, &[1, 8]).len(),
            2
        );
    }

    #[test]
    fn test_specs_cover_all_points() {
        let specs = NoiseModel::realistic(0.001).specs().unwrap();
        for point in InsertionPoint::ALL {
            assert!(specs.iter().any(|s| s.point == point));
        }
        assert_eq!(specs.len(), 6);
        assert!(NoiseModel::uniform(0.3).scaled(4.0).specs().is_err());
    }

    #[test]
    fn test_preset_at() {
        assert_eq!(NoisePreset::Realistic.at(0.002), NoiseModel::realistic(0.002));
        assert_eq!(
            NoisePreset::Biased { eta: 5.0 }.at(0.01).bias(),
            Some(5.0)
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let model = NoiseModel::z_biased(0.004);
        let json = serde_json::to_string(&model).unwrap();
        let parsed: NoiseModel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, model);
    }
}
