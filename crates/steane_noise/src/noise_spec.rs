//! Noise specification records
//!
//! Gantree: L2_Noise → NoiseSpec
//!
//! A `NoiseSpec` names one channel the scheduler will place in a circuit:
//! what kind, how likely, how many qubits and at which insertion point.

use serde::{Deserialize, Serialize};
use std::fmt;
use steane_core::error::SteaneResult;
use steane_core::types::Probability;

/// Where in the protocol a noise channel is inserted
/// Gantree: InsertionPoint // 삽입 지점
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsertionPoint {
    /// After each encoding gate
    AfterEncodingOp,
    /// After each syndrome-extraction gate
    AfterExtractionOp,
    /// Immediately before each measurement
    BeforeMeasurement,
    /// Idle/storage period on data qubits
    Storage,
}

impl InsertionPoint {
    /// All insertion points in protocol order
    pub const ALL: [InsertionPoint; 4] = [
        InsertionPoint::AfterEncodingOp,
        InsertionPoint::Storage,
        InsertionPoint::AfterExtractionOp,
        InsertionPoint::BeforeMeasurement,
    ];

    /// True for points that follow a gate
    pub fn is_gate_point(&self) -> bool {
        matches!(
            self,
            InsertionPoint::AfterEncodingOp | InsertionPoint::AfterExtractionOp
        )
    }
}

impl fmt::Display for InsertionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InsertionPoint::AfterEncodingOp => "after-encoding-op",
            InsertionPoint::AfterExtractionOp => "after-extraction-op",
            InsertionPoint::BeforeMeasurement => "before-measurement",
            InsertionPoint::Storage => "storage",
        };
        write!(f, "{}", s)
    }
}

/// Channel family
/// Gantree: ChannelKind // 채널 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Uniform X/Y/Z with total probability p
    Depolarizing,
    /// p spread over the 15 non-identity two-qubit Paulis
    TwoQubitDepolarizing,
    /// Independent X and Z probabilities
    Biased,
    /// X only (classical readout flip)
    BitFlip,
}

/// Qubit arity of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    /// Acts on one qubit
    One,
    /// Acts on a pair of qubits
    Two,
}

impl Arity {
    /// Number of qubits
    pub fn count(&self) -> usize {
        match self {
            Arity::One => 1,
            Arity::Two => 2,
        }
    }
}

/// One configured noise channel
/// Gantree: NoiseSpec // 노이즈 명세
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    /// Channel family
    pub kind: ChannelKind,

    /// Total error probability per application
    pub probability: Probability,

    /// One or two qubits
    pub applies_to: Arity,

    /// Insertion point
    pub point: InsertionPoint,
}

impl NoiseSpec {
    /// Create a new spec, rejecting rates outside [0, 1]
    pub fn new(
        kind: ChannelKind,
        probability: f64,
        applies_to: Arity,
        point: InsertionPoint,
    ) -> SteaneResult<Self> {
        Ok(Self {
            kind,
            probability: Probability::new(probability)?,
            applies_to,
            point,
        })
    }

    /// True if the channel never fires
    pub fn is_silent(&self) -> bool {
        self.probability.is_zero()
    }
}

impl fmt::Display for NoiseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}({:.2e}, {}q) @ {}",
            self.kind,
            self.probability.value(),
            self.applies_to.count(),
            self.point
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steane_core::error::SteaneError;

    #[test]
    fn test_gate_points() {
        assert!(InsertionPoint::AfterEncodingOp.is_gate_point());
        assert!(!InsertionPoint::Storage.is_gate_point());
        assert_eq!(Arity::Two.count(), 2);
    }

    #[test]
    fn test_spec_display() {
        let spec = NoiseSpec::new(
            ChannelKind::BitFlip,
            0.05,
            Arity::One,
            InsertionPoint::BeforeMeasurement,
        )
        .unwrap();
        assert!(spec.to_string().contains("before-measurement"));
        assert!(!spec.is_silent());
    }

    #[test]
    fn test_spec_rejects_out_of_range_rate() {
        let err = NoiseSpec::new(ChannelKind::Depolarizing, 1.5, Arity::One, InsertionPoint::Storage)
            .unwrap_err();
        assert_eq!(err, SteaneError::InvalidProbability(1.5));
        assert!(err.is_configuration_error());
    }
}
