//! Tagged circuit operations
//!
//! Gantree: L1_Circuit → Operation
//!
//! A circuit is plain data: an ordered list of basis-change, controlled,
//! noise-channel, measurement and classically-controlled operations.

use crate::error::{SteaneError, SteaneResult};
use crate::types::{ColumnId, PauliKind, Probability, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// NoiseChannel
// ============================================================================

/// Stochastic Pauli channel attached to a noise operation
///
/// The channel is only a description; sampling it is the simulator's job.
/// Gantree: NoiseChannel // 노이즈 채널
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoiseChannel {
    /// Single-qubit depolarizing: X, Y, Z each with probability p/3
    Depolarize1 {
        /// Total error probability
        p: f64,
    },

    /// Two-qubit depolarizing: each of the 15 non-identity Pauli pairs with p/15
    Depolarize2 {
        /// Total error probability
        p: f64,
    },

    /// Independent single-qubit Pauli channel
    PauliChannel1 {
        /// X probability
        px: f64,
        /// Y probability
        py: f64,
        /// Z probability
        pz: f64,
    },
}

impl NoiseChannel {
    /// Number of qubits the channel acts on
    pub fn arity(&self) -> usize {
        match self {
            NoiseChannel::Depolarize2 { .. } => 2,
            _ => 1,
        }
    }

    /// Total error probability of one application
    pub fn total_probability(&self) -> f64 {
        match *self {
            NoiseChannel::Depolarize1 { p } | NoiseChannel::Depolarize2 { p } => p,
            NoiseChannel::PauliChannel1 { px, py, pz } => px + py + pz,
        }
    }

    /// True if the channel never fires
    pub fn is_trivial(&self) -> bool {
        self.total_probability() == 0.0
    }

    /// Channel name
    pub fn name(&self) -> &'static str {
        match self {
            NoiseChannel::Depolarize1 { .. } => "depolarize1",
            NoiseChannel::Depolarize2 { .. } => "depolarize2",
            NoiseChannel::PauliChannel1 { .. } => "pauli_channel_1",
        }
    }

    /// Validate probabilities
    pub fn validate(&self) -> SteaneResult<()> {
        let parts: Vec<f64> = match *self {
            NoiseChannel::Depolarize1 { p } | NoiseChannel::Depolarize2 { p } => vec![p],
            NoiseChannel::PauliChannel1 { px, py, pz } => vec![px, py, pz],
        };
        for value in parts {
            Probability::new(value)?;
        }
        let total = self.total_probability();
        if total > 1.0 {
            return Err(SteaneError::noise_parameter(
                self.name(),
                total,
                "total probability exceeds 1",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NoiseChannel::Depolarize1 { p } => write!(f, "DEPOLARIZE1({})", p),
            NoiseChannel::Depolarize2 { p } => write!(f, "DEPOLARIZE2({})", p),
            NoiseChannel::PauliChannel1 { px, py, pz } => {
                write!(f, "PAULI_CHANNEL_1({}, {}, {})", px, py, pz)
            }
        }
    }
}

// ============================================================================
// Condition
// ============================================================================

/// Classical condition over already-measured columns
///
/// Holds when every listed column carries the matching expected bit.
/// Gantree: Condition // 고전 조건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// (column, expected bit) pairs
    pub terms: Vec<(ColumnId, bool)>,
}

impl Condition {
    /// Condition requiring `columns` to equal `pattern` bit-for-bit
    pub fn equals(columns: &[ColumnId], pattern: &[bool]) -> Self {
        Self {
            terms: columns.iter().copied().zip(pattern.iter().copied()).collect(),
        }
    }

    /// Evaluate against a measurement record
    pub fn holds(&self, record: &[bool]) -> bool {
        self.terms
            .iter()
            .all(|&(column, expected)| record.get(column).copied() == Some(expected))
    }

    /// Largest referenced column
    pub fn max_column(&self) -> Option<ColumnId> {
        self.terms.iter().map(|&(c, _)| c).max()
    }
}

// ============================================================================
// Operation
// ============================================================================

/// Circuit operation
/// Gantree: Operation // 연산 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    // ========================================================================
    // Single-Qubit Clifford
    // ========================================================================
    /// Hadamard (basis change)
    H(QubitId),

    /// Phase gate
    S(QubitId),

    /// Inverse phase gate
    Sdg(QubitId),

    /// Pauli X
    X(QubitId),

    /// Pauli Y
    Y(QubitId),

    /// Pauli Z
    Z(QubitId),

    // ========================================================================
    // Non-Clifford
    // ========================================================================
    /// T gate; only representable on universal backends
    T(QubitId),

    // ========================================================================
    // Two-Qubit Controlled
    // ========================================================================
    /// Controlled-NOT (control, target)
    Cnot(QubitId, QubitId),

    /// Controlled-Z
    Cz(QubitId, QubitId),

    // ========================================================================
    // Noise, Measurement, Feedforward
    // ========================================================================
    /// Noise channel on one or two qubits
    Noise {
        /// Sampled channel
        channel: NoiseChannel,
        /// One or two target qubits
        qubits: Vec<QubitId>,
    },

    /// Z-basis measurement writing output column `column`
    Measure {
        /// Measured qubit
        qubit: QubitId,
        /// Output column in program order
        column: ColumnId,
    },

    /// Pauli applied only when `condition` holds on the record so far
    Conditional {
        /// Classical condition on earlier columns
        condition: Condition,
        /// Correction to apply
        pauli: PauliKind,
        /// Target qubit
        qubit: QubitId,
    },

    /// Scheduling barrier (no physical effect)
    Barrier(Vec<QubitId>),
}

impl Operation {
    /// Pauli gate of the given kind
    pub fn pauli(kind: PauliKind, qubit: QubitId) -> Self {
        match kind {
            PauliKind::X => Operation::X(qubit),
            PauliKind::Y => Operation::Y(qubit),
            PauliKind::Z => Operation::Z(qubit),
        }
    }

    /// Qubits involved in this operation
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::H(q)
            | Operation::S(q)
            | Operation::Sdg(q)
            | Operation::X(q)
            | Operation::Y(q)
            | Operation::Z(q)
            | Operation::T(q)
            | Operation::Measure { qubit: q, .. }
            | Operation::Conditional { qubit: q, .. } => vec![*q],
            Operation::Cnot(c, t) | Operation::Cz(c, t) => vec![*c, *t],
            Operation::Noise { qubits, .. } | Operation::Barrier(qubits) => qubits.clone(),
        }
    }

    /// Check if operation is a single-qubit unitary gate
    pub fn is_single_qubit(&self) -> bool {
        matches!(
            self,
            Operation::H(_)
                | Operation::S(_)
                | Operation::Sdg(_)
                | Operation::X(_)
                | Operation::Y(_)
                | Operation::Z(_)
                | Operation::T(_)
        )
    }

    /// Check if operation is a two-qubit gate
    pub fn is_two_qubit(&self) -> bool {
        matches!(self, Operation::Cnot(_, _) | Operation::Cz(_, _))
    }

    /// Check if operation is a noise annotation
    pub fn is_noise(&self) -> bool {
        matches!(self, Operation::Noise { .. })
    }

    /// Check if operation is a measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, Operation::Measure { .. })
    }

    /// Check if operation needs intra-circuit classical control
    pub fn is_conditional(&self) -> bool {
        matches!(self, Operation::Conditional { .. })
    }

    /// Check if operation is in the Clifford + Pauli-noise fragment
    pub fn is_clifford(&self) -> bool {
        !matches!(self, Operation::T(_))
    }

    /// Operation name
    pub fn name(&self) -> &'static str {
        match self {
            Operation::H(_) => "h",
            Operation::S(_) => "s",
            Operation::Sdg(_) => "sdg",
            Operation::X(_) => "x",
            Operation::Y(_) => "y",
            Operation::Z(_) => "z",
            Operation::T(_) => "t",
            Operation::Cnot(_, _) => "cx",
            Operation::Cz(_, _) => "cz",
            Operation::Noise { channel, .. } => channel.name(),
            Operation::Measure { .. } => "measure",
            Operation::Conditional { .. } => "if",
            Operation::Barrier(_) => "barrier",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Cnot(c, t) | Operation::Cz(c, t) => {
                write!(f, "{} q[{}],q[{}]", self.name(), c, t)
            }
            Operation::Noise { channel, qubits } => {
                let qs: Vec<String> = qubits.iter().map(|q| format!("q[{}]", q)).collect();
                write!(f, "{} {}", channel, qs.join(","))
            }
            Operation::Measure { qubit, column } => {
                write!(f, "measure q[{}] -> c[{}]", qubit, column)
            }
            Operation::Conditional {
                condition,
                pauli,
                qubit,
            } => {
                let terms: Vec<String> = condition
                    .terms
                    .iter()
                    .map(|(c, b)| format!("c[{}]=={}", c, u8::from(*b)))
                    .collect();
                write!(
                    f,
                    "if ({}) {} q[{}]",
                    terms.join(" && "),
                    pauli.to_char().to_ascii_lowercase(),
                    qubit
                )
            }
            Operation::Barrier(qubits) => {
                let qs: Vec<String> = qubits.iter().map(|q| format!("q[{}]", q)).collect();
                write!(f, "barrier {}", qs.join(","))
            }
            _ => {
                let q = self.qubits()[0];
                write!(f, "{} q[{}]", self.name(), q)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_qubits() {
        assert_eq!(Operation::H(3).qubits(), vec![3]);
        assert_eq!(Operation::Cnot(1, 4).qubits(), vec![1, 4]);
        assert_eq!(
            Operation::Measure {
                qubit: 2,
                column: 0
            }
            .qubits(),
            vec![2]
        );
    }

    #[test]
    fn test_operation_classification() {
        assert!(Operation::H(0).is_single_qubit());
        assert!(Operation::Cnot(0, 1).is_two_qubit());
        assert!(!Operation::T(0).is_clifford());
        assert!(Operation::Noise {
            channel: NoiseChannel::Depolarize1 { p: 0.1 },
            qubits: vec![0],
        }
        .is_noise());
    }

    #[test]
    fn test_pauli_constructor() {
        assert_eq!(Operation::pauli(PauliKind::Y, 5), Operation::Y(5));
    }

    #[test]
    fn test_channel_validation() {
        assert!(NoiseChannel::Depolarize1 { p: 0.01 }.validate().is_ok());
        assert_eq!(
            NoiseChannel::Depolarize1 { p: -0.01 }.validate(),
            Err(SteaneError::InvalidProbability(-0.01))
        );
        assert!(NoiseChannel::Depolarize2 { p: f64::NAN }.validate().is_err());
        assert!(NoiseChannel::PauliChannel1 {
            px: 0.6,
            py: 0.0,
            pz: 0.6
        }
        .validate()
        .is_err());
        assert_eq!(NoiseChannel::Depolarize2 { p: 0.1 }.arity(), 2);
    }

    #[test]
    fn test_condition_holds() {
        let cond = Condition::equals(&[0, 2], &[true, false]);
        assert!(cond.holds(&[true, true, false]));
        assert!(!cond.holds(&[true, true, true]));
        assert!(!cond.holds(&[true]));
        assert_eq!(cond.max_column(), Some(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Operation::Cnot(0, 1).to_string(), "cx q[0],q[1]");
        let op = Operation::Conditional {
            condition: Condition::equals(&[3], &[true]),
            pauli: PauliKind::X,
            qubit: 2,
        };
        assert_eq!(op.to_string(), "if (c[3]==1) x q[2]");
    }
}
