//! Circuit structure
//!
//! Gantree: L1_Circuit → Circuit
//!
//! Ordered operation list plus the measurement-column counter that pins the
//! output ordering contract: column `i` is the `i`-th measurement issued.

use crate::error::{SteaneError, SteaneResult};
use crate::operation::{NoiseChannel, Operation};
use crate::types::{ColumnId, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Quantum circuit as data
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits
    num_qubits: usize,

    /// Operation sequence
    operations: Vec<Operation>,

    /// Number of measurement columns issued so far
    num_measurements: usize,

    /// Optional circuit name
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            operations: Vec::new(),
            num_measurements: 0,
            name: None,
        }
    }

    /// Create a circuit with a name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(num_qubits)
        }
    }

    /// Create from a vector of operations, validating each in order
    pub fn from_operations(num_qubits: usize, operations: Vec<Operation>) -> SteaneResult<Self> {
        let mut circuit = Self::new(num_qubits);
        circuit.extend(operations)?;
        Ok(circuit)
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Append an operation
    /// Gantree: push(&mut, Operation) -> Result // 연산 추가
    pub fn push(&mut self, op: Operation) -> SteaneResult<()> {
        self.validate_operation(&op)?;
        if op.is_measurement() {
            self.num_measurements += 1;
        }
        self.operations.push(op);
        Ok(())
    }

    /// Append several operations
    pub fn extend(&mut self, ops: impl IntoIterator<Item = Operation>) -> SteaneResult<()> {
        for op in ops {
            self.push(op)?;
        }
        Ok(())
    }

    /// Append a Z-basis measurement and return its output column
    pub fn measure(&mut self, qubit: QubitId) -> SteaneResult<ColumnId> {
        let column = self.num_measurements;
        self.push(Operation::Measure { qubit, column })?;
        Ok(column)
    }

    /// Append a noise channel (skipped when the channel never fires)
    pub fn noise(&mut self, channel: NoiseChannel, qubits: &[QubitId]) -> SteaneResult<()> {
        if channel.is_trivial() {
            return Ok(());
        }
        self.push(Operation::Noise {
            channel,
            qubits: qubits.to_vec(),
        })
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get operations
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of measurement columns
    pub fn num_measurements(&self) -> usize {
        self.num_measurements
    }

    /// Column the next measurement will write
    pub fn next_column(&self) -> ColumnId {
        self.num_measurements
    }

    /// Get circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if circuit is empty
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Circuit depth over unitary gates and measurements (noise is free)
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];

        for op in &self.operations {
            if op.is_noise() || matches!(op, Operation::Barrier(_)) {
                continue;
            }
            let qubits = op.qubits();
            let max_depth = qubits
                .iter()
                .filter_map(|&q| qubit_depths.get(q))
                .max()
                .copied()
                .unwrap_or(0);
            for &q in &qubits {
                if q < self.num_qubits {
                    qubit_depths[q] = max_depth + 1;
                }
            }
        }

        qubit_depths.into_iter().max().unwrap_or(0)
    }

    /// Depth restricted to two-qubit gates
    pub fn two_qubit_depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];
        for op in self.operations.iter().filter(|op| op.is_two_qubit()) {
            let qubits = op.qubits();
            let layer = qubits.iter().map(|&q| qubit_depths[q]).max().unwrap_or(0) + 1;
            for &q in &qubits {
                qubit_depths[q] = layer;
            }
        }
        qubit_depths.into_iter().max().unwrap_or(0)
    }

    /// Get total operation count
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Count single-qubit gates
    pub fn count_1q(&self) -> usize {
        self.operations.iter().filter(|op| op.is_single_qubit()).count()
    }

    /// Count two-qubit gates
    pub fn count_2q(&self) -> usize {
        self.operations.iter().filter(|op| op.is_two_qubit()).count()
    }

    /// Count noise annotations
    pub fn count_noise(&self) -> usize {
        self.operations.iter().filter(|op| op.is_noise()).count()
    }

    /// Count classically-controlled operations
    pub fn count_conditional(&self) -> usize {
        self.operations.iter().filter(|op| op.is_conditional()).count()
    }

    /// True if the circuit needs mid-circuit classical control
    pub fn requires_feedforward(&self) -> bool {
        self.operations.iter().any(Operation::is_conditional)
    }

    /// True if every operation is Clifford or Pauli noise
    pub fn is_clifford(&self) -> bool {
        self.operations.iter().all(Operation::is_clifford)
    }

    /// Get qubits used in the circuit
    pub fn used_qubits(&self) -> HashSet<QubitId> {
        self.operations.iter().flat_map(|op| op.qubits()).collect()
    }

    /// Copy with every noise annotation removed
    pub fn without_noise(&self) -> Self {
        Self {
            operations: self
                .operations
                .iter()
                .filter(|op| !op.is_noise())
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// One operation per line
    pub fn to_text(&self) -> String {
        let mut lines = vec![format!(
            "qubits {}; columns {};",
            self.num_qubits, self.num_measurements
        )];
        lines.extend(self.operations.iter().map(|op| format!("{};", op)));
        lines.join("\n")
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn validate_operation(&self, op: &Operation) -> SteaneResult<()> {
        let qubits = op.qubits();
        for &qubit in &qubits {
            if qubit >= self.num_qubits {
                return Err(SteaneError::GateQubitMismatch {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
        }

        if (op.is_two_qubit() || op.is_noise()) && qubits.len() == 2 && qubits[0] == qubits[1] {
            return Err(SteaneError::RepeatedQubit {
                op: op.name().to_string(),
                qubit: qubits[0],
            });
        }

        match op {
            Operation::Measure { column, .. } if *column != self.num_measurements => {
                Err(SteaneError::ColumnOutOfOrder {
                    column: *column,
                    expected: self.num_measurements,
                })
            }
            Operation::Conditional { condition, .. } => match condition.max_column() {
                Some(column) if column >= self.num_measurements => {
                    Err(SteaneError::UnmeasuredColumn {
                        column,
                        measured: self.num_measurements,
                    })
                }
                _ => Ok(()),
            },
            Operation::Noise { channel, qubits } => {
                channel.validate()?;
                if qubits.len() != channel.arity() {
                    return Err(SteaneError::NoiseArityMismatch {
                        channel: channel.name().to_string(),
                        expected: channel.arity(),
                        actual: qubits.len(),
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit({} qubits, {} operations)",
            self.num_qubits,
            self.operations.len()
        )?;
        writeln!(f, "  Depth: {}", self.depth())?;
        writeln!(f, "  1Q gates: {}", self.count_1q())?;
        writeln!(f, "  2Q gates: {}", self.count_2q())?;
        writeln!(f, "  Noise channels: {}", self.count_noise())?;
        writeln!(f, "  Measurements: {}", self.num_measurements)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Condition;
    use crate::types::PauliKind;

    #[test]
    fn test_circuit_new() {
        let circuit = Circuit::new(5);
        assert_eq!(circuit.num_qubits(), 5);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_push_out_of_range() {
        let mut circuit = Circuit::new(3);
        assert!(circuit.push(Operation::H(5)).is_err());
        assert!(circuit.push(Operation::Cnot(1, 1)).is_err());
    }

    #[test]
    fn test_measurement_columns_in_program_order() {
        let mut circuit = Circuit::new(3);
        assert_eq!(circuit.measure(2).unwrap(), 0);
        assert_eq!(circuit.measure(0).unwrap(), 1);
        let err = circuit
            .push(Operation::Measure {
                qubit: 1,
                column: 5,
            })
            .unwrap_err();
        assert!(matches!(err, SteaneError::ColumnOutOfOrder { .. }));
        assert_eq!(circuit.num_measurements(), 2);
    }

    #[test]
    fn test_conditional_requires_measured_column() {
        let mut circuit = Circuit::new(2);
        let op = Operation::Conditional {
            condition: Condition::equals(&[0], &[true]),
            pauli: PauliKind::X,
            qubit: 1,
        };
        assert!(circuit.push(op.clone()).is_err());
        circuit.measure(0).unwrap();
        assert!(circuit.push(op).is_ok());
        assert!(circuit.requires_feedforward());
    }

    #[test]
    fn test_noise_arity_and_trivial_skip() {
        let mut circuit = Circuit::new(2);
        circuit
            .noise(NoiseChannel::Depolarize1 { p: 0.0 }, &[0])
            .unwrap();
        assert!(circuit.is_empty());
        assert!(circuit
            .noise(NoiseChannel::Depolarize2 { p: 0.1 }, &[0])
            .is_err());
        circuit
            .noise(NoiseChannel::Depolarize2 { p: 0.1 }, &[0, 1])
            .unwrap();
        assert_eq!(circuit.count_noise(), 1);
        assert!(circuit.without_noise().is_empty());
    }

    #[test]
    fn test_depth_ignores_noise() {
        let mut circuit = Circuit::new(3);
        circuit.push(Operation::H(0)).unwrap();
        circuit
            .noise(NoiseChannel::Depolarize1 { p: 0.1 }, &[0])
            .unwrap();
        circuit.push(Operation::Cnot(0, 1)).unwrap();
        circuit.push(Operation::H(2)).unwrap();
        assert_eq!(circuit.depth(), 2);
        assert_eq!(circuit.two_qubit_depth(), 1);
    }

    #[test]
    fn test_to_text() {
        let mut circuit = Circuit::new(2);
        circuit.push(Operation::H(0)).unwrap();
        circuit.measure(0).unwrap();
        let text = circuit.to_text();
        assert!(text.contains("h q[0];"));
        assert!(text.contains("measure q[0] -> c[0];"));
    }
}
