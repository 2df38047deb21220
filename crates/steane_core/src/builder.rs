//! Circuit builder
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent builder over `Circuit`. The first rejected operation is kept and
//! reported by `build()`, so chains never panic halfway through.

use crate::circuit::Circuit;
use crate::error::{SteaneError, SteaneResult};
use crate::operation::{Condition, NoiseChannel, Operation};
use crate::types::{ColumnId, PauliKind, QubitId};

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
#[derive(Debug, Clone)]
pub struct CircuitBuilder {
    /// Internal circuit being built
    circuit: Circuit,

    /// First error raised during construction
    error: Option<SteaneError>,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
            error: None,
        }
    }

    /// Create with circuit name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(num_qubits, name),
            error: None,
        }
    }

    /// Append an arbitrary operation
    pub fn op(mut self, op: Operation) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.circuit.push(op) {
                self.error = Some(e);
            }
        }
        self
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Add Hadamard gate
    pub fn h(self, qubit: QubitId) -> Self {
        self.op(Operation::H(qubit))
    }

    /// Add S gate
    pub fn s(self, qubit: QubitId) -> Self {
        self.op(Operation::S(qubit))
    }

    /// Add S-dagger gate
    pub fn sdg(self, qubit: QubitId) -> Self {
        self.op(Operation::Sdg(qubit))
    }

    /// Add Pauli-X gate
    pub fn x(self, qubit: QubitId) -> Self {
        self.op(Operation::X(qubit))
    }

    /// Add Pauli-Y gate
    pub fn y(self, qubit: QubitId) -> Self {
        self.op(Operation::Y(qubit))
    }

    /// Add Pauli-Z gate
    pub fn z(self, qubit: QubitId) -> Self {
        self.op(Operation::Z(qubit))
    }

    /// Add Pauli gate by kind
    pub fn pauli(self, kind: PauliKind, qubit: QubitId) -> Self {
        self.op(Operation::pauli(kind, qubit))
    }

    /// Add T gate
    pub fn t(self, qubit: QubitId) -> Self {
        self.op(Operation::T(qubit))
    }

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================

    /// Add CNOT gate
    /// Gantree: cnot(self, c, t) -> Self // CNOT 추가
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.op(Operation::Cnot(control, target))
    }

    /// Add CZ gate
    pub fn cz(self, a: QubitId, b: QubitId) -> Self {
        self.op(Operation::Cz(a, b))
    }

    // ========================================================================
    // Noise
    // ========================================================================

    /// Add a noise channel (dropped when it never fires)
    pub fn noise(mut self, channel: NoiseChannel, qubits: &[QubitId]) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.circuit.noise(channel, qubits) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Add single-qubit depolarizing noise
    pub fn depolarize1(self, qubit: QubitId, p: f64) -> Self {
        self.noise(NoiseChannel::Depolarize1 { p }, &[qubit])
    }

    /// Add two-qubit depolarizing noise
    pub fn depolarize2(self, a: QubitId, b: QubitId, p: f64) -> Self {
        self.noise(NoiseChannel::Depolarize2 { p }, &[a, b])
    }

    // ========================================================================
    // Measurement & Feedforward
    // ========================================================================

    /// Measure a qubit into the next column
    /// Gantree: measure(self, q) -> Self // 측정
    pub fn measure(self, qubit: QubitId) -> Self {
        let column = self.circuit.next_column();
        self.op(Operation::Measure { qubit, column })
    }

    /// Measure qubits in order
    pub fn measure_qubits(self, qubits: &[QubitId]) -> Self {
        qubits.iter().fold(self, |b, &q| b.measure(q))
    }

    /// Measure every qubit in index order
    pub fn measure_all(self) -> Self {
        let n = self.circuit.num_qubits();
        (0..n).fold(self, |b, q| b.measure(q))
    }

    /// Apply `pauli` on `qubit` when `columns` read `pattern`
    pub fn conditional(
        self,
        columns: &[ColumnId],
        pattern: &[bool],
        pauli: PauliKind,
        qubit: QubitId,
    ) -> Self {
        self.op(Operation::Conditional {
            condition: Condition::equals(columns, pattern),
            pauli,
            qubit,
        })
    }

    /// Add barrier across all qubits
    pub fn barrier_all(self) -> Self {
        let n = self.circuit.num_qubits();
        self.op(Operation::Barrier((0..n).collect()))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Column the next measurement will write
    pub fn next_column(&self) -> ColumnId {
        self.circuit.next_column()
    }

    /// Finish, returning the first construction error if any
    /// Gantree: build(self) -> Result<Circuit> // 빌드
    pub fn build(self) -> SteaneResult<Circuit> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.circuit),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
