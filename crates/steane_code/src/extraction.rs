//! Ancilla-based syndrome extraction
//!
//! Gantree: L3_Code → SyndromeExtractionProtocol
//!
//! One fresh ancilla per generator per round. X-type checks sandwich
//! ancilla→data CNOTs between Hadamards on the ancilla; Z-type checks use
//! data→ancilla CNOTs. Ancilla `i` is measured into syndrome bit `i`.

use crate::stabilizer::{Generator, StabilizerCode, StabilizerType};
use steane_core::circuit::Circuit;
use steane_core::error::SteaneResult;
use steane_core::operation::Operation;
use steane_core::types::{ColumnId, QubitId};
use steane_noise::{InsertionPoint, NoiseModel};

/// Builder for one round of stabilizer measurements
/// Gantree: SyndromeExtractionProtocol // 신드롬 추출
#[derive(Debug, Clone)]
pub struct SyndromeExtractionProtocol {
    generators: Vec<Generator>,
}

impl SyndromeExtractionProtocol {
    /// Create for a code
    pub fn new(code: &StabilizerCode) -> Self {
        Self {
            generators: code.generators(),
        }
    }

    /// Ancillas consumed per round
    pub fn num_ancillas(&self) -> usize {
        self.generators.len()
    }

    /// Noiseless gates measuring generator `g` with ancilla `anc`
    fn check_gates(generator: &Generator, anc: QubitId) -> Vec<Operation> {
        match generator.kind {
            StabilizerType::X => {
                let mut ops = vec![Operation::H(anc)];
                ops.extend(generator.support.iter().map(|&q| Operation::Cnot(anc, q)));
                ops.push(Operation::H(anc));
                ops
            }
            StabilizerType::Z => generator
                .support
                .iter()
                .map(|&q| Operation::Cnot(q, anc))
                .collect(),
        }
    }

    /// Append one round; ancillas are `ancilla_base..ancilla_base + num_ancillas()`
    ///
    /// Returns the measurement columns in canonical generator order.
    /// Gantree: append_round(circuit, base, noise) -> Result<Vec<ColumnId>> // 라운드 추가
    pub fn append_round(
        &self,
        circuit: &mut Circuit,
        ancilla_base: QubitId,
        noise: &NoiseModel,
    ) -> SteaneResult<Vec<ColumnId>> {
        let mut columns = Vec::with_capacity(self.generators.len());

        for (i, generator) in self.generators.iter().enumerate() {
            let anc = ancilla_base + i;
            for op in Self::check_gates(generator, anc) {
                let qubits = op.qubits();
                circuit.push(op)?;
                circuit.extend(noise.inject(InsertionPoint::AfterExtractionOp, &qubits))?;
            }
            circuit.extend(noise.inject(InsertionPoint::BeforeMeasurement, &[anc]))?;
            columns.push(circuit.measure(anc)?);
        }

        Ok(columns)
    }

    /// Standalone single-round circuit: data qubits then ancillas
    pub fn circuit(&self, num_data: usize, noise: &NoiseModel) -> SteaneResult<(Circuit, Vec<ColumnId>)> {
        let mut circuit = Circuit::with_name(num_data + self.num_ancillas(), "extract");
        let columns = self.append_round(&mut circuit, num_data, noise)?;
        Ok((circuit, columns))
    }
}

// ============================================================================
// Tests
// ============================================================================
