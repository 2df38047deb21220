//! Logical state preparation
//!
//! Gantree: L3_Code → EncodingProtocol
//!
//! The X-generator matrix is brought to reduced row echelon form. Each
//! pivot qubit gets a Hadamard and then fans out CNOTs to the non-pivot
//! qubits of its row. Pivots are never CNOT targets and targets are never
//! controls, so every CNOT ordering prepares the same stabilizer state.

use crate::gf2;
use crate::stabilizer::{StabilizerCode, StabilizerType};
use serde::{Deserialize, Serialize};
use steane_core::circuit::Circuit;
use steane_core::error::SteaneResult;
use steane_core::operation::Operation;
use steane_core::types::{LogicalState, QubitId};
use steane_noise::{InsertionPoint, NoiseModel};

/// CNOT scheduling strategy
/// Gantree: EncodingStrategy // Sequential | DepthOptimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EncodingStrategy {
    /// Row by row, pivot-major order
    #[default]
    Sequential,
    /// Greedy layering, each qubit touched at most once per layer
    DepthOptimized,
}

/// Encoder for a stabilizer code
/// Gantree: EncodingProtocol // 인코딩
#[derive(Debug, Clone)]
pub struct EncodingProtocol {
    code: StabilizerCode,
    strategy: EncodingStrategy,
    pivots: Vec<QubitId>,
    rows: Vec<u64>,
}

impl EncodingProtocol {
    /// Create an encoder
    pub fn new(code: StabilizerCode, strategy: EncodingStrategy) -> Self {
        let masks: Vec<u64> = code
            .x_generators()
            .iter()
            .map(|s| gf2::mask_of(s))
            .collect();
        let (pivots, rows): (Vec<QubitId>, Vec<u64>) = gf2::rref(&masks).into_iter().unzip();
        Self {
            code,
            strategy,
            pivots,
            rows,
        }
    }

    /// Strategy in use
    pub fn strategy(&self) -> EncodingStrategy {
        self.strategy
    }

    /// Qubits receiving a Hadamard
    pub fn pivots(&self) -> &[QubitId] {
        &self.pivots
    }

    /// CNOT (control, target) pairs in emission order
    pub fn cnot_pairs(&self) -> Vec<(QubitId, QubitId)> {
        let sequential: Vec<(QubitId, QubitId)> = self
            .pivots
            .iter()
            .zip(&self.rows)
            .flat_map(|(&pivot, &row)| {
                gf2::support_of(row)
                    .into_iter()
                    .filter(move |&q| q != pivot)
                    .map(move |q| (pivot, q))
            })
            .collect();

        match self.strategy {
            EncodingStrategy::Sequential => sequential,
            EncodingStrategy::DepthOptimized => Self::layer(sequential),
        }
    }

    fn layer(mut remaining: Vec<(QubitId, QubitId)>) -> Vec<(QubitId, QubitId)> {
        let mut ordered = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let mut busy: Vec<QubitId> = Vec::new();
            let mut deferred = Vec::new();
            for (c, t) in remaining {
                if busy.contains(&c) || busy.contains(&t) {
                    deferred.push((c, t));
                } else {
                    busy.push(c);
                    busy.push(t);
                    ordered.push((c, t));
                }
            }
            remaining = deferred;
        }
        ordered
    }

    /// Noiseless gate sequence preparing `state`
    /// Gantree: operations(state) -> Vec<Operation> // 게이트 시퀀스
    pub fn operations(&self, state: LogicalState) -> Vec<Operation> {
        let mut ops: Vec<Operation> = self.pivots.iter().map(|&q| Operation::H(q)).collect();
        ops.extend(self.cnot_pairs().into_iter().map(|(c, t)| Operation::Cnot(c, t)));
        if state == LogicalState::One {
            ops.extend(
                self.code
                    .logical_operator(StabilizerType::X)
                    .iter()
                    .map(|&q| Operation::X(q)),
            );
        }
        ops
    }

    /// Append the encoder to `circuit`, with noise after every gate
    pub fn append(
        &self,
        circuit: &mut Circuit,
        state: LogicalState,
        noise: &NoiseModel,
    ) -> SteaneResult<()> {
        for op in self.operations(state) {
            let qubits = op.qubits();
            circuit.push(op)?;
            circuit.extend(noise.inject(InsertionPoint::AfterEncodingOp, &qubits))?;
        }
        Ok(())
    }

    /// Standalone encoding circuit on the data qubits
    pub fn circuit(&self, state: LogicalState, noise: &NoiseModel) -> SteaneResult<Circuit> {
        let mut circuit = Circuit::with_name(self.code.n(), "encode");
        self.append(&mut circuit, state, noise)?;
        Ok(circuit)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_steane_pivots_and_cnots() {
        let enc = EncodingProtocol::new(StabilizerCode::steane(), EncodingStrategy::Sequential);
        assert_eq!(enc.pivots(), &[0, 1, 2]);
        assert_eq!(
            enc.cnot_pairs(),
            vec![
                (0, 3),
                (0, 5),
                (0, 6),
                (1, 3),
                (1, 4),
                (1, 6),
                (2, 3),
                (2, 4),
                (2, 5)
            ]
        );
    }

    #[test]
    fn test_strategies_share_cnot_multiset() {
        let code = StabilizerCode::steane();
        let seq = EncodingProtocol::new(code.clone(), EncodingStrategy::Sequential);
        let opt = EncodingProtocol::new(code, EncodingStrategy::DepthOptimized);
        assert_eq!(sorted(seq.cnot_pairs()), sorted(opt.cnot_pairs()));
    }

    #[test]
    fn test_depth_optimized_not_deeper() {
        let code = StabilizerCode::steane();
        let noise = NoiseModel::ideal();
        let seq = EncodingProtocol::new(code.clone(), EncodingStrategy::Sequential)
            .circuit(LogicalState::Zero, &noise)
            .unwrap();
        let opt = EncodingProtocol::new(code, EncodingStrategy::DepthOptimized)
            .circuit(LogicalState::Zero, &noise)
            .unwrap();
        assert_eq!(seq.depth(), 6);
        assert!(opt.depth() < seq.depth());
    }

    #[test]
    fn test_pivots_never_targeted() {
        let enc = EncodingProtocol::new(StabilizerCode::steane(), EncodingStrategy::DepthOptimized);
        for (c, t) in enc.cnot_pairs() {
            assert!(enc.pivots().contains(&c));
            assert!(!enc.pivots().contains(&t));
        }
    }

    #[test]
    fn test_logical_one_appends_x() {
        let enc = EncodingProtocol::new(StabilizerCode::steane(), EncodingStrategy::Sequential);
        let zero = enc.operations(LogicalState::Zero);
        let one = enc.operations(LogicalState::One);
        assert_eq!(one.len(), zero.len() + 7);
        assert!(one[zero.len()..].iter().all(|op| matches!(op, Operation::X(_))));
    }

    #[test]
    fn test_noise_after_every_gate() {
        let enc = EncodingProtocol::new(StabilizerCode::steane(), EncodingStrategy::Sequential);
        let circuit = enc
            .circuit(LogicalState::Zero, &NoiseModel::uniform(0.01))
            .unwrap();
        // 3 Hadamards + 9 CNOTs, one channel each
        assert_eq!(circuit.count_noise(), 12);
        assert_eq!(circuit.count_2q(), 9);
    }
}
