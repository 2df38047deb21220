//! Clifford stabilizer simulator backend
//!
//! Gantree: L4_Backend → StabilizerSimulator
//!
//! Samples Clifford circuits with Pauli noise on a CHP tableau. Shots are
//! split into fixed-size chunks run in parallel; chunk `c` draws from
//! stream `c` of a ChaCha8 generator seeded with the run seed, so results
//! do not depend on the thread count.

use crate::execution::{Backend, ExecutionMetadata, SampleBatch};
use crate::tableau::Tableau;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;
use steane_core::circuit::Circuit;
use steane_core::constants::stats::SHOTS_PER_CHUNK;
use steane_core::error::{SteaneError, SteaneResult};
use steane_core::operation::{NoiseChannel, Operation};
use steane_core::types::{Bitstring, PauliKind, QubitId};

/// Default qubit capacity
const DEFAULT_CAPACITY: usize = 512;

/// Stabilizer simulator backend
/// Gantree: StabilizerSimulator // 시뮬레이터 구현
#[derive(Debug, Clone)]
pub struct StabilizerSimulator {
    /// Backend name
    name: String,

    /// Maximum circuit width
    capacity: usize,

    /// Execute conditional operations in-circuit
    feedforward: bool,

    /// Shots per parallel chunk
    chunk_size: u64,
}

impl StabilizerSimulator {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a simulator with feedforward support
    pub fn new() -> Self {
        Self {
            name: "stabilizer_simulator".to_string(),
            capacity: DEFAULT_CAPACITY,
            feedforward: true,
            chunk_size: SHOTS_PER_CHUNK,
        }
    }

    /// Batch-only sampler without mid-circuit branching
    pub fn without_feedforward(mut self) -> Self {
        self.feedforward = false;
        self.name = "stabilizer_batch_sampler".to_string();
        self
    }

    /// Set qubit capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set shots per parallel chunk
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    fn apply_pair(tableau: &mut Tableau, index: u8, a: QubitId, b: QubitId) {
        // index in 1..16 enumerates (P_a, P_b) with I,X,Y,Z = 0..4
        let paulis = [None, Some(PauliKind::X), Some(PauliKind::Y), Some(PauliKind::Z)];
        if let Some(kind) = paulis[(index / 4) as usize] {
            tableau.pauli(kind, a);
        }
        if let Some(kind) = paulis[(index % 4) as usize] {
            tableau.pauli(kind, b);
        }
    }

    fn apply_noise<R: Rng>(
        tableau: &mut Tableau,
        channel: &NoiseChannel,
        qubits: &[QubitId],
        rng: &mut R,
    ) {
        match *channel {
            NoiseChannel::Depolarize1 { p } => {
                if rng.gen::<f64>() < p {
                    let kind = PauliKind::ALL[rng.gen_range(0..3)];
                    tableau.pauli(kind, qubits[0]);
                }
            }
            NoiseChannel::Depolarize2 { p } => {
                if rng.gen::<f64>() < p {
                    let index = rng.gen_range(1u8..16);
                    Self::apply_pair(tableau, index, qubits[0], qubits[1]);
                }
            }
            NoiseChannel::PauliChannel1 { px, py, pz } => {
                let u = rng.gen::<f64>();
                let kind = if u < px {
                    Some(PauliKind::X)
                } else if u < px + py {
                    Some(PauliKind::Y)
                } else if u < px + py + pz {
                    Some(PauliKind::Z)
                } else {
                    None
                };
                if let Some(kind) = kind {
                    tableau.pauli(kind, qubits[0]);
                }
            }
        }
    }

    /// Run one shot
    fn run_shot<R: Rng>(&self, circuit: &Circuit, rng: &mut R) -> SteaneResult<Bitstring> {
        let mut tableau = Tableau::new(circuit.num_qubits());
        let mut record: Vec<bool> = Vec::with_capacity(circuit.num_measurements());

        for op in circuit.operations() {
            match op {
                Operation::H(q) => tableau.h(*q),
                Operation::S(q) => tableau.s(*q),
                Operation::Sdg(q) => tableau.sdg(*q),
                Operation::X(q) => tableau.pauli(PauliKind::X, *q),
                Operation::Y(q) => tableau.pauli(PauliKind::Y, *q),
                Operation::Z(q) => tableau.pauli(PauliKind::Z, *q),
                Operation::Cnot(c, t) => tableau.cnot(*c, *t),
                Operation::Cz(a, b) => tableau.cz(*a, *b),
                Operation::Noise { channel, qubits } => {
                    Self::apply_noise(&mut tableau, channel, qubits, rng)
                }
                Operation::Measure { qubit, .. } => record.push(tableau.measure(*qubit, rng)),
                Operation::Conditional {
                    condition,
                    pauli,
                    qubit,
                } => {
                    if condition.holds(&record) {
                        tableau.pauli(*pauli, *qubit);
                    }
                }
                Operation::Barrier(_) => {}
                Operation::T(_) => {
                    return Err(SteaneError::UnsupportedOperation {
                        backend: self.name.clone(),
                        operation: op.to_string(),
                    })
                }
            }
        }

        Ok(Bitstring::new(record))
    }
}

impl Default for StabilizerSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for StabilizerSimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.capacity
    }

    fn supports_feedforward(&self) -> bool {
        self.feedforward
    }

    fn supports(&self, op: &Operation) -> bool {
        match op {
            Operation::T(_) => false,
            Operation::Conditional { .. } => self.feedforward,
            _ => true,
        }
    }

    fn sample(&self, circuit: &Circuit, shots: u64, seed: u64) -> SteaneResult<SampleBatch> {
        self.validate(circuit, shots)?;

        let start = Instant::now();
        let num_chunks = shots.div_ceil(self.chunk_size);

        let chunks: Vec<Vec<Bitstring>> = (0..num_chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(chunk);
                let first = chunk * self.chunk_size;
                let count = self.chunk_size.min(shots - first);
                (0..count)
                    .map(|_| self.run_shot(circuit, &mut rng))
                    .collect::<SteaneResult<Vec<_>>>()
            })
            .collect::<SteaneResult<Vec<_>>>()?;

        let rows: Vec<Bitstring> = chunks.into_iter().flatten().collect();
        let elapsed = start.elapsed().as_millis() as u64;

        log::debug!(
            "{}: sampled {} shots x {} columns in {} chunks ({} ms)",
            self.name,
            rows.len(),
            circuit.num_measurements(),
            num_chunks,
            elapsed
        );

        Ok(SampleBatch::new(
            circuit.num_measurements(),
            rows,
            ExecutionMetadata {
                backend: self.name.clone(),
                seed,
                chunks: num_chunks as usize,
                execution_time_ms: Some(elapsed),
                feedforward: self.feedforward && circuit.requires_feedforward(),
            },
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use steane_core::CircuitBuilder;

    #[test]
    fn test_bell_pairs_agree() {
        let backend = StabilizerSimulator::new();
        let circuit = CircuitBuilder::new(2)
            .h(0)
            .cnot(0, 1)
            .measure_all()
            .build()
            .unwrap();
        let batch = backend.sample(&circuit, 1000, 42).unwrap();

        assert_eq!(batch.len(), 1000);
        assert!(batch.shots.iter().all(|s| s.get(0) == s.get(1)));
        let p1 = batch.column_mean(0);
        assert!(p1 > 0.4 && p1 < 0.6, "P(1) = {}", p1);
    }

    #[test]
    fn test_seed_reproducibility() {
        let backend = StabilizerSimulator::new().with_chunk_size(16);
        let circuit = CircuitBuilder::new(3)
            .h(0)
            .cnot(0, 1)
            .depolarize2(1, 2, 0.2)
            .measure_all()
            .build()
            .unwrap();
        let a = backend.sample(&circuit, 100, 9).unwrap();
        let b = backend.sample(&circuit, 100, 9).unwrap();
        let c = backend.sample(&circuit, 100, 10).unwrap();
        assert_eq!(a.shots, b.shots);
        assert_ne!(a.shots, c.shots);
        assert_eq!(a.metadata.chunks, 7);
    }

    #[test]
    fn test_non_clifford_fails_whole_batch() {
        let backend = StabilizerSimulator::new();
        let circuit = CircuitBuilder::new(1).h(0).t(0).measure(0).build().unwrap();
        let err = backend.sample(&circuit, 10, 1).unwrap_err();
        assert!(matches!(err, SteaneError::UnsupportedOperation { .. }));
        assert!(err.is_simulator_failure());
    }

    #[test]
    fn test_conditional_requires_feedforward() {
        let circuit = CircuitBuilder::new(2)
            .x(0)
            .measure(0)
            .conditional(&[0], &[true], PauliKind::X, 1)
            .measure(1)
            .build()
            .unwrap();

        let batch = StabilizerSimulator::new().sample(&circuit, 50, 3).unwrap();
        assert!(batch.shots.iter().all(|s| s.get(1) == Some(true)));
        assert!(batch.metadata.feedforward);

        let err = StabilizerSimulator::new()
            .without_feedforward()
            .sample(&circuit, 50, 3)
            .unwrap_err();
        assert!(matches!(err, SteaneError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_capacity_and_shot_limits() {
        let backend = StabilizerSimulator::new().with_capacity(2);
        let wide = CircuitBuilder::new(3).measure_all().build().unwrap();
        assert!(matches!(
            backend.sample(&wide, 10, 0),
            Err(SteaneError::BackendCapacity { .. })
        ));
        let narrow = CircuitBuilder::new(1).measure(0).build().unwrap();
        assert!(matches!(
            backend.sample(&narrow, 0, 0),
            Err(SteaneError::ShotsOutOfRange(..))
        ));
    }

    #[test]
    fn test_depolarizing_rate() {
        // X or Y flips the readout: 2/3 of p
        let backend = StabilizerSimulator::new();
        let circuit = CircuitBuilder::new(1)
            .depolarize1(0, 0.3)
            .measure(0)
            .build()
            .unwrap();
        let batch = backend.sample(&circuit, 6000, 5).unwrap();
        let rate = batch.column_mean(0);
        assert!((rate - 0.2).abs() < 0.03, "flip rate = {}", rate);
    }

    #[test]
    fn test_bit_flip_channel_rate() {
        let backend = StabilizerSimulator::new();
        let circuit = CircuitBuilder::new(1)
            .noise(
                NoiseChannel::PauliChannel1 {
                    px: 0.1,
                    py: 0.0,
                    pz: 0.0,
                },
                &[0],
            )
            .measure(0)
            .build()
            .unwrap();
        let rate = backend.sample(&circuit, 5000, 11).unwrap().column_mean(0);
        assert!((rate - 0.1).abs() < 0.02, "flip rate = {}", rate);
    }

    #[test]
    fn test_two_qubit_depolarizing_marginal() {
        // Qubit a is flipped by X or Y on a: 8 of the 15 pairs
        let backend = StabilizerSimulator::new();
        let circuit = CircuitBuilder::new(2)
            .depolarize2(0, 1, 0.3)
            .measure_all()
            .build()
            .unwrap();
        let batch = backend.sample(&circuit, 6000, 13).unwrap();
        let expected = 0.3 * 8.0 / 15.0;
        assert!((batch.column_mean(0) - expected).abs() < 0.03);
        assert!((batch.column_mean(1) - expected).abs() < 0.03);
    }
}
