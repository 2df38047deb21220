//! Multi-round QEC scheduling
//!
//! Gantree: L5_Qec → QecRoundScheduler
//!
//! Lays out encode → (storage noise → extraction → correction)ⁿ → readout
//! as one circuit, and replays the per-round state machine over a sampled
//! shot. Every round uses fresh ancillas, so round `r` owns qubits
//! `n + r·m .. n + (r+1)·m`.
//!
//! In `InCircuit` mode each round is followed by one classically controlled
//! Pauli per decodable syndrome. In `PostHoc` mode nothing is applied; the
//! replay keeps a Pauli frame instead, decodes each round against the
//! syndrome the frame predicts, and applies the frame to the readout.

use crate::config::{ExperimentConfig, PostSelection};
use serde::{Deserialize, Serialize};
use std::fmt;
use steane_code::decoder::{DecodeOutcome, SyndromeDecoder};
use steane_code::encoding::EncodingProtocol;
use steane_code::extraction::SyndromeExtractionProtocol;
use steane_code::stabilizer::{StabilizerCode, StabilizerType};
use steane_code::syndrome::{ErrorEvent, Syndrome};
use steane_core::circuit::Circuit;
use steane_core::error::SteaneResult;
use steane_core::operation::{Condition, Operation};
use steane_core::types::{Bitstring, ColumnId, LogicalState, QubitId};
use steane_noise::{InsertionPoint, NoiseModel};

/// Raw measurement row for one shot: syndromes by round, then the readout
pub type ShotOutcome = Bitstring;

// ============================================================================
// State Machine
// ============================================================================

/// Scheduler state
/// Gantree: RoundState // 라운드 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    /// Preparing the logical state
    Encoding,
    /// Storage noise and syndrome extraction
    RoundActive,
    /// Syndrome looked up
    Decoded,
    /// Correction applied (or nothing to correct)
    Corrected,
    /// Uncorrectable syndrome; no data-qubit operation
    Flagged,
    /// Measuring the data qubits
    Readout,
    /// Final bits emitted
    Done,
}

impl RoundState {
    /// State after a decode
    pub fn after_decode(outcome: DecodeOutcome) -> Self {
        if outcome.is_decodable() {
            RoundState::Corrected
        } else {
            RoundState::Flagged
        }
    }

    /// State after Corrected/Flagged
    pub fn after_round(rounds_remaining: bool) -> Self {
        if rounds_remaining {
            RoundState::RoundActive
        } else {
            RoundState::Readout
        }
    }
}

/// Where corrections are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrectionMode {
    /// Classically controlled Paulis inside the circuit
    InCircuit,
    /// Pauli frame tracked during replay
    PostHoc,
}

impl fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionMode::InCircuit => write!(f, "in-circuit"),
            CorrectionMode::PostHoc => write!(f, "post-hoc"),
        }
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Column and qubit map of a scheduled circuit
/// Gantree: CircuitLayout // 회로 배치
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitLayout {
    /// Data qubits (0..num_data)
    pub num_data: usize,

    /// Ancillas consumed per round
    pub ancillas_per_round: usize,

    /// Syndrome columns for each round, canonical generator order
    pub syndrome_columns: Vec<Vec<ColumnId>>,

    /// Data-qubit readout columns, qubit order
    pub readout_columns: Vec<ColumnId>,

    /// Correction mode the circuit was built for
    pub mode: CorrectionMode,
}

impl CircuitLayout {
    /// Number of rounds
    pub fn rounds(&self) -> usize {
        self.syndrome_columns.len()
    }

    /// Total qubits
    pub fn num_qubits(&self) -> usize {
        self.num_data + self.rounds() * self.ancillas_per_round
    }

    /// Total measurement columns
    pub fn num_columns(&self) -> usize {
        self.syndrome_columns.iter().map(Vec::len).sum::<usize>() + self.readout_columns.len()
    }
}

/// Circuit plus its layout
#[derive(Debug, Clone)]
pub struct ScheduledCircuit {
    /// Circuit to sample
    pub circuit: Circuit,

    /// Column map
    pub layout: CircuitLayout,
}

// ============================================================================
// Trace
// ============================================================================

/// One replayed round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round index
    pub round: usize,

    /// Syndrome as measured
    pub measured: Syndrome,

    /// Syndrome after removing the frame's contribution
    pub effective: Syndrome,

    /// Decoder verdict on the effective syndrome
    pub outcome: DecodeOutcome,

    /// Corrected or Flagged
    pub state: RoundState,

    /// Inferred single-qubit error, if any
    pub event: Option<ErrorEvent>,
}

/// Replay of one shot through the state machine
/// Gantree: ShotTrace // 샷 추적
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotTrace {
    /// Per-round records
    pub rounds: Vec<RoundRecord>,

    /// States visited, Encoding through Done
    pub path: Vec<RoundState>,

    /// Readout with the frame applied
    pub readout: Bitstring,

    /// Prepared logical state
    pub target: LogicalState,

    /// Readout lies in the target's codeword sector
    pub in_target_sector: bool,

    /// Logical value after classical readout decoding
    pub decoded: Option<LogicalState>,
}

impl ShotTrace {
    /// Every round measured the trivial syndrome
    pub fn all_trivial(&self) -> bool {
        self.rounds.iter().all(|r| r.measured.is_trivial())
    }

    /// Rounds with a non-trivial measured syndrome
    pub fn nontrivial_rounds(&self) -> usize {
        self.rounds
            .iter()
            .filter(|r| !r.measured.is_trivial())
            .count()
    }

    /// Rounds that ended Flagged
    pub fn flagged_rounds(&self) -> usize {
        self.rounds
            .iter()
            .filter(|r| r.state == RoundState::Flagged)
            .count()
    }

    /// True if any round was flagged
    pub fn is_flagged(&self) -> bool {
        self.flagged_rounds() > 0
    }

    /// Readout decoding recovered the prepared state
    pub fn decoded_ok(&self) -> bool {
        self.decoded == Some(self.target)
    }

    /// True if the shot survives the post-selection predicate
    pub fn passes(&self, predicate: PostSelection) -> bool {
        match predicate {
            PostSelection::None => true,
            PostSelection::AllTrivialSyndromes => self.all_trivial(),
            PostSelection::NoFlaggedRounds => !self.is_flagged(),
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Multi-round cycle composer
/// Gantree: QecRoundScheduler // 라운드 스케줄러
#[derive(Debug, Clone)]
pub struct QecRoundScheduler {
    decoder: SyndromeDecoder,
    encoder: EncodingProtocol,
    extractor: SyndromeExtractionProtocol,
    noise: NoiseModel,
    rounds: usize,
    target: LogicalState,
}

impl QecRoundScheduler {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create for a code and configuration
    ///
    /// Fails on an invalid configuration or a code whose single-qubit
    /// syndromes collide under the configured coverage.
    pub fn new(code: StabilizerCode, config: &ExperimentConfig) -> SteaneResult<Self> {
        config.validate()?;
        let decoder = SyndromeDecoder::new(code.clone(), config.coverage)?;
        let extractor = SyndromeExtractionProtocol::new(&code);
        let encoder = EncodingProtocol::new(code, config.encoding);
        Ok(Self {
            decoder,
            encoder,
            extractor,
            noise: config.noise,
            rounds: config.rounds,
            target: config.target,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Decoder
    pub fn decoder(&self) -> &SyndromeDecoder {
        &self.decoder
    }

    /// Code
    pub fn code(&self) -> &StabilizerCode {
        self.decoder.code()
    }

    /// Rounds per shot
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Target logical state
    pub fn target(&self) -> LogicalState {
        self.target
    }

    /// Noise model
    pub fn noise(&self) -> &NoiseModel {
        &self.noise
    }

    /// Qubits a protected circuit needs
    pub fn required_qubits(&self) -> usize {
        self.code().n() + self.rounds * self.extractor.num_ancillas()
    }

    // ========================================================================
    // Circuit Construction
    // ========================================================================

    fn data_qubits(&self) -> Vec<QubitId> {
        (0..self.code().n()).collect()
    }

    fn append_readout(&self, circuit: &mut Circuit) -> SteaneResult<Vec<ColumnId>> {
        let data = self.data_qubits();
        circuit.extend(self.noise.inject(InsertionPoint::BeforeMeasurement, &data))?;
        data.iter().map(|&q| circuit.measure(q)).collect()
    }

    /// Build the protected memory circuit
    /// Gantree: build(mode) -> Result<ScheduledCircuit> // 회로 생성
    pub fn build(&self, mode: CorrectionMode) -> SteaneResult<ScheduledCircuit> {
        let n = self.code().n();
        let m = self.extractor.num_ancillas();
        let data = self.data_qubits();
        let mut circuit = Circuit::with_name(
            self.required_qubits(),
            format!("memory_{}r_{}", self.rounds, mode),
        );

        self.encoder.append(&mut circuit, self.target, &self.noise)?;

        let entries = self.decoder.table().entries();
        let mut syndrome_columns = Vec::with_capacity(self.rounds);
        for round in 0..self.rounds {
            circuit.extend(self.noise.inject(InsertionPoint::Storage, &data))?;
            let columns = self
                .extractor
                .append_round(&mut circuit, n + round * m, &self.noise)?;

            if mode == CorrectionMode::InCircuit {
                for (syndrome, kind, qubit) in &entries {
                    circuit.push(Operation::Conditional {
                        condition: Condition::equals(&columns, syndrome.bits()),
                        pauli: kind.inverse(),
                        qubit: *qubit,
                    })?;
                }
            }
            syndrome_columns.push(columns);
        }

        let readout_columns = self.append_readout(&mut circuit)?;

        log::debug!(
            "Scheduled {} rounds ({}): {} qubits, {} ops, {} columns",
            self.rounds,
            mode,
            circuit.num_qubits(),
            circuit.operation_count(),
            circuit.num_measurements()
        );

        Ok(ScheduledCircuit {
            circuit,
            layout: CircuitLayout {
                num_data: n,
                ancillas_per_round: m,
                syndrome_columns,
                readout_columns,
                mode,
            },
        })
    }

    /// Encode, idle for `periods` storage periods, read out; no extraction
    pub fn build_unprotected(&self, periods: usize) -> SteaneResult<ScheduledCircuit> {
        let n = self.code().n();
        let data = self.data_qubits();
        let mut circuit = Circuit::with_name(n, format!("unprotected_{}p", periods));

        self.encoder.append(&mut circuit, self.target, &self.noise)?;
        for _ in 0..periods {
            circuit.extend(self.noise.inject(InsertionPoint::Storage, &data))?;
        }
        let readout_columns = self.append_readout(&mut circuit)?;

        Ok(ScheduledCircuit {
            circuit,
            layout: CircuitLayout {
                num_data: n,
                ancillas_per_round: self.extractor.num_ancillas(),
                syndrome_columns: Vec::new(),
                readout_columns,
                mode: CorrectionMode::PostHoc,
            },
        })
    }

    // ========================================================================
    // Replay
    // ========================================================================

    /// Syndrome a Pauli frame would produce
    fn frame_syndrome(&self, fx: &[bool], fz: &[bool]) -> Vec<bool> {
        self.code()
            .generators()
            .iter()
            .map(|g| {
                let part = match g.kind {
                    StabilizerType::X => fz,
                    StabilizerType::Z => fx,
                };
                g.support.iter().filter(|&&q| part[q]).count() % 2 == 1
            })
            .collect()
    }

    /// Walk the state machine over one shot
    ///
    /// Fails if the shot is missing any column the layout reads.
    /// Gantree: replay(shot, layout) -> Result<ShotTrace> // 상태 재생
    pub fn replay(&self, shot: &ShotOutcome, layout: &CircuitLayout) -> SteaneResult<ShotTrace> {
        let n = layout.num_data;
        let mut fx = vec![false; n];
        let mut fz = vec![false; n];
        let mut path = vec![RoundState::Encoding];
        let mut rounds = Vec::with_capacity(layout.rounds());

        for (round, columns) in layout.syndrome_columns.iter().enumerate() {
            path.push(RoundState::RoundActive);
            let measured = Syndrome::from_record(shot, columns)?;
            let effective = match layout.mode {
                CorrectionMode::InCircuit => measured.clone(),
                CorrectionMode::PostHoc => Syndrome::new(
                    measured
                        .bits()
                        .iter()
                        .zip(self.frame_syndrome(&fx, &fz))
                        .map(|(&a, b)| a ^ b)
                        .collect(),
                ),
            };

            path.push(RoundState::Decoded);
            let outcome = self.decoder.decode(&effective);
            let state = RoundState::after_decode(outcome);
            path.push(state);

            let event = match outcome {
                DecodeOutcome::Correctable { kind, qubit } => {
                    if layout.mode == CorrectionMode::PostHoc {
                        let correction = kind.inverse();
                        fx[qubit] ^= correction.flips_bit();
                        fz[qubit] ^= correction.flips_phase();
                    }
                    Some(ErrorEvent { kind, qubit, round })
                }
                _ => None,
            };

            rounds.push(RoundRecord {
                round,
                measured,
                effective,
                outcome,
                state,
                event,
            });

            if round + 1 == layout.rounds() {
                path.push(RoundState::after_round(false));
            }
        }

        if layout.rounds() == 0 {
            path.push(RoundState::Readout);
        }

        let mut readout = shot.select(&layout.readout_columns)?;
        for (q, &flip) in fx.iter().enumerate() {
            if flip {
                readout.flip(q);
            }
        }
        path.push(RoundState::Done);

        let in_target_sector = self.code().is_codeword_of(&readout, self.target);
        let decoded = self.decoder.decode_readout(&readout).logical;

        Ok(ShotTrace {
            rounds,
            path,
            readout,
            target: self.target,
            in_target_sector,
            decoded,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
