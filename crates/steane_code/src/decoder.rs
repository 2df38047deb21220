//! Lookup-table syndrome decoder
//!
//! Gantree: L3_Code → SyndromeDecoder
//!
//! The table is derived from the generators: every single-qubit error
//! candidate is mapped to the syndrome it produces. Any syndrome outside
//! the table decodes to `Uncorrectable`.

use crate::stabilizer::StabilizerCode;
use crate::syndrome::Syndrome;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use steane_core::error::{SteaneError, SteaneResult};
use steane_core::operation::Operation;
use steane_core::types::{Bitstring, LogicalState, PauliKind, QubitId};

// ============================================================================
// DecodeOutcome
// ============================================================================

/// Result of decoding one syndrome
/// Gantree: DecodeOutcome // NoError | (kind, q) | Uncorrectable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecodeOutcome {
    /// Trivial syndrome
    NoError,
    /// Single-qubit error identified
    Correctable {
        /// Pauli kind
        kind: PauliKind,
        /// Affected qubit
        qubit: QubitId,
    },
    /// Syndrome produced by no single-qubit candidate
    Uncorrectable,
}

impl DecodeOutcome {
    /// True unless uncorrectable
    pub fn is_decodable(&self) -> bool {
        !matches!(self, DecodeOutcome::Uncorrectable)
    }
}

impl fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeOutcome::NoError => write!(f, "NO_ERROR"),
            DecodeOutcome::Correctable { kind, qubit } => write!(f, "{}{}", kind, qubit),
            DecodeOutcome::Uncorrectable => write!(f, "UNCORRECTABLE"),
        }
    }
}

// ============================================================================
// Coverage
// ============================================================================

/// Which single-qubit error kinds the table covers
/// Gantree: Coverage // Minimal | Full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Coverage {
    /// X and Z errors
    Minimal,
    /// X, Y and Z errors
    #[default]
    Full,
}

impl Coverage {
    /// Error kinds covered
    pub fn kinds(&self) -> &'static [PauliKind] {
        match self {
            Coverage::Minimal => &[PauliKind::X, PauliKind::Z],
            Coverage::Full => &PauliKind::ALL,
        }
    }
}

// ============================================================================
// SyndromeTable
// ============================================================================

/// Syndrome → single-qubit error map
/// Gantree: SyndromeTable // 신드롬 테이블
#[derive(Debug, Clone, PartialEq)]
pub struct SyndromeTable {
    num_bits: usize,
    coverage: Coverage,
    entries: HashMap<Syndrome, (PauliKind, QubitId)>,
}

impl SyndromeTable {
    /// Derive the table from a code's generators
    ///
    /// Fails if two candidates share a syndrome or one is undetectable.
    /// Gantree: build(code, coverage) -> Result<Self> // 테이블 생성
    pub fn build(code: &StabilizerCode, coverage: Coverage) -> SteaneResult<Self> {
        let generators = code.generators();
        let mut entries: HashMap<Syndrome, (PauliKind, QubitId)> = HashMap::new();

        for &kind in coverage.kinds() {
            for qubit in 0..code.n() {
                let syndrome = Syndrome::new(
                    generators
                        .iter()
                        .map(|g| g.detects(kind, qubit))
                        .collect(),
                );
                if syndrome.is_trivial() {
                    return Err(SteaneError::SyndromeCollision {
                        first: "I".into(),
                        second: format!("{}{}", kind, qubit),
                        syndrome: syndrome.to_string(),
                    });
                }
                if let Some(&(k0, q0)) = entries.get(&syndrome) {
                    return Err(SteaneError::SyndromeCollision {
                        first: format!("{}{}", k0, q0),
                        second: format!("{}{}", kind, qubit),
                        syndrome: syndrome.to_string(),
                    });
                }
                entries.insert(syndrome, (kind, qubit));
            }
        }

        log::debug!(
            "Derived syndrome table: {} single-qubit entries over {} generators ({:?})",
            entries.len(),
            generators.len(),
            coverage
        );

        Ok(Self {
            num_bits: generators.len(),
            coverage,
            entries,
        })
    }

    /// Syndrome length
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Coverage used to build the table
    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    /// Number of single-qubit entries (excludes the trivial syndrome)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no single-qubit entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total lookup
    pub fn lookup(&self, syndrome: &Syndrome) -> DecodeOutcome {
        if syndrome.len() != self.num_bits {
            return DecodeOutcome::Uncorrectable;
        }
        if syndrome.is_trivial() {
            return DecodeOutcome::NoError;
        }
        match self.entries.get(syndrome) {
            Some(&(kind, qubit)) => DecodeOutcome::Correctable { kind, qubit },
            None => DecodeOutcome::Uncorrectable,
        }
    }

    /// Single-qubit entries sorted by syndrome
    pub fn entries(&self) -> Vec<(Syndrome, PauliKind, QubitId)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|(s, &(k, q))| (s.clone(), k, q))
            .collect();
        out.sort();
        out
    }
}

// ============================================================================
// ReadoutDecode
// ============================================================================

/// Classical decoding of a final Z-basis readout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadoutDecode {
    /// Readout after the single-bit correction
    pub corrected: Bitstring,
    /// Bit flipped by the correction
    pub flipped: Option<QubitId>,
    /// Logical value, `None` if no single flip explains the parities
    pub logical: Option<LogicalState>,
}

// ============================================================================
// SyndromeDecoder
// ============================================================================

/// Deterministic O(1) decoder
/// Gantree: SyndromeDecoder // 디코더
#[derive(Debug, Clone)]
pub struct SyndromeDecoder {
    code: StabilizerCode,
    table: SyndromeTable,
}

impl SyndromeDecoder {
    /// Build the decoder for a code
    pub fn new(code: StabilizerCode, coverage: Coverage) -> SteaneResult<Self> {
        let table = SyndromeTable::build(&code, coverage)?;
        Ok(Self { code, table })
    }

    /// Steane code decoder with full X/Y/Z coverage
    pub fn steane() -> SteaneResult<Self> {
        Self::new(StabilizerCode::steane(), Coverage::Full)
    }

    /// Underlying code
    pub fn code(&self) -> &StabilizerCode {
        &self.code
    }

    /// Underlying table
    pub fn table(&self) -> &SyndromeTable {
        &self.table
    }

    /// Decode a syndrome
    /// Gantree: decode(syndrome) -> DecodeOutcome // 디코딩
    pub fn decode(&self, syndrome: &Syndrome) -> DecodeOutcome {
        self.table.lookup(syndrome)
    }

    /// Operation undoing a `kind` error on `qubit`
    /// Gantree: correction_for(kind, q) -> Operation // 보정 연산
    pub fn correction_for(&self, kind: PauliKind, qubit: QubitId) -> Operation {
        Operation::pauli(kind.inverse(), qubit)
    }

    /// Correction for a decode outcome, if any
    pub fn correction(&self, outcome: DecodeOutcome) -> Option<Operation> {
        match outcome {
            DecodeOutcome::Correctable { kind, qubit } => Some(self.correction_for(kind, qubit)),
            _ => None,
        }
    }

    /// Syndrome produced by a single `kind` error on `qubit`
    pub fn syndrome_of(&self, kind: PauliKind, qubit: QubitId) -> SteaneResult<Syndrome> {
        if qubit >= self.code.n() {
            return Err(SteaneError::QubitOutOfRange {
                qubit,
                max: self.code.n(),
            });
        }
        Ok(Syndrome::new(
            self.code
                .generators()
                .iter()
                .map(|g| g.detects(kind, qubit))
                .collect(),
        ))
    }

    /// Number of syndromes that do not decode to `Uncorrectable`
    pub fn decodable_count(&self) -> usize {
        self.table.len() + 1
    }

    /// Correct a single bit flip in a Z-basis readout and read the logical value
    ///
    /// The Z-check parities must match the column of exactly one qubit;
    /// otherwise the readout is left as is and the logical value is `None`
    /// unless it is already a codeword.
    pub fn decode_readout(&self, bits: &Bitstring) -> ReadoutDecode {
        let parities = self.code.z_check_parities(bits);
        if parities.iter().all(|&p| !p) {
            return ReadoutDecode {
                corrected: bits.clone(),
                flipped: None,
                logical: self.code.logical_value(bits),
            };
        }

        let candidates: Vec<QubitId> = (0..self.code.n())
            .filter(|&q| {
                self.code
                    .z_generators()
                    .iter()
                    .zip(&parities)
                    .all(|(support, &p)| support.contains(&q) == p)
            })
            .collect();

        match candidates.as_slice() {
            [q] => {
                let mut corrected = bits.clone();
                corrected.flip(*q);
                let logical = self.code.logical_value(&corrected);
                ReadoutDecode {
                    corrected,
                    flipped: Some(*q),
                    logical,
                }
            }
            _ => ReadoutDecode {
                corrected: bits.clone(),
                flipped: None,
                logical: None,
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(v: [u8; 6]) -> Syndrome {
        Syndrome::new(v.iter().map(|&b| b == 1).collect())
    }

    #[test]
    fn test_concrete_vectors() {
        let decoder = SyndromeDecoder::steane().unwrap();
        assert_eq!(
            decoder.syndrome_of(PauliKind::X, 2).unwrap(),
            bits([0, 0, 0, 1, 0, 1])
        );
        assert_eq!(
            decoder.syndrome_of(PauliKind::Z, 3).unwrap(),
            bits([1, 0, 0, 0, 0, 0])
        );
        assert_eq!(
            decoder.syndrome_of(PauliKind::Y, 2).unwrap(),
            bits([1, 0, 1, 1, 0, 1])
        );
        assert_eq!(decoder.decode(&bits([0; 6])), DecodeOutcome::NoError);
        assert_eq!(
            decoder.decode(&bits([1, 0, 1, 1, 0, 1])),
            DecodeOutcome::Correctable {
                kind: PauliKind::Y,
                qubit: 2
            }
        );
    }

    #[test]
    fn test_every_single_error_decodes_to_itself() {
        let decoder = SyndromeDecoder::steane().unwrap();
        for kind in PauliKind::ALL {
            for q in 0..7 {
                let s = decoder.syndrome_of(kind, q).unwrap();
                assert_eq!(
                    decoder.decode(&s),
                    DecodeOutcome::Correctable { kind, qubit: q }
                );
            }
        }
    }

    #[test]
    fn test_decode_total_minimal() {
        let decoder = SyndromeDecoder::new(StabilizerCode::steane(), Coverage::Minimal).unwrap();
        let decodable = (0u64..64)
            .map(|m| decoder.decode(&Syndrome::from_mask(m, 6)))
            .filter(DecodeOutcome::is_decodable)
            .count();
        assert_eq!(decodable, 1 + 14);
        assert_eq!(decoder.decodable_count(), 15);
    }

    #[test]
    fn test_decode_total_full() {
        let decoder = SyndromeDecoder::steane().unwrap();
        let decodable = (0u64..64)
            .map(|m| decoder.decode(&Syndrome::from_mask(m, 6)))
            .filter(DecodeOutcome::is_decodable)
            .count();
        assert_eq!(decodable, 1 + 21);
    }

    #[test]
    fn test_decode_deterministic_and_length_checked() {
        let decoder = SyndromeDecoder::steane().unwrap();
        let s = bits([0, 1, 1, 0, 0, 0]);
        assert_eq!(decoder.decode(&s), decoder.decode(&s));
        assert_eq!(
            decoder.decode(&Syndrome::trivial(5)),
            DecodeOutcome::Uncorrectable
        );
    }

    #[test]
    fn test_correction_is_inverse_pauli() {
        let decoder = SyndromeDecoder::steane().unwrap();
        assert_eq!(decoder.correction_for(PauliKind::Z, 4), Operation::Z(4));
        assert_eq!(decoder.correction(DecodeOutcome::Uncorrectable), None);
        assert!(decoder.syndrome_of(PauliKind::X, 7).is_err());
    }

    #[test]
    fn test_collision_detected() {
        // [[3,1]] code whose checks cannot tell qubit 0 from qubit 1
        let code = StabilizerCode::new(3, vec![vec![0, 1]], vec![vec![0, 1]], vec![2], vec![2])
            .unwrap();
        let err = SyndromeTable::build(&code, Coverage::Minimal).unwrap_err();
        assert!(matches!(err, SteaneError::SyndromeCollision { .. }));
    }

    #[test]
    fn test_decode_readout_single_flip() {
        let decoder = SyndromeDecoder::steane().unwrap();
        let mut readout = decoder.code().valid_codewords(LogicalState::One)[3].clone();
        readout.flip(5);
        let result = decoder.decode_readout(&readout);
        assert_eq!(result.flipped, Some(5));
        assert_eq!(result.logical, Some(LogicalState::One));
    }

    #[test]
    fn test_decode_readout_clean() {
        let decoder = SyndromeDecoder::steane().unwrap();
        let result = decoder.decode_readout(&Bitstring::zeros(7));
        assert_eq!(result.flipped, None);
        assert_eq!(result.logical, Some(LogicalState::Zero));
    }
}
