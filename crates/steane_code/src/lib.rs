//! # Steane Code
//!
//! Stabilizer code model, syndrome decoding and the encoding and
//! syndrome-extraction circuit builders.
//!
//! ## Gantree Architecture
//!
//! ```text
//! steane_code // L3: Code Layer (완료)
//!     Gf2 // GF(2) 선형대수 (완료)
//!     StabilizerCode // 안정자 코드 (완료)
//!         steane(), generators(), is_codeword(), valid_codewords()
//!         logical_operator(), distance(), z_check_parities()
//!     Syndrome // 신드롬 + ErrorEvent (완료)
//!     SyndromeDecoder // 룩업 디코더 (완료)
//!         SyndromeTable::build(), decode(), correction_for()
//!         decode_readout()
//!     EncodingProtocol // 인코딩 (완료)
//!         Sequential, DepthOptimized
//!     SyndromeExtractionProtocol // 신드롬 추출 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use steane_code::prelude::*;
//! use steane_core::PauliKind;
//!
//! let decoder = SyndromeDecoder::steane().unwrap();
//! let syndrome = decoder.syndrome_of(PauliKind::Z, 3).unwrap();
//! assert_eq!(syndrome.to_string(), "(1,0,0,0,0,0)");
//! assert_eq!(
//!     decoder.decode(&syndrome),
//!     DecodeOutcome::Correctable { kind: PauliKind::Z, qubit: 3 }
//! );
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// GF(2) helpers (Gantree: L3_Code → Gf2)
pub mod gf2;

/// Stabilizer code (Gantree: L3_Code → StabilizerCode)
pub mod stabilizer;

/// Syndromes and error events (Gantree: L3_Code → Syndrome)
pub mod syndrome;

/// Lookup decoder (Gantree: L3_Code → SyndromeDecoder)
pub mod decoder;

/// Encoding circuits (Gantree: L3_Code → EncodingProtocol)
pub mod encoding;

/// Extraction circuits (Gantree: L3_Code → SyndromeExtractionProtocol)
pub mod extraction;

// ============================================================================
// Re-exports
// ============================================================================

pub use decoder::{Coverage, DecodeOutcome, ReadoutDecode, SyndromeDecoder, SyndromeTable};
pub use encoding::{EncodingProtocol, EncodingStrategy};
pub use extraction::SyndromeExtractionProtocol;
pub use stabilizer::{Generator, StabilizerCode, StabilizerType};
pub use syndrome::{ErrorEvent, Syndrome};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports

    pub use crate::decoder::{Coverage, DecodeOutcome, ReadoutDecode, SyndromeDecoder, SyndromeTable};
    pub use crate::encoding::{EncodingProtocol, EncodingStrategy};
    pub use crate::extraction::SyndromeExtractionProtocol;
    pub use crate::stabilizer::{Generator, StabilizerCode, StabilizerType};
    pub use crate::syndrome::{ErrorEvent, Syndrome};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use steane_core::prelude::*;
    use steane_noise::NoiseModel;

    /// Classical image of the encoder: set pivot bits, propagate CNOTs
    fn propagate(ops: &[Operation], n: usize, pivot_bits: &[(usize, bool)]) -> Bitstring {
        let mut bits = vec![false; n];
        for &(q, b) in pivot_bits {
            bits[q] = b;
        }
        for op in ops {
            match *op {
                Operation::Cnot(c, t) => bits[t] ^= bits[c],
                Operation::X(q) => bits[q] = !bits[q],
                _ => {}
            }
        }
        Bitstring::new(bits)
    }

    #[test]
    fn test_encoder_branches_are_codewords() {
        let code = StabilizerCode::steane();
        for strategy in [EncodingStrategy::Sequential, EncodingStrategy::DepthOptimized] {
            let enc = EncodingProtocol::new(code.clone(), strategy);
            for state in [LogicalState::Zero, LogicalState::One] {
                let ops = enc.operations(state);
                let mut seen = std::collections::BTreeSet::new();
                for combo in 0u8..8 {
                    let pivots: Vec<(usize, bool)> = enc
                        .pivots()
                        .iter()
                        .enumerate()
                        .map(|(i, &q)| (q, (combo >> i) & 1 == 1))
                        .collect();
                    let word = propagate(&ops, 7, &pivots);
                    assert!(code.is_codeword_of(&word, state), "{} {}", word, state);
                    seen.insert(word);
                }
                // Every branch of the superposition is a distinct codeword
                assert_eq!(seen.len(), 8);
            }
        }
    }

    #[test]
    fn test_decoder_consistent_with_extraction_order() {
        let code = StabilizerCode::steane();
        let decoder = SyndromeDecoder::new(code.clone(), Coverage::Full).unwrap();
        let protocol = SyndromeExtractionProtocol::new(&code);
        let (_, columns) = protocol.circuit(7, &NoiseModel::ideal()).unwrap();
        assert_eq!(columns.len(), decoder.table().num_bits());
    }

    #[test]
    fn test_full_memory_circuit_builds() {
        let code = StabilizerCode::steane();
        let noise = NoiseModel::realistic(0.001);
        let enc = EncodingProtocol::new(code.clone(), EncodingStrategy::DepthOptimized);
        let ext = SyndromeExtractionProtocol::new(&code);

        let mut circuit = Circuit::new(7 + 2 * ext.num_ancillas());
        enc.append(&mut circuit, LogicalState::Zero, &noise).unwrap();
        ext.append_round(&mut circuit, 7, &noise).unwrap();
        ext.append_round(&mut circuit, 13, &noise).unwrap();
        for q in 0..7 {
            circuit.measure(q).unwrap();
        }

        assert_eq!(circuit.num_measurements(), 19);
        assert!(circuit.is_clifford());
        assert!(!circuit.requires_feedforward());
    }
}
