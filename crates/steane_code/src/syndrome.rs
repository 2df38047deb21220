//! Syndromes and error events
//!
//! Gantree: L3_Code → Syndrome
//!
//! Bit `i` of a syndrome is the outcome of generator `i` in canonical order
//! (X generators first, then Z generators).

use serde::{Deserialize, Serialize};
use std::fmt;
use steane_core::error::SteaneResult;
use steane_core::types::{Bitstring, ColumnId, PauliKind, QubitId};

/// Ordered stabilizer measurement outcomes
/// Gantree: Syndrome // 신드롬
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Syndrome {
    bits: Vec<bool>,
}

impl Syndrome {
    /// Create from raw bits
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// All-zero syndrome of the given length
    pub fn trivial(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// Syndrome with bit `i` equal to bit `i` of `mask`
    pub fn from_mask(mask: u64, len: usize) -> Self {
        Self {
            bits: (0..len).map(|i| (mask >> i) & 1 == 1).collect(),
        }
    }

    /// Gather a syndrome from a shot record
    pub fn from_record(record: &Bitstring, columns: &[ColumnId]) -> SteaneResult<Self> {
        Ok(Self {
            bits: record.select(columns)?.as_slice().to_vec(),
        })
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// True if every generator reported +1
    /// Gantree: is_trivial() -> bool // 무오류
    pub fn is_trivial(&self) -> bool {
        self.bits.iter().all(|&b| !b)
    }

    /// Bit of generator `i`
    pub fn get(&self, i: usize) -> Option<bool> {
        self.bits.get(i).copied()
    }

    /// Raw bits
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of violated generators
    pub fn weight(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

impl fmt::Display for Syndrome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self
            .bits
            .iter()
            .map(|&b| if b { "1" } else { "0" })
            .collect();
        write!(f, "({})", parts.join(","))
    }
}

/// Injected or inferred single-qubit error
/// Gantree: ErrorEvent // (kind, qubit, round)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Pauli kind
    pub kind: PauliKind,
    /// Physical qubit
    pub qubit: QubitId,
    /// Round index (0-based)
    pub round: usize,
}

impl fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}@r{}", self.kind, self.qubit, self.round)
    }
}
