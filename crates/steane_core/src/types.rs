//! Core types for the Steane QEC engine
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Provides fundamental type aliases and validated wrapper types
//! used throughout the protocol layers.

use crate::error::{SteaneError, SteaneResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitXor;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Classical output column assigned to a measurement (program order)
/// Gantree: ColumnId // pub type ColumnId = usize
pub type ColumnId = usize;

// ============================================================================
// Probability (Validated Wrapper)
// ============================================================================

/// Probability value in range [0, 1]
/// Gantree: Probability // 범위 검증 구조체
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Probability(f64);

impl Probability {
    /// Create a new Probability with validation
    /// Gantree: new(f64) -> Result<Self> // 생성+검증
    pub fn new(value: f64) -> SteaneResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(SteaneError::InvalidProbability(value));
        }
        Ok(Self(value))
    }

    /// Get the probability value
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Get the complement (1 - p)
    #[inline]
    pub fn complement(&self) -> f64 {
        1.0 - self.0
    }

    /// True if the probability is exactly zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Zero probability
    pub const ZERO: Self = Self(0.0);

    /// Certainty (p = 1)
    pub const ONE: Self = Self(1.0);
}

impl Default for Probability {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = SteaneError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ============================================================================
// Bitstring
// ============================================================================

/// Classical bit vector (measurement record or readout)
///
/// Index 0 is printed first, so `"1000000"` has qubit 0 set.
/// Gantree: Bitstring // 비트열 타입
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bitstring {
    bits: Vec<bool>,
}

impl Bitstring {
    /// Create from a vector of bools
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Create from string (e.g., "0110")
    /// Gantree: parse(s) -> Self // 파싱
    pub fn parse(s: &str) -> SteaneResult<Self> {
        let bits: Result<Vec<bool>, _> = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(SteaneError::InvalidBitstring(s.to_string())),
            })
            .collect();
        Ok(Self { bits: bits? })
    }

    /// Create from a low-bit-first mask
    pub fn from_mask(mask: u64, len: usize) -> Self {
        Self {
            bits: (0..len).map(|i| (mask >> i) & 1 == 1).collect(),
        }
    }

    /// Create zero bitstring of given length
    pub fn zeros(n: usize) -> Self {
        Self {
            bits: vec![false; n],
        }
    }

    /// Get the number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Count number of 1s (Hamming weight)
    /// Gantree: popcount() -> usize // 1 카운트
    pub fn popcount(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Get parity (true if odd number of 1s)
    pub fn parity(&self) -> bool {
        self.popcount() % 2 == 1
    }

    /// Parity of the bits at the given indices
    pub fn parity_over(&self, indices: &[usize]) -> bool {
        indices
            .iter()
            .filter(|&&i| self.get(i).unwrap_or(false))
            .count()
            % 2
            == 1
    }

    /// True if every bit is zero
    pub fn is_all_zero(&self) -> bool {
        self.bits.iter().all(|&b| !b)
    }

    /// Get bit at index
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Flip bit at index (no-op when out of range)
    pub fn flip(&mut self, index: usize) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = !*bit;
        }
    }

    /// Select a sub-bitstring by index list
    ///
    /// Fails on the first index past the end of the record.
    pub fn select(&self, indices: &[usize]) -> SteaneResult<Self> {
        let bits = indices
            .iter()
            .map(|&i| {
                self.get(i).ok_or(SteaneError::MissingColumn {
                    column: i,
                    len: self.len(),
                })
            })
            .collect::<SteaneResult<Vec<bool>>>()?;
        Ok(Self { bits })
    }

    /// Borrow raw bits
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Convert to low-bit-first mask (first 64 bits)
    pub fn to_mask(&self) -> u64 {
        self.bits
            .iter()
            .take(64)
            .enumerate()
            .filter(|(_, &b)| b)
            .fold(0u64, |acc, (i, _)| acc | (1 << i))
    }

    /// Hamming distance to another bitstring of the same length
    pub fn hamming_distance(&self, other: &Self) -> usize {
        self.bits
            .iter()
            .zip(&other.bits)
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl BitXor for &Bitstring {
    type Output = Bitstring;

    fn bitxor(self, rhs: Self) -> Bitstring {
        Bitstring {
            bits: self
                .bits
                .iter()
                .zip(&rhs.bits)
                .map(|(a, b)| a ^ b)
                .collect(),
        }
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            write!(f, "{}", if b { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl From<Vec<bool>> for Bitstring {
    fn from(bits: Vec<bool>) -> Self {
        Self::new(bits)
    }
}

// ============================================================================
// PauliKind
// ============================================================================

/// Single-qubit Pauli error kind
/// Gantree: PauliKind // X/Y/Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PauliKind {
    /// Bit flip
    X,
    /// Bit and phase flip
    Y,
    /// Phase flip
    Z,
}

impl PauliKind {
    /// All kinds in canonical order
    pub const ALL: [PauliKind; 3] = [PauliKind::X, PauliKind::Y, PauliKind::Z];

    /// Parse from character
    pub fn from_char(c: char) -> SteaneResult<Self> {
        match c.to_ascii_uppercase() {
            'X' => Ok(PauliKind::X),
            'Y' => Ok(PauliKind::Y),
            'Z' => Ok(PauliKind::Z),
            _ => Err(SteaneError::InvalidPauli(c.to_string())),
        }
    }

    /// Convert to character
    pub fn to_char(&self) -> char {
        match self {
            PauliKind::X => 'X',
            PauliKind::Y => 'Y',
            PauliKind::Z => 'Z',
        }
    }

    /// Has a bit-flip component (anticommutes with Z checks)
    pub fn flips_bit(&self) -> bool {
        matches!(self, PauliKind::X | PauliKind::Y)
    }

    /// Has a phase-flip component (anticommutes with X checks)
    pub fn flips_phase(&self) -> bool {
        matches!(self, PauliKind::Y | PauliKind::Z)
    }

    /// Inverse Pauli (every Pauli is self-inverse up to phase)
    pub fn inverse(&self) -> Self {
        *self
    }
}

impl fmt::Display for PauliKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

// ============================================================================
// LogicalState
// ============================================================================

/// Logical computational basis state of one encoded qubit
/// Gantree: LogicalState // |0_L⟩, |1_L⟩
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogicalState {
    /// Logical |0⟩
    #[default]
    Zero,
    /// Logical |1⟩
    One,
}

impl LogicalState {
    /// Logical value from a parity bit
    pub fn from_parity(odd: bool) -> Self {
        if odd {
            LogicalState::One
        } else {
            LogicalState::Zero
        }
    }

    /// Parity bit of this state
    pub fn parity(&self) -> bool {
        matches!(self, LogicalState::One)
    }
}

impl fmt::Display for LogicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalState::Zero => write!(f, "|0_L>"),
            LogicalState::One => write!(f, "|1_L>"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
