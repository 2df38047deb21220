//! CSS stabilizer code definition
//!
//! Gantree: L3_Code → StabilizerCode
//!
//! Immutable value object holding X- and Z-type generator supports and one
//! logical operator pair. Commutation, logical consistency and the logical
//! qubit count are all checked over GF(2) at construction.

use crate::gf2;
use serde::{Deserialize, Serialize};
use std::fmt;
use steane_core::constants::code::{
    CHECK_SUPPORTS, MAX_DISTANCE_SEARCH_QUBITS, MAX_MASK_QUBITS, N as STEANE_N,
};
use steane_core::error::{SteaneError, SteaneResult};
use steane_core::types::{Bitstring, LogicalState, PauliKind, QubitId};

// ============================================================================
// Generator
// ============================================================================

/// Pauli type of a CSS generator or logical operator
/// Gantree: StabilizerType // X/Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StabilizerType {
    /// Product of X on the support
    X,
    /// Product of Z on the support
    Z,
}

impl StabilizerType {
    /// True if a generator of this type anticommutes with a single-qubit
    /// Pauli of `kind` on one of its support qubits
    pub fn detects(&self, kind: PauliKind) -> bool {
        match self {
            StabilizerType::X => kind.flips_phase(),
            StabilizerType::Z => kind.flips_bit(),
        }
    }
}

impl fmt::Display for StabilizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StabilizerType::X => write!(f, "X"),
            StabilizerType::Z => write!(f, "Z"),
        }
    }
}

/// One stabilizer generator
/// Gantree: Generator // (type, support)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    /// Pauli type
    pub kind: StabilizerType,

    /// Physical qubits in the support, ascending
    pub support: Vec<QubitId>,
}

impl Generator {
    /// True if this generator flags a `kind` error on `qubit`
    pub fn detects(&self, kind: PauliKind, qubit: QubitId) -> bool {
        self.kind.detects(kind) && self.support.contains(&qubit)
    }

    /// Weight of the generator
    pub fn weight(&self) -> usize {
        self.support.len()
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .support
            .iter()
            .map(|q| format!("{}{}", self.kind, q))
            .collect();
        write!(f, "{}", terms.join(" "))
    }
}

// ============================================================================
// StabilizerCode
// ============================================================================

/// CSS stabilizer code with one logical qubit
/// Gantree: StabilizerCode // 안정자 코드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilizerCode {
    /// Physical qubit count
    n: usize,

    /// Logical qubit count (n - rank X - rank Z)
    k: usize,

    /// X-type generator supports, canonical order
    x_generators: Vec<Vec<QubitId>>,

    /// Z-type generator supports, canonical order
    z_generators: Vec<Vec<QubitId>>,

    /// Logical X support
    logical_x: Vec<QubitId>,

    /// Logical Z support
    logical_z: Vec<QubitId>,

    /// RREF basis of the X generators; |0_L⟩ lives on its span
    sector_basis: Vec<(usize, u64)>,
}

impl StabilizerCode {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a code, validating commutation and logical operators
    /// Gantree: new(n, xs, zs, lx, lz) -> Result<Self> // 생성+검증
    pub fn new(
        n: usize,
        x_generators: Vec<Vec<QubitId>>,
        z_generators: Vec<Vec<QubitId>>,
        logical_x: Vec<QubitId>,
        logical_z: Vec<QubitId>,
    ) -> SteaneResult<Self> {
        if n == 0 || n > MAX_MASK_QUBITS {
            return Err(SteaneError::InvalidCode(format!(
                "{} physical qubits (supported: 1..={})",
                n, MAX_MASK_QUBITS
            )));
        }

        let normalize = |support: Vec<QubitId>| -> SteaneResult<Vec<QubitId>> {
            let mut s = support;
            s.sort_unstable();
            s.dedup();
            if s.is_empty() {
                return Err(SteaneError::InvalidCode("empty support".into()));
            }
            if let Some(&q) = s.iter().find(|&&q| q >= n) {
                return Err(SteaneError::QubitOutOfRange { qubit: q, max: n });
            }
            Ok(s)
        };

        let x_generators = x_generators
            .into_iter()
            .map(normalize)
            .collect::<SteaneResult<Vec<_>>>()?;
        let z_generators = z_generators
            .into_iter()
            .map(normalize)
            .collect::<SteaneResult<Vec<_>>>()?;
        let logical_x = normalize(logical_x)?;
        let logical_z = normalize(logical_z)?;

        let x_masks: Vec<u64> = x_generators.iter().map(|s| gf2::mask_of(s)).collect();
        let z_masks: Vec<u64> = z_generators.iter().map(|s| gf2::mask_of(s)).collect();

        // X and Z generators commute iff their supports overlap evenly
        for (i, &xm) in x_masks.iter().enumerate() {
            for (j, &zm) in z_masks.iter().enumerate() {
                if gf2::overlap_parity(xm, zm) {
                    return Err(SteaneError::NonCommutingGenerators {
                        first: i,
                        second: x_masks.len() + j,
                    });
                }
            }
        }

        let lx = gf2::mask_of(&logical_x);
        let lz = gf2::mask_of(&logical_z);

        if z_masks.iter().any(|&zm| gf2::overlap_parity(lx, zm)) {
            return Err(SteaneError::InvalidLogicalOperator(
                "logical X anticommutes with a Z generator".into(),
            ));
        }
        if x_masks.iter().any(|&xm| gf2::overlap_parity(lz, xm)) {
            return Err(SteaneError::InvalidLogicalOperator(
                "logical Z anticommutes with an X generator".into(),
            ));
        }
        if !gf2::overlap_parity(lx, lz) {
            return Err(SteaneError::InvalidLogicalOperator(
                "logical X and logical Z must anticommute".into(),
            ));
        }

        let rank_x = gf2::rank(&x_masks);
        let rank_z = gf2::rank(&z_masks);
        if rank_x + rank_z >= n {
            return Err(SteaneError::InvalidCode(format!(
                "no logical qubits: n = {}, rank X = {}, rank Z = {}",
                n, rank_x, rank_z
            )));
        }
        let k = n - rank_x - rank_z;
        if k != 1 {
            return Err(SteaneError::InvalidCode(format!(
                "{} logical qubits; exactly one logical operator pair is supported",
                k
            )));
        }

        let sector_basis = gf2::rref(&x_masks);
        Ok(Self {
            n,
            k,
            x_generators,
            z_generators,
            logical_x,
            logical_z,
            sector_basis,
        })
    }

    /// The Steane [[7,1,3]] code
    /// Gantree: steane() -> Self // 스틴 코드
    pub fn steane() -> Self {
        let checks: Vec<Vec<QubitId>> = CHECK_SUPPORTS.iter().map(|s| s.to_vec()).collect();
        let all: Vec<QubitId> = (0..STEANE_N).collect();
        let masks: Vec<u64> = checks.iter().map(|s| gf2::mask_of(s)).collect();
        Self {
            n: STEANE_N,
            k: 1,
            x_generators: checks.clone(),
            z_generators: checks,
            logical_x: all.clone(),
            logical_z: all,
            sector_basis: gf2::rref(&masks),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Physical qubit count
    pub fn n(&self) -> usize {
        self.n
    }

    /// Logical qubit count
    pub fn k(&self) -> usize {
        self.k
    }

    /// X-type generator supports
    pub fn x_generators(&self) -> &[Vec<QubitId>] {
        &self.x_generators
    }

    /// Z-type generator supports
    pub fn z_generators(&self) -> &[Vec<QubitId>] {
        &self.z_generators
    }

    /// Total generator count (syndrome length)
    pub fn num_generators(&self) -> usize {
        self.x_generators.len() + self.z_generators.len()
    }

    /// Generators in canonical order: X-type first, then Z-type
    /// Gantree: generators(&self) -> Vec<Generator> // 정렬된 생성자
    pub fn generators(&self) -> Vec<Generator> {
        let xs = self.x_generators.iter().map(|s| Generator {
            kind: StabilizerType::X,
            support: s.clone(),
        });
        let zs = self.z_generators.iter().map(|s| Generator {
            kind: StabilizerType::Z,
            support: s.clone(),
        });
        xs.chain(zs).collect()
    }

    /// Logical operator support
    /// Gantree: logical_operator(kind) -> &[QubitId] // 논리 연산자
    pub fn logical_operator(&self, kind: StabilizerType) -> &[QubitId] {
        match kind {
            StabilizerType::X => &self.logical_x,
            StabilizerType::Z => &self.logical_z,
        }
    }

    // ========================================================================
    // Codewords
    // ========================================================================

    fn x_masks(&self) -> Vec<u64> {
        self.x_generators.iter().map(|s| gf2::mask_of(s)).collect()
    }

    fn z_masks(&self) -> Vec<u64> {
        self.z_generators.iter().map(|s| gf2::mask_of(s)).collect()
    }

    /// Computational-basis strings of one logical sector, sorted
    ///
    /// |0_L⟩ is supported on the span of the X generators; |1_L⟩ on that
    /// span shifted by the logical X support.
    /// Gantree: valid_codewords(state) -> Vec<Bitstring> // 코드워드
    pub fn valid_codewords(&self, state: LogicalState) -> Vec<Bitstring> {
        let shift = match state {
            LogicalState::Zero => 0,
            LogicalState::One => gf2::mask_of(&self.logical_x),
        };
        let rows: Vec<u64> = self.sector_basis.iter().map(|&(_, r)| r).collect();
        let mut masks: Vec<u64> = gf2::span(&rows)
            .into_iter()
            .map(|m| m ^ shift)
            .collect();
        masks.sort_unstable();
        masks
            .into_iter()
            .map(|m| Bitstring::from_mask(m, self.n))
            .collect()
    }

    /// Logical sector of a readout, or `None` if it is not a codeword
    pub fn logical_value(&self, bits: &Bitstring) -> Option<LogicalState> {
        if bits.len() != self.n {
            return None;
        }
        let residue = gf2::reduce(&self.sector_basis, bits.to_mask());
        if residue == 0 {
            Some(LogicalState::Zero)
        } else if residue == gf2::reduce(&self.sector_basis, gf2::mask_of(&self.logical_x)) {
            Some(LogicalState::One)
        } else {
            None
        }
    }

    /// True if the readout lies in either logical sector
    /// Gantree: is_codeword(bits) -> bool // 코드워드 판정
    pub fn is_codeword(&self, bits: &Bitstring) -> bool {
        self.logical_value(bits).is_some()
    }

    /// True if the readout lies in the sector of `state`
    pub fn is_codeword_of(&self, bits: &Bitstring, state: LogicalState) -> bool {
        self.logical_value(bits) == Some(state)
    }

    /// Parities of the Z generators on a Z-basis readout
    pub fn z_check_parities(&self, bits: &Bitstring) -> Vec<bool> {
        self.z_generators
            .iter()
            .map(|s| bits.parity_over(s))
            .collect()
    }

    // ========================================================================
    // Distance
    // ========================================================================

    /// Minimum weight of a non-trivial logical operator (brute force)
    /// Gantree: distance(&self) -> Result<usize> // 코드 거리
    pub fn distance(&self) -> SteaneResult<usize> {
        if self.n > MAX_DISTANCE_SEARCH_QUBITS {
            return Err(SteaneError::InvalidCode(format!(
                "distance search limited to {} qubits",
                MAX_DISTANCE_SEARCH_QUBITS
            )));
        }
        let xs = self.x_masks();
        let zs = self.z_masks();

        // X-type logicals commute with all Z checks and are not X stabilizers;
        // Z-type logicals likewise with roles swapped.
        let mut best = self.n + 1;
        for v in 1u64..(1u64 << self.n) {
            let w = v.count_ones() as usize;
            if w >= best {
                continue;
            }
            let x_logical =
                zs.iter().all(|&z| !gf2::overlap_parity(v, z)) && !gf2::in_span(&xs, v);
            let z_logical =
                xs.iter().all(|&x| !gf2::overlap_parity(v, x)) && !gf2::in_span(&zs, v);
            if x_logical || z_logical {
                best = w;
            }
        }

        if best > self.n {
            return Err(SteaneError::InternalError(
                "no non-trivial logical operator found".into(),
            ));
        }
        Ok(best)
    }
}

impl Default for StabilizerCode {
    fn default() -> Self {
        Self::steane()
    }
}

impl fmt::Display for StabilizerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StabilizerCode [[{}, {}]]", self.n, self.k)?;
        for (i, g) in self.generators().iter().enumerate() {
            writeln!(f, "  S{}: {}", i, g)?;
        }
        writeln!(f, "  X_L: {:?}", self.logical_x)?;
        write!(f, "  Z_L: {:?}", self.logical_z)
    }
}

// ============================================================================
// Tests
// ============================================================================
