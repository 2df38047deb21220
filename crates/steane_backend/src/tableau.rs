//! Aaronson-Gottesman stabilizer tableau
//!
//! Gantree: L4_Backend → Tableau
//!
//! Rows `0..n` are destabilizers, rows `n..2n` stabilizers. X and Z parts
//! are bit-packed into `u64` words; the sign of each row is a separate bit.

use rand::Rng;
use steane_core::types::{PauliKind, QubitId};

/// CHP tableau over `n` qubits, initialised to |0…0⟩
/// Gantree: Tableau // 스태빌라이저 테이블
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tableau {
    n: usize,
    words: usize,
    x: Vec<u64>,
    z: Vec<u64>,
    sign: Vec<bool>,
}

/// Phase exponent (power of i) picked up when multiplying Pauli (x1,z1)
/// into Pauli (x2,z2)
#[inline]
fn phase_exponent(x1: bool, z1: bool, x2: bool, z2: bool) -> i32 {
    match (x1, z1) {
        (false, false) => 0,
        (true, true) => z2 as i32 - x2 as i32,
        (true, false) => z2 as i32 * (2 * x2 as i32 - 1),
        (false, true) => x2 as i32 * (1 - 2 * z2 as i32),
    }
}

impl Tableau {
    /// Create the tableau of |0…0⟩
    pub fn new(n: usize) -> Self {
        let words = n.div_ceil(64).max(1);
        let mut t = Self {
            n,
            words,
            x: vec![0; 2 * n * words],
            z: vec![0; 2 * n * words],
            sign: vec![false; 2 * n],
        };
        for q in 0..n {
            t.set_x(q, q, true);
            t.set_z(n + q, q, true);
        }
        t
    }

    /// Qubit count
    pub fn num_qubits(&self) -> usize {
        self.n
    }

    // ========================================================================
    // Bit Access
    // ========================================================================

    #[inline]
    fn index(&self, row: usize, q: QubitId) -> (usize, u64) {
        (row * self.words + q / 64, 1u64 << (q % 64))
    }

    #[inline]
    fn get_x(&self, row: usize, q: QubitId) -> bool {
        let (i, m) = self.index(row, q);
        self.x[i] & m != 0
    }

    #[inline]
    fn get_z(&self, row: usize, q: QubitId) -> bool {
        let (i, m) = self.index(row, q);
        self.z[i] & m != 0
    }

    #[inline]
    fn set_x(&mut self, row: usize, q: QubitId, v: bool) {
        let (i, m) = self.index(row, q);
        if v {
            self.x[i] |= m;
        } else {
            self.x[i] &= !m;
        }
    }

    #[inline]
    fn set_z(&mut self, row: usize, q: QubitId, v: bool) {
        let (i, m) = self.index(row, q);
        if v {
            self.z[i] |= m;
        } else {
            self.z[i] &= !m;
        }
    }

    fn row_words(&self, row: usize) -> std::ops::Range<usize> {
        row * self.words..(row + 1) * self.words
    }

    /// Phase of (source · target) given both signs, as a new sign bit
    fn product_sign(
        &self,
        src_x: &[u64],
        src_z: &[u64],
        src_sign: bool,
        dst_x: &[u64],
        dst_z: &[u64],
        dst_sign: bool,
    ) -> bool {
        let mut total = 2 * src_sign as i32 + 2 * dst_sign as i32;
        for q in 0..self.n {
            let (w, b) = (q / 64, q % 64);
            total += phase_exponent(
                (src_x[w] >> b) & 1 == 1,
                (src_z[w] >> b) & 1 == 1,
                (dst_x[w] >> b) & 1 == 1,
                (dst_z[w] >> b) & 1 == 1,
            );
        }
        total.rem_euclid(4) == 2
    }

    /// Left-multiply row `target` by row `source`
    fn rowsum(&mut self, target: usize, source: usize) {
        let (s, t) = (self.row_words(source), self.row_words(target));
        let sign = self.product_sign(
            &self.x[s.clone()],
            &self.z[s.clone()],
            self.sign[source],
            &self.x[t.clone()],
            &self.z[t.clone()],
            self.sign[target],
        );
        for k in 0..self.words {
            self.x[t.start + k] ^= self.x[s.start + k];
            self.z[t.start + k] ^= self.z[s.start + k];
        }
        self.sign[target] = sign;
    }

    // ========================================================================
    // Clifford Gates
    // ========================================================================

    /// Hadamard
    pub fn h(&mut self, q: QubitId) {
        for row in 0..2 * self.n {
            let (xb, zb) = (self.get_x(row, q), self.get_z(row, q));
            self.sign[row] ^= xb && zb;
            self.set_x(row, q, zb);
            self.set_z(row, q, xb);
        }
    }

    /// Phase gate S
    pub fn s(&mut self, q: QubitId) {
        for row in 0..2 * self.n {
            let (xb, zb) = (self.get_x(row, q), self.get_z(row, q));
            self.sign[row] ^= xb && zb;
            self.set_z(row, q, zb ^ xb);
        }
    }

    /// Inverse phase gate
    pub fn sdg(&mut self, q: QubitId) {
        for row in 0..2 * self.n {
            let (xb, zb) = (self.get_x(row, q), self.get_z(row, q));
            self.sign[row] ^= xb && !zb;
            self.set_z(row, q, zb ^ xb);
        }
    }

    /// CNOT
    pub fn cnot(&mut self, c: QubitId, t: QubitId) {
        for row in 0..2 * self.n {
            let (xc, zc) = (self.get_x(row, c), self.get_z(row, c));
            let (xt, zt) = (self.get_x(row, t), self.get_z(row, t));
            self.sign[row] ^= xc && zt && (xt == zc);
            self.set_x(row, t, xt ^ xc);
            self.set_z(row, c, zc ^ zt);
        }
    }

    /// Controlled-Z
    pub fn cz(&mut self, a: QubitId, b: QubitId) {
        self.h(b);
        self.cnot(a, b);
        self.h(b);
    }

    /// Pauli gate: flips the sign of every row it anticommutes with
    pub fn pauli(&mut self, kind: PauliKind, q: QubitId) {
        for row in 0..2 * self.n {
            let anticommutes = match kind {
                PauliKind::X => self.get_z(row, q),
                PauliKind::Z => self.get_x(row, q),
                PauliKind::Y => self.get_x(row, q) ^ self.get_z(row, q),
            };
            self.sign[row] ^= anticommutes;
        }
    }

    // ========================================================================
    // Measurement
    // ========================================================================

    /// True if a Z-basis measurement of `q` is deterministic
    pub fn is_deterministic(&self, q: QubitId) -> bool {
        (self.n..2 * self.n).all(|row| !self.get_x(row, q))
    }

    /// Z-basis measurement with collapse
    pub fn measure<R: Rng + ?Sized>(&mut self, q: QubitId, rng: &mut R) -> bool {
        let n = self.n;
        match (n..2 * n).find(|&row| self.get_x(row, q)) {
            Some(p) => {
                for row in 0..2 * n {
                    if row != p && self.get_x(row, q) {
                        self.rowsum(row, p);
                    }
                }
                // Destabilizer p-n takes the old stabilizer; stabilizer p becomes ±Z_q
                let (src, dst) = (self.row_words(p), self.row_words(p - n));
                self.x.copy_within(src.clone(), dst.start);
                self.z.copy_within(src.clone(), dst.start);
                self.sign[p - n] = self.sign[p];

                self.x[src.clone()].fill(0);
                self.z[src].fill(0);
                self.set_z(p, q, true);
                let outcome: bool = rng.gen();
                self.sign[p] = outcome;
                outcome
            }
            None => {
                let mut acc_x = vec![0u64; self.words];
                let mut acc_z = vec![0u64; self.words];
                let mut acc_sign = false;
                for i in 0..n {
                    if !self.get_x(i, q) {
                        continue;
                    }
                    let s = self.row_words(n + i);
                    acc_sign = self.product_sign(
                        &self.x[s.clone()],
                        &self.z[s.clone()],
                        self.sign[n + i],
                        &acc_x,
                        &acc_z,
                        acc_sign,
                    );
                    for k in 0..self.words {
                        acc_x[k] ^= self.x[s.start + k];
                        acc_z[k] ^= self.z[s.start + k];
                    }
                }
                acc_sign
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_initial_zero() {
        let mut t = Tableau::new(3);
        let mut r = rng();
        assert!(t.is_deterministic(1));
        assert!(!t.measure(1, &mut r));
    }

    #[test]
    fn test_x_flips() {
        let mut t = Tableau::new(2);
        let mut r = rng();
        t.pauli(PauliKind::X, 0);
        assert!(t.measure(0, &mut r));
        assert!(!t.measure(1, &mut r));
    }

    #[test]
    fn test_y_flips_z_does_not() {
        let mut t = Tableau::new(2);
        let mut r = rng();
        t.pauli(PauliKind::Y, 0);
        t.pauli(PauliKind::Z, 1);
        assert!(t.measure(0, &mut r));
        assert!(!t.measure(1, &mut r));
    }

    #[test]
    fn test_hadamard_random_then_repeatable() {
        let mut t = Tableau::new(1);
        let mut r = rng();
        t.h(0);
        assert!(!t.is_deterministic(0));
        let first = t.measure(0, &mut r);
        assert!(t.is_deterministic(0));
        for _ in 0..5 {
            assert_eq!(t.measure(0, &mut r), first);
        }
    }

    #[test]
    fn test_hzh_is_x() {
        let mut t = Tableau::new(1);
        let mut r = rng();
        t.h(0);
        t.pauli(PauliKind::Z, 0);
        t.h(0);
        assert!(t.measure(0, &mut r));
    }

    #[test]
    fn test_bell_correlations() {
        let mut r = rng();
        let mut ones = 0;
        for _ in 0..200 {
            let mut t = Tableau::new(2);
            t.h(0);
            t.cnot(0, 1);
            let a = t.measure(0, &mut r);
            let b = t.measure(1, &mut r);
            assert_eq!(a, b);
            ones += a as usize;
        }
        assert!(ones > 60 && ones < 140, "ones = {}", ones);
    }

    #[test]
    fn test_s_squared_is_z() {
        let mut t = Tableau::new(1);
        let mut r = rng();
        t.h(0);
        t.s(0);
        t.s(0);
        t.h(0);
        assert!(t.measure(0, &mut r));
    }

    #[test]
    fn test_s_sdg_cancel() {
        let mut t = Tableau::new(1);
        let mut r = rng();
        t.h(0);
        t.s(0);
        t.sdg(0);
        t.h(0);
        assert!(!t.measure(0, &mut r));
    }

    #[test]
    fn test_x_parity_check_via_ancilla() {
        // |++⟩ has X0X1 = +1; measuring it through an ancilla reads 0
        let mut r = rng();
        for _ in 0..20 {
            let mut t = Tableau::new(3);
            t.h(0);
            t.h(1);
            t.h(2);
            t.cnot(2, 0);
            t.cnot(2, 1);
            t.h(2);
            assert!(!t.measure(2, &mut r));
        }
    }

    #[test]
    fn test_cz_phase_kickback() {
        // CZ on |+⟩|1⟩ flips the first qubit to |−⟩
        let mut t = Tableau::new(2);
        let mut r = rng();
        t.h(0);
        t.pauli(PauliKind::X, 1);
        t.cz(0, 1);
        t.h(0);
        assert!(t.measure(0, &mut r));
    }

    #[test]
    fn test_wide_register() {
        let mut t = Tableau::new(70);
        let mut r = rng();
        t.pauli(PauliKind::X, 66);
        t.cnot(66, 3);
        assert!(t.measure(3, &mut r));
        assert!(t.measure(66, &mut r));
        assert!(!t.measure(69, &mut r));
    }
}
