//! GF(2) linear algebra over bit masks
//!
//! Gantree: L3_Code → Gf2
//!
//! Rows are `u64` masks with bit `i` standing for qubit `i`.

/// Mask with the given qubits set
pub fn mask_of(support: &[usize]) -> u64 {
    support.iter().fold(0u64, |acc, &q| acc | (1u64 << q))
}

/// Qubit indices set in a mask, ascending
pub fn support_of(mask: u64) -> Vec<usize> {
    (0..64).filter(|&i| (mask >> i) & 1 == 1).collect()
}

/// Parity of the overlap of two supports
#[inline]
pub fn overlap_parity(a: u64, b: u64) -> bool {
    (a & b).count_ones() % 2 == 1
}

/// Reduced row echelon form
///
/// Returns `(pivot, row)` pairs with ascending pivots. Every pivot column is
/// set in exactly one returned row. Zero rows are dropped.
pub fn rref(rows: &[u64]) -> Vec<(usize, u64)> {
    let mut work: Vec<u64> = rows.iter().copied().filter(|&r| r != 0).collect();
    let mut reduced: Vec<(usize, u64)> = Vec::new();

    for col in 0..64 {
        let bit = 1u64 << col;
        let Some(pos) = work.iter().position(|&r| r & bit != 0) else {
            continue;
        };
        let pivot_row = work.swap_remove(pos);

        for r in work.iter_mut() {
            if *r & bit != 0 {
                *r ^= pivot_row;
            }
        }
        for (_, r) in reduced.iter_mut() {
            if *r & bit != 0 {
                *r ^= pivot_row;
            }
        }
        reduced.push((col, pivot_row));
        work.retain(|&r| r != 0);

        if work.is_empty() {
            break;
        }
    }

    reduced
}

/// Rank over GF(2)
pub fn rank(rows: &[u64]) -> usize {
    rref(rows).len()
}

/// True if `v` lies in the row span of `rows`
pub fn in_span(rows: &[u64], v: u64) -> bool {
    let mut extended = rows.to_vec();
    extended.push(v);
    rank(&extended) == rank(rows)
}

/// Residue of `v` after clearing every pivot of an RREF basis
///
/// Zero exactly when `v` lies in the span of `basis`.
pub fn reduce(basis: &[(usize, u64)], v: u64) -> u64 {
    basis.iter().fold(v, |acc, &(pivot, row)| {
        if (acc >> pivot) & 1 == 1 {
            acc ^ row
        } else {
            acc
        }
    })
}

/// Every element of the row span (2^rank masks, sorted)
pub fn span(rows: &[u64]) -> Vec<u64> {
    let basis: Vec<u64> = rref(rows).into_iter().map(|(_, r)| r).collect();
    let mut out: Vec<u64> = (0u64..(1u64 << basis.len()))
        .map(|combo| {
            basis
                .iter()
                .enumerate()
                .filter(|(i, _)| (combo >> i) & 1 == 1)
                .fold(0u64, |acc, (_, &r)| acc ^ r)
        })
        .collect();
    out.sort_unstable();
    out
}
