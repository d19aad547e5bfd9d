//! Jacobi sums `J(χ, χ) = Σ_{x ≠ 0,1 in F_q} ζ_{p^k}^{ind(x) + ind(1-x)}`,
//! built directly from the discrete-log table rather than a standalone
//! character type — the same approach [`crate::f_table`] uses.
//!
//! All three constructors (the plain `p`-type sum and the two `p = 2`
//! companions the `check_2k` congruence needs) go through one general
//! routine parameterized by the linear combination `(a, b)` applied to
//! the table entries, mirroring `_jacobi_pq_general` in the reference
//! library — a single weighted-sum-of-characters construction with the
//! coefficients swapped per caller.

use crate::f_table::FTable;
use crate::unity_zp::UnityZp;
use rug::Integer;
use std::sync::Arc;

/// `Σ_{x=g^i, i=1..q-2} ζ_{p^k}^{(a·i + b·ind(1-x)) mod p^k}`, folded back
/// into canonical (degree < φ(p^k)) form via the `Φ_{p^k}` relation as
/// each raw exponent is produced.
///
/// `table` is queried at `i - 1` (not `i`), since our [`FTable`] is built
/// over the same domain `i = 1..q-2` but stores entries 0-indexed for
/// `x = g^1 .. g^{q-2}` — this keeps every table access in bounds,
/// resolving an off-by-one that the reference C indexes `table[i]`
/// directly for `i` up to `q - 2` against a `q - 2`-element array.
fn jacobi_pq_general(p: u64, k: u32, q: u64, n: Arc<Integer>, a: u64, b: u64) -> UnityZp {
    let table = FTable::build(q);
    let pow_dec = p.pow(k - 1);
    let size = (p - 1) * pow_dec; // phi(p^k)
    let pow = pow_dec * p; // p^k

    let mut j = UnityZp::zero(p, k, n);
    for idx in 0..table.len() as u64 {
        let i = idx + 1; // exponent of x = g^i, i = 1..q-2
        let ind_1_minus_x = table.get(idx as usize) + 1;
        let mut l = ((a * i) % pow + (b * ind_1_minus_x) % pow) % pow;
        if l < size {
            j.coeff_add(l as usize, &Integer::from(1));
        } else {
            for _ in 0..p - 1 {
                l -= pow_dec;
                j.coeff_add(l as usize, &Integer::from(-1));
            }
        }
    }
    j.reduce();
    j
}

/// `J(χ, χ)` in `R_{p^k}`, for a prime `p` dividing `q - 1` with `p^k || q - 1`.
pub fn jacobi_sum_pq(p: u64, k: u32, q: u64, n: Arc<Integer>) -> UnityZp {
    jacobi_pq_general(p, k, q, n, 1, 1)
}

/// The first `p = 2` companion sum `check_2k` needs: `(a, b) = (2, 1)`.
pub fn jacobi_sum_2q_one(k: u32, q: u64, n: Arc<Integer>) -> UnityZp {
    jacobi_pq_general(2, k, q, n, 2, 1)
}

/// The second `p = 2` companion sum: `(a, b) = (3·2^{k-3}, 2^{k-3})`, only
/// meaningful for `k >= 3`.
pub fn jacobi_sum_2q_two(k: u32, q: u64, n: Arc<Integer>) -> UnityZp {
    let b = 2u64.pow(k - 3);
    let a = 3 * b;
    jacobi_pq_general(2, k, q, n, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobi_sum_pq_is_well_formed() {
        let n = Arc::new(Integer::from(104729u64));
        let j = jacobi_sum_pq(3, 1, 7, n);
        assert_eq!(j.p, 3);
        assert_eq!(j.k, 1);
    }

    #[test]
    fn jacobi_sum_pq_matches_direct_sum() {
        // I7: for q prime and p^k || q-1, jacobi_sum_pq(q,p) equals the
        // direct sum over the f-table of zeta_{p^k}^{i + table[i]}.
        let q = 19u64; // q-1 = 18 = 2 * 3^2, so p=3, k=2 divides evenly.
        let p = 3u64;
        let k = 2u32;
        let n = Arc::new(Integer::from(104729u64));
        let table = FTable::build(q);
        let pow = p.pow(k);
        let mut direct = UnityZp::zero(p, k, n.clone());
        for idx in 0..table.len() as u64 {
            let i = idx + 1;
            let ind = table.get(idx as usize) + 1;
            let e = (i + ind) % pow;
            direct.coeff_add(e as usize, &Integer::from(1));
        }
        direct.reduce();
        let j = jacobi_sum_pq(p, k, q, n);
        assert!(j.equal(&direct));
    }

    #[test]
    fn jacobi_sum_2q_variants_are_well_formed() {
        // q = 41: q-1 = 40 = 2^3 * 5, so k = 3 is valid for both companions.
        let n = Arc::new(Integer::from(104729u64));
        let j1 = jacobi_sum_2q_one(3, 41, n.clone());
        let j2 = jacobi_sum_2q_two(3, 41, n);
        assert_eq!(j1.p, 2);
        assert_eq!(j2.p, 2);
    }
}
