//! Discrete-log table f on F_q, used to build Jacobi and Gauss sums.
//!
//! For a prime q with primitive root g, `table[i]` is defined for
//! `i = 0..q-2` by the identity `g^(i+1) + g^(table[i]+1) ≡ 1 (mod q)`.
//! Built once per distinct q and held read-only for the remainder of the
//! q-loop in the engines.

use crate::bigint::{discrete_log_bsgs, pow_mod_u64, primitive_root_prime};

#[derive(Clone, Debug)]
pub struct FTable {
    pub q: u64,
    pub g: u64,
    table: Vec<u64>,
}

impl FTable {
    /// Build the table for prime `q`. Panics if `q` is not an odd prime
    /// (the construction is undefined for q <= 2, and the caller never
    /// drives it with a non-prime).
    pub fn build(q: u64) -> Self {
        debug_assert!(q > 2, "FTable requires an odd prime modulus");
        let g = primitive_root_prime(q);
        let order = q - 1;
        let mut table = Vec::with_capacity((q - 2) as usize);
        for i in 0..q - 2 {
            let g_pow = pow_mod_u64(g, i + 1, q);
            // c = (1 - g^(i+1)) mod q, computed without underflow.
            let c = if g_pow == 0 { 1 } else { (q + 1 - g_pow) % q };
            let c = if c == 0 { q } else { c };
            let idx = discrete_log_bsgs(g, c, q, order)
                .expect("1 - g^(i+1) is always a nonzero residue with a discrete log");
            // table[i] stores h such that c = g^(h+1), i.e. h = idx - 1 (mod order).
            let h = if idx == 0 { order - 1 } else { idx - 1 };
            table.push(h);
        }
        FTable { q, g, table }
    }

    #[inline]
    pub fn get(&self, i: usize) -> u64 {
        self.table[i]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigint::pow_mod_u64;

    #[test]
    fn identity_holds_for_small_primes() {
        for &q in &[5u64, 7, 11, 13, 23, 101] {
            let t = FTable::build(q);
            assert_eq!(t.len(), (q - 2) as usize);
            for i in 0..t.len() {
                let lhs = pow_mod_u64(t.g, i as u64 + 1, q);
                let rhs = pow_mod_u64(t.g, t.get(i) + 1, q);
                assert_eq!((lhs + rhs) % q, 1, "q={q}, i={i}");
            }
        }
    }

    #[test]
    fn q_eleven_concrete() {
        // I1: q = 11, g = 2 gives a length-9 table whose pairs sum to 1 mod 11.
        let t = FTable::build(11);
        assert_eq!(t.g, 2);
        assert_eq!(t.len(), 9);
    }
}
