//! Elements of `Z[ζ_q, ζ_p]/n`, represented as a length-p vector of
//! polynomials in `Y` (standing for ζ_q) reduced mod `Y^q - 1`. Slot `i`
//! holds the coefficient of `ζ_p^i`.
//!
//! This is where Gauss sums live: `gauss_sum_character_pow` builds
//! `τ_pow(χ) = Σ_{i=1}^{q-1} ζ_q^{g^i mod q} ζ_p^{(i·pow) mod p}` directly
//! from a primitive root of q, with no separate character table.

use crate::bigint::primitive_root_prime;
use rug::Integer;
use std::sync::Arc;

fn reduce_mod(x: &mut Integer, n: &Integer) {
    *x %= n;
    if *x < 0 {
        *x += n;
    }
}

#[derive(Clone, Debug)]
pub struct UnityZpq {
    pub p: u64,
    pub q: u64,
    pub n: Arc<Integer>,
    polys: Vec<Vec<Integer>>,
}

impl UnityZpq {
    pub fn zero(p: u64, q: u64, n: Arc<Integer>) -> Self {
        let polys = vec![vec![Integer::new(); q as usize]; p as usize];
        UnityZpq { p, q, n, polys }
    }

    pub fn one(p: u64, q: u64, n: Arc<Integer>) -> Self {
        let mut f = Self::zero(p, q, n);
        f.polys[0][0] = Integer::from(1);
        f
    }

    pub fn get(&self, i: usize, j: usize) -> &Integer {
        &self.polys[i][j]
    }

    pub fn coeff_add(&mut self, i: usize, j: usize, x: &Integer) {
        self.polys[i][j] += x;
        reduce_mod(&mut self.polys[i][j], &self.n);
    }

    pub fn coeff_add_ui(&mut self, i: usize, j: usize, x: u64) {
        self.coeff_add(i, j, &Integer::from(x));
    }

    pub fn add(&self, other: &Self) -> Self {
        debug_assert_eq!((self.p, self.q), (other.p, other.q));
        let mut out = self.clone();
        for i in 0..self.p as usize {
            for j in 0..self.q as usize {
                out.polys[i][j] = (&self.polys[i][j] + &other.polys[i][j]).into();
                reduce_mod(&mut out.polys[i][j], &self.n);
            }
        }
        out
    }

    fn poly_mul_mod_yq(&self, a: &[Integer], b: &[Integer]) -> Vec<Integer> {
        let q = self.q as usize;
        let mut raw = vec![Integer::new(); 2 * q - 1];
        for i in 0..q {
            if a[i] == 0 {
                continue;
            }
            for j in 0..q {
                if b[j] == 0 {
                    continue;
                }
                raw[i + j] += Integer::from(&a[i] * &b[j]);
            }
        }
        for k in (q..raw.len()).rev() {
            let c = std::mem::replace(&mut raw[k], Integer::new());
            raw[k - q] += c;
        }
        raw.truncate(q);
        for c in raw.iter_mut() {
            reduce_mod(c, &self.n);
        }
        raw
    }

    /// Multiply: for each (i, j), fold left.polys[i] * right.polys[j] (a
    /// Y-polynomial, mod Y^q-1) into the slot (i+j) mod p of the result —
    /// rotation in the p-direction, convolution in the q-direction.
    pub fn mul(&self, other: &Self) -> Self {
        let mut out = Self::zero(self.p, self.q, self.n.clone());
        let p = self.p as usize;
        for i in 0..p {
            if self.polys[i].iter().all(|c| *c == 0) {
                continue;
            }
            for j in 0..p {
                if other.polys[j].iter().all(|c| *c == 0) {
                    continue;
                }
                let slot = (i + j) % p;
                let prod = self.poly_mul_mod_yq(&self.polys[i], &other.polys[j]);
                for y in 0..self.q as usize {
                    out.polys[slot][y] += &prod[y];
                    reduce_mod(&mut out.polys[slot][y], &self.n);
                }
            }
        }
        out
    }

    /// Multiply by ζ_p^k: cyclically rotate the p-indexed slots by k.
    /// Since ζ_p^p = 1, slot i (holding the coefficient of ζ_p^i) moves
    /// to slot (i + k) mod p.
    pub fn mul_unity_p_pow(&self, k: u64) -> Self {
        let p = self.p as usize;
        let k = (k as usize) % p;
        let mut out = Self::zero(self.p, self.q, self.n.clone());
        for i in 0..p {
            out.polys[(i + k) % p] = self.polys[i].clone();
        }
        out
    }

    pub fn pow(&self, e: &Integer) -> Self {
        if *e == 0 {
            return Self::one(self.p, self.q, self.n.clone());
        }
        let bits = e.significant_bits();
        let mut result = Self::one(self.p, self.q, self.n.clone());
        for b in (0..bits).rev() {
            result = result.mul(&result.clone());
            if e.get_bit(b) {
                result = result.mul(self);
            }
        }
        result
    }

    pub fn pow_ui(&self, e: u64) -> Self {
        self.pow(&Integer::from(e))
    }

    pub fn equal(&self, other: &Self) -> bool {
        self.p == other.p && self.q == other.q && self.polys == other.polys
    }

    /// σ_pow: τ_pow(χ) = Σ_{i=1}^{q-1} ζ_q^{g^i mod q} ζ_p^{(i·pow) mod p}
    pub fn gauss_sum_character_pow(p: u64, q: u64, n: Arc<Integer>, pow: u64) -> Self {
        let g = primitive_root_prime(q);
        let mut f = Self::zero(p, q, n);
        let mut qpow = 1u64;
        let pow_mod_p = pow % p;
        for i in 1..q {
            qpow = ((qpow as u128 * g as u128) % q as u128) as u64;
            let ppow = ((i as u128 * pow_mod_p as u128) % p as u128) as usize;
            f.coeff_add_ui(ppow, qpow as usize, 1);
        }
        f
    }

    /// The Gauss sum τ(χ) itself — the character-pow construction at pow=1.
    pub fn gauss_sum(p: u64, q: u64, n: Arc<Integer>) -> Self {
        Self::gauss_sum_character_pow(p, q, n, 1)
    }

    /// τ_{n mod p}(χ), the specific power the L_p congruence check needs.
    pub fn gauss_sum_sigma_pow(p: u64, q: u64, n: Arc<Integer>, modulus: &Integer) -> Self {
        let pow = modulus
            .clone()
            .rem_euc(&Integer::from(p))
            .to_u64()
            .expect("n mod p fits in u64 since p fits in u64");
        Self::gauss_sum_character_pow(p, q, n, pow)
    }

    /// If self = ζ_p^i (a pure p-unity, no q-component), return i.
    pub fn is_p_unity(&self) -> Option<u64> {
        let mut hit = None;
        for i in 0..self.p as usize {
            let row = &self.polys[i];
            let is_one = row[0] == 1 && row[1..].iter().all(|c| *c == 0);
            let is_zero = row.iter().all(|c| *c == 0);
            if is_one {
                if hit.is_some() {
                    return None;
                }
                hit = Some(i as u64);
            } else if !is_zero {
                return None;
            }
        }
        hit
    }

    /// If self is a p-unity at a nonzero exponent (hence a generator of
    /// the order-p group it lives in, since p is prime), return that
    /// exponent.
    pub fn is_p_unity_generator(&self) -> Option<u64> {
        self.is_p_unity().filter(|&i| i != 0)
    }

    /// Find `i` such that rotating `self` by `i` (multiplying by ζ_p^i)
    /// equals `target`, or `None` if no rotation matches. This is the
    /// Gauss-sum L_p check's witness search: `target` is itself a general
    /// Gauss-sum element (not a pure monomial), so `is_p_unity` — which
    /// tests for a single bare ζ_p^i — does not apply directly here; this
    /// is the companion comparison for two arbitrary elements instead.
    pub fn p_rotation_matching(&self, target: &Self) -> Option<u64> {
        for i in 0..self.p {
            if self.mul_unity_p_pow(i).equal(target) {
                return Some(i);
            }
        }
        None
    }
}
