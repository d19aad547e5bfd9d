//! Arbitrary-precision integer operations and the small-prime number theory
//! helpers the cyclotomic engine builds on: baby-step giant-step discrete
//! log, primitive root search, Montgomery multiplication mod a u64 prime,
//! and trial-division factoring.
//!
//! Multi-precision arithmetic (add/sub/mul/mod/gcd/xgcd/invert/powm/bit
//! access) is `rug::Integer` directly — there is no reason to reimplement
//! GMP. Everything below is the number theory GMP doesn't hand you for
//! free, lifted from the same Montgomery/BSGS machinery used for sieve
//! discrete logs elsewhere in this codebase.
//!
//! ## References
//!
//! - Peter L. Montgomery, "Modular Multiplication Without Trial Division",
//!   Mathematics of Computation, 44(170):519–521, 1985.
//! - Daniel Shanks, "Class Number, a Theory of Factorization, and Genera",
//!   Proceedings of Symposia in Pure Mathematics, 20:415–440, 1971 (BSGS).

use rug::Integer;
use std::collections::HashMap;

/// Deterministic Miller-Rabin witness set, valid for all n < 3,317,044,064,679,887,385,961,981
/// (comfortably covers every u64). See Sorenson & Webster (2015).
const MR_WITNESSES: [u64; 13] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

/// Modular exponentiation: base^exp mod modulus, for u64-scale moduli.
pub fn pow_mod_u64(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result: u64 = 1;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result as u128 * base as u128 % modulus as u128) as u64;
        }
        exp >>= 1;
        base = (base as u128 * base as u128 % modulus as u128) as u64;
    }
    result
}

/// Deterministic primality test for u64 via Miller-Rabin with a fixed
/// witness set known to be exhaustive in this range.
pub fn n_is_prime(p: u64) -> bool {
    if p < 2 {
        return false;
    }
    for &small in &[2u64, 3, 5, 7, 11, 13] {
        if p == small {
            return true;
        }
        if p % small == 0 {
            return false;
        }
    }
    let mut d = p - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }
    'witness: for &a in &MR_WITNESSES {
        if a >= p {
            continue;
        }
        let mut x = pow_mod_u64(a, d, p);
        if x == 1 || x == p - 1 {
            continue;
        }
        for _ in 0..r - 1 {
            x = (x as u128 * x as u128 % p as u128) as u64;
            if x == p - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Smallest prime strictly greater than p.
pub fn n_nextprime(p: u64) -> u64 {
    let mut candidate = p + 1;
    if candidate <= 2 {
        return 2;
    }
    if candidate % 2 == 0 {
        candidate += 1;
    }
    while !n_is_prime(candidate) {
        candidate += 2;
    }
    candidate
}

/// The p-adic valuation of m: the largest k with p^k | m (0 if p does not divide m).
pub fn p_adic_valuation(mut m: u64, p: u64) -> u32 {
    let mut v = 0u32;
    while m % p == 0 {
        m /= p;
        v += 1;
    }
    v
}

/// Trial-division factorization of a u64 into (prime, exponent) pairs.
pub fn factor_u64(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    let mut d = 2u64;
    while d * d <= n {
        if n % d == 0 {
            let mut exp = 0u32;
            while n % d == 0 {
                n /= d;
                exp += 1;
            }
            factors.push((d, exp));
        }
        d += 1;
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

/// Montgomery multiplication context for a fixed odd modulus.
#[derive(Clone, Copy, Debug)]
pub struct MontgomeryCtx {
    pub n: u64,
    n_prime: u64,
    r_mod_n: u64,
    r2_mod_n: u64,
}

impl MontgomeryCtx {
    pub fn new(n: u64) -> Self {
        debug_assert!(n > 1 && n & 1 == 1, "Montgomery requires odd modulus > 1");

        let mut inv: u64 = 1;
        for _ in 0..6 {
            inv = inv.wrapping_mul(2u64.wrapping_sub(n.wrapping_mul(inv)));
        }
        let n_prime = inv.wrapping_neg();

        let r_mod_n = ((1u128 << 64) % n as u128) as u64;
        let r2_mod_n = ((r_mod_n as u128 * r_mod_n as u128) % n as u128) as u64;

        MontgomeryCtx {
            n,
            n_prime,
            r_mod_n,
            r2_mod_n,
        }
    }

    #[inline]
    pub fn to_mont(&self, a: u64) -> u64 {
        self.mul(a % self.n, self.r2_mod_n)
    }

    #[inline]
    pub fn from_mont(&self, a: u64) -> u64 {
        self.reduce(a as u128)
    }

    #[inline]
    fn reduce(&self, t: u128) -> u64 {
        let m = (t as u64).wrapping_mul(self.n_prime);
        let u = t + (m as u128) * (self.n as u128);
        let result = (u >> 64) as u64;
        if result >= self.n {
            result - self.n
        } else {
            result
        }
    }

    #[inline]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        self.reduce((a as u128) * (b as u128))
    }

    pub fn pow_mod(&self, base: u64, mut exp: u64) -> u64 {
        let mut result = self.r_mod_n;
        let mut b = base;
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, b);
            }
            exp >>= 1;
            if exp > 0 {
                b = self.mul(b, b);
            }
        }
        result
    }

    pub fn mod_inverse(&self, a_mont: u64) -> Option<u64> {
        if a_mont == 0 {
            return None;
        }
        Some(self.pow_mod(a_mont, self.n - 2))
    }

    #[inline]
    pub fn one(&self) -> u64 {
        self.r_mod_n
    }
}

/// Multiplicative order of `base` modulo prime `p`.
pub fn multiplicative_order(base: u64, p: u64) -> u64 {
    let mut order = p - 1;
    let factors = factor_u64(order);
    if p > 2 {
        let ctx = MontgomeryCtx::new(p);
        let base_mont = ctx.to_mont(base % p);
        let one = ctx.one();
        for (q, _) in factors {
            while order % q == 0 && ctx.pow_mod(base_mont, order / q) == one {
                order /= q;
            }
        }
    } else {
        for (q, _) in factors {
            while order % q == 0 && pow_mod_u64(base, order / q, p) == 1 {
                order /= q;
            }
        }
    }
    order
}

/// Baby-step giant-step discrete logarithm: find x in [0, order) such that
/// base^x ≡ target (mod p), or None if no solution exists.
pub fn discrete_log_bsgs(base: u64, target: u64, p: u64, order: u64) -> Option<u64> {
    let m = (order as f64).sqrt().ceil() as u64;
    if m == 0 {
        return None;
    }

    if p > 2 {
        let ctx = MontgomeryCtx::new(p);
        let base_mont = ctx.to_mont(base % p);
        let target_mont = ctx.to_mont(target % p);

        let mut table = HashMap::with_capacity(m as usize);
        let mut power = ctx.one();
        for j in 0..m {
            table.insert(power, j);
            power = ctx.mul(power, base_mont);
        }

        let base_inv_mont = ctx.mod_inverse(base_mont)?;
        let giant_step = ctx.pow_mod(base_inv_mont, m);

        let mut gamma = target_mont;
        for i in 0..=m {
            if let Some(&j) = table.get(&gamma) {
                let x = i * m + j;
                if x < order {
                    return Some(x);
                }
            }
            gamma = ctx.mul(gamma, giant_step);
        }
        None
    } else {
        let mut table = HashMap::with_capacity(m as usize);
        let mut power = 1u64;
        for j in 0..m {
            table.insert(power, j);
            power = (power as u128 * base as u128 % p as u128) as u64;
        }

        let base_inv = pow_mod_u64(base, p - 2, p);
        let giant_step = pow_mod_u64(base_inv, m, p);

        let mut gamma = target;
        for i in 0..=m {
            if let Some(&j) = table.get(&gamma) {
                let x = i * m + j;
                if x < order {
                    return Some(x);
                }
            }
            gamma = (gamma as u128 * giant_step as u128 % p as u128) as u64;
        }
        None
    }
}

/// Find a primitive root of prime q (a generator of (Z/qZ)*).
pub fn primitive_root_prime(q: u64) -> u64 {
    if q == 2 {
        return 1;
    }
    let phi = q - 1;
    let prime_factors: Vec<u64> = factor_u64(phi).into_iter().map(|(p, _)| p).collect();
    let mut g = 2u64;
    loop {
        if prime_factors
            .iter()
            .all(|&pf| pow_mod_u64(g, phi / pf, q) != 1)
        {
            return g;
        }
        g += 1;
    }
}

/// Discrete log of `target` base the canonical primitive root of prime `q`.
pub fn discrete_log_prime(target: u64, q: u64) -> u64 {
    let g = primitive_root_prime(q);
    discrete_log_bsgs(g, target, q, q - 1).expect("discrete log over F_q* always has a solution")
}

/// Best-effort stand-in for Lenstra's residue-class divisor search: looks
/// for a non-trivial common factor of n with npow + k*s for small k. This
/// is a deliberately conservative approximation documented in DESIGN.md —
/// `final_division`'s primary trial-division loop does not depend on it.
pub fn divisor_in_residue_class(n: &Integer, s: &Integer, npow: &Integer) -> Option<Integer> {
    let bound = 64i64;
    let mut candidate = npow.clone();
    for _ in 0..bound {
        let g = n.clone().gcd(&candidate);
        if g > 1u32 && g != *n {
            return Some(g);
        }
        candidate += s;
        if &candidate >= n {
            break;
        }
    }
    None
}
