//! Selects the smooth parameter pair `(R, s)` the Jacobi/Gauss engines run
//! their congruence checks against: `s = Π q_i^{e_i}` over a set of small
//! auxiliary primes `q_i`, and `R` such that every `q_i - 1` factors over
//! small primes dividing `R`.
//!
//! Two flavors, matching the two historical strategies for picking `R`,
//! grounded directly in `config_gauss.c` / `config_jacobi.c`:
//! - **Gauss**: grow `R` one step at a time, re-deriving the admissible
//!   prime set each step, until `s^2 > n`.
//! - **Jacobi**: look `R` up from a table indexed by the bit length of
//!   `n`, then build `s` from prime *powers* of the admissible primes —
//!   the extra exponent is what lets `s^2 > n` hold for a fixed R.

use crate::bigint::{factor_u64, n_is_prime, n_nextprime, p_adic_valuation};
use rug::ops::Pow;
use rug::Integer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavor {
    Gauss,
    Jacobi,
}

/// One `(q, p, k)` cell: an auxiliary prime `q` together with one
/// prime-power factor `p^k` of `q - 1` that the congruence check at that
/// `q` runs over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub q: u64,
    pub p: u64,
    pub k: u32,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub flavor: Flavor,
    /// R, the cyclotomic field degree parameter.
    pub r: u64,
    /// s = Π q_i^{e_i}.
    pub s: Integer,
    /// The (q, e) pairs whose product is s.
    pub qs: Vec<(u64, u32)>,
    /// Factorization of R into (p, k) prime powers.
    pub rs: Vec<(u64, u32)>,
    /// Every (q, p, k) cell the engine needs to check, derived from qs by
    /// factoring each q - 1.
    pub cells: Vec<Cell>,
}

/// `_R_value`: R is tabulated as a function of bits(n).
fn r_value(n_bits: u32) -> u64 {
    const TABLE: &[(u32, u64)] = &[
        (101, 180),
        (152, 720),
        (204, 1260),
        (268, 2520),
        (344, 5040),
        (525, 27720),
        (774, 98280),
        (1035, 166320),
        (1566, 720720),
        (2082, 1663200),
        (3491, 8648640),
    ];
    for &(max_bits, r) in TABLE {
        if n_bits <= max_bits {
            return r;
        }
    }
    6983776800
}

fn build_cells(qs: &[(u64, u32)]) -> Vec<Cell> {
    let mut cells = Vec::new();
    for &(q, _e) in qs {
        if q <= 2 {
            continue; // q - 1 = 1 has no prime-power factors.
        }
        for (p, k) in factor_u64(q - 1) {
            cells.push(Cell { q, p, k });
        }
    }
    cells
}

fn pow_big(base: u64, exp: u32) -> Integer {
    Integer::from(base).pow(exp)
}

/// `_jacobi_config_update`: given R, build qs/s with the extra exponent
/// that guarantees s^2 > n for this fixed R.
fn jacobi_qs(r: u64) -> (Vec<(u64, u32)>, Integer) {
    let mut qs = Vec::new();
    let mut s = Integer::from(1u32);

    let e2 = p_adic_valuation(r, 2) + 2;
    qs.push((2, e2));
    s *= pow_big(2, e2);

    let mut prime = 3u64;
    while 2 * (prime - 1) <= r {
        if r % (prime - 1) == 0 {
            let e = p_adic_valuation(r, prime) + 1;
            qs.push((prime, e));
            s *= pow_big(prime, e);
        }
        prime = n_nextprime(prime);
    }

    if n_is_prime(r + 1) {
        qs.push((r + 1, 1));
        s *= Integer::from(r + 1);
    }

    (qs, s)
}

/// `_aprcl_config_update` / `_config_gauss_update`: admit every prime q
/// with `2(q-1) <= R` and `(q-1) | R`, each with multiplicity 1.
fn gauss_qs(r: u64) -> (Vec<(u64, u32)>, Integer) {
    let mut qs = Vec::new();
    let mut s = Integer::from(1u32);
    let mut prime = 2u64;
    loop {
        if 2 * (prime - 1) > r {
            break;
        }
        if r % (prime - 1) == 0 {
            qs.push((prime, 1));
            s *= Integer::from(prime);
        }
        prime = n_nextprime(prime);
    }
    (qs, s)
}

impl Config {
    /// Jacobi flavor: R looked up from the bit-length table, s built from
    /// prime powers of the admissible primes.
    pub fn build_jacobi(n: &Integer) -> Self {
        let r = r_value(n.significant_bits());
        let (qs, s) = jacobi_qs(r);
        let rs = factor_u64(r);
        let cells = build_cells(&qs);
        Config {
            flavor: Flavor::Jacobi,
            r,
            s,
            qs,
            rs,
            cells,
        }
    }

    /// Jacobi flavor, but starting the table lookup from a larger R —
    /// used by the driver's retry schedule (×2, ×3, ×5 on a PROBABPRIME
    /// verdict).
    pub fn build_jacobi_with_r(r: u64) -> Self {
        let (qs, s) = jacobi_qs(r);
        let rs = factor_u64(r);
        let cells = build_cells(&qs);
        Config {
            flavor: Flavor::Jacobi,
            r,
            s,
            qs,
            rs,
            cells,
        }
    }

    /// Gauss flavor: grow R one step at a time, recomputing s from
    /// scratch each step, until s^2 > n.
    pub fn build_gauss(n: &Integer) -> Self {
        Self::build_gauss_from(n, 1)
    }

    /// Gauss flavor, resuming the growth search past a previously-tried
    /// R — used to retry after an inconclusive λ_p without restarting
    /// from scratch.
    pub fn build_gauss_from(n: &Integer, start_r: u64) -> Self {
        let mut r = start_r;
        let mut qs;
        let mut s;
        loop {
            r += 1;
            let (q, ss) = gauss_qs(r);
            qs = q;
            s = ss;
            let s2 = Integer::from(&s * &s);
            if s2 > *n {
                break;
            }
        }
        let rs = factor_u64(r);
        let cells = build_cells(&qs);
        Config {
            flavor: Flavor::Gauss,
            r,
            s,
            qs,
            rs,
            cells,
        }
    }
}
