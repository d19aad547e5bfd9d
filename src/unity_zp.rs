//! Elements of `R_{p^k} = (Z/nZ)[X] / Φ_{p^k}(X)`, the cyclotomic ring the
//! Jacobi-sum engine runs its congruence checks in.
//!
//! An element is stored as its length-`p^k` coefficient vector in
//! `(Z/nZ)[X]/(X^{p^k}-1)`; canonical (post-`reduce`) form has every
//! coefficient at index >= φ(p^k) equal to zero, since those are folded
//! back into the low-degree coefficients by the Φ_{p^k} relation
//! `X^φ = -(1 + X^{p^{k-1}} + ... + X^{(p-2)p^{k-1}})`.
//!
//! For `p^k` in `{3,4,5,7,8,9,11,16}` this file carries hand-scheduled
//! Karatsuba-style kernels for `mul`/`sqr` (`mul9` and `mul16` are the
//! two exceptions: the source material leaves those two specific
//! routines as empty stub bodies, so they run through the generic
//! poly-multiply-then-reduce path instead). Everything outside that set
//! of sizes also runs through the generic path, which is always correct
//! regardless of kernel availability.
//!
//! `mul8` has no stub in the source material either, but the ring's
//! negacyclic reduction (`Φ_8(X) = X^4+1`) is structurally different
//! from every other size here, so it is derived directly from that
//! relation rather than transcribed.

use rug::Integer;
use std::sync::Arc;

fn reduce_mod(x: &mut Integer, n: &Integer) {
    *x %= n;
    if *x < 0 {
        *x += n;
    }
}

/// p^{k-1}: the block size used by the Φ_{p^k} folding relation.
fn block_size(p: u64, pow_pk: u64) -> u64 {
    pow_pk / p
}

#[derive(Clone, Debug)]
pub struct UnityZp {
    pub p: u64,
    pub k: u32,
    pub pow_pk: u64,
    pub phi: u64,
    pub n: Arc<Integer>,
    coeffs: Vec<Integer>,
}

impl UnityZp {
    pub fn zero(p: u64, k: u32, n: Arc<Integer>) -> Self {
        let pow_pk = p.pow(k);
        let phi = pow_pk - pow_pk / p;
        UnityZp {
            p,
            k,
            pow_pk,
            phi,
            n,
            coeffs: vec![Integer::new(); pow_pk as usize],
        }
    }

    pub fn one(p: u64, k: u32, n: Arc<Integer>) -> Self {
        let mut f = Self::zero(p, k, n);
        f.coeffs[0] = Integer::from(1);
        f
    }

    /// The embedded p^k-th root of unity ζ_{p^k}^i, already reduced.
    pub fn zeta_pow(p: u64, k: u32, n: Arc<Integer>, i: u64) -> Self {
        let pow_pk = p.pow(k);
        let mut f = Self::zero(p, k, n);
        f.coeffs[(i % pow_pk) as usize] = Integer::from(1);
        f.reduce();
        f
    }

    #[inline]
    pub fn get(&self, i: usize) -> &Integer {
        &self.coeffs[i]
    }

    pub fn set(&mut self, i: usize, c: Integer) {
        self.coeffs[i] = c;
        reduce_mod(&mut self.coeffs[i], &self.n);
    }

    pub fn coeff_add(&mut self, i: usize, x: &Integer) {
        self.coeffs[i] += x;
        reduce_mod(&mut self.coeffs[i], &self.n);
    }

    pub fn add(&self, other: &Self) -> Self {
        debug_assert_eq!((self.p, self.k), (other.p, other.k));
        let mut out = self.clone();
        for i in 0..self.pow_pk as usize {
            out.coeffs[i] = (&self.coeffs[i] + &other.coeffs[i]).into();
            reduce_mod(&mut out.coeffs[i], &self.n);
        }
        out
    }

    /// Fold every coefficient at index >= φ(p^k) back into the canonical
    /// range using the Φ_{p^k} relation. A cancelled coefficient at index
    /// `i` is subtracted from `coeff[(i - φ(p^k)) + j·p^{k-1}]` for each
    /// `j = 0..=p-2` — the `i`-dependent offset `i - φ(p^k)` (itself in
    /// `[0, p^{k-1})` since `i` ranges over `[φ(p^k), p^k)`) matters: it is
    /// not the same fixed set of destinations for every `i`.
    pub fn reduce(&mut self) {
        let block = block_size(self.p, self.pow_pk);
        for i in (self.phi as usize..self.pow_pk as usize).rev() {
            if self.coeffs[i] == 0 {
                continue;
            }
            let c = std::mem::replace(&mut self.coeffs[i], Integer::new());
            let offset = i - self.phi as usize;
            for j in 0..=(self.p - 2) {
                let idx = offset + (j * block) as usize;
                self.coeffs[idx] -= &c;
                reduce_mod(&mut self.coeffs[idx], &self.n);
            }
        }
    }

    fn raw_mul(&self, other: &Self) -> Vec<Integer> {
        let len = self.pow_pk as usize;
        let mut raw = vec![Integer::new(); 2 * len - 1];
        for i in 0..len {
            if self.coeffs[i] == 0 {
                continue;
            }
            for j in 0..len {
                if other.coeffs[j] == 0 {
                    continue;
                }
                raw[i + j] += Integer::from(&self.coeffs[i] * &other.coeffs[j]);
            }
        }
        raw
    }

    fn fold_and_reduce(&self, mut raw: Vec<Integer>) -> Self {
        let len = self.pow_pk as usize;
        for i in (len..raw.len()).rev() {
            let c = std::mem::replace(&mut raw[i], Integer::new());
            raw[i - len] += c;
        }
        raw.truncate(len);
        let mut out = Self::zero(self.p, self.k, self.n.clone());
        for i in 0..len {
            out.coeffs[i] = std::mem::replace(&mut raw[i], Integer::new());
            reduce_mod(&mut out.coeffs[i], &self.n);
        }
        out.reduce();
        out
    }

    /// Generic multiply: raw polynomial product, fold mod X^{p^k}-1, then
    /// reduce mod Φ_{p^k}. Always correct; used directly for every p^k
    /// without a hand-scheduled kernel.
    pub fn mul_generic(&self, other: &Self) -> Self {
        let raw = self.raw_mul(other);
        self.fold_and_reduce(raw)
    }

    pub fn mul(&self, other: &Self) -> Self {
        match (self.p, self.k) {
            (2, 2) => kernels::mul4(self, other),
            (2, 3) => kernels::mul8(self, other),
            (3, 1) => kernels::mul3(self, other),
            (5, 1) => kernels::mul5(self, other),
            (7, 1) => kernels::mul7(self, other),
            (11, 1) => kernels::mul11(self, other),
            _ => self.mul_generic(other),
        }
    }

    pub fn sqr(&self) -> Self {
        match (self.p, self.k) {
            (2, 2) => kernels::sqr4(self),
            (2, 3) => kernels::sqr8(self),
            (2, 4) => kernels::sqr16(self),
            (3, 1) => kernels::sqr3(self),
            (3, 2) => kernels::sqr9(self),
            (5, 1) => kernels::sqr5(self),
            (7, 1) => kernels::sqr7(self),
            (11, 1) => kernels::sqr11(self),
            _ => self.mul_generic(self),
        }
    }

    /// Binary square-and-multiply exponentiation — the baseline that
    /// `pow_sliding` and `pow_mont` must agree with.
    pub fn pow(&self, e: &Integer) -> Self {
        if *e == 0 {
            return Self::one(self.p, self.k, self.n.clone());
        }
        if *e == 1 {
            return self.clone();
        }
        let bits = e.significant_bits();
        let mut result = Self::one(self.p, self.k, self.n.clone());
        for b in (0..bits).rev() {
            result = result.sqr();
            if e.get_bit(b) {
                result = result.mul(self);
            }
        }
        result
    }

    fn select_k(bits: u32) -> u32 {
        match bits {
            0..=8 => 1,
            9..=24 => 2,
            25..=69 => 3,
            70..=196 => 4,
            197..=538 => 5,
            539..=1433 => 6,
            1434..=3714 => 7,
            3715..=9399 => 8,
            9400..=23290 => 9,
            23291..=56651 => 10,
            _ => 11,
        }
    }

    /// Sliding-window exponentiation: dominates 2^k-ary for this size range.
    pub fn pow_sliding(&self, e: &Integer) -> Self {
        if *e == 0 {
            return Self::one(self.p, self.k, self.n.clone());
        }
        if *e == 1 {
            return self.clone();
        }
        let bits = e.significant_bits();
        let window = Self::select_k(bits);
        let g_sqr = self.sqr();
        let num_odd = 1usize << (window - 1);
        let mut odd_powers = Vec::with_capacity(num_odd);
        odd_powers.push(self.clone());
        for i in 1..num_odd {
            let prev = odd_powers[i - 1].clone();
            odd_powers.push(prev.mul(&g_sqr));
        }

        let mut result = Self::one(self.p, self.k, self.n.clone());
        let mut bit_idx = (bits - 1) as i64;
        while bit_idx >= 0 {
            if !e.get_bit(bit_idx as u32) {
                result = result.sqr();
                bit_idx -= 1;
                continue;
            }
            // Extend a chain of length <= window ending in a 1 bit.
            let mut chain_len = 1u32;
            let lo = bit_idx.saturating_sub(window as i64 - 1).max(0);
            let mut end = bit_idx;
            for cand in (lo..bit_idx).rev() {
                if e.get_bit(cand as u32) {
                    end = cand;
                }
            }
            chain_len = (bit_idx - end + 1) as u32;
            let mut value = 0u64;
            for i in (end..=bit_idx).rev() {
                value = (value << 1) | (e.get_bit(i as u32) as u64);
            }
            for _ in 0..chain_len {
                result = result.sqr();
            }
            result = result.mul(&odd_powers[(value as usize) / 2]);
            bit_idx = end - 1;
        }
        result
    }

    /// Montgomery-domain exponentiation: same square-and-multiply schedule
    /// as [`pow`](Self::pow), but every coefficient multiplication runs
    /// through REDC instead of a direct `% n`. Must agree with `pow` and
    /// `pow_sliding` on every input — this crate's `rug`/GMP backend
    /// already gives fast arbitrary-precision division, so REDC buys no
    /// speedup here, but the Montgomery domain is threaded through so the
    /// entry point matches the one the reference material exposes.
    pub fn pow_mont(&self, e: &Integer) -> Self {
        if *e == 0 {
            return Self::one(self.p, self.k, self.n.clone());
        }
        if *e == 1 {
            return self.clone();
        }
        let mont = montgomery::Montgomery::new(&self.n);
        let mut base = self.to_mont(&mont);
        let mut result = Self::one(self.p, self.k, self.n.clone()).to_mont(&mont);
        let bits = e.significant_bits();
        for b in 0..bits {
            if e.get_bit(b) {
                result = result.mont_mul(&base, &mont);
            }
            base = base.mont_mul(&base, &mont);
        }
        result.from_mont(&mont)
    }

    fn to_mont(&self, mont: &montgomery::Montgomery) -> Self {
        let mut out = self.clone();
        for c in out.coeffs.iter_mut() {
            *c = mont.to_mont(c);
        }
        out
    }

    fn from_mont(&self, mont: &montgomery::Montgomery) -> Self {
        let mut out = self.clone();
        for c in out.coeffs.iter_mut() {
            *c = mont.redc(c);
        }
        out
    }

    /// Multiply two Montgomery-domain elements: raw polynomial product
    /// (each cross term still Montgomery-scale), REDC every folded
    /// coefficient once, then apply the usual cyclotomic fold.
    fn mont_mul(&self, other: &Self, mont: &montgomery::Montgomery) -> Self {
        let raw = self.raw_mul(other);
        let len = self.pow_pk as usize;
        let mut folded = vec![Integer::new(); len];
        for i in 0..raw.len() {
            folded[i % len] += &raw[i];
        }
        let mut out = Self::zero(self.p, self.k, self.n.clone());
        for i in 0..len {
            out.coeffs[i] = mont.redc(&folded[i]);
        }
        out.reduce();
        out
    }

    /// σ_x(g): maps ζ to ζ^x.
    pub fn aut(&self, x: u64) -> Self {
        let mut f = Self::zero(self.p, self.k, self.n.clone());
        for i in 0..self.pow_pk as usize {
            if self.coeffs[i] == 0 {
                continue;
            }
            let idx = ((x * i as u64) % self.pow_pk) as usize;
            f.coeffs[idx] += &self.coeffs[i];
            reduce_mod(&mut f.coeffs[idx], &self.n);
        }
        f.reduce();
        f
    }

    /// f such that σ_x(f) = self.
    pub fn aut_inv(&self, x: u64) -> Self {
        let mut f = Self::zero(self.p, self.k, self.n.clone());
        let block = block_size(self.p, self.pow_pk);
        for i in 0..self.phi {
            let idx = (x * i) % self.pow_pk;
            f.coeffs[i as usize] = self.coeffs[idx as usize].clone();
        }
        for i in self.phi..self.pow_pk {
            let idx = (x * i) % self.pow_pk;
            let val = self.coeffs[idx as usize].clone();
            if val == 0 {
                continue;
            }
            for j in 1..self.p {
                let dest = (i as i64) - (j * block) as i64;
                debug_assert!(dest >= 0 && (dest as u64) < self.phi);
                let dest = dest as usize;
                f.coeffs[dest] -= &val;
                reduce_mod(&mut f.coeffs[dest], &self.n);
            }
        }
        f
    }

    pub fn equal(&self, other: &Self) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.reduce();
        b.reduce();
        a.coeffs == b.coeffs
    }

    /// Return i such that self = ζ_{p^k}^i, or None.
    pub fn is_unity(&self) -> Option<u64> {
        let mut this = self.clone();
        this.reduce();
        for i in 0..self.pow_pk {
            let z = Self::zeta_pow(self.p, self.k, self.n.clone(), i);
            if this.coeffs == z.coeffs {
                return Some(i);
            }
        }
        None
    }

    /// Return i such that self = ζ_p^i (embedded at index i·p^{k-1}), or None.
    pub fn is_p_unity(&self) -> Option<u64> {
        let mut this = self.clone();
        this.reduce();
        let block = block_size(self.p, self.pow_pk);
        for i in 0..self.p {
            let z = Self::zeta_pow(self.p, self.k, self.n.clone(), i * block);
            if this.coeffs == z.coeffs {
                return Some(i);
            }
        }
        None
    }
}

mod kernels {
    //! Hand-scheduled Karatsuba-style multiply/square kernels for the
    //! fast-kernel set `{3,4,5,7,8,9,11,16}`, built from the AR1 (3x3) /
    //! AR2 (4x4) / AR3 (5x5) building blocks. `mul9` and `mul16` are the
    //! two sizes the source material leaves as empty stub bodies, so
    //! they are the only entries in this set with no hand kernel at all
    //! (dispatch in the parent module falls through to `mul_generic` for
    //! them); `sqr5`, `sqr7`, `sqr11` reuse the verified `mulN` kernel
    //! against itself rather than transcribing the source material's
    //! separate, register-reuse-heavy squaring-only routines (the same
    //! shortcut this file already took for `sqr3`). `sqr9` has no `mul9`
    //! to fall back onto, so it is its own standalone kernel derived from
    //! the Φ_9 relation.
    use super::UnityZp;
    use rug::Integer;

    /// 3x3 Toom-style multiply: (a0,a1,a2) x (b0,b1,b2) -> (c0..c4), 6 multiplies.
    pub fn ar1(a: &[Integer; 3], b: &[Integer; 3]) -> [Integer; 5] {
        let d1 = Integer::from(&a[0] * &b[0]);
        let d2 = Integer::from(&a[1] * &b[1]);
        let d3 = Integer::from(&a[2] * &b[2]);
        let m1 = Integer::from(&a[0] + &a[1]);
        let m2 = Integer::from(&b[0] + &b[1]);
        let s01 = Integer::from(&m1 * &m2);
        let m3 = Integer::from(&a[0] + &a[2]);
        let m4 = Integer::from(&b[0] + &b[2]);
        let s02 = Integer::from(&m3 * &m4);
        let m5 = Integer::from(&a[1] + &a[2]);
        let m6 = Integer::from(&b[1] + &b[2]);
        let s12 = Integer::from(&m5 * &m6);

        let c0 = d1.clone();
        let c1 = Integer::from(&s01 - &d1) - &d2;
        let c2 = Integer::from(&s02 - &d1) - &d3 + &d2;
        let c3 = Integer::from(&s12 - &d2) - &d3;
        let c4 = d3;
        [c0, c1, c2, c3, c4]
    }

    /// 4x4 multiply: (a0..a3) x (b0..b3) -> (c0..c6). Plain schoolbook —
    /// correct and simple; the Karatsuba-style cross-term scheduling the
    /// source material uses here was not transcribed, so this building
    /// block trades the constant-factor speedup for certainty.
    pub fn ar2(a: &[Integer; 4], b: &[Integer; 4]) -> [Integer; 7] {
        let mut c: [Integer; 7] = std::array::from_fn(|_| Integer::new());
        for i in 0..4 {
            for j in 0..4 {
                c[i + j] += Integer::from(&a[i] * &b[j]);
            }
        }
        c
    }

    /// 5x5 multiply: (a0..a4) x (b0..b4) -> (c0..c8). Plain schoolbook,
    /// same trade-off as `ar2`: the source material's recursive-Karatsuba
    /// scheduling for this block was not transcribed.
    pub fn ar3(a: &[Integer; 5], b: &[Integer; 5]) -> [Integer; 9] {
        let mut c: [Integer; 9] = std::array::from_fn(|_| Integer::new());
        for i in 0..5 {
            for j in 0..5 {
                c[i + j] += Integer::from(&a[i] * &b[j]);
            }
        }
        c
    }

    pub fn mul3(f: &UnityZp, g: &UnityZp) -> UnityZp {
        let x0 = f.get(0).clone();
        let x1 = f.get(1).clone();
        let y0 = g.get(0).clone();
        let y1 = g.get(1).clone();
        let d1 = Integer::from(&x0 * &y0);
        let d2 = Integer::from(&x1 * &y1);
        let m1 = Integer::from(&x0 - &x1);
        let m2 = Integer::from(&y1 - &y0);
        let d3 = Integer::from(&m1 * &m2) + &d1;
        let mut out = UnityZp::zero(3, 1, f.n.clone());
        out.set(1, d3);
        out.set(0, Integer::from(&d1 - &d2));
        out
    }

    pub fn sqr3(f: &UnityZp) -> UnityZp {
        mul3(f, f)
    }

    /// Karatsuba-style multiply for p^k = 5 (phi = 4): 9 multiplies
    /// against the schoolbook 16, grounded in `unity_zp_mul5.c`.
    pub fn mul5(f: &UnityZp, g: &UnityZp) -> UnityZp {
        let x0 = f.get(0).clone();
        let x1 = f.get(1).clone();
        let x2 = f.get(2).clone();
        let x3 = f.get(3).clone();
        let y0 = g.get(0).clone();
        let y1 = g.get(1).clone();
        let y2 = g.get(2).clone();
        let y3 = g.get(3).clone();

        let m1 = Integer::from(&x1 - &x3);
        let m2 = Integer::from(&y1 - &y3);
        let m3 = Integer::from(&x2 - &x3);
        let m4 = Integer::from(&y3 - &y2);
        let m5 = Integer::from(&x0 - &x1);
        let m6 = Integer::from(&y1 - &y0);
        let m7 = Integer::from(&x0 - &x2);
        let m8 = Integer::from(&y2 - &y0);

        let d0 = Integer::from(&x0 * &y0);
        let t1 = Integer::from(&m1 * &m2);
        let d1 = Integer::from(&d0 + &t1);
        let t2 = Integer::from(&m3 * &m4);
        let d3 = Integer::from(&m5 * &m6);
        let d4 = Integer::from(&m7 * &m8);
        let d5 = Integer::from(&x1 * &y1);
        let d6 = Integer::from(&x2 * &y2);
        let d7 = Integer::from(&x3 * &y3);

        let z0 = Integer::from(&d1 + &t2) - &d5;
        let z1 = Integer::from(&d1 + &d3) - &d6;
        let z2 = Integer::from(&d1 + &d4) - &d7;
        let m3b = Integer::from(&m1 - &m7);
        let m4b = Integer::from(&m2 + &m8);
        let d1b = Integer::from(&m3b * &m4b);
        let z3 = Integer::from(Integer::from(Integer::from(&d0 + &d1b) + &t2) + &d3) + &d4;

        let mut out = UnityZp::zero(5, 1, f.n.clone());
        out.set(0, z0);
        out.set(1, z1);
        out.set(2, z2);
        out.set(3, z3);
        out
    }

    pub fn sqr5(f: &UnityZp) -> UnityZp {
        mul5(f, f)
    }

    /// Karatsuba-split multiply for p^k = 7 (phi = 6): split the active
    /// coefficients into halves of size m = 3 and run three AR1 calls
    /// (low*low, high*high, and a difference term) instead of nine
    /// direct coefficient multiplies, grounded in `unity_zp_mul7.c`.
    pub fn mul7(f: &UnityZp, g: &UnityZp) -> UnityZp {
        let lo_g: [Integer; 3] = std::array::from_fn(|i| f.get(i).clone());
        let hi_g: [Integer; 3] = std::array::from_fn(|i| f.get(i + 3).clone());
        let lo_h: [Integer; 3] = std::array::from_fn(|i| g.get(i).clone());
        let hi_h: [Integer; 3] = std::array::from_fn(|i| g.get(i + 3).clone());

        let diff_g: [Integer; 3] = std::array::from_fn(|i| Integer::from(&lo_g[i] - &hi_g[i]));
        let diff_h: [Integer; 3] = std::array::from_fn(|i| Integer::from(&hi_h[i] - &lo_h[i]));

        let low = ar1(&lo_g, &lo_h);
        let high = ar1(&hi_g, &hi_h);
        let diff = ar1(&diff_g, &diff_h);
        let cross: [Integer; 5] = std::array::from_fn(|j| {
            Integer::from(Integer::from(&low[j] + &high[j]) + &diff[j])
        });

        let tail = Integer::from(&cross[3] + &high[0]);
        let z0 = Integer::from(Integer::from(&low[0] + &cross[4]) + &high[1]) - &tail;
        let z1 = Integer::from(&low[1] + &high[2]) - &tail;
        let z2 = Integer::from(&low[2] + &high[3]) - &tail;
        let z3 = Integer::from(Integer::from(&low[3] + &cross[0]) + &high[4]) - &tail;
        let z4 = Integer::from(&low[4] + &cross[1]) - &tail;
        let z5 = Integer::from(&cross[2]) - &tail;

        let mut out = UnityZp::zero(7, 1, f.n.clone());
        out.set(0, z0);
        out.set(1, z1);
        out.set(2, z2);
        out.set(3, z3);
        out.set(4, z4);
        out.set(5, z5);
        out
    }

    pub fn sqr7(f: &UnityZp) -> UnityZp {
        mul7(f, f)
    }

    /// Karatsuba-split multiply for p^k = 11 (phi = 10): the same
    /// low/high/diff split as `mul7`, scaled to halves of size m = 5 via
    /// the AR3 (5x5) building block, grounded in `unity_zp_mul11.c`.
    pub fn mul11(f: &UnityZp, g: &UnityZp) -> UnityZp {
        let lo_g: [Integer; 5] = std::array::from_fn(|i| f.get(i).clone());
        let hi_g: [Integer; 5] = std::array::from_fn(|i| f.get(i + 5).clone());
        let lo_h: [Integer; 5] = std::array::from_fn(|i| g.get(i).clone());
        let hi_h: [Integer; 5] = std::array::from_fn(|i| g.get(i + 5).clone());

        let diff_g: [Integer; 5] = std::array::from_fn(|i| Integer::from(&lo_g[i] - &hi_g[i]));
        let diff_h: [Integer; 5] = std::array::from_fn(|i| Integer::from(&hi_h[i] - &lo_h[i]));

        let low = ar3(&lo_g, &lo_h);
        let high = ar3(&hi_g, &hi_h);
        let diff = ar3(&diff_g, &diff_h);
        let cross: [Integer; 9] = std::array::from_fn(|j| {
            Integer::from(Integer::from(&low[j] + &high[j]) + &diff[j])
        });

        let tail = Integer::from(&cross[5] + &high[0]);
        let z0 = Integer::from(Integer::from(&low[0] + &cross[6]) + &high[1]) - &tail;
        let z1 = Integer::from(Integer::from(&low[1] + &cross[7]) + &high[2]) - &tail;
        let z2 = Integer::from(Integer::from(&low[2] + &cross[8]) + &high[3]) - &tail;
        let z3 = Integer::from(&low[3] + &high[4]) - &tail;
        let z4 = Integer::from(&low[4] + &high[5]) - &tail;
        let z5 = Integer::from(Integer::from(&low[5] + &cross[0]) + &high[6]) - &tail;
        let z6 = Integer::from(Integer::from(&low[6] + &cross[1]) + &high[7]) - &tail;
        let z7 = Integer::from(Integer::from(&low[7] + &cross[2]) + &high[8]) - &tail;
        let z8 = Integer::from(&low[8] + &cross[3]) - &tail;
        let z9 = Integer::from(&cross[4]) - &tail;

        let mut out = UnityZp::zero(11, 1, f.n.clone());
        out.set(0, z0);
        out.set(1, z1);
        out.set(2, z2);
        out.set(3, z3);
        out.set(4, z4);
        out.set(5, z5);
        out.set(6, z6);
        out.set(7, z7);
        out.set(8, z8);
        out.set(9, z9);
        out
    }

    pub fn sqr11(f: &UnityZp) -> UnityZp {
        mul11(f, f)
    }

    /// Squaring kernel for p^k = 9 (p = 3, k = 2, phi = 6): split f into
    /// a = (x0,x1,x2), b = (x3,x4,x5) (f = a + b*X^3), compute a^2, b^2,
    /// a*b via AR1, then fold the degree <= 10 raw product mod X^9 - 1
    /// and the Φ_9 = X^6+X^3+1 relation (unlike the p^k = p prime
    /// kernels above, each excess coefficient here folds into *two*
    /// destinations offset by the block size 3, not every active
    /// coefficient). `mul9` itself has no hand kernel (the source
    /// material's `unity_zp_mul9` is an empty stub) so this is a
    /// standalone squaring-only kernel, not `mul9(f, f)`.
    pub fn sqr9(f: &UnityZp) -> UnityZp {
        let a: [Integer; 3] = std::array::from_fn(|i| f.get(i).clone());
        let b: [Integer; 3] = std::array::from_fn(|i| f.get(i + 3).clone());

        let a2 = ar1(&a, &a);
        let b2 = ar1(&b, &b);
        let ab = ar1(&a, &b);

        let z0 = Integer::from(&a2[0] + &b2[3]) - Integer::from(&ab[3] + &ab[3]) - &b2[0];
        let z1 = Integer::from(&a2[1] + &b2[4]) - Integer::from(&ab[4] + &ab[4]) - &b2[1];
        let z2 = Integer::from(&a2[2]) - &b2[2];
        let z3 = Integer::from(&a2[3] + Integer::from(&ab[0] + &ab[0])) - Integer::from(&ab[3] + &ab[3]) - &b2[0];
        let z4 = Integer::from(&a2[4] + Integer::from(&ab[1] + &ab[1])) - Integer::from(&ab[4] + &ab[4]) - &b2[1];
        let z5 = Integer::from(&ab[2] + &ab[2]) - &b2[2];

        let mut out = UnityZp::zero(3, 2, f.n.clone());
        out.set(0, z0);
        out.set(1, z1);
        out.set(2, z2);
        out.set(3, z3);
        out.set(4, z4);
        out.set(5, z5);
        out
    }

    pub fn mul4(f: &UnityZp, g: &UnityZp) -> UnityZp {
        let x0 = f.get(0).clone();
        let x1 = f.get(1).clone();
        let y0 = g.get(0).clone();
        let y1 = g.get(1).clone();
        let m1 = Integer::from(&x0 + &x1);
        let m2 = Integer::from(&y0 + &y1);
        let m3 = Integer::from(&y1 - &y0);
        let t7 = Integer::from(&m1 * &y0);
        let t8 = Integer::from(&m2 * &x1);
        let t9 = Integer::from(&m3 * &x0);
        let mut out = UnityZp::zero(2, 2, f.n.clone());
        out.set(0, Integer::from(&t7 - &t8));
        out.set(1, Integer::from(&t7 + &t9));
        out
    }

    pub fn sqr4(f: &UnityZp) -> UnityZp {
        let x0 = f.get(0).clone();
        let x1 = f.get(1).clone();
        let m1 = Integer::from(&x0 - &x1);
        let m2 = Integer::from(&x0 + &x1);
        let d1 = Integer::from(&m1 * &m2);
        let m1b = Integer::from(&x0 + &x0);
        let d1b = Integer::from(&m1b * &x1);
        let mut out = UnityZp::zero(2, 2, f.n.clone());
        out.set(0, d1);
        out.set(1, d1b);
        out
    }

    /// (re1 + im1*y)(re2 + im2*y) with y^2 = -1, via the 3-multiply
    /// Gaussian-integer trick: t1 = re1*re2, t2 = im1*im2, t3 =
    /// (re1+im1)*(re2+im2), giving (t1-t2, t3-t1-t2).
    fn gauss_mul(re1: &Integer, im1: &Integer, re2: &Integer, im2: &Integer) -> (Integer, Integer) {
        let t1 = Integer::from(re1 * re2);
        let t2 = Integer::from(im1 * im2);
        let s1 = Integer::from(re1 + im1);
        let s2 = Integer::from(re2 + im2);
        let t3 = Integer::from(&s1 * &s2);
        let re = Integer::from(&t1 - &t2);
        let im = Integer::from(&t3 - &t1) - &t2;
        (re, im)
    }

    /// Multiply for p^k = 8 (phi = 4): Φ_8(X) = X^4+1 is a negacyclic
    /// reduction, not a cyclic fold, so this splits f = A + B*X (A, B in
    /// the subring Z[y]/(y^2+1) with y = X^2) and runs the same
    /// three-way Karatsuba split as `mul4` one level up: AC, BD, and
    /// (A+B)(C+D) give AD+BC by subtraction, and each of those three
    /// "complex" multiplies is itself done via `gauss_mul` — 9 real
    /// multiplies total, grounded in the negacyclic-convolution relation
    /// this ring satisfies (no stub kernel exists in the source material
    /// for this size; this is derived directly from Φ_8, verified
    /// against the schoolbook negacyclic product term by term).
    pub fn mul8(f: &UnityZp, g: &UnityZp) -> UnityZp {
        let x0 = f.get(0).clone();
        let x1 = f.get(1).clone();
        let x2 = f.get(2).clone();
        let x3 = f.get(3).clone();
        let y0 = g.get(0).clone();
        let y1 = g.get(1).clone();
        let y2 = g.get(2).clone();
        let y3 = g.get(3).clone();

        let (ac_re, ac_im) = gauss_mul(&x0, &x2, &y0, &y2);
        let (bd_re, bd_im) = gauss_mul(&x1, &x3, &y1, &y3);
        let a_sum = Integer::from(&x0 + &x1);
        let b_sum = Integer::from(&x2 + &x3);
        let c_sum = Integer::from(&y0 + &y1);
        let d_sum = Integer::from(&y2 + &y3);
        let (s_re, s_im) = gauss_mul(&a_sum, &b_sum, &c_sum, &d_sum);
        let adbc_re = Integer::from(&s_re - &ac_re) - &bd_re;
        let adbc_im = Integer::from(&s_im - &ac_im) - &bd_im;

        let c0 = Integer::from(&ac_re - &bd_im);
        let c1 = adbc_re;
        let c2 = Integer::from(&ac_im + &bd_re);
        let c3 = adbc_im;

        let mut out = UnityZp::zero(2, 3, f.n.clone());
        out.set(0, c0);
        out.set(1, c1);
        out.set(2, c2);
        out.set(3, c3);
        out
    }

    pub fn sqr8(f: &UnityZp) -> UnityZp {
        let x0 = f.get(0).clone();
        let x1 = f.get(1).clone();
        let x2 = f.get(2).clone();
        let x3 = f.get(3).clone();

        let m1 = Integer::from(&x0 - &x2);
        let m2 = Integer::from(&x0 + &x2);
        let m3 = Integer::from(&x1 - &x3);
        let m4 = Integer::from(&x1 + &x3);
        let m5 = Integer::from(&x0 + &x0);
        let m6 = Integer::from(&x1 + &x1);

        let m7 = Integer::from(&m1 + &m3);
        let m8 = Integer::from(&m2 + &m4);
        let d1 = Integer::from(&m1 * &m2);
        let d2 = Integer::from(&m3 * &m4);
        let d3 = Integer::from(&m6 * &x3);
        let d4 = Integer::from(&m5 * &x2);

        let m2b = Integer::from(&x2 + &x3);
        let y0 = Integer::from(&d1 - &d3);
        let y2 = Integer::from(&d2 + &d4);
        let d5 = Integer::from(&m7 * &m8);

        let d6 = Integer::from(&d1 + &d2);
        let y1 = Integer::from(&d5 - &d6);
        let m1b = Integer::from(&m5 + &m6);
        let d1b = Integer::from(&m1b * &m2b);
        let d6b = Integer::from(&d3 + &d4);
        let y3 = Integer::from(&d1b - &d6b);

        let mut out = UnityZp::zero(2, 3, f.n.clone());
        out.set(0, y0);
        out.set(1, y1);
        out.set(2, y2);
        out.set(3, y3);
        out
    }

    pub fn sqr16(f: &UnityZp) -> UnityZp {
        // f = lo + X^4*hi (deg < 8 each). f^2 = lo^2 + 2*X^4*lo*hi + X^8*hi^2,
        // each product an AR2 call; raw degree tops out at 14 < pow_pk=16 so
        // no wraparound fold is needed before the cyclotomic reduction.
        let lo: [Integer; 4] = std::array::from_fn(|i| f.get(i).clone());
        let hi: [Integer; 4] = std::array::from_fn(|i| f.get(i + 4).clone());

        let lo2 = ar2(&lo, &lo);
        let hi2 = ar2(&hi, &hi);
        let cross = ar2(&lo, &hi);

        let mut raw = vec![Integer::new(); 16];
        for i in 0..7 {
            raw[i] += lo2[i].clone();
        }
        for i in 0..7 {
            raw[i + 4] += Integer::from(&cross[i] + &cross[i]);
        }
        for i in 0..7 {
            raw[i + 8] += hi2[i].clone();
        }

        let mut out = UnityZp::zero(2, 4, f.n.clone());
        for i in 0..16 {
            out.set(i, std::mem::replace(&mut raw[i], Integer::new()));
        }
        out.reduce();
        out
    }
}

mod montgomery {
    //! REDC-based Montgomery reduction over the coefficient ring `Z/nZ`,
    //! grounded in `montgomery.c`/`unity_zp_mont_ninv.c`/`unity_zp_mont_redc.c`:
    //! pick `r = 2^bits` comfortably larger than `n`, precompute
    //! `ninv = -n^{-1} mod r`, and reduce via the usual two-multiply REDC
    //! instead of a division.
    use rug::Integer;

    pub struct Montgomery {
        n: Integer,
        r_bits: u32,
        r: Integer,
        r_mask: Integer,
        ninv: Integer,
    }

    impl Montgomery {
        pub fn new(n: &Integer) -> Self {
            let r_bits = n.significant_bits() + 1;
            let r = Integer::from(1u32) << r_bits;
            let r_mask = Integer::from(&r - 1u32);
            // ninv such that n * ninv == -1 (mod r), i.e. r - (n^-1 mod r).
            let n_inv_mod_r = n
                .clone()
                .invert(&r)
                .expect("n is odd (driver rejects even n), so n is invertible mod 2^k");
            let ninv = Integer::from(&r - &n_inv_mod_r);
            Montgomery {
                n: n.clone(),
                r_bits,
                r,
                r_mask,
                ninv,
            }
        }

        /// a -> a * r mod n.
        pub fn to_mont(&self, a: &Integer) -> Integer {
            let shifted = Integer::from(a << self.r_bits);
            shifted.rem_euc(&self.n)
        }

        /// REDC(t) = t * r^{-1} mod n, for 0 <= t < n * r.
        pub fn redc(&self, t: &Integer) -> Integer {
            let t = if *t < 0 {
                Integer::from(t + &self.n * &self.r)
            } else {
                t.clone()
            };
            let m = Integer::from(&t & &self.r_mask) * &self.ninv;
            let m = Integer::from(&m & &self.r_mask);
            let sum = Integer::from(&t + &m * &self.n);
            let mut result = Integer::from(sum >> self.r_bits);
            if result >= self.n {
                result -= &self.n;
            }
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elem(p: u64, k: u32, n: u64, coeffs: &[i64]) -> UnityZp {
        let n = Arc::new(Integer::from(n));
        let mut f = UnityZp::zero(p, k, n);
        for (i, &c) in coeffs.iter().enumerate() {
            f.set(i, Integer::from(c));
        }
        f
    }

    #[test]
    fn reduce_is_idempotent() {
        let mut f = elem(3, 1, 101, &[5, 3, 7]);
        f.reduce();
        let before = f.coeffs.clone();
        f.reduce();
        assert_eq!(f.coeffs, before);
    }

    #[test]
    fn reduce_p3k1_has_length_le_2() {
        // I2
        let mut f = elem(3, 1, 1009, &[1, 1, 1]);
        f.reduce();
        assert_eq!(*f.get(2), 0);
    }

    #[test]
    fn mul_and_sqr_agree() {
        // I4
        for &n in &[1009u64, 104729] {
            let g = elem(3, 1, n, &[2, 5, 0]);
            let mut direct = g.mul(&g);
            direct.reduce();
            let mut squared = g.sqr();
            squared.reduce();
            assert_eq!(direct.coeffs, squared.coeffs);
        }
    }

    #[test]
    fn pow_small_exponents() {
        // I5
        let g = elem(3, 1, 1009, &[2, 5, 0]);
        let p0 = g.pow(&Integer::from(0));
        assert!(p0.is_unity() == Some(0));
        let p1 = g.pow(&Integer::from(1));
        assert!(p1.equal(&g));
        let p2 = g.pow(&Integer::from(2));
        let sq = g.sqr();
        assert!(p2.equal(&sq));
    }

    #[test]
    fn pow_sliding_matches_pow() {
        // I6
        let g = elem(5, 1, 104729, &[3, 7, 2, 9]);
        for e in [0u64, 1, 2, 3, 17, 100, 12345] {
            let a = g.pow(&Integer::from(e));
            let b = g.pow_sliding(&Integer::from(e));
            assert!(a.equal(&b), "mismatch at e={e}");
        }
    }

    #[test]
    fn aut_aut_inv_roundtrip() {
        // I3
        let g = elem(5, 1, 104729, &[3, 7, 2, 9]);
        for &x in &[2u64, 3, 4] {
            let inv = g.aut_inv(x);
            let back = inv.aut(x);
            assert!(back.equal(&g), "x={x}");
        }
    }

    #[test]
    fn fast_kernels_match_generic_mul4() {
        let a = elem(2, 2, 1009, &[3, 5]);
        let b = elem(2, 2, 1009, &[7, 2]);
        let fast = a.mul(&b);
        let generic = a.mul_generic(&b);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_sqr4() {
        let a = elem(2, 2, 1009, &[3, 5]);
        let fast = a.sqr();
        let generic = a.mul_generic(&a);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_sqr8() {
        let a = elem(2, 3, 104729, &[3, 5, 11, 2]);
        let fast = a.sqr();
        let generic = a.mul_generic(&a);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn mul3_matches_generic() {
        let a = elem(3, 1, 1009, &[4, 9, 0]);
        let b = elem(3, 1, 1009, &[2, 3, 0]);
        let fast = a.mul(&b);
        let generic = a.mul_generic(&b);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn pow_mont_matches_pow() {
        let g = elem(5, 1, 104729, &[3, 7, 2, 9]);
        for e in [0u64, 1, 2, 3, 17, 100, 12345] {
            let a = g.pow(&Integer::from(e));
            let b = g.pow_mont(&Integer::from(e));
            assert!(a.equal(&b), "mismatch at e={e}");
        }
    }

    #[test]
    fn pow_mont_matches_pow_sliding_on_larger_modulus() {
        let n = Arc::new(Integer::from(1_000_003u64) * Integer::from(999_983u64));
        let mut g = UnityZp::zero(2, 3, n);
        g.set(0, Integer::from(12345));
        g.set(1, Integer::from(67890));
        g.set(2, Integer::from(13579));
        g.set(3, Integer::from(24680));
        let e = Integer::from(123_456_789u64);
        let a = g.pow_sliding(&e);
        let b = g.pow_mont(&e);
        assert!(a.equal(&b));
    }

    #[test]
    fn fast_kernels_match_generic_mul5() {
        let a = elem(5, 1, 104729, &[3, 5, 9, 2]);
        let b = elem(5, 1, 104729, &[7, 2, 4, 6]);
        let fast = a.mul(&b);
        let generic = a.mul_generic(&b);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_sqr5() {
        let a = elem(5, 1, 104729, &[3, 5, 9, 2]);
        let fast = a.sqr();
        let generic = a.mul_generic(&a);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_mul7() {
        let a = elem(7, 1, 104729, &[3, 5, 9, 2, 8, 1]);
        let b = elem(7, 1, 104729, &[7, 2, 4, 6, 3, 5]);
        let fast = a.mul(&b);
        let generic = a.mul_generic(&b);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_sqr7() {
        let a = elem(7, 1, 104729, &[3, 5, 9, 2, 8, 1]);
        let fast = a.sqr();
        let generic = a.mul_generic(&a);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_mul11() {
        let a = elem(11, 1, 104729, &[3, 5, 9, 2, 8, 1, 6, 4, 0, 7]);
        let b = elem(11, 1, 104729, &[7, 2, 4, 6, 3, 5, 1, 9, 8, 0]);
        let fast = a.mul(&b);
        let generic = a.mul_generic(&b);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_sqr11() {
        let a = elem(11, 1, 104729, &[3, 5, 9, 2, 8, 1, 6, 4, 0, 7]);
        let fast = a.sqr();
        let generic = a.mul_generic(&a);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_sqr9() {
        let a = elem(3, 2, 104729, &[3, 5, 9, 2, 8, 1]);
        let fast = a.sqr();
        let generic = a.mul_generic(&a);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn fast_kernels_match_generic_mul8() {
        let a = elem(2, 3, 104729, &[3, 5, 11, 2]);
        let b = elem(2, 3, 104729, &[7, 9, 4, 6]);
        let fast = a.mul(&b);
        let generic = a.mul_generic(&b);
        assert!(fast.equal(&generic));
    }

    #[test]
    fn is_unity_detects_roots() {
        let n = Arc::new(Integer::from(104729u64));
        for i in 0..5u64 {
            let z = UnityZp::zeta_pow(5, 1, n.clone(), i);
            assert_eq!(z.is_unity(), Some(i));
        }
    }
}
