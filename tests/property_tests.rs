//! Property-based tests for the cyclotomic arithmetic layer.
//!
//! These exercise the invariants spec'd for the ring/sum layer (reduce
//! idempotence, automorphism round-trips, multiple exponentiation paths
//! agreeing, the F-table identity) across randomly generated inputs rather
//! than a handful of fixed examples, the same way the rest of this
//! codebase's arithmetic primitives are property-tested.
//!
//! ```bash
//! cargo test --test property_tests
//! PROPTEST_CASES=10000 cargo test --test property_tests
//! ```

use darkreach_aprcl::bigint::{discrete_log_bsgs, pow_mod_u64, primitive_root_prime};
use darkreach_aprcl::config::Config;
use darkreach_aprcl::f_table::FTable;
use darkreach_aprcl::unity_zp::UnityZp;
use proptest::prelude::*;
use rug::Integer;
use std::sync::Arc;

const SMALL_PRIMES: &[u64] = &[5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43];

fn modulus() -> Arc<Integer> {
    Arc::new(Integer::from(104_729u64)) // a convenient mid-size prime
}

fn unity_elem(p: u64, k: u32, coeffs: &[i64]) -> UnityZp {
    let mut f = UnityZp::zero(p, k, modulus());
    for (i, &c) in coeffs.iter().enumerate() {
        f.set(i, Integer::from(c));
    }
    f
}

proptest! {
    /// I1: FTable(q) satisfies g^(i+1) + g^(table[i]+1) == 1 (mod q) for
    /// every i, for any odd prime q drawn from a small pool (BSGS is
    /// O(sqrt(q)) so this stays fast without needing huge primes).
    #[test]
    fn ftable_identity_holds(qi in 0..SMALL_PRIMES.len()) {
        let q = SMALL_PRIMES[qi];
        let t = FTable::build(q);
        for i in 0..t.len() {
            let lhs = pow_mod_u64(t.g, i as u64 + 1, q);
            let rhs = pow_mod_u64(t.g, t.get(i) + 1, q);
            prop_assert_eq!((lhs + rhs) % q, 1);
        }
    }

    /// Discrete log round-trips through BSGS for any target in range.
    #[test]
    fn discrete_log_bsgs_roundtrips(qi in 0..SMALL_PRIMES.len(), raw_target in 1u64..50) {
        let q = SMALL_PRIMES[qi];
        let g = primitive_root_prime(q);
        let target = 1 + raw_target % (q - 1);
        let x = discrete_log_bsgs(g, target, q, q - 1).unwrap();
        prop_assert_eq!(pow_mod_u64(g, x, q), target % q);
    }

    /// `reduce` is idempotent for any p^k in the small fast-kernel set and
    /// any coefficient vector.
    #[test]
    fn reduce_is_idempotent(c0 in 0i64..1000, c1 in 0i64..1000, c2 in 0i64..1000) {
        let mut f = unity_elem(3, 1, &[c0, c1, c2]);
        f.reduce();
        let once = format!("{:?}", f);
        f.reduce();
        let twice = format!("{:?}", f);
        prop_assert_eq!(once, twice);
    }

    /// I4: sqr(g) == mul(g, g) after reduce, for p^k = 4 (the hand-kernel
    /// case) across random coefficients.
    #[test]
    fn mul_and_sqr_agree_p4(c0 in 0i64..500, c1 in 0i64..500) {
        let g = unity_elem(2, 2, &[c0, c1]);
        let mut direct = g.mul(&g);
        direct.reduce();
        let mut squared = g.sqr();
        squared.reduce();
        prop_assert_eq!(direct.get(0).clone(), squared.get(0).clone());
        prop_assert_eq!(direct.get(1).clone(), squared.get(1).clone());
    }

    /// I6: pow_sliding(g, e) == pow(g, e) for random exponents, p^k = 5.
    #[test]
    fn pow_sliding_matches_pow(c0 in 1i64..200, c1 in 1i64..200, c2 in 1i64..200, c3 in 1i64..200, e in 0u64..200_000) {
        let g = unity_elem(5, 1, &[c0, c1, c2, c3]);
        let a = g.pow(&Integer::from(e));
        let b = g.pow_sliding(&Integer::from(e));
        prop_assert!(a.equal(&b));
    }

    /// I3: aut(aut_inv(g, x), x) == g for any x coprime to p^k = 5.
    #[test]
    fn aut_roundtrips(c0 in 0i64..200, c1 in 0i64..200, c2 in 0i64..200, c3 in 0i64..200, x in 1u64..5) {
        let g = unity_elem(5, 1, &[c0, c1, c2, c3]);
        let back = g.aut_inv(x).aut(x);
        prop_assert!(back.equal(&g));
    }

    /// I9: both config flavors satisfy s^2 > n for a range of random odd n.
    #[test]
    fn gauss_config_satisfies_s_squared_bound(raw in 1_000_000u64..2_000_000u64) {
        let n = Integer::from(raw | 1);
        let cfg = Config::build_gauss(&n);
        let s2 = Integer::from(&cfg.s * &cfg.s);
        prop_assert!(s2 > n);
    }
}
