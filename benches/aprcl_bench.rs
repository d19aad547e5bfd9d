use criterion::{black_box, criterion_group, criterion_main, Criterion};
use darkreach_aprcl::unity_zp::UnityZp;
use darkreach_aprcl::{config::Config, is_prime};
use rug::Integer;
use std::sync::Arc;

fn bench_is_prime_small_prime(c: &mut Criterion) {
    let n = Integer::from(1_000_003u64);
    c.bench_function("is_prime(1000003)", |b| {
        b.iter(|| is_prime(black_box(&n)).unwrap());
    });
}

fn bench_is_prime_small_composite(c: &mut Criterion) {
    let n = Integer::from(1_000_001u64); // 101 * 9901
    c.bench_function("is_prime(1000001)", |b| {
        b.iter(|| is_prime(black_box(&n)).unwrap());
    });
}

fn bench_is_prime_mersenne(c: &mut Criterion) {
    let n = (Integer::from(1u32) << 127u32) - 1u32; // M127, prime
    c.bench_function("is_prime(2^127-1)", |b| {
        b.iter(|| is_prime(black_box(&n)).unwrap());
    });
}

fn bench_jacobi_config_build(c: &mut Criterion) {
    let n = (Integer::from(1u32) << 200u32) - 1u32;
    c.bench_function("Config::build_jacobi(2^200-1)", |b| {
        b.iter(|| Config::build_jacobi(black_box(&n)));
    });
}

/// One coefficient vector per fast-kernel `(p, k)`, filled with small
/// distinct values so `mul`/`sqr` exercise every active coefficient.
fn fast_kernel_elem(p: u64, k: u32, n: &Arc<Integer>) -> UnityZp {
    let mut f = UnityZp::zero(p, k, n.clone());
    let phi = f.phi as usize;
    for i in 0..phi {
        f.set(i, Integer::from(3 + i as u64 * 7));
    }
    f
}

/// `UnityZp::mul`/`sqr`/`pow_sliding` across the whole hand-kernel set
/// `{3,4,5,7,8,9,11,16}`, against a modulus large enough that coefficient
/// multiplies aren't trivially cheap.
fn bench_unity_zp_fast_kernels(c: &mut Criterion) {
    let n = Arc::new((Integer::from(1u32) << 256u32) - 189u32);
    let exponent = Integer::from(1u64) << 40u32;

    for &(p, k) in &[(3u64, 1u32), (2, 2), (5, 1), (7, 1), (2, 3), (3, 2), (11, 1), (2, 4)] {
        let f = fast_kernel_elem(p, k, &n);
        let g = fast_kernel_elem(p, k, &n);

        c.bench_function(&format!("UnityZp::mul p^k={}", p.pow(k)), |b| {
            b.iter(|| black_box(&f).mul(black_box(&g)));
        });
        c.bench_function(&format!("UnityZp::sqr p^k={}", p.pow(k)), |b| {
            b.iter(|| black_box(&f).sqr());
        });
        c.bench_function(&format!("UnityZp::pow_sliding p^k={}", p.pow(k)), |b| {
            b.iter(|| black_box(&f).pow_sliding(black_box(&exponent)));
        });
    }
}

fn int(decimal: &str) -> Integer {
    Integer::from_str_radix(decimal, 10).unwrap()
}

/// Full `is_prime` over the S1-S6 scenario literals from
/// `tests/aprcl_vectors.rs` — the sizes the tabulated `R` breakpoints are
/// actually chosen for, unlike the toy inputs above.
fn bench_is_prime_scenarios(c: &mut Criterion) {
    let s1 = int("40206835204840513073");
    let s2 = int("521419622856657689423872613771");
    let s3 = int("5991810554633396517767024967580894321153");
    let s4 = int("8876044532898802067");
    let s5 = int("323424426232167763068694468589");
    let s6 = {
        let mut n = Integer::from(1u32);
        for _ in 0..7 {
            n = Integer::from(&n * &s1);
        }
        n
    };

    c.bench_function("is_prime(S1: 20-digit prime)", |b| {
        b.iter(|| is_prime(black_box(&s1)).unwrap());
    });
    c.bench_function("is_prime(S2: prime, n=3 mod 4)", |b| {
        b.iter(|| is_prime(black_box(&s2)).unwrap());
    });
    c.bench_function("is_prime(S3: prime, n=1 mod 4)", |b| {
        b.iter(|| is_prime(black_box(&s3)).unwrap());
    });
    c.bench_function("is_prime(S4: composite, two prime factors)", |b| {
        b.iter(|| is_prime(black_box(&s4)).unwrap());
    });
    c.bench_function("is_prime(S5: composite, two prime factors)", |b| {
        b.iter(|| is_prime(black_box(&s5)).unwrap());
    });
    c.bench_function("is_prime(S6: composite, prime^7)", |b| {
        b.iter(|| is_prime(black_box(&s6)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_is_prime_small_prime,
    bench_is_prime_small_composite,
    bench_is_prime_mersenne,
    bench_jacobi_config_build,
    bench_unity_zp_fast_kernels,
    bench_is_prime_scenarios,
);
criterion_main!(benches);
