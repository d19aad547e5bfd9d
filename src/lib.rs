//! # darkreach-aprcl — APR-CL deterministic primality proving
//!
//! Implements the Adleman–Pomerance–Rumely primality test as refined by
//! Cohen and Lenstra: pick a smooth cyclotomic-field parameter pair
//! `(R, s)`, run a Jacobi- or Gauss-sum congruence per prime factor of
//! `R`, and finish with a trial-division-in-residue-class step once
//! every congruence is certified.
//!
//! ## Module organization
//!
//! - [`bigint`] — u64-scale number theory: Miller–Rabin, factoring,
//!   discrete log, Montgomery arithmetic, primitive roots.
//! - [`f_table`] — the `x ↦ ind(1-x)` discrete-log table Jacobi sums are
//!   built from.
//! - [`unity_zp`] — the cyclotomic ring `Z[ζ_{p^k}]/n`.
//! - [`unity_zpq`] — `Z[ζ_q, ζ_p]/n`, where Gauss sums live.
//! - [`jacobi_sum`] — Jacobi-sum construction over [`unity_zp`].
//! - [`config`] — selects `(R, s)` per flavor.
//! - [`engine`] — the per-cell L_p congruence checks, both flavors.
//! - [`final_division`] — the closing trial-division-in-residue-class step.
//! - [`driver`] — `is_prime`, the public entry point, with its retry ladder.
//! - [`error`] — the typed verdict/error taxonomy.
//!
//! ## Entry point
//!
//! ```no_run
//! use rug::Integer;
//! let n = Integer::from(1009u64);
//! let status = darkreach_aprcl::is_prime(&n).unwrap();
//! assert_eq!(status, darkreach_aprcl::PrimalityStatus::Prime);
//! ```

pub mod bigint;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod f_table;
pub mod final_division;
pub mod jacobi_sum;
pub mod unity_zp;
pub mod unity_zpq;

pub use driver::{is_prime, is_prime_gauss};
pub use error::{PrimalityError, PrimalityStatus};
