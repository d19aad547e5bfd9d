//! `IsPrime(n)`: picks the Jacobi configuration for n's bit length, runs
//! the congruence engine, retries with a scaled-up R on an inconclusive
//! (PROBABPRIME) result, and falls through to FinalDivision once every
//! auxiliary prime has been certified.

use crate::config::Config;
use crate::engine::{run_gauss, run_jacobi};
use crate::error::{PrimalityError, PrimalityStatus};
use crate::final_division::{final_division, FinalDivisionOutcome};
use rug::Integer;

/// R is rescaled by these factors, in order, each time a run comes back
/// PROBABPRIME — one retry per factor before giving up. `--max-retries`
/// caps how many of these are actually tried.
const RETRY_SCALES: &[u64] = &[2, 3, 5];

/// The default cap on how many `RETRY_SCALES` entries `is_prime` will try
/// before giving up — matches the CLI's own `--max-retries` default.
pub const DEFAULT_MAX_RETRIES: usize = 3;

fn small_prime_answer(n: &Integer) -> Option<PrimalityStatus> {
    if *n < 2 {
        return Some(PrimalityStatus::Composite);
    }
    if *n == 2 || *n == 3 {
        return Some(PrimalityStatus::Prime);
    }
    None
}

/// Run one Jacobi pass at the given R: certify every λ_p, then hand off
/// to FinalDivision. `None` means every cell was consistent but at least
/// one λ_p is unresolved (PROBABPRIME — call site retries with a bigger
/// R); `Some(Err)` means a cell or FinalDivision witnessed n composite.
fn run_one_pass(n: &Integer, r: u64) -> Result<Option<PrimalityStatus>, PrimalityError> {
    let config = Config::build_jacobi_with_r(r);
    let lambdas = match run_jacobi(n, &config) {
        Ok(lambdas) => lambdas,
        Err(()) => return Ok(Some(PrimalityStatus::Composite)),
    };

    if !config.rs.iter().all(|&(p, _)| lambdas.get(&p).copied().unwrap_or(false)) {
        return Ok(None);
    }

    match final_division(n, &config.s, config.r) {
        Ok(FinalDivisionOutcome::Prime) => Ok(Some(PrimalityStatus::Prime)),
        Ok(FinalDivisionOutcome::Composite { .. }) => Ok(Some(PrimalityStatus::Composite)),
        Err(PrimalityError::FinalDivisionInconclusive) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The top-level entry point: n >= 2 (rejects anything smaller, which
/// covers n = 0 and n = 1; the spec's "n < 4" direct-answer boundary
/// collapses to the composite/prime checks below for n = 2, 3). Runs the
/// default retry budget ([`DEFAULT_MAX_RETRIES`]); use
/// [`is_prime_with_retries`] to override it (what the CLI's
/// `--max-retries` flag threads through).
pub fn is_prime(n: &Integer) -> Result<PrimalityStatus, PrimalityError> {
    is_prime_with_retries(n, DEFAULT_MAX_RETRIES)
}

/// As [`is_prime`], but `max_retries` caps how many of `RETRY_SCALES`'
/// ×2/×3/×5 rescales are tried before the driver gives up with
/// `HardError` — `0` means a single pass at the tabulated R, no retries.
pub fn is_prime_with_retries(n: &Integer, max_retries: usize) -> Result<PrimalityStatus, PrimalityError> {
    if *n < 0 {
        return Err(PrimalityError::InvalidInput {
            reason: "n must be non-negative".to_string(),
        });
    }
    if let Some(status) = small_prime_answer(n) {
        return Ok(status);
    }
    if n.is_even() {
        return Ok(PrimalityStatus::Composite);
    }

    let n_bits = n.significant_bits();
    let base_r = Config::build_jacobi(n).r;

    if let Some(status) = run_one_pass(n, base_r)? {
        return Ok(status);
    }
    for &scale in RETRY_SCALES.iter().take(max_retries) {
        if let Some(status) = run_one_pass(n, base_r * scale)? {
            return Ok(status);
        }
    }

    Err(PrimalityError::HardError { n_bits })
}

/// The Gauss-flavor variant: a CLI convenience (`--flavor gauss`), not
/// part of the default entry point, which always runs Jacobi. Grows R
/// past its initial s^2 > n bound if a pass leaves a λ_p unresolved.
/// Runs the default retry budget; see [`is_prime_gauss_with_retries`].
pub fn is_prime_gauss(n: &Integer) -> Result<PrimalityStatus, PrimalityError> {
    is_prime_gauss_with_retries(n, DEFAULT_MAX_RETRIES as u32)
}

/// As [`is_prime_gauss`], but `max_retries` caps how many times R is
/// grown past its initial `s^2 > n` bound before giving up.
pub fn is_prime_gauss_with_retries(n: &Integer, max_retries: u32) -> Result<PrimalityStatus, PrimalityError> {
    if *n < 0 {
        return Err(PrimalityError::InvalidInput {
            reason: "n must be non-negative".to_string(),
        });
    }
    if let Some(status) = small_prime_answer(n) {
        return Ok(status);
    }
    if n.is_even() {
        return Ok(PrimalityStatus::Composite);
    }

    let mut config = Config::build_gauss(n);
    for _ in 0..=max_retries {
        let lambdas = match run_gauss(n, &config) {
            Ok(lambdas) => lambdas,
            Err(()) => return Ok(PrimalityStatus::Composite),
        };

        let all_certified = config
            .rs
            .iter()
            .all(|&(p, _)| lambdas.get(&p).copied().unwrap_or(false));

        if all_certified {
            return match final_division(n, &config.s, config.r) {
                Ok(FinalDivisionOutcome::Prime) => Ok(PrimalityStatus::Prime),
                Ok(FinalDivisionOutcome::Composite { .. }) => Ok(PrimalityStatus::Composite),
                Err(PrimalityError::FinalDivisionInconclusive) => {
                    config = Config::build_gauss_from(n, config.r);
                    continue;
                }
                Err(e) => return Err(e),
            };
        }

        config = Config::build_gauss_from(n, config.r);
    }

    Err(PrimalityError::HardError {
        n_bits: n.significant_bits(),
    })
}
