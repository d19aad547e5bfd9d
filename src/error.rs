//! Error taxonomy for primality proving: malformed input is a hard error,
//! a cyclotomic congruence step failing under a retry budget becomes a
//! probabilistic result rather than a panic, and a final division that
//! can't resolve within its iteration bound is reported rather than
//! looping forever.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimalityError {
    /// n < 2, or n is even (only 2 itself is handled as a trivial prime).
    InvalidInput { reason: String },
    /// No (q, p, k) configuration could be found satisfying `s^2 > n`
    /// (Gauss flavor) or the tabulated bit-length bound (Jacobi flavor)
    /// within the allotted search.
    HardError { n_bits: u32 },
    /// The final residue-class trial division found no witness within
    /// its bound — n is neither provably prime nor provably composite
    /// with this configuration.
    FinalDivisionInconclusive,
    /// A required discrete-log or primitive-root computation over F_q
    /// failed — indicates a malformed or non-prime q reached the table
    /// builder. Corresponds to conditions the theory says cannot occur;
    /// not expected to surface outside development.
    InvariantFailure { detail: String },
}

impl fmt::Display for PrimalityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimalityError::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            PrimalityError::HardError { n_bits } => write!(
                f,
                "no configuration satisfies the required bound for a {n_bits}-bit input"
            ),
            PrimalityError::FinalDivisionInconclusive => {
                write!(f, "final division found no conclusive witness")
            }
            PrimalityError::InvariantFailure { detail } => {
                write!(f, "arithmetic invariant violated: {detail}")
            }
        }
    }
}

impl std::error::Error for PrimalityError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimalityStatus {
    Prime,
    Composite,
    /// Every congruence passed but the run never reached a large enough
    /// `s` to certify primality outright (can occur when retries are
    /// exhausted under the Gauss flavor for this n); callers may choose
    /// to retry with a larger configuration.
    ProbablyPrime,
}

impl fmt::Display for PrimalityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimalityStatus::Prime => write!(f, "PRIME"),
            PrimalityStatus::Composite => write!(f, "COMPOSITE"),
            PrimalityStatus::ProbablyPrime => write!(f, "PROBABPRIME"),
        }
    }
}

/// The per-cell verdict a Jacobi/Gauss congruence check produces, kept
/// distinct rather than collapsed into a single `Err(())`: a `p`/`q`
/// sharing a factor with `n` is a different kind of witness than a
/// congruence that's merely inconclusive, which is itself different from
/// a Jacobi/Gauss sum power that isn't a root of unity at all (the
/// "not even congruent" case §7 calls out separately from a clean
/// `λ_p = 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellVerdict {
    /// `gcd(p, n) > 1` or `gcd(q, n) > 1` — n is composite outright,
    /// witnessed directly by the shared factor.
    GcdWitness,
    /// The Jacobi/Gauss sum power tested was not a root of unity at all
    /// — n is composite, witnessed by the congruence failing outright
    /// rather than merely leaving λ_p unresolved.
    NotARootOfUnity,
    /// The congruence passed but did not certify λ_p = 1 for this cell
    /// (e.g. the root-of-unity exponent found is divisible by p). Not a
    /// composite witness — the caller may still certify this prime via
    /// another cell, or retry with a larger R.
    Unresolved,
    /// λ_p = 1 is certified for this cell's prime.
    Certified(u64),
}
