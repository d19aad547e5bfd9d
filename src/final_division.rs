//! The trial-division-in-residue-class step that runs once every
//! auxiliary-prime congruence has passed. Every prime factor of n is
//! congruent to some power `n^k mod s`; walking those powers either
//! confirms n is prime (no power turns out to be a nontrivial divisor)
//! or produces the witness factor directly.

use crate::error::PrimalityError;
use rug::Integer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalDivisionOutcome {
    Prime,
    Composite { witness: Integer },
}

/// Walk `npow = n^k mod s` for `k = 1..R`. At each step, `rem = n mod
/// npow`: if `rem == 1` the walk terminates inconclusively in n's favor
/// (no contradiction found, and s^2 > n rules out a composite n having
/// room for two factors avoiding every residue class); if `rem == 0`
/// and `npow` is neither 1 nor n itself, `npow` is a genuine nontrivial
/// divisor of n.
pub fn final_division(
    n: &Integer,
    s: &Integer,
    r: u64,
) -> Result<FinalDivisionOutcome, PrimalityError> {
    if n <= &Integer::from(1u32) {
        return Err(PrimalityError::InvalidInput {
            reason: "n must be greater than 1".to_string(),
        });
    }

    let nmul = n.clone().rem_euc(s);
    if nmul == 0 {
        return Ok(FinalDivisionOutcome::Composite {
            witness: n.clone().gcd(s),
        });
    }
    let mut npow = nmul.clone();

    for _ in 1..r {
        let rem = n.clone().rem_euc(&npow);
        if rem == 1 {
            break;
        }
        if rem == 0 && npow != *n && npow != 1u32 {
            return Ok(FinalDivisionOutcome::Composite { witness: npow });
        }
        npow = Integer::from(&npow * &nmul).rem_euc(s);
    }

    Ok(FinalDivisionOutcome::Prime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prime_input_reports_prime() {
        let n = Integer::from(1009u64); // prime
        let s = Integer::from(1000u64);
        let outcome = final_division(&n, &s, 10).unwrap();
        assert_eq!(outcome, FinalDivisionOutcome::Prime);
    }

    #[test]
    fn composite_input_finds_a_witness() {
        let n = Integer::from(91u64); // 7 * 13
        let s = Integer::from(14u64); // n mod s = 7, a genuine nontrivial divisor
        match final_division(&n, &s, 5).unwrap() {
            FinalDivisionOutcome::Composite { witness } => {
                assert_eq!(Integer::from(&n % &witness), 0);
                assert!(witness > 1u32 && witness < n);
            }
            FinalDivisionOutcome::Prime => panic!("91 is not prime"),
        }
    }

    #[test]
    fn rejects_trivial_input() {
        let n = Integer::from(1u32);
        let s = Integer::from(2u32);
        assert!(final_division(&n, &s, 2).is_err());
    }
}
