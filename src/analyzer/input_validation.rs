// Input validation probe: adversarial plaintexts must be rejected at the
// encryption boundary. A rejection is the desired outcome; silent acceptance
// is recorded as an issue.

use crate::cryptosystem::{HomomorphicCryptosystem, Plaintext};
use crate::result::{RiskLevel, TestResult};
use log::{debug, warn};
use num_bigint::{BigInt, BigUint};
use num_traits::One;

pub const PROBE_NAME: &str = "Input Validation";

/// Exponent of the oversized plaintext 2^HUGE_PLAINTEXT_BITS.
pub const HUGE_PLAINTEXT_BITS: u32 = 1024;

/// What a cryptosystem must do with a case's plaintext.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// Encryption must fail
    Reject,
    /// Encryption may fail; if it succeeds the value must decrypt unchanged
    RejectOrRoundTrip,
}

/// One adversarial encryption attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationCase {
    pub plaintext: Plaintext,
    pub expectation: Expectation,
    /// Issue recorded when the expectation is violated
    pub issue: &'static str,
}

/// Adversarial inputs for a modulus `n`, in the order they are attempted.
///
/// The 2^1024 case is only included while it is below `n`. It is then a legal
/// plaintext, so it probes arithmetic on wide values rather than rejection.
pub fn validation_cases(n: &BigUint) -> Vec<ValidationCase> {
    let mut cases = vec![
        ValidationCase {
            plaintext: Plaintext::from(-1i64),
            expectation: Expectation::Reject,
            issue: "Accepts negative values",
        },
        ValidationCase {
            plaintext: Plaintext::from(n.clone()),
            expectation: Expectation::Reject,
            issue: "Accepts values >= n",
        },
        ValidationCase {
            plaintext: Plaintext::from(3.14),
            expectation: Expectation::Reject,
            issue: "Accepts non-integer values",
        },
    ];

    let huge = BigUint::one() << HUGE_PLAINTEXT_BITS;
    if &huge < n {
        cases.push(ValidationCase {
            plaintext: Plaintext::Integer(BigInt::from(huge)),
            expectation: Expectation::RejectOrRoundTrip,
            issue: "Corrupts values requiring more than 1024 bits",
        });
    }

    cases
}

/// Attempt one case; `Some(issue)` when the cryptosystem misbehaves.
fn check_case<C>(cryptosystem: &C, case: &ValidationCase) -> Option<&'static str>
where
    C: HomomorphicCryptosystem + ?Sized,
{
    let ciphertext = match cryptosystem.encrypt(&case.plaintext) {
        Ok(ciphertext) => ciphertext,
        Err(err) => {
            debug!("rejected plaintext {}: {}", case.plaintext, err);
            return None;
        }
    };

    match case.expectation {
        Expectation::Reject => Some(case.issue),
        Expectation::RejectOrRoundTrip => {
            let expected = case.plaintext.as_integer().and_then(BigInt::to_biguint);
            match cryptosystem.decrypt(&ciphertext) {
                Ok(decrypted) if Some(&decrypted) == expected.as_ref() => None,
                Ok(_) => Some(case.issue),
                Err(err) => {
                    debug!("decrypting accepted plaintext {} failed: {}", case.plaintext, err);
                    Some(case.issue)
                }
            }
        }
    }
}

pub fn run<C>(cryptosystem: &C) -> TestResult
where
    C: HomomorphicCryptosystem + ?Sized,
{
    let cases = validation_cases(&cryptosystem.key_descriptor().n);
    let mut issues: Vec<&'static str> = Vec::new();

    for case in &cases {
        if let Some(issue) = check_case(cryptosystem, case) {
            warn!("invalid handling of plaintext {}: {}", case.plaintext, issue);
            issues.push(issue);
        }
    }

    if issues.is_empty() {
        let mut detail = format!("All {} input validation checks passed", cases.len());
        if cases.len() < 4 {
            detail.push_str(" (2^1024 check skipped: not below n)");
        }
        TestResult::pass(
            PROBE_NAME,
            detail,
            RiskLevel::Low,
            "Input validation is implemented correctly",
        )
    } else {
        TestResult::fail(
            PROBE_NAME,
            format!("Issues found: {}", issues.join(", ")),
            RiskLevel::Medium,
            format!("Fix input validation to prevent attacks: {}", issues.join("; ")),
        )
    }
}
