// Probabilistic encryption probe: repeated encryptions of one plaintext must
// all differ, otherwise the randomization source is broken or reused.

use crate::cryptosystem::{Ciphertext, HomomorphicCryptosystem, Plaintext};
use crate::result::{RiskLevel, TestResult};
use log::{debug, warn};
use std::collections::HashSet;

pub const PROBE_NAME: &str = "Probabilistic Encryption";

/// Plaintext encrypted repeatedly by the uniqueness probes.
pub const FIXTURE_MESSAGE: u64 = 12345;

/// Unique ratio at or above which encryption is considered fully randomized.
pub const UNIQUE_RATIO_STRONG: f64 = 0.95;

/// Unique ratio at or above which randomization is degraded but acceptable.
pub const UNIQUE_RATIO_ACCEPTABLE: f64 = 0.80;

/// Number of distinct ciphertexts among `iterations` encryptions of `message`.
/// Encryptions that fail contribute nothing.
pub fn count_distinct_encryptions<C>(cryptosystem: &C, message: u64, iterations: usize) -> usize
where
    C: HomomorphicCryptosystem + ?Sized,
{
    let plaintext = Plaintext::from(message);
    let mut ciphertexts: HashSet<Ciphertext> = HashSet::with_capacity(iterations);

    for i in 0..iterations {
        match cryptosystem.encrypt(&plaintext) {
            Ok(ciphertext) => {
                ciphertexts.insert(ciphertext);
            }
            Err(err) => warn!("encryption {} of fixture plaintext failed: {}", i, err),
        }
    }

    ciphertexts.len()
}

pub fn run<C>(cryptosystem: &C, iterations: usize) -> TestResult
where
    C: HomomorphicCryptosystem + ?Sized,
{
    let distinct = count_distinct_encryptions(cryptosystem, FIXTURE_MESSAGE, iterations);
    let unique_ratio = distinct as f64 / iterations as f64;
    debug!(
        "unique ciphertexts: {}/{} ({:.1}%)",
        distinct,
        iterations,
        unique_ratio * 100.0
    );

    let detail = format!(
        "{}/{} unique encryptions ({:.1}%)",
        distinct,
        iterations,
        unique_ratio * 100.0
    );

    if unique_ratio >= UNIQUE_RATIO_STRONG {
        TestResult::pass(
            PROBE_NAME,
            detail,
            RiskLevel::Low,
            "Probabilistic encryption is working correctly",
        )
    } else if unique_ratio >= UNIQUE_RATIO_ACCEPTABLE {
        TestResult::pass(
            PROBE_NAME,
            detail,
            RiskLevel::Medium,
            "Check the quality of the random number generator",
        )
    } else {
        TestResult::fail(
            PROBE_NAME,
            format!("Only {}", detail),
            RiskLevel::High,
            "Random number generator is inadequate: identical plaintexts produce repeated ciphertexts",
        )
    }
}
