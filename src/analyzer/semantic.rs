// Semantic security probe: ciphertext uniqueness plus a coarse bit-pattern
// balance check over encryptions of distinct small plaintexts.

use super::probabilistic::{
    count_distinct_encryptions, FIXTURE_MESSAGE, UNIQUE_RATIO_ACCEPTABLE, UNIQUE_RATIO_STRONG,
};
use crate::cryptosystem::{Ciphertext, HomomorphicCryptosystem};
use crate::result::{RiskLevel, TestResult};
use log::{debug, warn};
use num_bigint::BigUint;

pub const PROBE_NAME: &str = "Semantic Security";

/// Plaintexts whose ciphertexts are inspected for bit balance.
pub const BALANCE_PLAINTEXTS: std::ops::RangeInclusive<u64> = 1..=10;

/// Maximum distance from a 50% ones ratio still considered balanced.
pub const MAX_BIT_BALANCE: f64 = 0.1;

/// Fraction of set bits in the binary rendering of a ciphertext.
pub fn ones_ratio(ciphertext: &Ciphertext) -> f64 {
    let bits = ciphertext.bit_len();
    if bits == 0 {
        return 0.0;
    }
    ciphertext.count_ones() as f64 / bits as f64
}

/// Average ones ratio over encryptions of [`BALANCE_PLAINTEXTS`].
pub fn average_ones_ratio<C>(cryptosystem: &C) -> f64
where
    C: HomomorphicCryptosystem + ?Sized,
{
    let ratios: Vec<f64> = BALANCE_PLAINTEXTS
        .filter_map(|m| match cryptosystem.encrypt_value(&BigUint::from(m)) {
            Ok(ciphertext) => Some(ones_ratio(&ciphertext)),
            Err(err) => {
                warn!("encryption of {} failed during bit analysis: {}", m, err);
                None
            }
        })
        .collect();

    if ratios.is_empty() {
        return 0.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

pub fn run<C>(cryptosystem: &C, iterations: usize) -> TestResult
where
    C: HomomorphicCryptosystem + ?Sized,
{
    let distinct = count_distinct_encryptions(cryptosystem, FIXTURE_MESSAGE, iterations);
    let unique_ratio = distinct as f64 / iterations as f64;

    let avg_ones_ratio = average_ones_ratio(cryptosystem);
    let bit_balance = (avg_ones_ratio - 0.5).abs();
    debug!(
        "unique ciphertexts: {}/{}, average ones ratio {:.3}, bit balance {:.3}",
        distinct, iterations, avg_ones_ratio, bit_balance
    );

    let detail = format!(
        "Unique ratio: {:.1}%, Bit balance: {:.3}",
        unique_ratio * 100.0,
        bit_balance
    );

    if unique_ratio >= UNIQUE_RATIO_STRONG && bit_balance < MAX_BIT_BALANCE {
        TestResult::pass(
            PROBE_NAME,
            detail,
            RiskLevel::Low,
            "Semantic security properties look good",
        )
    } else if unique_ratio >= UNIQUE_RATIO_ACCEPTABLE {
        TestResult::pass(
            PROBE_NAME,
            detail,
            RiskLevel::Medium,
            "Semantic security is adequate; monitor randomness quality",
        )
    } else {
        TestResult::fail(
            PROBE_NAME,
            detail,
            RiskLevel::High,
            "Ciphertexts leak plaintext equality; semantic security is compromised",
        )
    }
}
