// Homomorphic correctness probe: random additions and scalar multiplications
// carried out on ciphertexts must decrypt to the same result as the plaintext
// arithmetic mod n.

use super::{sample_range, sampling_cap};
use crate::cryptosystem::HomomorphicCryptosystem;
use crate::error::CryptosystemError;
use crate::result::{RiskLevel, TestResult};
use log::{debug, warn};
use num_bigint::BigUint;
use rand::Rng;

pub const PROBE_NAME: &str = "Homomorphic Correctness";

/// Scalars are drawn from `[1, SCALAR_BOUND)`.
pub const SCALAR_BOUND: u64 = 100;

/// Outcome of one (a, b, k) trial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrialOutcome {
    Passed,
    /// One entry per mismatching identity, or a single entry for an error
    Failed(Vec<String>),
}

impl TrialOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TrialOutcome::Passed)
    }

    fn into_failures(self) -> Vec<String> {
        match self {
            TrialOutcome::Passed => Vec::new(),
            TrialOutcome::Failed(failures) => failures,
        }
    }
}

/// Check both homomorphic identities for one set of operands.
pub fn run_trial<C>(cryptosystem: &C, index: usize, a: u64, b: u64, k: u64) -> TrialOutcome
where
    C: HomomorphicCryptosystem + ?Sized,
{
    match check_identities(cryptosystem, a, b, k) {
        Ok(failures) if failures.is_empty() => TrialOutcome::Passed,
        Ok(failures) => TrialOutcome::Failed(failures),
        Err(err) => TrialOutcome::Failed(vec![format!("Error in trial {}: {}", index, err)]),
    }
}

fn check_identities<C>(
    cryptosystem: &C,
    a: u64,
    b: u64,
    k: u64,
) -> Result<Vec<String>, CryptosystemError>
where
    C: HomomorphicCryptosystem + ?Sized,
{
    let n = &cryptosystem.key_descriptor().n;
    let (a_big, b_big, k_big) = (BigUint::from(a), BigUint::from(b), BigUint::from(k));
    let mut failures = Vec::new();

    let enc_a = cryptosystem.encrypt_value(&a_big)?;
    let enc_b = cryptosystem.encrypt_value(&b_big)?;

    let enc_sum = cryptosystem.homomorphic_add(&enc_a, &enc_b)?;
    let sum = cryptosystem.decrypt(&enc_sum)?;
    let expected_sum = (&a_big + &b_big) % n;
    if sum != expected_sum {
        failures.push(format!("Addition: {}+{} = {} != {}", a, b, sum, expected_sum));
    }

    let enc_product = cryptosystem.homomorphic_multiply_constant(&enc_a, &k_big)?;
    let product = cryptosystem.decrypt(&enc_product)?;
    let expected_product = (&a_big * &k_big) % n;
    if product != expected_product {
        failures.push(format!(
            "Multiplication: {}*{} = {} != {}",
            a, k, product, expected_product
        ));
    }

    Ok(failures)
}

pub fn run<C, R>(cryptosystem: &C, trials: usize, failure_report_limit: usize, rng: &mut R) -> TestResult
where
    C: HomomorphicCryptosystem + ?Sized,
    R: Rng + ?Sized,
{
    let cap = sampling_cap(&cryptosystem.key_descriptor().n);
    let mut failures = Vec::new();
    let mut failed_trials = 0usize;

    for index in 0..trials {
        let a = sample_range(rng, 1, cap);
        let b = sample_range(rng, 1, cap);
        let k = sample_range(rng, 1, SCALAR_BOUND);

        let outcome = run_trial(cryptosystem, index, a, b, k);
        if !outcome.is_passed() {
            failed_trials += 1;
            let trial_failures = outcome.into_failures();
            warn!("trial {} failed: {}", index, trial_failures.join("; "));
            failures.extend(trial_failures);
        }
    }

    debug!("homomorphic trials passed: {}/{}", trials - failed_trials, trials);

    if failures.is_empty() {
        TestResult::pass(
            PROBE_NAME,
            format!("All {} trials passed", trials),
            RiskLevel::Low,
            "Homomorphic operations are correct",
        )
    } else {
        let quoted: Vec<&str> = failures
            .iter()
            .take(failure_report_limit)
            .map(String::as_str)
            .collect();
        TestResult::fail(
            PROBE_NAME,
            format!(
                "{} of {} trials failed ({} failed checks)",
                failed_trials,
                trials,
                failures.len()
            ),
            RiskLevel::Critical,
            format!("Implementation is broken: [{}]", quoted.join("; ")),
        )
    }
}
