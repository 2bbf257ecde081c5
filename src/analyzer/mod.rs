// Security analyzer: binds one cryptosystem and runs the six probes against it,
// keeping every result in execution order.
//
// Each probe lives in its own module as a pure function of the cryptosystem,
// the configured sample counts and, where needed, an RNG or clock. The
// analyzer only coordinates: it invokes a probe and appends the result.

pub mod homomorphic;
pub mod input_validation;
pub mod key_strength;
pub mod probabilistic;
pub mod semantic;
pub mod timing;

pub use timing::{Clock, MonotonicClock, TimingMeasurement, TimingStatistics};

use crate::cancel::CancellationToken;
use crate::config::AuditConfig;
use crate::cryptosystem::HomomorphicCryptosystem;
use crate::error::{AuditError, Result};
use crate::report::SecurityReport;
use crate::result::TestResult;
use log::{debug, info};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on sampled operands, before the `n / 10` cap.
pub const MAX_SAMPLED_OPERAND: u64 = 1_000_000;

/// Exclusive upper bound for sampled operands: `min(1_000_000, n / 10)`.
pub fn sampling_cap(n: &BigUint) -> u64 {
    (n / 10u32)
        .to_u64()
        .map_or(MAX_SAMPLED_OPERAND, |tenth| tenth.min(MAX_SAMPLED_OPERAND))
}

/// Uniform sample from `[low, high)`; an empty range collapses to `low`.
pub fn sample_range<R: Rng + ?Sized>(rng: &mut R, low: u64, high: u64) -> u64 {
    if high <= low {
        low
    } else {
        rng.gen_range(low..high)
    }
}

/// The six probes, in the order a full analysis runs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeKind {
    ProbabilisticEncryption,
    HomomorphicCorrectness,
    KeyStrength,
    SemanticSecurity,
    InputValidation,
    SideChannelResistance,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 6] = [
        ProbeKind::ProbabilisticEncryption,
        ProbeKind::HomomorphicCorrectness,
        ProbeKind::KeyStrength,
        ProbeKind::SemanticSecurity,
        ProbeKind::InputValidation,
        ProbeKind::SideChannelResistance,
    ];

    /// Name carried by the results this probe produces.
    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::ProbabilisticEncryption => probabilistic::PROBE_NAME,
            ProbeKind::HomomorphicCorrectness => homomorphic::PROBE_NAME,
            ProbeKind::KeyStrength => key_strength::PROBE_NAME,
            ProbeKind::SemanticSecurity => semantic::PROBE_NAME,
            ProbeKind::InputValidation => input_validation::PROBE_NAME,
            ProbeKind::SideChannelResistance => timing::PROBE_NAME,
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs security probes against one cryptosystem and accumulates the results.
///
/// The result sequence is append-only: running a probe twice records two
/// results. Reports are derived from it on demand and never stored.
pub struct SecurityAnalyzer<'a, C: ?Sized, K = MonotonicClock> {
    /// Cryptosystem under test, only ever used through `&self` methods
    cryptosystem: &'a C,

    /// Sample counts and reporting limits
    config: AuditConfig,

    /// Source of sampled plaintexts and operands
    rng: ChaCha20Rng,

    /// Time source for the side-channel probe
    clock: K,

    /// Results in execution order
    results: Vec<TestResult>,
}

impl<'a, C> SecurityAnalyzer<'a, C, MonotonicClock>
where
    C: HomomorphicCryptosystem + ?Sized,
{
    /// Bind an analyzer to `cryptosystem`. Fails if `config` is invalid.
    pub fn new(cryptosystem: &'a C, config: AuditConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };

        Ok(Self {
            cryptosystem,
            config,
            rng,
            clock: MonotonicClock::new(),
            results: Vec::new(),
        })
    }
}

impl<'a, C, K> SecurityAnalyzer<'a, C, K>
where
    C: HomomorphicCryptosystem + ?Sized,
    K: Clock,
{
    /// Replace the time source used by the side-channel probe.
    pub fn with_clock<K2: Clock>(self, clock: K2) -> SecurityAnalyzer<'a, C, K2> {
        SecurityAnalyzer {
            cryptosystem: self.cryptosystem,
            config: self.config,
            rng: self.rng,
            clock,
            results: self.results,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn cryptosystem(&self) -> &C {
        self.cryptosystem
    }

    /// Results recorded so far, in execution order.
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }

    /// Aggregate the results recorded so far.
    pub fn report(&self) -> SecurityReport {
        SecurityReport::from_results(&self.results)
    }

    /// Run one probe and record its result.
    pub fn run_probe(&mut self, kind: ProbeKind) -> &TestResult {
        debug!("running probe: {}", kind);
        let cryptosystem = self.cryptosystem;

        let result = match kind {
            ProbeKind::ProbabilisticEncryption => {
                probabilistic::run(cryptosystem, self.config.probabilistic_iterations)
            }
            ProbeKind::HomomorphicCorrectness => homomorphic::run(
                cryptosystem,
                self.config.homomorphic_trials,
                self.config.failure_report_limit,
                &mut self.rng,
            ),
            ProbeKind::KeyStrength => key_strength::run(cryptosystem.key_descriptor()),
            ProbeKind::SemanticSecurity => {
                semantic::run(cryptosystem, self.config.semantic_iterations)
            }
            ProbeKind::InputValidation => input_validation::run(cryptosystem),
            ProbeKind::SideChannelResistance => timing::run(
                cryptosystem,
                self.config.timing_samples,
                &mut self.rng,
                &self.clock,
            ),
        };

        info!("{} [{}]", result, result.risk_level());
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    pub fn test_probabilistic_encryption(&mut self) -> &TestResult {
        self.run_probe(ProbeKind::ProbabilisticEncryption)
    }

    pub fn test_homomorphic_correctness(&mut self) -> &TestResult {
        self.run_probe(ProbeKind::HomomorphicCorrectness)
    }

    pub fn test_key_strength(&mut self) -> &TestResult {
        self.run_probe(ProbeKind::KeyStrength)
    }

    pub fn test_semantic_security(&mut self) -> &TestResult {
        self.run_probe(ProbeKind::SemanticSecurity)
    }

    pub fn test_input_validation(&mut self) -> &TestResult {
        self.run_probe(ProbeKind::InputValidation)
    }

    pub fn test_side_channel_resistance(&mut self) -> &TestResult {
        self.run_probe(ProbeKind::SideChannelResistance)
    }

    /// Run all six probes in order and aggregate.
    pub fn run_all(&mut self) -> SecurityReport {
        for kind in ProbeKind::ALL {
            self.run_probe(kind);
        }
        self.report()
    }

    /// Like [`run_all`](Self::run_all), but checks `token` before each probe.
    ///
    /// On cancellation the results gathered so far stay in the analyzer and no
    /// report is produced.
    pub fn run_all_with_cancellation(&mut self, token: &CancellationToken) -> Result<SecurityReport> {
        let total = ProbeKind::ALL.len();
        for (completed, kind) in ProbeKind::ALL.into_iter().enumerate() {
            if token.is_cancelled() {
                info!("analysis interrupted after {} of {} probes", completed, total);
                return Err(AuditError::Interrupted { completed, total });
            }
            self.run_probe(kind);
        }
        Ok(self.report())
    }
}
