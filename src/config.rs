// Configuration for a security analysis run.
// Sample counts, reporting limits and the optional RNG seed all live here so a
// run can be reproduced exactly from its configuration.

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};

/// Parameters controlling how much sampling each probe performs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Encryptions of the fixture plaintext in the probabilistic-encryption probe
    pub probabilistic_iterations: usize,

    /// Random (a, b, k) trials in the homomorphic-correctness probe
    pub homomorphic_trials: usize,

    /// Encryptions of the fixture plaintext in the semantic-security probe
    pub semantic_iterations: usize,

    /// Total timed encryptions in the side-channel probe, split evenly between
    /// small and large plaintexts
    pub timing_samples: usize,

    /// Maximum number of failing cases quoted in a recommendation
    pub failure_report_limit: usize,

    /// Seed for plaintext sampling; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            probabilistic_iterations: 100,
            homomorphic_trials: 50,
            semantic_iterations: 100,
            timing_samples: 100,
            failure_report_limit: 3,
            seed: None,
        }
    }
}

impl AuditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduced sampling for smoke runs and CI.
    pub fn quick() -> Self {
        Self {
            probabilistic_iterations: 20,
            homomorphic_trials: 10,
            semantic_iterations: 20,
            timing_samples: 40,
            ..Self::default()
        }
    }

    /// Heavier sampling for a pre-release audit. Timing results in particular
    /// become far less noisy with more samples.
    pub fn thorough() -> Self {
        Self {
            probabilistic_iterations: 500,
            homomorphic_trials: 200,
            semantic_iterations: 500,
            timing_samples: 1000,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_probabilistic_iterations(mut self, iterations: usize) -> Self {
        self.probabilistic_iterations = iterations;
        self
    }

    pub fn with_homomorphic_trials(mut self, trials: usize) -> Self {
        self.homomorphic_trials = trials;
        self
    }

    pub fn with_semantic_iterations(mut self, iterations: usize) -> Self {
        self.semantic_iterations = iterations;
        self
    }

    pub fn with_timing_samples(mut self, samples: usize) -> Self {
        self.timing_samples = samples;
        self
    }

    /// Reject configurations under which a probe cannot produce a ratio.
    pub fn validate(&self) -> Result<()> {
        if self.probabilistic_iterations == 0 {
            return Err(AuditError::InvalidConfig(
                "probabilistic_iterations must be at least 1".to_string(),
            ));
        }

        if self.homomorphic_trials == 0 {
            return Err(AuditError::InvalidConfig(
                "homomorphic_trials must be at least 1".to_string(),
            ));
        }

        if self.semantic_iterations == 0 {
            return Err(AuditError::InvalidConfig(
                "semantic_iterations must be at least 1".to_string(),
            ));
        }

        // both timing groups need at least one sample
        if self.timing_samples < 2 {
            return Err(AuditError::InvalidConfig(format!(
                "timing_samples must be at least 2, got {}",
                self.timing_samples
            )));
        }

        if self.failure_report_limit == 0 {
            return Err(AuditError::InvalidConfig(
                "failure_report_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
