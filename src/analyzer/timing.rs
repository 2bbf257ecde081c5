// Side-channel (timing) probe: compares mean encryption time of small and large
// plaintexts. Wall-clock timing on shared hardware is noisy, so this is a
// smoke test for gross data-dependent timing rather than a constant-time proof.

use super::{sample_range, sampling_cap};
use crate::cryptosystem::HomomorphicCryptosystem;
use crate::result::{RiskLevel, TestResult};
use log::{debug, warn};
use num_bigint::BigUint;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

pub const PROBE_NAME: &str = "Side-Channel Resistance";

/// Small plaintexts are drawn from `[1, SMALL_PLAINTEXT_BOUND)`.
pub const SMALL_PLAINTEXT_BOUND: u64 = 1_000;

/// Large plaintexts start here.
pub const LARGE_PLAINTEXT_FLOOR: u64 = 100_000;

/// Relative difference below which timing is considered uniform.
pub const UNIFORM_THRESHOLD: f64 = 0.10;

/// Relative difference at or above which timing is considered exploitable.
pub const VULNERABLE_THRESHOLD: f64 = 0.30;

/// Monotonic time source used to time individual encryptions.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl<K: Clock + ?Sized> Clock for &K {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Summary statistics over one group of timed encryptions, in nanoseconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStatistics {
    pub sample_count: usize,
    pub mean_ns: f64,
    pub median_ns: f64,
    pub std_deviation_ns: f64,
    /// Standard deviation relative to the mean; 0 when the mean is 0
    pub coefficient_of_variation: f64,
}

impl TimingStatistics {
    pub fn from_durations(durations: &[Duration]) -> Self {
        let sample_count = durations.len();
        if sample_count == 0 {
            return Self::default();
        }

        let mut nanos: Vec<f64> = durations.iter().map(|d| d.as_nanos() as f64).collect();
        let mean_ns = nanos.iter().sum::<f64>() / sample_count as f64;

        nanos.sort_by(f64::total_cmp);
        let median_ns = if sample_count % 2 == 0 {
            (nanos[sample_count / 2 - 1] + nanos[sample_count / 2]) / 2.0
        } else {
            nanos[sample_count / 2]
        };

        let variance = nanos
            .iter()
            .map(|&t| {
                let diff = t - mean_ns;
                diff * diff
            })
            .sum::<f64>()
            / sample_count as f64;
        let std_deviation_ns = variance.sqrt();
        let coefficient_of_variation = if mean_ns > 0.0 {
            std_deviation_ns / mean_ns
        } else {
            0.0
        };

        Self {
            sample_count,
            mean_ns,
            median_ns,
            std_deviation_ns,
            coefficient_of_variation,
        }
    }
}

impl fmt::Display for TimingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean {:.1}us, median {:.1}us, sd {:.1}us, cv {:.3}",
            self.mean_ns / 1_000.0,
            self.median_ns / 1_000.0,
            self.std_deviation_ns / 1_000.0,
            self.coefficient_of_variation
        )
    }
}

/// Timings of both plaintext groups and their relative difference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingMeasurement {
    pub small: TimingStatistics,
    pub large: TimingStatistics,
    /// `|mean_large - mean_small| / mean_small`
    pub relative_difference: f64,
}

impl TimingMeasurement {
    pub fn from_groups(small: &[Duration], large: &[Duration]) -> Self {
        let small = TimingStatistics::from_durations(small);
        let large = TimingStatistics::from_durations(large);
        let relative_difference = if small.mean_ns > 0.0 {
            (large.mean_ns - small.mean_ns).abs() / small.mean_ns
        } else {
            0.0
        };
        Self {
            small,
            large,
            relative_difference,
        }
    }
}

fn time_encryption<C, K>(cryptosystem: &C, clock: &K, m: u64) -> Duration
where
    C: HomomorphicCryptosystem + ?Sized,
    K: Clock + ?Sized,
{
    let plaintext = BigUint::from(m);
    let start = clock.now();
    let outcome = cryptosystem.encrypt_value(&plaintext);
    let elapsed = clock.now().saturating_sub(start);
    if let Err(err) = outcome {
        warn!("timed encryption of {} failed: {}", m, err);
    }
    elapsed
}

/// Time `samples / 2` encryptions of small plaintexts and as many of large ones.
pub fn measure<C, R, K>(cryptosystem: &C, samples: usize, rng: &mut R, clock: &K) -> TimingMeasurement
where
    C: HomomorphicCryptosystem + ?Sized,
    R: Rng + ?Sized,
    K: Clock + ?Sized,
{
    let per_group = samples / 2;
    let cap = sampling_cap(&cryptosystem.key_descriptor().n);

    let small: Vec<Duration> = (0..per_group)
        .map(|_| {
            let m = sample_range(rng, 1, SMALL_PLAINTEXT_BOUND);
            time_encryption(cryptosystem, clock, m)
        })
        .collect();

    let large: Vec<Duration> = (0..per_group)
        .map(|_| {
            let m = sample_range(rng, LARGE_PLAINTEXT_FLOOR, cap);
            time_encryption(cryptosystem, clock, m)
        })
        .collect();

    TimingMeasurement::from_groups(&small, &large)
}

pub fn run<C, R, K>(cryptosystem: &C, samples: usize, rng: &mut R, clock: &K) -> TestResult
where
    C: HomomorphicCryptosystem + ?Sized,
    R: Rng + ?Sized,
    K: Clock + ?Sized,
{
    let measurement = measure(cryptosystem, samples, rng, clock);
    debug!(
        "timed {} small and {} large encryptions",
        measurement.small.sample_count, measurement.large.sample_count
    );

    let diff = measurement.relative_difference;
    let detail = format!(
        "Timing difference: {:.1}% (small: {}; large: {})",
        diff * 100.0,
        measurement.small,
        measurement.large
    );

    if diff < UNIFORM_THRESHOLD {
        TestResult::pass(
            PROBE_NAME,
            detail,
            RiskLevel::Low,
            "Timing is consistent across plaintext sizes",
        )
    } else if diff < VULNERABLE_THRESHOLD {
        TestResult::pass(
            PROBE_NAME,
            detail,
            RiskLevel::Medium,
            "Some timing variation detected; review the implementation for constant-time operations",
        )
    } else {
        TestResult::fail(
            PROBE_NAME,
            detail,
            RiskLevel::High,
            "Significant timing differences detected; vulnerable to timing attacks",
        )
    }
}
