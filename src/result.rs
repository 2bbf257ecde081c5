use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative severity attached to every probe outcome.
///
/// Ordered from least to most severe. Severity is graded independently of
/// pass/fail: a passing probe can still carry `Medium` risk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// All levels, most severe first; the order reports are rendered in.
    pub const BY_SEVERITY: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Whether a report should quote the recommendation regardless of outcome.
    pub fn is_severe(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength grade of a key, derived from the modulus bit length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl SecurityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Low => "LOW",
            SecurityLevel::Medium => "MEDIUM",
            SecurityLevel::High => "HIGH",
            SecurityLevel::VeryHigh => "VERY HIGH",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single probe run. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    name: String,
    passed: bool,
    detail: String,
    risk_level: RiskLevel,
    recommendation: String,
}

impl TestResult {
    pub fn new(
        name: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
        risk_level: RiskLevel,
        recommendation: impl Into<String>,
    ) -> Self {
        debug_assert!(
            !(passed && risk_level == RiskLevel::Critical),
            "a passing result cannot carry CRITICAL risk"
        );
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
            risk_level,
            recommendation: recommendation.into(),
        }
    }

    /// Passing result with the given risk grade.
    pub fn pass(
        name: impl Into<String>,
        detail: impl Into<String>,
        risk_level: RiskLevel,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(name, true, detail, risk_level, recommendation)
    }

    /// Failing result with the given risk grade.
    pub fn fail(
        name: impl Into<String>,
        detail: impl Into<String>,
        risk_level: RiskLevel,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(name, false, detail, risk_level, recommendation)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "[{}] {}: {}", status, self.name, self.detail)
    }
}
