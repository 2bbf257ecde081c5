// Report aggregation over a sequence of probe results.
// A report is a pure function of the results: building it twice from the same
// sequence yields equal reports, and nothing is mutated.

use crate::error::Result;
use crate::result::{RiskLevel, TestResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Results sharing one risk level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskGroup {
    pub risk_level: RiskLevel,
    pub results: Vec<TestResult>,
}

/// Aggregated view of an analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    /// Number of results aggregated
    total: usize,

    /// Number of passing results
    passed: usize,

    /// `passed / total`, or 0.0 for an empty run
    pass_ratio: f64,

    /// One group per risk level, most severe first; empty groups included
    groups: Vec<RiskGroup>,
}

impl SecurityReport {
    pub fn from_results(results: &[TestResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();
        let pass_ratio = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };

        let groups = RiskLevel::BY_SEVERITY
            .into_iter()
            .map(|risk_level| RiskGroup {
                risk_level,
                results: results
                    .iter()
                    .filter(|r| r.risk_level() == risk_level)
                    .cloned()
                    .collect(),
            })
            .collect();

        Self {
            total,
            passed,
            pass_ratio,
            groups,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn pass_ratio(&self) -> f64 {
        self.pass_ratio
    }

    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }

    pub fn groups(&self) -> &[RiskGroup] {
        &self.groups
    }

    /// Results graded at `level`, in execution order.
    pub fn bucket(&self, level: RiskLevel) -> &[TestResult] {
        self.groups
            .iter()
            .find(|group| group.risk_level == level)
            .map(|group| group.results.as_slice())
            .unwrap_or(&[])
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SecurityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SECURITY ANALYSIS REPORT")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(
            f,
            "Overall Score: {}/{} tests passed ({:.1}%)",
            self.passed,
            self.total,
            self.pass_ratio * 100.0
        )?;

        for group in self.groups.iter().filter(|g| !g.results.is_empty()) {
            writeln!(f)?;
            writeln!(f, "{} RISK ({} items):", group.risk_level, group.results.len())?;
            for result in &group.results {
                let status = if result.passed() { "PASS" } else { "FAIL" };
                writeln!(f, "  [{}] {}: {}", status, result.name(), result.detail())?;
                if !result.passed() || group.risk_level.is_severe() {
                    writeln!(f, "    Recommendation: {}", result.recommendation())?;
                }
            }
        }

        Ok(())
    }
}
