// Key strength probe: grades the modulus by bit length and checks it for
// small prime factors, which are a structural defect regardless of size.

use crate::cryptosystem::KeyDescriptor;
use crate::primality::small_prime_factors;
use crate::result::{RiskLevel, SecurityLevel, TestResult};
use log::{debug, warn};

pub const PROBE_NAME: &str = "Key Strength Analysis";

/// Grade for a given modulus size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrengthGrade {
    pub security_level: SecurityLevel,
    pub risk_level: RiskLevel,
    pub recommendation: &'static str,
}

/// Map a modulus bit length onto a security level and risk.
pub fn classify_bit_length(bits: u64) -> StrengthGrade {
    match bits {
        4096.. => StrengthGrade {
            security_level: SecurityLevel::VeryHigh,
            risk_level: RiskLevel::Low,
            recommendation: "Key is very strong for all applications",
        },
        3072.. => StrengthGrade {
            security_level: SecurityLevel::High,
            risk_level: RiskLevel::Low,
            recommendation: "Key is adequate for production applications",
        },
        2048.. => StrengthGrade {
            security_level: SecurityLevel::Medium,
            risk_level: RiskLevel::Medium,
            recommendation: "Key is adequate for development; upgrade to 3072 bits or more for production",
        },
        _ => StrengthGrade {
            security_level: SecurityLevel::Low,
            risk_level: RiskLevel::High,
            recommendation: "Key is too weak for serious use",
        },
    }
}

pub fn run(key: &KeyDescriptor) -> TestResult {
    let bits = key.modulus_bits();
    let grade = classify_bit_length(bits);
    let detail = format!("{}-bit key, security level: {}", bits, grade.security_level);
    debug!("key size: {} bits ({})", bits, grade.security_level);

    let factors = small_prime_factors(&key.n);
    if !factors.is_empty() {
        warn!("modulus has small prime factors: {:?}", factors);
        return TestResult::fail(
            PROBE_NAME,
            detail,
            RiskLevel::Critical,
            format!("Modulus n has small prime factors {:?}", factors),
        );
    }

    TestResult::new(
        PROBE_NAME,
        grade.security_level >= SecurityLevel::Medium,
        detail,
        grade.risk_level,
        grade.recommendation,
    )
}
