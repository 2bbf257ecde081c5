pub mod analyzer;
pub mod cancel;
pub mod config;
pub mod cryptosystem;
pub mod error;
pub mod paillier;
pub mod primality;
pub mod report;
pub mod result;

#[cfg(test)]
mod testing;


pub use analyzer::{Clock, MonotonicClock, ProbeKind, SecurityAnalyzer};
pub use cancel::CancellationToken;
pub use config::AuditConfig;
pub use cryptosystem::{Ciphertext, HomomorphicCryptosystem, KeyDescriptor, Plaintext};
pub use error::{AuditError, CryptosystemError, Result};
pub use paillier::{KeyInfo, PaillierCryptosystem};
pub use report::{RiskGroup, SecurityReport};
pub use result::{RiskLevel, SecurityLevel, TestResult};

/// Run the full six-probe analysis against `cryptosystem` and aggregate the
/// results. The run stops between probes once `token` is cancelled.
pub fn run_security_analysis<C>(
    cryptosystem: &C,
    config: AuditConfig,
    token: &CancellationToken,
) -> Result<SecurityReport>
where
    C: HomomorphicCryptosystem + ?Sized,
{
    let mut analyzer = SecurityAnalyzer::new(cryptosystem, config)?;
    analyzer.run_all_with_cancellation(token)
}
