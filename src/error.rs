use thiserror::Error;

/// Errors raised by a cryptosystem at its public boundary.
///
/// The validation probe treats any of these coming out of `encrypt` as a
/// correct rejection; inside a homomorphic trial they are recorded as failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CryptosystemError {
    #[error("Plaintext must be non-negative")]
    NegativePlaintext,

    #[error("Plaintext must be smaller than the modulus ({modulus_bits}-bit)")]
    PlaintextOutOfRange {
        modulus_bits: u64,
    },

    #[error("Plaintext must be an integer, got {0}")]
    NonIntegerPlaintext(f64),

    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error("No modular inverse exists")]
    NoModularInverse,

    #[error("Invalid key size: {0}")]
    InvalidKeySize(String),
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cryptosystem error: {0}")]
    Cryptosystem(#[from] CryptosystemError),

    #[error("Security analysis interrupted after {completed} of {total} probes")]
    Interrupted {
        completed: usize,
        total: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
