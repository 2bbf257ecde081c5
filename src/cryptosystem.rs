// Public contract between the security analyzer and the cryptosystem it probes.
// The analyzer never reaches behind this trait: every probe is expressed in terms
// of encrypt, decrypt, the two homomorphic operations and the key descriptor.

use crate::error::CryptosystemError;
use num_bigint::{BigInt, BigUint};
use std::fmt;

/// Read-only view of the key material an analyzer is allowed to inspect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDescriptor {
    /// Public modulus n = p * q
    pub n: BigUint,
    /// Public generator g
    pub g: BigUint,
    /// Private decryption exponent lambda
    pub lambda: BigUint,
}

impl KeyDescriptor {
    pub fn new(n: BigUint, g: BigUint, lambda: BigUint) -> Self {
        Self { n, g, lambda }
    }

    /// Bit length of the modulus.
    pub fn modulus_bits(&self) -> u64 {
        self.n.bits()
    }
}

/// A plaintext as it arrives at the encryption boundary.
///
/// Callers of a real deployment hand over untyped numeric input, so the
/// boundary type can carry negative, oversized and non-integer values. A sound
/// implementation rejects everything that is not an integer in `[0, n)`.
#[derive(Clone, Debug, PartialEq)]
pub enum Plaintext {
    /// Arbitrary-precision signed integer
    Integer(BigInt),
    /// Non-integer numeric input
    Decimal(f64),
}

impl Plaintext {
    /// Integer view of the plaintext, if it has one.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Plaintext::Integer(value) => Some(value),
            Plaintext::Decimal(_) => None,
        }
    }
}

impl From<u64> for Plaintext {
    fn from(value: u64) -> Self {
        Plaintext::Integer(BigInt::from(value))
    }
}

impl From<i64> for Plaintext {
    fn from(value: i64) -> Self {
        Plaintext::Integer(BigInt::from(value))
    }
}

impl From<BigUint> for Plaintext {
    fn from(value: BigUint) -> Self {
        Plaintext::Integer(BigInt::from(value))
    }
}

impl From<&BigUint> for Plaintext {
    fn from(value: &BigUint) -> Self {
        Plaintext::Integer(BigInt::from(value.clone()))
    }
}

impl From<BigInt> for Plaintext {
    fn from(value: BigInt) -> Self {
        Plaintext::Integer(value)
    }
}

impl From<f64> for Plaintext {
    fn from(value: f64) -> Self {
        Plaintext::Decimal(value)
    }
}

impl fmt::Display for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plaintext::Integer(value) => write!(f, "{}", value),
            Plaintext::Decimal(value) => write!(f, "{}", value),
        }
    }
}

/// An opaque ciphertext, an element of Z*_{n^2} for Paillier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ciphertext(BigUint);

impl Ciphertext {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    /// Number of bits in the binary rendering of the ciphertext.
    pub fn bit_len(&self) -> u64 {
        self.0.bits()
    }

    /// Number of set bits in the binary rendering of the ciphertext.
    pub fn count_ones(&self) -> u64 {
        self.0.count_ones()
    }
}

impl From<BigUint> for Ciphertext {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Ciphertext {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

/// An additively homomorphic public-key cryptosystem.
///
/// `homomorphic_add` must satisfy `decrypt(add(c1, c2)) == (m1 + m2) mod n` and
/// `homomorphic_multiply_constant` must satisfy `decrypt(mul(c, k)) == (m * k) mod n`.
pub trait HomomorphicCryptosystem {
    /// Encrypt a plaintext, rejecting anything outside `[0, n)` or non-integer.
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError>;

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError>;

    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError>;

    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError>;

    fn key_descriptor(&self) -> &KeyDescriptor;

    /// Convenience wrapper for the common case of an in-range integer plaintext.
    fn encrypt_value(&self, value: &BigUint) -> Result<Ciphertext, CryptosystemError> {
        self.encrypt(&Plaintext::from(value))
    }
}

impl<T: HomomorphicCryptosystem + ?Sized> HomomorphicCryptosystem for &T {
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError> {
        (**self).decrypt(ciphertext)
    }

    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError> {
        (**self).homomorphic_add(lhs, rhs)
    }

    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError> {
        (**self).homomorphic_multiply_constant(ciphertext, scalar)
    }

    fn key_descriptor(&self) -> &KeyDescriptor {
        (**self).key_descriptor()
    }
}
