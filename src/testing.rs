// Shared fixtures for unit and integration tests: fixed Paillier primes and
// stub cryptosystems with deliberately broken behaviour.

use crate::analyzer::Clock;
use crate::cryptosystem::{Ciphertext, HomomorphicCryptosystem, KeyDescriptor, Plaintext};
use crate::error::CryptosystemError;
use crate::paillier::PaillierCryptosystem;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

const P_256: &str = "d813d7d15fa71c15422d042cb225f65f1d1dbbf27c5cb17541c85c85bb70685d";
const Q_256: &str = "ccfff9497998ec59fc5002c4ee2a131d6179f8ae20bb413f10bb9e1b42271a51";

const P_1024: &str = concat!(
    "dd421c503c8007ebdb9be0018e8f762f2bf786c8846d152fb46dd1eb60b74b9e",
    "34e6c8aa88db049c71d305813dbde6f917db618a99e578a5c4f35d096e03d54d",
    "d73cd835f880b967ca20f7b760daaa9456c51399e60bfe90411ac44742b8e4d4",
    "e7aa65beabb7bdf560f6a8f088337ec382fcd6a1ab61b7e0b7df4db9ccd9caf1",
);
const Q_1024: &str = concat!(
    "f8b6daba20fa74946ca45c384fdcf28de16d1ae3e26493339e0cc448c5df1bf0",
    "90303b1ee79c397e8a2c0604c3e3b8ac6ba4793e2709de7a34683beb4613828b",
    "78a4d43bb72359baba4528846676847784c0e0dcb0edf8d1aa334534af0e6d6c",
    "038db8924ac91e4074822c5a1fbb2b2994db2f68496efbc2a540c153ce7fff59",
);

fn hex(value: &str) -> BigUint {
    BigUint::parse_bytes(value.as_bytes(), 16).expect("fixture primes are valid hex")
}

/// Two 256-bit primes whose product is a 512-bit modulus.
pub fn fixture_primes_512() -> (BigUint, BigUint) {
    (hex(P_256), hex(Q_256))
}

/// Two 1024-bit primes whose product is a 2048-bit modulus.
pub fn fixture_primes_2048() -> (BigUint, BigUint) {
    (hex(P_1024), hex(Q_1024))
}

/// Reference Paillier over a 512-bit modulus with deterministic randomness.
pub fn paillier_512() -> PaillierCryptosystem {
    let (p, q) = fixture_primes_512();
    PaillierCryptosystem::from_primes(&p, &q)
        .expect("fixture primes form a valid key")
        .with_rng(ChaCha20Rng::seed_from_u64(512))
}

/// Reference Paillier over a 2048-bit modulus with deterministic randomness.
pub fn paillier_2048() -> PaillierCryptosystem {
    let (p, q) = fixture_primes_2048();
    PaillierCryptosystem::from_primes(&p, &q)
        .expect("fixture primes form a valid key")
        .with_rng(ChaCha20Rng::seed_from_u64(2048))
}

/// An odd modulus of exactly `bits` bits with no factor below 50.
pub fn modulus_with_bits(bits: u64) -> BigUint {
    // 2^(bits-1) + 1 is odd; bump by 2 until no small prime divides it
    let mut n = (BigUint::one() << (bits - 1)) + BigUint::one();
    while !crate::primality::small_prime_factors(&n).is_empty() {
        n += 2u32;
    }
    n
}

/// Descriptor-only key with the given modulus.
pub fn key_with_modulus(n: BigUint) -> KeyDescriptor {
    let g = &n + 1u32;
    KeyDescriptor::new(n, g, BigUint::from(1u32))
}

/// Plaintext-in-the-clear "cryptosystem": ciphertext = m + nonce * n, so the
/// homomorphic identities hold and every encryption is unique, with no cost.
pub struct TransparentStub {
    key: KeyDescriptor,
    nonce: Cell<u64>,
    nonce_pool: Option<u64>,
}

impl TransparentStub {
    pub fn new(n: BigUint) -> Self {
        Self {
            key: key_with_modulus(n),
            nonce: Cell::new(1),
            nonce_pool: None,
        }
    }

    /// Cycle through nonces `1..=pool`, so at most `pool` distinct
    /// ciphertexts exist per plaintext while bit patterns stay balanced.
    pub fn with_nonce_pool(n: BigUint, pool: u64) -> Self {
        Self {
            nonce_pool: Some(pool),
            ..Self::new(n)
        }
    }

    fn next_nonce(&self) -> u64 {
        let nonce = self.nonce.get();
        self.nonce.set(nonce + 1);
        match self.nonce_pool {
            Some(pool) => (nonce - 1) % pool + 1,
            None => nonce,
        }
    }
}

impl HomomorphicCryptosystem for TransparentStub {
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError> {
        let m = strict_plaintext(plaintext, &self.key.n)?;
        Ok(Ciphertext::new(m + &self.key.n * self.next_nonce()))
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError> {
        Ok(ciphertext.as_biguint() % &self.key.n)
    }

    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError> {
        Ok(Ciphertext::new(lhs.as_biguint() + rhs.as_biguint()))
    }

    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError> {
        Ok(Ciphertext::new(ciphertext.as_biguint() * scalar))
    }

    fn key_descriptor(&self) -> &KeyDescriptor {
        &self.key
    }
}

/// Reject everything that is not an integer in `[0, n)`.
pub fn strict_plaintext(plaintext: &Plaintext, n: &BigUint) -> Result<BigUint, CryptosystemError> {
    match plaintext {
        Plaintext::Decimal(value) => Err(CryptosystemError::NonIntegerPlaintext(*value)),
        Plaintext::Integer(value) if value.sign() == Sign::Minus => {
            Err(CryptosystemError::NegativePlaintext)
        }
        Plaintext::Integer(value) if value.magnitude() >= n => {
            Err(CryptosystemError::PlaintextOutOfRange { modulus_bits: n.bits() })
        }
        Plaintext::Integer(value) => Ok(value.magnitude().clone()),
    }
}

/// Deterministic "encryption": every plaintext maps to the same ciphertext.
pub struct ConstantCiphertextStub {
    key: KeyDescriptor,
}

impl ConstantCiphertextStub {
    pub fn new() -> Self {
        let (p, q) = fixture_primes_512();
        Self { key: key_with_modulus(p * q) }
    }
}

impl HomomorphicCryptosystem for ConstantCiphertextStub {
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError> {
        strict_plaintext(plaintext, &self.key.n)?;
        Ok(Ciphertext::from(0xdead_beefu64))
    }

    fn decrypt(&self, _ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError> {
        Ok(BigUint::zero())
    }

    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        _rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError> {
        Ok(lhs.clone())
    }

    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        _scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError> {
        Ok(ciphertext.clone())
    }

    fn key_descriptor(&self) -> &KeyDescriptor {
        &self.key
    }
}

/// Encrypts `m` to one of `pool` fixed ciphertexts in rotation, so exactly
/// `pool` distinct values appear across repeated encryptions.
pub struct RepeatingStub {
    key: KeyDescriptor,
    pool: u64,
    counter: Cell<u64>,
}

impl RepeatingStub {
    pub fn new(pool: u64) -> Self {
        let (p, q) = fixture_primes_512();
        Self {
            key: key_with_modulus(p * q),
            pool,
            counter: Cell::new(0),
        }
    }
}

impl HomomorphicCryptosystem for RepeatingStub {
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError> {
        let m = strict_plaintext(plaintext, &self.key.n)?;
        let slot = self.counter.get() % self.pool;
        self.counter.set(self.counter.get() + 1);
        // sparse pattern: only about one bit in eight is set
        let spread = (BigUint::one() << 255u32) | BigUint::from(0x5555_5555_5555_5555u64 ^ slot);
        Ok(Ciphertext::new(spread + m))
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError> {
        Ok(ciphertext.as_biguint() % &self.key.n)
    }

    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        _rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError> {
        Ok(lhs.clone())
    }

    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        _scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError> {
        Ok(ciphertext.clone())
    }

    fn key_descriptor(&self) -> &KeyDescriptor {
        &self.key
    }
}

/// Which homomorphic operation a [`BrokenHomomorphismStub`] gets wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Breakage {
    /// Addition drops the right-hand operand
    Addition,
    /// Scalar multiplication ignores the scalar
    Multiplication,
    /// Both operations fail with an error
    Errors,
}

/// Correct encryption with a deliberately broken homomorphism.
pub struct BrokenHomomorphismStub {
    inner: TransparentStub,
    breakage: Breakage,
}

impl BrokenHomomorphismStub {
    pub fn new(breakage: Breakage) -> Self {
        let (p, q) = fixture_primes_512();
        Self {
            inner: TransparentStub::new(p * q),
            breakage,
        }
    }
}

impl HomomorphicCryptosystem for BrokenHomomorphismStub {
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError> {
        self.inner.encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError> {
        self.inner.decrypt(ciphertext)
    }

    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError> {
        match self.breakage {
            Breakage::Addition => Ok(lhs.clone()),
            Breakage::Errors => Err(CryptosystemError::InvalidCiphertext(
                "operand out of range".to_string(),
            )),
            Breakage::Multiplication => self.inner.homomorphic_add(lhs, rhs),
        }
    }

    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError> {
        match self.breakage {
            Breakage::Multiplication => Ok(ciphertext.clone()),
            Breakage::Errors => Err(CryptosystemError::InvalidCiphertext(
                "operand out of range".to_string(),
            )),
            Breakage::Addition => self.inner.homomorphic_multiply_constant(ciphertext, scalar),
        }
    }

    fn key_descriptor(&self) -> &KeyDescriptor {
        self.inner.key_descriptor()
    }
}

/// Boundary checks a [`LenientValidationStub`] skips.
#[derive(Clone, Copy, Debug, Default)]
pub struct Leniency {
    pub negative: bool,
    pub oversized: bool,
    pub decimal: bool,
}

/// Correct arithmetic with configurable gaps in input validation.
pub struct LenientValidationStub {
    inner: TransparentStub,
    leniency: Leniency,
}

impl LenientValidationStub {
    pub fn new(n: BigUint, leniency: Leniency) -> Self {
        Self {
            inner: TransparentStub::new(n),
            leniency,
        }
    }
}

impl HomomorphicCryptosystem for LenientValidationStub {
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError> {
        let n = &self.inner.key_descriptor().n;
        match plaintext {
            Plaintext::Decimal(value) if self.leniency.decimal => {
                Ok(Ciphertext::from(value.abs().floor() as u64))
            }
            Plaintext::Integer(value) if value.sign() == Sign::Minus && self.leniency.negative => {
                Ok(Ciphertext::new(value.magnitude().clone()))
            }
            Plaintext::Integer(value)
                if value.sign() != Sign::Minus && value.magnitude() >= n && self.leniency.oversized =>
            {
                Ok(Ciphertext::new(value.magnitude() % n))
            }
            _ => self.inner.encrypt(plaintext),
        }
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError> {
        self.inner.decrypt(ciphertext)
    }

    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError> {
        self.inner.homomorphic_add(lhs, rhs)
    }

    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError> {
        self.inner.homomorphic_multiply_constant(ciphertext, scalar)
    }

    fn key_descriptor(&self) -> &KeyDescriptor {
        self.inner.key_descriptor()
    }
}

/// Virtual clock advanced explicitly by the code under measurement.
#[derive(Clone, Debug, Default)]
pub struct SimulatedClock {
    elapsed: Rc<Cell<Duration>>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> Duration {
        self.elapsed.get()
    }
}

/// Clock that advances by a fixed step on every read, so every measured
/// interval is identical.
#[derive(Debug)]
pub struct SteppingClock {
    step: Duration,
    elapsed: Cell<Duration>,
}

impl SteppingClock {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            elapsed: Cell::new(Duration::ZERO),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Duration {
        let now = self.elapsed.get() + self.step;
        self.elapsed.set(now);
        now
    }
}

/// Encryption whose cost depends on plaintext size, charged to a shared
/// [`SimulatedClock`].
pub struct DelayedEncryptionStub {
    inner: TransparentStub,
    clock: SimulatedClock,
    small_cost: Duration,
    large_cost: Duration,
}

impl DelayedEncryptionStub {
    /// Plaintexts below this are charged `small_cost`.
    pub const LARGE_THRESHOLD: u64 = 100_000;

    pub fn new(clock: SimulatedClock, small_cost: Duration, large_cost: Duration) -> Self {
        let (p, q) = fixture_primes_512();
        Self {
            inner: TransparentStub::new(p * q),
            clock,
            small_cost,
            large_cost,
        }
    }
}

impl HomomorphicCryptosystem for DelayedEncryptionStub {
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError> {
        let large = plaintext
            .as_integer()
            .and_then(BigInt::to_u64)
            .map_or(true, |m| m >= Self::LARGE_THRESHOLD);
        self.clock.advance(if large { self.large_cost } else { self.small_cost });
        self.inner.encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError> {
        self.inner.decrypt(ciphertext)
    }

    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError> {
        self.inner.homomorphic_add(lhs, rhs)
    }

    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError> {
        self.inner.homomorphic_multiply_constant(ciphertext, scalar)
    }

    fn key_descriptor(&self) -> &KeyDescriptor {
        self.inner.key_descriptor()
    }
}
