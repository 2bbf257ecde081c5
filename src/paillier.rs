//! Reference Paillier cryptosystem.
//!
//! Uses the g = n + 1 simplification, so L(g^lambda mod n^2) = lambda mod n and
//! mu = lambda^-1 mod n. This is the implementation the CLI and the end-to-end
//! tests bind the analyzer to; the analyzer itself only sees
//! [`HomomorphicCryptosystem`].

use crate::cryptosystem::{Ciphertext, HomomorphicCryptosystem, KeyDescriptor, Plaintext};
use crate::error::CryptosystemError;
use crate::primality::generate_prime;
use num_bigint::{BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::cell::RefCell;

/// Smallest modulus size accepted by key generation.
pub const MIN_KEY_BITS: u64 = 512;

/// Metadata describing a generated key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInfo {
    /// Requested key size in bits
    pub bit_length: u64,
    /// Actual bit length of n
    pub n_bit_length: u64,
    /// Nominal security label, e.g. "2048-bit"
    pub security_level: String,
}

/// Paillier key pair together with the randomness source used for encryption.
pub struct PaillierCryptosystem {
    requested_bits: u64,
    key: KeyDescriptor,
    n_squared: BigUint,
    mu: BigUint,
    rng: RefCell<Box<dyn RngCore>>,
}

impl PaillierCryptosystem {
    /// Generate a fresh key pair whose modulus is `bits` bits long.
    pub fn generate(bits: u64) -> Result<Self, CryptosystemError> {
        Self::generate_with_rng(bits, &mut OsRng)
    }

    /// Generate a key pair drawing primes from `rng`.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(
        bits: u64,
        rng: &mut R,
    ) -> Result<Self, CryptosystemError> {
        validate_key_size(bits)?;

        let half = bits / 2;
        let p = generate_prime(half, rng);
        let mut q = generate_prime(half, rng);
        while q == p {
            q = generate_prime(half, rng);
        }

        let mut system = Self::from_primes(&p, &q)?;
        system.requested_bits = bits;
        Ok(system)
    }

    /// Build a key pair from two known distinct primes.
    pub fn from_primes(p: &BigUint, q: &BigUint) -> Result<Self, CryptosystemError> {
        if p == q {
            return Err(CryptosystemError::InvalidKeySize(
                "p and q must be distinct".to_string(),
            ));
        }

        let one = BigUint::one();
        let n = p * q;
        let n_squared = &n * &n;
        let lambda = (p - &one).lcm(&(q - &one));
        let g = &n + &one;
        let mu = mod_inverse(&lambda, &n).ok_or(CryptosystemError::NoModularInverse)?;

        Ok(Self {
            requested_bits: n.bits(),
            key: KeyDescriptor::new(n, g, lambda),
            n_squared,
            mu,
            rng: RefCell::new(Box::new(OsRng)),
        })
    }

    /// Replace the encryption randomness source, e.g. with a seeded RNG in tests.
    pub fn with_rng<R: RngCore + 'static>(self, rng: R) -> Self {
        Self {
            rng: RefCell::new(Box::new(rng)),
            ..self
        }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.key.n
    }

    pub fn key_info(&self) -> KeyInfo {
        KeyInfo {
            bit_length: self.requested_bits,
            n_bit_length: self.key.n.bits(),
            security_level: format!("{}-bit", self.requested_bits),
        }
    }

    /// L(x) = (x - 1) / n
    fn l_function(&self, x: &BigUint) -> BigUint {
        (x - BigUint::one()) / &self.key.n
    }

    /// Random r in [1, n) with gcd(r, n) = 1.
    fn sample_unit(&self) -> BigUint {
        let mut rng = self.rng.borrow_mut();
        let one = BigUint::one();
        loop {
            let r = rng.gen_biguint_range(&one, &self.key.n);
            if r.gcd(&self.key.n).is_one() {
                return r;
            }
        }
    }

    fn validate_plaintext(&self, plaintext: &Plaintext) -> Result<BigUint, CryptosystemError> {
        let value = match plaintext {
            Plaintext::Integer(value) => value,
            Plaintext::Decimal(value) => {
                return Err(CryptosystemError::NonIntegerPlaintext(*value));
            }
        };

        if value.sign() == Sign::Minus {
            return Err(CryptosystemError::NegativePlaintext);
        }

        let magnitude = value.magnitude();
        if magnitude >= &self.key.n {
            return Err(CryptosystemError::PlaintextOutOfRange {
                modulus_bits: self.key.n.bits(),
            });
        }

        Ok(magnitude.clone())
    }

    fn validate_ciphertext(&self, ciphertext: &Ciphertext) -> Result<(), CryptosystemError> {
        let c = ciphertext.as_biguint();
        if c.is_zero() || c >= &self.n_squared {
            return Err(CryptosystemError::InvalidCiphertext(
                "ciphertext must lie in [1, n^2)".to_string(),
            ));
        }
        Ok(())
    }
}

impl HomomorphicCryptosystem for PaillierCryptosystem {
    /// c = g^m * r^n mod n^2
    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, CryptosystemError> {
        let m = self.validate_plaintext(plaintext)?;
        let r = self.sample_unit();

        let g_m = self.key.g.modpow(&m, &self.n_squared);
        let r_n = r.modpow(&self.key.n, &self.n_squared);
        Ok(Ciphertext::new((g_m * r_n) % &self.n_squared))
    }

    /// m = L(c^lambda mod n^2) * mu mod n
    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint, CryptosystemError> {
        self.validate_ciphertext(ciphertext)?;

        let c_lambda = ciphertext.as_biguint().modpow(&self.key.lambda, &self.n_squared);
        let l = self.l_function(&c_lambda);
        Ok((l * &self.mu) % &self.key.n)
    }

    /// E(m1) * E(m2) mod n^2 = E(m1 + m2 mod n)
    fn homomorphic_add(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
    ) -> Result<Ciphertext, CryptosystemError> {
        self.validate_ciphertext(lhs)?;
        self.validate_ciphertext(rhs)?;
        Ok(Ciphertext::new(
            (lhs.as_biguint() * rhs.as_biguint()) % &self.n_squared,
        ))
    }

    /// E(m)^k mod n^2 = E(k * m mod n)
    fn homomorphic_multiply_constant(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigUint,
    ) -> Result<Ciphertext, CryptosystemError> {
        self.validate_ciphertext(ciphertext)?;
        Ok(Ciphertext::new(
            ciphertext.as_biguint().modpow(scalar, &self.n_squared),
        ))
    }

    fn key_descriptor(&self) -> &KeyDescriptor {
        &self.key
    }
}

fn validate_key_size(bits: u64) -> Result<(), CryptosystemError> {
    if bits < MIN_KEY_BITS {
        return Err(CryptosystemError::InvalidKeySize(format!(
            "{} bits is below the {}-bit minimum",
            bits, MIN_KEY_BITS
        )));
    }
    if bits % 2 != 0 {
        return Err(CryptosystemError::InvalidKeySize(format!(
            "{} bits is not even",
            bits
        )));
    }
    Ok(())
}

/// Modular inverse of `a` modulo `m` via the extended Euclidean algorithm.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    use num_bigint::BigInt;

    let m_int = BigInt::from(m.clone());
    let extended = BigInt::from(a % m).extended_gcd(&m_int);
    if !extended.gcd.is_one() {
        return None;
    }
    extended.x.mod_floor(&m_int).to_biguint()
}
