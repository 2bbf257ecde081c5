//! Probabilistic primality testing and prime generation over `BigUint`.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};

/// Primes up to 47, used for trial division and the small-factor key check.
pub const SMALL_PRIMES: [u32; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

/// Odd primes used to cheaply discard prime candidates before Miller-Rabin.
const SIEVE_PRIMES: [u32; 10] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31];

/// Default number of Miller-Rabin rounds; error probability is at most 4^-rounds.
pub const DEFAULT_MR_ROUNDS: usize = 10;

/// Small primes from [`SMALL_PRIMES`] that divide `n` evenly.
pub fn small_prime_factors(n: &BigUint) -> Vec<u32> {
    SMALL_PRIMES
        .iter()
        .copied()
        .filter(|&p| (n % p).is_zero())
        .collect()
}

/// Miller-Rabin test with `rounds` random witnesses.
pub fn is_probable_prime<R: Rng + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // n - 1 = d * 2^r with d odd
    let n_minus_one = n - &one;
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);

        if x == one || x == n_minus_one {
            continue;
        }

        for _ in 1..r {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Generate a random prime of exactly `bits` bits, with the two top bits set.
///
/// Two such primes of `k` bits multiply to exactly `2k` bits, since both are at
/// least 1.5 * 2^(k-1). `bits` must be at least 2.
pub fn generate_prime<R: Rng + CryptoRng + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(bits - 2, true);
        candidate.set_bit(0, true);

        let divisible = SIEVE_PRIMES.iter().any(|&p| {
            let p_big = BigUint::from(p);
            candidate != p_big && (&candidate % &p_big).is_zero()
        });
        if divisible {
            continue;
        }

        if is_probable_prime(&candidate, DEFAULT_MR_ROUNDS, rng) {
            return candidate;
        }
    }
}
