//! RSA trapdoor keypair.
//!
//! The keypair exists to hand the puzzle author a shortcut: knowing
//! φ(N) = (p−1)(q−1) reduces the 2^t exponent modulo φ. A deployment
//! that only publishes puzzles keeps N and discards the rest via
//! [`RsaKey::into_public`].

use num_bigint::BigUint;
use num_traits::One;
use tracing::debug;

use crate::constants::MIN_BIT_SIZE;
use crate::error::{TimeLockError, TimeLockResult};
use crate::mpc::RandomState;
use crate::primes::{get_prime, get_prime_with_state};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaKey {
    p: BigUint,
    q: BigUint,
    n: BigUint,
    phi: BigUint,
}

impl RsaKey {
    /// Generate a keypair for a modulus of roughly `bit_size` bits. Each
    /// prime is sampled at `bit_size / 2 - 1` bits from its own
    /// OS-seeded stream.
    pub fn generate(bit_size: usize) -> TimeLockResult<Self> {
        let prime_size = Self::prime_size(bit_size)?;

        let p = get_prime(prime_size)?;
        let mut q = get_prime(prime_size)?;
        while q == p {
            q = get_prime(prime_size)?;
        }

        Ok(Self::from_primes(p, q))
    }

    /// Deterministic variant threading both prime draws through one
    /// caller-owned stream. Fixture path; production reseeds from the OS.
    pub fn generate_with_state(
        bit_size: usize,
        state: &mut RandomState,
    ) -> TimeLockResult<Self> {
        let prime_size = Self::prime_size(bit_size)?;

        let p = get_prime_with_state(prime_size, state);
        let mut q = get_prime_with_state(prime_size, state);
        while q == p {
            q = get_prime_with_state(prime_size, state);
        }

        Ok(Self::from_primes(p, q))
    }

    pub(crate) fn from_primes(p: BigUint, q: BigUint) -> Self {
        let n = &p * &q;
        let phi = (&p - BigUint::one()) * (&q - BigUint::one());
        debug!(modulus_bits = n.bits(), "generated rsa trapdoor key");
        RsaKey { p, q, n, phi }
    }

    fn prime_size(bit_size: usize) -> TimeLockResult<usize> {
        if bit_size < MIN_BIT_SIZE {
            return Err(TimeLockError::BadParameter(format!(
                "modulus bit size {} is below the minimum {}",
                bit_size, MIN_BIT_SIZE
            )));
        }
        let prime_size = bit_size / 2 - 1;
        if prime_size < 2 {
            return Err(TimeLockError::BadParameter(format!(
                "prime size {} is too small",
                prime_size
            )));
        }
        Ok(prime_size)
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn phi(&self) -> &BigUint {
        &self.phi
    }

    /// Consume the key, keeping only the public modulus. The trapdoor
    /// fields go out of scope here; nothing else holds them.
    pub fn into_public(self) -> BigUint {
        self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRIME_TEST_ROUNDS;
    use crate::mpc::{is_probable_prime, random_state};

    #[test]
    fn test_key_is_well_formed() {
        let key = RsaKey::generate(64).unwrap();

        assert_eq!(key.modulus(), &(key.p() * key.q()));
        assert_eq!(
            key.phi(),
            &((key.p() - 1u32) * (key.q() - 1u32))
        );
        assert_ne!(key.p(), key.q());
        assert!(is_probable_prime(key.p(), PRIME_TEST_ROUNDS));
        assert!(is_probable_prime(key.q(), PRIME_TEST_ROUNDS));
    }

    #[test]
    fn test_prime_width_tracks_request() {
        let key = RsaKey::generate(64).unwrap();
        // prime_size = 64/2 - 1 = 31
        assert!(key.p().bits() <= 33);
        assert!(key.q().bits() <= 33);
    }

    #[test]
    fn test_rejects_tiny_modulus() {
        assert!(matches!(
            RsaKey::generate(8),
            Err(TimeLockError::BadParameter(_))
        ));
        assert!(matches!(
            RsaKey::generate(15),
            Err(TimeLockError::BadParameter(_))
        ));
        assert!(RsaKey::generate(16).is_ok());
    }

    #[test]
    fn test_generation_is_deterministic_under_fixed_seed() {
        let mut a = random_state(1234);
        let mut b = random_state(1234);
        let key_a = RsaKey::generate_with_state(64, &mut a).unwrap();
        let key_b = RsaKey::generate_with_state(64, &mut b).unwrap();
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn test_into_public_keeps_only_modulus() {
        let key = RsaKey::generate(32).unwrap();
        let n = key.modulus().clone();
        assert_eq!(key.into_public(), n);
    }
}
