//! Multi-precision arithmetic facade.
//!
//! Every group operation in the crate goes through the free functions in
//! this module, so the rest of the code never touches `num_bigint`
//! directly. Values are non-negative; the canonical external encoding is
//! an unprefixed lower-case hex string.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{thread_rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::constants::PRIME_TEST_ROUNDS;
use crate::error::{TimeLockError, TimeLockResult};

/// Deterministic random stream. Two states built from the same seed yield
/// identical draw sequences; `urandom_bits` advances the state in place.
#[derive(Clone, Debug)]
pub struct RandomState {
    rng: ChaCha20Rng,
}

impl RandomState {
    pub(crate) fn from_seed_bytes(seed: [u8; 32]) -> Self {
        RandomState {
            rng: ChaCha20Rng::from_seed(seed),
        }
    }
}

/// Coerce a machine integer to a big integer.
pub fn mpz(value: u64) -> BigUint {
    BigUint::from(value)
}

/// Initialise a deterministic random stream from a fixed seed.
pub fn random_state(seed: u64) -> RandomState {
    RandomState {
        rng: ChaCha20Rng::seed_from_u64(seed),
    }
}

/// Draw a uniform integer in `[0, 2^bit_count)`, advancing the state.
pub fn urandom_bits(state: &mut RandomState, bit_count: u64) -> BigUint {
    state.rng.gen_biguint(bit_count)
}

/// Smallest prime strictly greater than `value`.
pub fn next_prime(value: &BigUint) -> BigUint {
    let mut candidate = value + BigUint::one();
    if candidate <= mpz(2) {
        return mpz(2);
    }
    if candidate.is_even() {
        candidate += BigUint::one();
    }
    while !is_probable_prime(&candidate, PRIME_TEST_ROUNDS) {
        candidate += mpz(2);
    }
    candidate
}

/// `base^exp mod modulus`. Panics on a zero modulus, which is a
/// programmer error everywhere in this crate.
pub fn powmod(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// `base^exp` without reduction, by square-and-multiply over the exponent
/// bits. Handles exponents far beyond `u32`; the result for `2^t` is a
/// `t + 1` bit integer, so callers pay for what they ask for.
pub fn pow(base: &BigUint, exp: &BigUint) -> BigUint {
    let mut result = BigUint::one();
    let mut base_pow = base.clone();
    let mut exp_remaining = exp.clone();

    while !exp_remaining.is_zero() {
        if exp_remaining.is_odd() {
            result *= &base_pow;
        }
        exp_remaining >>= 1;
        // Skip the final squaring once the exponent is exhausted
        if !exp_remaining.is_zero() {
            base_pow = &base_pow * &base_pow;
        }
    }

    result
}

/// Non-negative remainder. Panics on a zero modulus.
pub fn rem(value: &BigUint, modulus: &BigUint) -> BigUint {
    value % modulus
}

/// Miller-Rabin primality test.
///
/// Deterministic witness set below the verified bound, `rounds` random
/// witnesses above it.
pub fn is_probable_prime(n: &BigUint, rounds: usize) -> bool {
    if n <= &BigUint::one() {
        return false;
    }

    if n == &mpz(2) || n == &mpz(3) {
        return true;
    }

    if n.is_even() {
        return false;
    }

    // Write n-1 as 2^r * d
    let one = BigUint::one();
    let two = mpz(2);
    let n_minus_1 = n - &one;

    let mut r = 0;
    let mut d = n_minus_1.clone();

    while d.is_even() {
        d >>= 1;
        r += 1;
    }

    // Witness loop with deterministic witnesses for small n
    let witnesses: Vec<BigUint> = if n < &BigUint::from(3317044064679887385961981u128) {
        vec![2u32, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37]
            .into_iter()
            .map(BigUint::from)
            .collect()
    } else {
        // Random witnesses for large n
        let mut rng = thread_rng();
        (0..rounds)
            .map(|_| rng.gen_biguint_range(&two, &(n - &two)))
            .collect()
    };

    'witness: for a in witnesses {
        if a >= *n {
            continue;
        }

        let mut x = a.modpow(&d, n);

        if x == one || x == n_minus_1 {
            continue 'witness;
        }

        for _ in 0..r - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Canonical hex encoding: lower-case, no prefix, no padding.
pub fn to_hex(value: &BigUint) -> String {
    value.to_str_radix(16)
}

/// Decode a hex string. Lenient on input: surrounding whitespace, an
/// optional `0x`/`0X` prefix, and upper-case digits are all accepted.
pub fn from_hex(text: &str) -> TimeLockResult<BigUint> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(TimeLockError::BadParameter(
            "empty hex string".to_string(),
        ));
    }

    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| {
        TimeLockError::BadParameter(format!("invalid hex string: {:?}", text))
    })
}

/// Decode a base-10 string (the external form of the timing parameter).
pub fn from_dec(text: &str) -> TimeLockResult<BigUint> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TimeLockError::BadParameter(
            "empty decimal string".to_string(),
        ));
    }

    BigUint::parse_bytes(trimmed.as_bytes(), 10).ok_or_else(|| {
        TimeLockError::BadParameter(format!("invalid decimal string: {:?}", text))
    })
}
