//! Random prime sampling.

use num_bigint::BigUint;

use crate::error::TimeLockResult;
use crate::mpc::{next_prime, urandom_bits, RandomState};
use crate::random::get_random;

/// Produce a prime of roughly `bit_size` bits: draw a uniform integer of
/// that width and walk forward to the next prime. Primes right after a
/// large prime gap are drawn slightly more often than their neighbours.
pub fn get_prime(bit_size: usize) -> TimeLockResult<BigUint> {
    let mut state = get_random(bit_size)?;
    Ok(get_prime_with_state(bit_size, &mut state))
}

/// Same draw, but from a caller-owned stream. Used by deterministic
/// fixtures and by key generation that threads one stream through both
/// primes.
pub fn get_prime_with_state(bit_size: usize, state: &mut RandomState) -> BigUint {
    let random_num = urandom_bits(state, bit_size as u64);
    next_prime(&random_num)
}
