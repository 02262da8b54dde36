//! OS-entropy seeding for the deterministic big-integer stream.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::TimeLockResult;
use crate::mpc::RandomState;

/// Draw `bit_size` bits of entropy from the OS CSPRNG and key a fresh
/// [`RandomState`] with them. Every call produces an independent stream;
/// seeds are never reused across puzzles.
pub fn get_random(bit_size: usize) -> TimeLockResult<RandomState> {
    let byte_count = std::cmp::max(bit_size.div_ceil(8), 32);
    let mut entropy = vec![0u8; byte_count];
    OsRng.try_fill_bytes(&mut entropy)?;

    // Compress the buffer to the 256-bit stream key
    let digest = Sha256::digest(&entropy);
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);

    Ok(RandomState::from_seed_bytes(seed))
}
