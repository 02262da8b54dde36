// RSA modulus bit size
pub const BIT_SIZE: usize = 2048;

// T - total squarings for the delay
pub const TIMING_PARAMETER: u64 = 3_000_000;

// Number of proof segments for parallel verification
pub const NUM_SEGMENTS: usize = 10;

// Smallest modulus width the key generator accepts
pub const MIN_BIT_SIZE: usize = 16;

// Denominator for degree() = cpu_count / divisor
pub const DEFAULT_PARALLELISM_DIVISOR: usize = 2;

// Miller-Rabin rounds for prime generation
pub const PRIME_TEST_ROUNDS: usize = 40;
