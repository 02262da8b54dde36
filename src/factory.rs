//! Puzzle production line: keypair, challenge, puzzle, solution.

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, info};

use crate::constants::MIN_BIT_SIZE;
use crate::error::{TimeLockError, TimeLockResult};
use crate::mpc::{urandom_bits, RandomState};
use crate::pool::WorkerPool;
use crate::puzzle::{Puzzle, PuzzleBuilder};
use crate::random::get_random;
use crate::rsa::RsaKey;
use crate::solver::TrapdoorSolver;

/// Factory configured with a modulus width and a timing parameter. Each
/// [`create_puzzle`](PuzzleFactory::create_puzzle) call produces an
/// independent `(puzzle, key, solution)` triple; the solution comes from
/// the trapdoor path while φ is still at hand.
#[derive(Clone, Debug)]
pub struct PuzzleFactory {
    bit_size: usize,
    t: BigUint,
}

impl PuzzleFactory {
    pub fn new(bit_size: usize, t: BigUint) -> TimeLockResult<Self> {
        if bit_size < MIN_BIT_SIZE {
            return Err(TimeLockError::BadParameter(format!(
                "modulus bit size {} is below the minimum {}",
                bit_size, MIN_BIT_SIZE
            )));
        }
        if t.is_zero() {
            return Err(TimeLockError::BadParameter(
                "timing parameter t must be at least 1".to_string(),
            ));
        }
        Ok(PuzzleFactory { bit_size, t })
    }

    pub fn bit_size(&self) -> usize {
        self.bit_size
    }

    pub fn timing_parameter(&self) -> &BigUint {
        &self.t
    }

    /// Generate one puzzle with fresh OS entropy for both the keypair
    /// and the challenge.
    pub fn create_puzzle(&self) -> TimeLockResult<(Puzzle, RsaKey, BigUint)> {
        let rsa = RsaKey::generate(self.bit_size)?;
        let mut state = get_random(self.bit_size)?;
        self.assemble(rsa, &mut state)
    }

    /// Deterministic variant drawing everything from one caller-owned
    /// stream. Fixture path; production reseeds from the OS.
    pub fn create_puzzle_with_state(
        &self,
        state: &mut RandomState,
    ) -> TimeLockResult<(Puzzle, RsaKey, BigUint)> {
        let rsa = RsaKey::generate_with_state(self.bit_size, state)?;
        self.assemble(rsa, state)
    }

    /// Generate `amount` independent triples across the worker pool.
    /// Output order is input-index order; each worker reseeds from the
    /// OS, so no two puzzles share randomness.
    pub fn create_puzzles(
        &self,
        amount: usize,
        pool: &WorkerPool,
    ) -> TimeLockResult<Vec<(Puzzle, RsaKey, BigUint)>> {
        if amount == 0 {
            return Err(TimeLockError::BadParameter(
                "puzzle count must be positive".to_string(),
            ));
        }

        info!(amount, workers = pool.degree(), "generating puzzle batch");
        pool.map((0..amount).collect(), |_| self.create_puzzle())
    }

    fn assemble(
        &self,
        rsa: RsaKey,
        state: &mut RandomState,
    ) -> TimeLockResult<(Puzzle, RsaKey, BigUint)> {
        let x = self.sample_challenge(state, rsa.modulus());

        let puzzle = PuzzleBuilder::new()
            .x(x)
            .t(self.t.clone())
            .modulus(rsa.modulus().clone())
            .build()?;

        let y = TrapdoorSolver::solve(&rsa, &puzzle)?;
        debug!(modulus_bits = rsa.modulus().bits(), "assembled puzzle");

        Ok((puzzle, rsa, y))
    }

    // The raw draw spans bit_size bits while N is a couple of bits
    // shorter, so reduce and reject zero to land in (0, N).
    fn sample_challenge(&self, state: &mut RandomState, n: &BigUint) -> BigUint {
        loop {
            let x = urandom_bits(state, self.bit_size as u64) % n;
            if !x.is_zero() {
                return x;
            }
        }
    }
}
