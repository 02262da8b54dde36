//! The two solving paths.
//!
//! [`TrapdoorSolver`] is the puzzle author's shortcut: with φ(N) in hand
//! the exponent 2^t collapses to `2^t mod φ` (Euler's theorem; the
//! chance that x shares a factor with N is ~2/√N and is ignored).
//! [`SequentialSolver`] is everyone else's reality and the reason the
//! construction works: t squarings, no known shortcut.

use num_bigint::BigUint;

use crate::error::{TimeLockError, TimeLockResult};
use crate::mpc::{mpz, pow, powmod};
use crate::pool::WorkerPool;
use crate::puzzle::Puzzle;
use crate::rsa::RsaKey;

pub struct TrapdoorSolver;

impl TrapdoorSolver {
    /// `y = x^(2^t mod φ) mod N`. The key and puzzle must agree on N.
    pub fn solve(rsa: &RsaKey, puzzle: &Puzzle) -> TimeLockResult<BigUint> {
        if puzzle.modulus() != rsa.modulus() {
            return Err(TimeLockError::ModulusMismatch(
                "puzzle modulus differs from the key modulus".to_string(),
            ));
        }

        // d = (2^t) mod phi, without ever materialising 2^t
        let d = powmod(&mpz(2), puzzle.t(), rsa.phi());
        Ok(powmod(puzzle.x(), &d, puzzle.modulus()))
    }

    /// Solve a batch across the worker pool. Results come back in input
    /// order.
    pub fn solve_many(
        pairs: &[(RsaKey, Puzzle)],
        pool: &WorkerPool,
    ) -> TimeLockResult<Vec<BigUint>> {
        pool.map(pairs.iter().collect(), |pair: &(RsaKey, Puzzle)| {
            TrapdoorSolver::solve(&pair.0, &pair.1)
        })
    }
}

pub struct SequentialSolver;

impl SequentialSolver {
    /// `y = x^(2^t) mod N` the honest way: materialise the t+1 bit
    /// exponent and hand it to one big `powmod`.
    pub fn solve(puzzle: &Puzzle) -> BigUint {
        let exp = pow(&mpz(2), puzzle.t());
        powmod(puzzle.x(), &exp, puzzle.modulus())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpc::random_state;
    use crate::puzzle::PuzzleBuilder;

    fn small_key() -> RsaKey {
        // N = 21, phi = 12
        RsaKey::from_primes(mpz(7), mpz(3))
    }

    fn small_puzzle(t: u64) -> Puzzle {
        PuzzleBuilder::new()
            .x(mpz(5))
            .t(mpz(t))
            .modulus(mpz(21))
            .build()
            .unwrap()
    }

    #[test]
    fn test_trapdoor_solver_small_modulus() {
        // 2^2 = 4, 4 mod 12 = 4, 5^4 mod 21 = 625 mod 21 = 16
        let y = TrapdoorSolver::solve(&small_key(), &small_puzzle(2)).unwrap();
        assert_eq!(y, mpz(16));
    }

    #[test]
    fn test_sequential_solver_small_modulus() {
        assert_eq!(SequentialSolver::solve(&small_puzzle(2)), mpz(16));
        assert_eq!(SequentialSolver::solve(&small_puzzle(4)), mpz(16));
        assert_eq!(SequentialSolver::solve(&small_puzzle(6)), mpz(16));
    }

    #[test]
    fn test_solvers_agree_on_generated_key() {
        let mut state = random_state(2024);
        let key = RsaKey::generate_with_state(64, &mut state).unwrap();
        let x = mpz(123456789) % key.modulus();
        let puzzle = PuzzleBuilder::new()
            .x(x)
            .t(mpz(1000))
            .modulus(key.modulus().clone())
            .build()
            .unwrap();

        let fast = TrapdoorSolver::solve(&key, &puzzle).unwrap();
        let slow = SequentialSolver::solve(&puzzle);
        assert_eq!(fast, slow);
        assert!(&fast < puzzle.modulus());
    }

    #[test]
    fn test_modulus_mismatch_is_rejected() {
        let key = small_key();
        let other = RsaKey::from_primes(mpz(11), mpz(5)); // N = 55
        let puzzle = small_puzzle(2);

        assert!(TrapdoorSolver::solve(&key, &puzzle).is_ok());
        assert!(matches!(
            TrapdoorSolver::solve(&other, &puzzle),
            Err(TimeLockError::ModulusMismatch(_))
        ));
    }

    #[test]
    fn test_solve_many_preserves_order() {
        let pool = WorkerPool::new(4).unwrap();
        let pairs: Vec<(RsaKey, Puzzle)> = (2..10)
            .map(|t| (small_key(), small_puzzle(t)))
            .collect();

        let batch = TrapdoorSolver::solve_many(&pairs, &pool).unwrap();
        assert_eq!(batch.len(), pairs.len());
        for (solution, (key, puzzle)) in batch.iter().zip(&pairs) {
            assert_eq!(solution, &TrapdoorSolver::solve(key, puzzle).unwrap());
        }
    }
}
