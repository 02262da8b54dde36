//! Time-lock puzzles and a segmented verifiable delay function over an
//! RSA group.
//!
//! A puzzle `(x, t, N)` asks for `y = x^(2^t) mod N`. Whoever generated
//! `N = p*q` keeps φ(N) as a trapdoor and solves in one reduced
//! exponentiation; everyone else performs the t squarings. The segmented
//! evaluator additionally publishes k intermediate checkpoints so a
//! verifier can re-check every segment in parallel.
//!
//! ```
//! use timelock::mpc::mpz;
//! use timelock::{PuzzleFactory, SequentialSolver};
//!
//! let factory = PuzzleFactory::new(32, mpz(100))?;
//! let (puzzle, _rsa, y) = factory.create_puzzle()?;
//! assert_eq!(SequentialSolver::solve(&puzzle), y);
//! # Ok::<(), timelock::TimeLockError>(())
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod factory;
pub mod mpc;
pub mod pool;
pub mod primes;
pub mod puzzle;
pub mod random;
pub mod rsa;
pub mod solver;
pub mod store;
pub mod vdf;

pub use error::{TimeLockError, TimeLockResult};
pub use factory::PuzzleFactory;
pub use pool::WorkerPool;
pub use puzzle::{Puzzle, PuzzleBuilder};
pub use rsa::RsaKey;
pub use solver::{SequentialSolver, TrapdoorSolver};
pub use vdf::{SegmentedVdf, Verdict};
