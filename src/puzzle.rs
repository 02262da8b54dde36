//! The puzzle value and its staged builder.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{TimeLockError, TimeLockResult};
use crate::mpc::mpz;

/// Immutable time-lock puzzle `(x, t, N)`: solving means computing
/// `x^(2^t) mod N`. Not tied to any particular solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    x: BigUint,
    t: BigUint,
    n: BigUint,
}

impl Puzzle {
    /// Build a puzzle, enforcing `0 < x < N`, `t >= 1`, `N >= 2`.
    pub fn new(x: BigUint, t: BigUint, n: BigUint) -> TimeLockResult<Self> {
        if n < mpz(2) {
            return Err(TimeLockError::BadParameter(
                "modulus N must be at least 2".to_string(),
            ));
        }
        if x.is_zero() || x >= n {
            return Err(TimeLockError::BadParameter(
                "challenge x must satisfy 0 < x < N".to_string(),
            ));
        }
        if t.is_zero() {
            return Err(TimeLockError::BadParameter(
                "timing parameter t must be at least 1".to_string(),
            ));
        }
        Ok(Puzzle { x, t, n })
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    pub fn t(&self) -> &BigUint {
        &self.t
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }
}

/// Staged constructor for [`Puzzle`]. `build` refuses to materialise a
/// puzzle until all three fields have been set; setting a field twice
/// overwrites the earlier value.
#[derive(Clone, Debug, Default)]
pub struct PuzzleBuilder {
    x: Option<BigUint>,
    t: Option<BigUint>,
    n: Option<BigUint>,
}

impl PuzzleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: BigUint) -> Self {
        self.x = Some(x);
        self
    }

    pub fn t(mut self, t: BigUint) -> Self {
        self.t = Some(t);
        self
    }

    pub fn modulus(mut self, n: BigUint) -> Self {
        self.n = Some(n);
        self
    }

    pub fn build(self) -> TimeLockResult<Puzzle> {
        let mut missing = Vec::new();
        if self.x.is_none() {
            missing.push("x");
        }
        if self.t.is_none() {
            missing.push("t");
        }
        if self.n.is_none() {
            missing.push("N");
        }
        if !missing.is_empty() {
            return Err(TimeLockError::IncompletePuzzle(format!(
                "missing field(s): {}",
                missing.join(", ")
            )));
        }

        Puzzle::new(self.x.unwrap(), self.t.unwrap(), self.n.unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_builds_with_all_fields() {
        let puzzle = PuzzleBuilder::new()
            .x(mpz(5))
            .t(mpz(2))
            .modulus(mpz(21))
            .build()
            .unwrap();

        assert_eq!(puzzle.x(), &mpz(5));
        assert_eq!(puzzle.t(), &mpz(2));
        assert_eq!(puzzle.modulus(), &mpz(21));
    }

    #[test]
    fn test_builder_requires_every_field() {
        let missing_n = PuzzleBuilder::new().x(mpz(5)).t(mpz(2)).build();
        assert!(matches!(
            missing_n,
            Err(TimeLockError::IncompletePuzzle(_))
        ));

        let empty = PuzzleBuilder::new().build();
        match empty {
            Err(TimeLockError::IncompletePuzzle(msg)) => {
                assert!(msg.contains("x") && msg.contains("t") && msg.contains("N"));
            }
            other => panic!("expected IncompletePuzzle, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_overwrites_on_repeat_set() {
        let puzzle = PuzzleBuilder::new()
            .x(mpz(3))
            .x(mpz(5))
            .t(mpz(2))
            .modulus(mpz(21))
            .build()
            .unwrap();
        assert_eq!(puzzle.x(), &mpz(5));
    }

    #[test]
    fn test_puzzle_rejects_out_of_range_values() {
        assert!(Puzzle::new(mpz(0), mpz(2), mpz(21)).is_err());
        assert!(Puzzle::new(mpz(21), mpz(2), mpz(21)).is_err());
        assert!(Puzzle::new(mpz(30), mpz(2), mpz(21)).is_err());
        assert!(Puzzle::new(mpz(5), mpz(0), mpz(21)).is_err());
        assert!(Puzzle::new(mpz(1), mpz(2), mpz(1)).is_err());
        assert!(Puzzle::new(mpz(5), mpz(2), mpz(21)).is_ok());
    }
}
