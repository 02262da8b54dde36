//! Segmented verifiable delay function.
//!
//! The prover walks the full chain of t squarings in order, publishing a
//! checkpoint every `t / k` squarings; after segment i the running value
//! is `x^(2^(i*L)) mod N` and the last checkpoint is the VDF output. The
//! verifier re-squares each segment from its predecessor's checkpoint,
//! which has no ordering dependency and parallelises freely.
//!
//! The prover squares explicitly instead of batching a segment into one
//! `powmod` call with exponent `2^L`; the delay guarantee rests on the
//! squarings actually happening one after another.

use std::fmt;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use tracing::debug;

use crate::error::{TimeLockError, TimeLockResult};
use crate::mpc::mpz;
use crate::pool::WorkerPool;
use crate::puzzle::Puzzle;

/// Outcome of proof verification. Rejections are ordinary values; only a
/// malformed segmentation is an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    ProofLengthMismatch { expected: usize, actual: usize },
    /// 1-based segment whose checkpoint failed to reproduce.
    CheckpointMismatch { segment: usize },
    FinalMismatch,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "valid"),
            Verdict::ProofLengthMismatch { expected, actual } => {
                write!(f, "proof length mismatch: expected {}, got {}", expected, actual)
            }
            Verdict::CheckpointMismatch { segment } => {
                write!(f, "checkpoint mismatch in segment {}", segment)
            }
            Verdict::FinalMismatch => write!(f, "final checkpoint does not match y"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SegmentedVdf {
    num_segments: usize,
}

impl SegmentedVdf {
    pub fn new(num_segments: usize) -> TimeLockResult<Self> {
        if num_segments == 0 {
            return Err(TimeLockError::BadParameter(
                "segment count must be at least 1".to_string(),
            ));
        }
        Ok(SegmentedVdf { num_segments })
    }

    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    /// Evaluate the puzzle, emitting one checkpoint per segment. Returns
    /// `(y, proof)` with `proof.last() == y`.
    pub fn generate_proof(
        &self,
        puzzle: &Puzzle,
    ) -> TimeLockResult<(BigUint, Vec<BigUint>)> {
        let segment_length = self.segment_length(puzzle.t())?;
        debug!(
            segments = self.num_segments,
            segment_length, "evaluating segmented delay function"
        );

        let n = puzzle.modulus();
        let mut r = puzzle.x().clone();
        let mut proof = Vec::with_capacity(self.num_segments);

        for _ in 0..self.num_segments {
            r = square_chain(&r, segment_length, n);
            proof.push(r.clone());
        }

        Ok((r, proof))
    }

    /// Re-compute one segment and compare against its checkpoint.
    pub fn verify_segment(
        start: &BigUint,
        expected: &BigUint,
        segment_length: u64,
        modulus: &BigUint,
    ) -> bool {
        square_chain(start, segment_length, modulus) == *expected
    }

    /// Check every segment concurrently, then the final checkpoint
    /// against `y`. Accepts iff all segments reproduce and
    /// `proof.last() == y`.
    pub fn parallel_verify(
        &self,
        puzzle: &Puzzle,
        y: &BigUint,
        proof: &[BigUint],
        pool: &WorkerPool,
    ) -> TimeLockResult<Verdict> {
        let segment_length = self.segment_length(puzzle.t())?;

        if proof.len() != self.num_segments {
            return Ok(Verdict::ProofLengthMismatch {
                expected: self.num_segments,
                actual: proof.len(),
            });
        }

        // Segment i restarts from checkpoint i-1; segment 1 from x.
        // Each worker gets its own copies of the endpoints.
        let tasks: Vec<(usize, BigUint, BigUint)> = (0..proof.len())
            .map(|i| {
                let start = if i == 0 {
                    puzzle.x().clone()
                } else {
                    proof[i - 1].clone()
                };
                (i + 1, start, proof[i].clone())
            })
            .collect();

        let modulus = puzzle.modulus();
        let checks = pool.map(tasks, |(segment, start, expected)| {
            Ok((
                segment,
                Self::verify_segment(&start, &expected, segment_length, modulus),
            ))
        })?;

        if let Some((segment, _)) = checks.iter().find(|(_, ok)| !*ok) {
            return Ok(Verdict::CheckpointMismatch { segment: *segment });
        }

        if proof.last() != Some(y) {
            return Ok(Verdict::FinalMismatch);
        }

        Ok(Verdict::Valid)
    }

    fn segment_length(&self, t: &BigUint) -> TimeLockResult<u64> {
        let k = mpz(self.num_segments as u64);
        if !(t % &k).is_zero() {
            return Err(TimeLockError::BadSegmentation(format!(
                "t = {} is not divisible by {} segments",
                t, self.num_segments
            )));
        }
        (t / &k).to_u64().ok_or_else(|| {
            TimeLockError::BadParameter("segment length exceeds u64".to_string())
        })
    }
}

/// `count` sequential squarings of `start` modulo `modulus`.
fn square_chain(start: &BigUint, count: u64, modulus: &BigUint) -> BigUint {
    let mut r = start.clone();
    for _ in 0..count {
        r = (&r * &r) % modulus;
    }
    r
}
