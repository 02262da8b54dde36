//! Worker-pool adapter.
//!
//! CPU-bound fan-out happens through one of these: batch puzzle
//! generation, batch trapdoor solving, and parallel proof verification.
//! Results always come back in input order, and the first worker error
//! aborts the whole batch.

use rayon::prelude::*;

use crate::config::Config;
use crate::error::{TimeLockError, TimeLockResult};

pub struct WorkerPool {
    degree: usize,
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Pool with an explicit degree of parallelism (clamped to >= 1).
    pub fn new(degree: usize) -> TimeLockResult<Self> {
        let degree = degree.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(degree)
            .build()
            .map_err(|e| TimeLockError::ThreadError(e.to_string()))?;
        Ok(WorkerPool { degree, pool })
    }

    /// Pool sized from configuration: `max(1, cpu_count / divisor)`.
    pub fn from_config(config: &Config) -> TimeLockResult<Self> {
        Self::new(Self::degree_for(config.parallelism_divisor))
    }

    pub fn degree_for(divisor: usize) -> usize {
        (num_cpus::get() / divisor.max(1)).max(1)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Apply `op` to every input with up to `degree()` concurrent
    /// workers. Outputs are emitted in input-index order regardless of
    /// completion order; a failing worker aborts the batch with its
    /// error and prior successes are discarded.
    pub fn map<I, O, F>(&self, inputs: Vec<I>, op: F) -> TimeLockResult<Vec<O>>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> TimeLockResult<O> + Sync + Send,
    {
        self.pool
            .install(|| inputs.into_par_iter().map(&op).collect())
    }
}
