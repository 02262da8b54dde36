//! Batch puzzle generator: `generate <count>`.

use std::process;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use timelock::config::Config;
use timelock::constants::{BIT_SIZE, TIMING_PARAMETER};
use timelock::error::TimeLockResult;
use timelock::mpc::mpz;
use timelock::store::{open_store, PuzzleRecord, PuzzleStore, RsaRecord};
use timelock::{PuzzleFactory, WorkerPool};

#[derive(Parser)]
#[command(name = "generate", about = "Generate time-lock puzzles and save them")]
struct Cli {
    /// Number of puzzles to generate
    count: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("generation failed: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> TimeLockResult<()> {
    let config = Config::from_env();
    let pool = WorkerPool::from_config(&config)?;
    let factory = PuzzleFactory::new(BIT_SIZE, mpz(TIMING_PARAMETER))?;

    let started = Instant::now();
    let triples = factory.create_puzzles(cli.count, &pool)?;
    info!(
        count = triples.len(),
        elapsed = ?started.elapsed(),
        "puzzle generation finished"
    );

    let store = open_store(&config)?;
    let started = Instant::now();
    for (puzzle, rsa, y) in &triples {
        let rsa_record = RsaRecord::from_key(rsa);
        let puzzle_record = PuzzleRecord::new(puzzle, y, &rsa_record.id);
        store.save_rsa(&rsa_record)?;
        store.save_puzzle(&puzzle_record)?;
    }
    info!(elapsed = ?started.elapsed(), "records saved");

    Ok(())
}
