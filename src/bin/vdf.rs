//! Segmented delay-function runner: evaluates one puzzle with protocol
//! constants, verifies the proof in parallel, and saves the record.

use std::process;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use timelock::config::Config;
use timelock::constants::{BIT_SIZE, NUM_SEGMENTS, TIMING_PARAMETER};
use timelock::error::TimeLockResult;
use timelock::mpc::{mpz, to_hex};
use timelock::store::{open_store, PuzzleStore, VdfRecord};
use timelock::{PuzzleFactory, SegmentedVdf, WorkerPool};

#[derive(Parser)]
#[command(
    name = "vdf",
    about = "Evaluate a segmented delay function and save its proof"
)]
struct Cli {}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let _cli = Cli::parse();
    if let Err(e) = run() {
        error!("vdf evaluation failed: {}", e);
        process::exit(1);
    }
}

fn run() -> TimeLockResult<()> {
    let config = Config::from_env();
    let pool = WorkerPool::from_config(&config)?;
    let factory = PuzzleFactory::new(BIT_SIZE, mpz(TIMING_PARAMETER))?;

    let (puzzle, _rsa, expected) = factory.create_puzzle()?;
    info!(modulus = %to_hex(puzzle.modulus()), "generated puzzle");

    let vdf = SegmentedVdf::new(NUM_SEGMENTS)?;
    let started = Instant::now();
    let (y, proof) = vdf.generate_proof(&puzzle)?;
    info!(elapsed = ?started.elapsed(), output = %to_hex(&y), "proof generated");

    if y != expected {
        error!("segmented evaluation disagrees with the trapdoor solution");
        process::exit(1);
    }

    let started = Instant::now();
    let verdict = vdf.parallel_verify(&puzzle, &y, &proof, &pool)?;
    info!(elapsed = ?started.elapsed(), %verdict, "parallel verification finished");

    if !verdict.is_valid() {
        error!("verification failed, aborting save");
        process::exit(1);
    }

    let store = open_store(&config)?;
    store.save_vdf(&VdfRecord::new(&puzzle, &y, &proof))?;
    info!("record saved");

    Ok(())
}
