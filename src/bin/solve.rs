//! Sequential puzzle solver: `solve <x_hex> <t_decimal> <N_hex>`.
//!
//! No trapdoor involved; this performs the actual t squarings.

use std::process;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use timelock::error::TimeLockResult;
use timelock::mpc::{from_dec, from_hex, to_hex};
use timelock::{PuzzleBuilder, SequentialSolver};

#[derive(Parser)]
#[command(
    name = "solve",
    about = "Solve a time-lock puzzle by sequential squaring (no private key)"
)]
struct Cli {
    /// The input value x (hex string)
    x: String,
    /// The time parameter t (number of squarings, decimal)
    t: String,
    /// The modulus N (hex string)
    n: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("solving failed: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> TimeLockResult<()> {
    let puzzle = PuzzleBuilder::new()
        .x(from_hex(&cli.x)?)
        .t(from_dec(&cli.t)?)
        .modulus(from_hex(&cli.n)?)
        .build()?;

    info!(t = %puzzle.t(), "solving by sequential squaring; this may take a while");
    let started = Instant::now();
    let y = SequentialSolver::solve(&puzzle);
    info!(elapsed = ?started.elapsed(), "solved");

    println!("y = {}", to_hex(&y));
    Ok(())
}
