use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use constraint_puzzles::config::PuzzleConfig;
use constraint_puzzles::solver::Backend;
use constraint_puzzles::{Part, Puzzle};

#[derive(Parser, Debug)]
#[command(name = "solver", about = "Solve a puzzle input and print the answer")]
struct Args {
    /// One of hailstones, claws, lights, wiring
    #[arg(name = "PUZZLE")]
    puzzle: Puzzle,

    /// Puzzle text
    #[arg(name = "INPUT")]
    input: PathBuf,

    /// Which part to answer
    #[arg(long, default_value = "two")]
    part: Part,

    /// TOML configuration; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured backend
    #[arg(long)]
    backend: Option<Backend>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args, "arguments parsed");

    let mut config = match &args.config {
        Some(path) => PuzzleConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => PuzzleConfig::default(),
    };
    if let Some(backend) = args.backend {
        config = config.with_backend(backend);
    }

    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let answer = args.puzzle.solve(args.part, &input, &config)
        .with_context(|| format!("solving {} part {}", args.puzzle, args.part))?;

    println!("{answer}");
    Ok(())
}
