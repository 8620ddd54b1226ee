//! Fulcrum -- a No Tipping player for the judge pipe protocol.
//!
//! Reads state blocks from stdin and writes one `<position> <weight>` line
//! per block to stdout. Logs go to stderr; set `RUST_LOG` to adjust.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use fulcrum::engine::Engine;
use fulcrum::player::Schedule;

#[derive(Debug, Parser)]
#[command(name = "fulcrum", version, about = "No Tipping game player")]
struct Args {
    /// JSON depth schedule; built-in defaults when omitted.
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Seed for root move ordering.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let schedule = match &args.schedule {
        Some(path) => match Schedule::load(path) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "bad schedule");
                return ExitCode::FAILURE;
            }
        },
        None => Schedule::default(),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new(schedule, args.seed);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if let Err(e) = engine.handle_line(&line, &mut out) {
            error!(error = %e, "stdout closed");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
