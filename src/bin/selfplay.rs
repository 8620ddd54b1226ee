//! Self-play game generation CLI.
//!
//! Plays No Tipping games between the contestant and an opponent and
//! writes one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- --games 20 --opponent random --output games.jsonl

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fulcrum::player::Schedule;
use fulcrum::selfplay::{self, Opponent, SelfPlayConfig};

#[derive(Debug, Parser)]
#[command(name = "selfplay", about = "Generate No Tipping self-play games")]
struct Args {
    /// Number of games to play.
    #[arg(long, default_value_t = 10)]
    games: usize,

    #[arg(long, value_enum, default_value_t = Opponent::Random)]
    opponent: Opponent,

    /// Random games per decision for the montecarlo opponent.
    #[arg(long, default_value_t = fulcrum::player::montecarlo::DEFAULT_TRIALS)]
    rollouts: usize,

    /// JSON depth schedule for contestants.
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Games played in parallel.
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Random seed, 0 for entropy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output file; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress per-game progress.
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
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

    let config = SelfPlayConfig {
        num_games: args.games,
        opponent: args.opponent,
        schedule,
        rollouts: args.rollouts.max(1),
        threads: args.threads.max(1),
        seed: args.seed,
        quiet: args.quiet,
    };
    info!(
        games = config.num_games,
        opponent = ?config.opponent,
        threads = config.threads,
        seed = config.seed,
        "starting self-play"
    );

    let mut writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot create output");
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let start = Instant::now();
    let mut games = Vec::with_capacity(config.num_games);
    let mut write_failed = None;
    let run = selfplay::run_self_play_with_callback(&config, |game| {
        if write_failed.is_none() {
            if let Err(e) = selfplay::write_game_json(&game, &mut writer) {
                write_failed = Some(e);
            }
        }
        games.push(game);
    });
    if let Err(e) = run {
        error!(error = %e, "cannot start worker pool");
        return ExitCode::FAILURE;
    }
    if let Some(e) = write_failed.or_else(|| writer.flush().err()) {
        error!(error = %e, "failed writing games");
        return ExitCode::FAILURE;
    }

    if !args.quiet {
        selfplay::print_summary(&games);
        info!(secs = start.elapsed().as_secs_f64(), "done");
    }
    ExitCode::SUCCESS
}
