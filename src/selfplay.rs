//! Self-play game generation.
//!
//! Plays full games between the contestant and a baseline (random or
//! rollout player, or a second contestant), alternating colours by game number, and records every move
//! plus the result as one JSON object per game.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::board::{apply, Phase, Side, State, Weight};
use crate::player::{montecarlo, Contestant, MonteCarloPlayer, Player, RandomPlayer, Schedule};
use crate::protocol::judge_move;

/// Who the contestant plays against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Opponent {
    Random,
    #[value(name = "montecarlo")]
    MonteCarlo,
    Contestant,
}

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    pub opponent: Opponent,
    /// Schedule used by every contestant.
    pub schedule: Schedule,
    /// Random games per decision for the rollout player.
    pub rollouts: usize,
    /// Games played at once. 1 plays sequentially.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress logs.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            opponent: Opponent::Random,
            schedule: Schedule::default(),
            rollouts: montecarlo::DEFAULT_TRIALS,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ending {
    /// The loser tipped the board.
    Tipped,
    /// The loser had no ply left.
    NoMoves,
}

/// One ply as played.
#[derive(Debug, Clone, Serialize)]
pub struct MoveRecord {
    pub side: Side,
    pub phase: Phase,
    pub position: i32,
    pub weight: Weight,
}

/// A complete game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub red: &'static str,
    pub blue: &'static str,
    pub winner: Side,
    pub ending: Ending,
    pub moves: Vec<MoveRecord>,
}

impl GameRecord {
    /// Name of the player that won.
    pub fn winner_name(&self) -> &'static str {
        match self.winner {
            Side::Red => self.red,
            Side::Blue => self.blue,
        }
    }
}

fn make_player(kind: Opponent, side: Side, config: &SelfPlayConfig, seed: u64) -> Box<dyn Player> {
    match kind {
        Opponent::Contestant => Box::new(Contestant::new(side, config.schedule.clone(), Some(seed))),
        Opponent::Random => Box::new(RandomPlayer::new(Some(seed))),
        Opponent::MonteCarlo => Box::new(MonteCarloPlayer::with_trials(config.rollouts, Some(seed))),
    }
}

/// Plays one game. The contestant takes Red on even ids, Blue on odd.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, rng: &mut SmallRng) -> GameRecord {
    let contestant_side = if game_id % 2 == 0 { Side::Red } else { Side::Blue };
    let kind = |side: Side| {
        if side == contestant_side {
            Opponent::Contestant
        } else {
            config.opponent
        }
    };
    let mut red = make_player(kind(Side::Red), Side::Red, config, rng.gen());
    let mut blue = make_player(kind(Side::Blue), Side::Blue, config, rng.gen());

    let mut state = State::initial();
    let mut moves = Vec::new();
    let (winner, ending) = loop {
        let mover = state.turn;
        let player = match mover {
            Side::Red => &mut red,
            Side::Blue => &mut blue,
        };
        let ply = match player.next_ply(&state) {
            Ok(ply) => ply,
            Err(e) => {
                if !config.quiet {
                    info!(game_id, side = mover.name(), reason = %e, "no ply");
                }
                break (mover.opponent(), Ending::NoMoves);
            }
        };
        let mv = judge_move(ply, &state);
        moves.push(MoveRecord {
            side: mover,
            phase: state.phase,
            position: mv.position,
            weight: mv.weight,
        });
        apply(ply, &mut state);
        if state.board.is_tipped() {
            break (mover.opponent(), Ending::Tipped);
        }
    };

    GameRecord {
        game_id,
        red: red.name(),
        blue: blue.name(),
        winner,
        ending,
        moves,
    }
}

/// Runs self-play generation, producing every game record.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, rayon::ThreadPoolBuildError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
    })?;
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs self-play generation, calling `on_game` with each completed game.
///
/// Games arrive in completion order, which is not game order when playing
/// in parallel.
pub fn run_self_play_with_callback<F>(
    config: &SelfPlayConfig,
    on_game: F,
) -> Result<(), rayon::ThreadPoolBuildError>
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game)
    } else {
        run_self_play_sequential(config, on_game);
        Ok(())
    }
}

fn game_rng(seed: u64, game_id: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn log_game(config: &SelfPlayConfig, done: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    info!(
        game = done,
        of = config.num_games,
        winner = game.winner_name(),
        side = game.winner.name(),
        plies = game.moves.len(),
        secs = started.elapsed().as_secs_f64(),
        "game finished"
    );
}

fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let game = play_game(config, i, &mut game_rng(config.seed, i));
        log_game(config, i + 1, &game, started);
        on_game(game);
    }
}

/// Plays games on a dedicated rayon pool and hands them back over a channel.
fn run_self_play_parallel<F>(
    config: &SelfPlayConfig,
    mut on_game: F,
) -> Result<(), rayon::ThreadPoolBuildError>
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let started = Instant::now();
                        let game = play_game(config, i, &mut game_rng(config.seed, i));
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_game(config, done, &game, started);
                        if tx.send(game).is_err() {
                            warn!(game_id = i, "receiver gone, dropping game");
                        }
                    });
            });
        });

        for game in rx {
            on_game(game);
        }
    });
    Ok(())
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        write_game_json(game, out)?;
    }
    out.flush()
}

/// Writes a single game record as one JSON line.
pub fn write_game_json<W: Write>(game: &GameRecord, out: &mut W) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, game)?;
    writeln!(out)
}

/// Win counts over a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub contestant_wins: usize,
    pub red_wins: usize,
    pub tipped: usize,
    pub total_plies: usize,
}

/// Tallies results; a game between two contestants counts as a
/// contestant win either way.
pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        ..Summary::default()
    };
    for game in games {
        if game.winner_name() == "contestant" {
            summary.contestant_wins += 1;
        }
        if game.winner == Side::Red {
            summary.red_wins += 1;
        }
        if game.ending == Ending::Tipped {
            summary.tipped += 1;
        }
        summary.total_plies += game.moves.len();
    }
    summary
}

/// Logs a summary of self-play results.
pub fn print_summary(games: &[GameRecord]) {
    let s = summarize(games);
    if s.games == 0 {
        return;
    }
    info!(
        games = s.games,
        contestant_wins = s.contestant_wins,
        red_wins = s.red_wins,
        tipped = s.tipped,
        avg_plies = s.total_plies as f64 / s.games as f64,
        "self-play summary"
    );
}
