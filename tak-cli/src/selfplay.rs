//! Selfplay command - random games as an engine stress test
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game(), check_state()
//! - Level 4: utilities

use anyhow::{bail, ensure, Context, Result};
use clap::Args;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use tak_core::{Color, GameConfig, GameResult, GameState, Reason, Reserves};

use crate::{result_code, GameArgs};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct SelfplayArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// Number of games to play
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Abandon a game after this many plies
    #[arg(long, default_value = "1000")]
    pub max_plies: u16,

    /// Verify conservation, legal-move closure and TPS round-trip every ply
    #[arg(long)]
    pub check: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    result: GameResult,
    code: &'static str,
    plies: u16,
    final_tps: String,
}

#[derive(Clone, Debug, Default, Serialize)]
struct SelfplayStats {
    games: usize,
    white_wins: usize,
    black_wins: usize,
    draws: usize,
    unfinished: usize,
    road_wins: usize,
    flat_wins: usize,
    stalemates: usize,
    avg_plies: f64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run selfplay command
pub fn run(args: SelfplayArgs, seed: Option<u64>) -> Result<()> {
    let config = args.game.config();
    config
        .validate()
        .with_context(|| format!("Invalid game settings: {config:?}"))?;
    tracing::info!(
        "Self-play: {} games on {}x{} (half-komi {})",
        args.games,
        config.size,
        config.size,
        config.half_komi
    );

    let records = play_games(&config, &args, seed)?;
    let stats = compute_statistics(&records);
    report_results(&records, &stats, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_games(config: &GameConfig, args: &SelfplayArgs, seed: Option<u64>) -> Result<Vec<GameRecord>> {
    let mut rng = create_rng(seed);
    let mut records = Vec::with_capacity(args.games);
    for game_number in 1..=args.games {
        let record = play_single_game(config, game_number, args, &mut rng)
            .with_context(|| format!("Game {game_number} failed"))?;
        tracing::debug!(
            "Game {}: {} after {} plies",
            record.game_number,
            record.code,
            record.plies
        );
        if record.result.is_ongoing() {
            tracing::warn!(
                "Game {} hit the {}-ply limit at {}",
                record.game_number,
                args.max_plies,
                record.final_tps
            );
        }
        records.push(record);
    }
    Ok(records)
}

fn report_results(records: &[GameRecord], stats: &SelfplayStats, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            stats: &'a SelfplayStats,
            games: &'a [GameRecord],
        }
        let output = JsonOutput {
            stats,
            games: records,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n=== Self-play Results ===");
    println!("Games:      {}", stats.games);
    println!("White wins: {}", stats.white_wins);
    println!("Black wins: {}", stats.black_wins);
    println!("Draws:      {}", stats.draws);
    println!("Unfinished: {}", stats.unfinished);
    println!(
        "By reason:  {} road, {} flats, {} stalemate",
        stats.road_wins, stats.flat_wins, stats.stalemates
    );
    println!("Avg plies:  {:.1}", stats.avg_plies);
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(
    config: &GameConfig,
    game_number: usize,
    args: &SelfplayArgs,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut state = GameState::new(config)?;
    while state.result().is_ongoing() && state.ply() < args.max_plies {
        if args.check {
            check_state(&state)?;
        }
        let Some(&mv) = state.possible_moves().choose(rng) else {
            bail!("no legal moves in ongoing game at {}", state.to_tps());
        };
        state.play(mv)?;
    }
    if args.check {
        check_state(&state)?;
    }

    Ok(GameRecord {
        game_number,
        result: state.result(),
        code: result_code(state.result()),
        plies: state.ply(),
        final_tps: state.to_tps(),
    })
}

/// Engine invariants every reachable position must satisfy
fn check_state(state: &GameState) -> Result<()> {
    let tps = state.to_tps();
    let start = Reserves::for_size(state.size());
    for color in [Color::White, Color::Black] {
        let (stones, caps) = state.board().piece_count(color);
        let reserves = state.reserves(color);
        ensure!(
            stones + u32::from(reserves.stones) == u32::from(start.stones)
                && caps + u32::from(reserves.caps) == u32::from(start.caps),
            "{color} pieces not conserved at {tps}"
        );
    }

    ensure!(
        state.possible_moves().is_empty() != state.result().is_ongoing(),
        "move list and result disagree at {tps}"
    );

    let config = GameConfig::new(state.size(), state.half_komi());
    let reloaded = GameState::from_tps(&config, &tps)
        .with_context(|| format!("emitted TPS does not parse: {tps}"))?;
    ensure!(
        reloaded.board() == state.board() && reloaded.ply() == state.ply(),
        "TPS round-trip changed the position at {tps}"
    );
    ensure!(
        reloaded.possible_moves() == state.possible_moves(),
        "TPS round-trip changed the legal moves at {tps}"
    );

    for &mv in state.possible_moves() {
        let next = state
            .clone_and_play(mv)
            .with_context(|| format!("generated move {mv} rejected at {tps}"))?;
        ensure!(next.ply() == state.ply() + 1, "{mv} did not advance the ply at {tps}");
    }
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn compute_statistics(records: &[GameRecord]) -> SelfplayStats {
    let mut stats = SelfplayStats {
        games: records.len(),
        ..SelfplayStats::default()
    };
    for record in records {
        match record.result {
            GameResult::Ongoing => stats.unfinished += 1,
            GameResult::Draw => stats.draws += 1,
            GameResult::Winner { color, reason } => {
                match color {
                    Color::White => stats.white_wins += 1,
                    Color::Black => stats.black_wins += 1,
                }
                match reason {
                    Reason::Road => stats.road_wins += 1,
                    Reason::Flats => stats.flat_wins += 1,
                    Reason::Stalemate => stats.stalemates += 1,
                }
            }
        }
    }
    if !records.is_empty() {
        let total: u64 = records.iter().map(|r| u64::from(r.plies)).sum();
        stats.avg_plies = total as f64 / records.len() as f64;
    }
    stats
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
