//! Tak CLI - Command-line tooling for the rules engine
//!
//! Commands:
//! - perft: Count move paths from a position
//! - selfplay: Play random games and check engine invariants
//! - replay: Apply a PTN move list to a position

mod perft_cmd;
mod replay;
mod selfplay;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tak_core::{Color, GameConfig, GameResult, GameState, Reason};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tak")]
#[command(about = "Tak rules engine tooling")]
struct Cli {
    /// Seed for reproducible random runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count leaf nodes below a position
    Perft(perft_cmd::PerftArgs),
    /// Play random games, checking invariants along the way
    Selfplay(selfplay::SelfplayArgs),
    /// Play a PTN move list from a position and print the outcome
    Replay(replay::ReplayArgs),
}

/// Board options shared by every command
#[derive(Args, Clone, Debug)]
pub struct GameArgs {
    /// Board size (3-8)
    #[arg(long, default_value = "5")]
    pub size: usize,

    /// Half-komi added to White's doubled flat count
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub half_komi: i8,
}

impl GameArgs {
    pub fn config(&self) -> GameConfig {
        GameConfig::default()
            .with_size(self.size)
            .with_half_komi(self.half_komi)
    }

    /// Starting position, or the given TPS
    pub fn load(&self, tps: Option<&str>) -> Result<GameState> {
        let config = self.config();
        match tps {
            Some(text) => GameState::from_tps(&config, text)
                .with_context(|| format!("Failed to load position: {text}")),
            None => GameState::new(&config)
                .with_context(|| format!("Invalid game settings: {config:?}")),
        }
    }
}

/// PTN result code: `R-0`, `0-F`, `1/2-1/2`, ...
pub fn result_code(result: GameResult) -> &'static str {
    match result {
        GameResult::Ongoing => "ongoing",
        GameResult::Draw => "1/2-1/2",
        GameResult::Winner { color, reason } => match (color, reason) {
            (Color::White, Reason::Road) => "R-0",
            (Color::White, Reason::Flats) => "F-0",
            (Color::White, Reason::Stalemate) => "1-0",
            (Color::Black, Reason::Road) => "0-R",
            (Color::Black, Reason::Flats) => "0-F",
            (Color::Black, Reason::Stalemate) => "0-1",
        },
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Perft(args) => perft_cmd::run(args),
        Commands::Selfplay(args) => selfplay::run(args, cli.seed),
        Commands::Replay(args) => replay::run(args),
    }
}
