//! Replay command - apply a PTN move list and report the final position

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use tak_core::{Color, GameResult, GameState};

use crate::{result_code, GameArgs};

#[derive(Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// Start from this TPS position instead of an empty board
    #[arg(long)]
    pub tps: Option<String>,

    /// Moves in PTN; move numbers such as `12.` are skipped
    #[arg(value_name = "MOVE")]
    pub moves: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Serialize)]
struct ReplayReport {
    tps: String,
    ply: u16,
    to_move: Color,
    result: GameResult,
    code: &'static str,
    white_reserves: (u8, u8),
    black_reserves: (u8, u8),
    legal_moves: usize,
}

/// Run replay command
pub fn run(args: ReplayArgs) -> Result<()> {
    let mut state = args.game.load(args.tps.as_deref())?;
    replay(&mut state, &args.moves)?;

    let white = state.reserves(Color::White);
    let black = state.reserves(Color::Black);
    let report = ReplayReport {
        tps: state.to_tps(),
        ply: state.ply(),
        to_move: state.to_move(),
        result: state.result(),
        code: result_code(state.result()),
        white_reserves: (white.stones, white.caps),
        black_reserves: (black.stones, black.caps),
        legal_moves: state.possible_moves().len(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.tps);
        println!("Result: {}", report.code);
    }
    Ok(())
}

/// Play every move token in order, stopping at the first rejected one
fn replay(state: &mut GameState, moves: &[String]) -> Result<()> {
    let tokens = moves
        .iter()
        .flat_map(|text| text.split_whitespace())
        .filter(|token| !is_move_number(token));

    for (index, token) in tokens.enumerate() {
        let ply = state.ply();
        let mv = state
            .play_ptn(token)
            .with_context(|| format!("Move {} ({token}) rejected at ply {ply}", index + 1))?;
        tracing::debug!(ply, mv = %mv, "replayed");
    }
    Ok(())
}

fn is_move_number(token: &str) -> bool {
    token
        .strip_suffix('.')
        .is_some_and(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
}
