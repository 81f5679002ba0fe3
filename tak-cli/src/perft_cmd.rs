//! Perft command - count move paths to validate move generation
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: count_nodes(), report_results()
//! - Level 3: parallel_divide()

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;

use tak_core::{perft, perft_divide, GameState, Move};

use crate::GameArgs;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PerftArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// Search depth in plies
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Start from this TPS position instead of an empty board
    #[arg(long)]
    pub tps: Option<String>,

    /// Print node counts per root move
    #[arg(long)]
    pub divide: bool,

    /// Split root moves across the rayon thread pool
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Serialize)]
struct DivideEntry {
    #[serde(rename = "move")]
    mv: String,
    nodes: u64,
}

#[derive(Clone, Debug, Serialize)]
struct PerftReport {
    tps: String,
    depth: u32,
    nodes: u64,
    elapsed_ms: u64,
    nodes_per_second: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    divide: Option<Vec<DivideEntry>>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run perft command
pub fn run(args: PerftArgs) -> Result<()> {
    let state = args.game.load(args.tps.as_deref())?;
    tracing::info!(
        "Perft depth {} from {} ({})",
        args.depth,
        state.to_tps(),
        if args.parallel { "parallel" } else { "sequential" }
    );

    let start = Instant::now();
    let (nodes, divide) = count_nodes(&state, &args);
    let elapsed = start.elapsed();

    let report = PerftReport {
        tps: state.to_tps(),
        depth: args.depth,
        nodes,
        elapsed_ms: elapsed.as_millis() as u64,
        nodes_per_second: rate(nodes, elapsed),
        divide: args.divide.then(|| {
            divide
                .iter()
                .map(|(mv, nodes)| DivideEntry {
                    mv: mv.to_string(),
                    nodes: *nodes,
                })
                .collect()
        }),
    };
    report_results(&report, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Total nodes plus the per-move split when one was computed
fn count_nodes(state: &GameState, args: &PerftArgs) -> (u64, Vec<(Move, u64)>) {
    if args.depth == 0 || !(args.divide || args.parallel) {
        return (perft(state, args.depth), Vec::new());
    }
    let divide = if args.parallel {
        parallel_divide(state, args.depth)
    } else {
        perft_divide(state, args.depth)
    };
    let nodes = divide.iter().map(|(_, nodes)| nodes).sum();
    (nodes, divide)
}

fn report_results(report: &PerftReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if let Some(divide) = &report.divide {
        for entry in divide {
            println!("{:<12} {}", entry.mv, entry.nodes);
        }
        println!();
    }
    println!("Position: {}", report.tps);
    println!("Depth:    {}", report.depth);
    println!("Nodes:    {}", report.nodes);
    println!(
        "Time:     {}ms ({:.0} nodes/s)",
        report.elapsed_ms, report.nodes_per_second
    );
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Same as `perft_divide`, with each root move searched on its own worker
fn parallel_divide(state: &GameState, depth: u32) -> Vec<(Move, u64)> {
    state
        .possible_moves()
        .par_iter()
        .map(|&mv| {
            let nodes = state
                .clone_and_play(mv)
                .map(|next| perft(&next, depth - 1))
                .unwrap_or(0);
            (mv, nodes)
        })
        .collect()
}

fn rate(nodes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        nodes as f64 / secs
    } else {
        0.0
    }
}
