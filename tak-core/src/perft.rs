//! Move-path enumeration for validating move generation

use crate::game::GameState;
use crate::moves::Move;

/// Count leaf nodes `depth` plies below `state`.
///
/// Terminal positions count as leaves and are not expanded further. A depth
/// of `0` counts the position itself.
pub fn perft(state: &GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = state.possible_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|&mv| match state.clone_and_play(mv) {
            Ok(next) => perft(&next, depth - 1),
            Err(_) => 0,
        })
        .sum()
}

/// Per-root-move node counts, in move generation order
pub fn perft_divide(state: &GameState, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    state
        .possible_moves()
        .iter()
        .map(|&mv| {
            let nodes = match state.clone_and_play(mv) {
                Ok(next) => perft(&next, depth - 1),
                Err(_) => 0,
            };
            (mv, nodes)
        })
        .collect()
}
