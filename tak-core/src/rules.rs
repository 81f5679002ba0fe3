//! Terminal condition detection: roads, flat counts and stalemate

use crate::board::{Board, Direction, Square};
use crate::game::{GameResult, Reason};
use crate::pieces::{Color, Reserves};
use std::cmp::Ordering;

/// Which pair of opposite edges a road connects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    /// Left edge (column 0) to right edge
    Horizontal,
    /// Bottom edge (row 0) to top edge
    Vertical,
}

/// Whether `color` has a road in either direction
pub fn has_road(board: &Board, color: Color) -> bool {
    let size = board.size();
    // Squares topped by a flat or capstone of this color
    let mask: Vec<bool> = board
        .stacks()
        .map(|(_, stack)| {
            stack
                .top()
                .map_or(false, |piece| piece.color == color && piece.kind.is_road())
        })
        .collect();

    // Fewer road pieces than the board width can never span it
    if mask.iter().filter(|&&road| road).count() < size {
        return false;
    }

    connects(board, &mask, Axis::Horizontal) || connects(board, &mask, Axis::Vertical)
}

/// Flood fill from one edge over `mask`, looking for the opposite edge
fn connects(board: &Board, mask: &[bool], axis: Axis) -> bool {
    let size = board.size();
    let on_start = |sq: Square| match axis {
        Axis::Horizontal => sq.col == 0,
        Axis::Vertical => sq.row == 0,
    };
    let on_end = |sq: Square| match axis {
        Axis::Horizontal => sq.col as usize == size - 1,
        Axis::Vertical => sq.row as usize == size - 1,
    };

    let mut visited = vec![false; size * size];
    let mut frontier: Vec<Square> = Vec::with_capacity(size * size);
    for square in board.squares() {
        if on_start(square) && mask[square.index(size)] {
            visited[square.index(size)] = true;
            frontier.push(square);
        }
    }

    while let Some(square) = frontier.pop() {
        if on_end(square) {
            return true;
        }
        for direction in Direction::ALL {
            if let Some(next) = board.step(square, direction) {
                let index = next.index(size);
                if mask[index] && !visited[index] {
                    visited[index] = true;
                    frontier.push(next);
                }
            }
        }
    }
    false
}

/// Compare flat counts, half-komi goes to White
pub fn flat_winner(board: &Board, half_komi: i8) -> GameResult {
    let white = 2 * board.flat_count(Color::White) as i32 + i32::from(half_komi);
    let black = 2 * board.flat_count(Color::Black) as i32;
    match white.cmp(&black) {
        Ordering::Greater => GameResult::winner(Color::White, Reason::Flats),
        Ordering::Less => GameResult::winner(Color::Black, Reason::Flats),
        Ordering::Equal => GameResult::Draw,
    }
}

/// Result of a position right after `mover` played, ignoring stalemate.
///
/// Roads come first; when both colors have one the mover wins. Otherwise a
/// full board or a player out of pieces ends the game on flats.
pub fn evaluate(
    board: &Board,
    mover: Color,
    white: Reserves,
    black: Reserves,
    half_komi: i8,
) -> GameResult {
    let white_road = has_road(board, Color::White);
    let black_road = has_road(board, Color::Black);
    match (white_road, black_road) {
        (true, true) => return GameResult::winner(mover, Reason::Road),
        (true, false) => return GameResult::winner(Color::White, Reason::Road),
        (false, true) => return GameResult::winner(Color::Black, Reason::Road),
        (false, false) => {}
    }

    if board.is_full() || white.is_depleted() || black.is_depleted() {
        return flat_winner(board, half_komi);
    }

    GameResult::Ongoing
}

/// Side to move has nothing to play
pub fn stalemate(to_move: Color) -> GameResult {
    GameResult::winner(to_move.opponent(), Reason::Stalemate)
}
