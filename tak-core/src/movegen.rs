//! Legal move enumeration
//!
//! Order is fixed: placements by square index (flat, wall, capstone), then
//! spreads by origin square, direction (up, down, left, right), pickup count
//! and drop pattern in lexicographic order.

use crate::board::{Board, Direction, Square};
use crate::moves::{Drops, Move};
use crate::pieces::{Color, PieceKind, Reserves};

/// Everything move generation needs to know about a position
#[derive(Clone, Copy, Debug)]
pub struct MoveContext<'a> {
    pub board: &'a Board,
    pub to_move: Color,
    /// Reserves of the color that will be placed (the opponent's during the opening)
    pub placing: Reserves,
    pub opening: bool,
}

/// Append every legal move for the side to move
pub fn generate_moves(ctx: &MoveContext<'_>, moves: &mut Vec<Move>) {
    generate_placements(ctx, moves);
    if !ctx.opening {
        generate_spreads(ctx.board, ctx.to_move, moves);
    }
}

fn generate_placements(ctx: &MoveContext<'_>, moves: &mut Vec<Move>) {
    for (square, stack) in ctx.board.stacks() {
        if !stack.is_empty() {
            continue;
        }
        for kind in PieceKind::ALL {
            if ctx.opening && kind != PieceKind::Flat {
                continue;
            }
            if ctx.placing.has(kind) {
                moves.push(Move::place(square, kind));
            }
        }
    }
}

fn generate_spreads(board: &Board, color: Color, moves: &mut Vec<Move>) {
    for (square, stack) in board.stacks() {
        let top = match stack.top() {
            Some(top) if top.color == color => top,
            _ => continue,
        };
        let max_pickup = stack.height().min(board.carry_limit());

        for direction in Direction::ALL {
            let (open, wall_ahead) = reach(board, square, direction);
            let can_smash = wall_ahead && top.kind == PieceKind::Cap;

            for pickup in 1..=max_pickup {
                let mut push = |counts: &[u8]| {
                    if let Some(drops) = Drops::new(counts) {
                        moves.push(Move::spread(square, direction, drops));
                    }
                };
                compositions(pickup, 1, open, &mut Vec::new(), &mut push);

                // Cover every open square, then the capstone alone hits the wall
                if can_smash {
                    if open == 0 {
                        if pickup == 1 {
                            push(&[1]);
                        }
                    } else {
                        let mut with_smash = |prefix: &[u8]| {
                            let mut counts = prefix.to_vec();
                            counts.push(1);
                            push(&counts);
                        };
                        compositions(pickup - 1, open, open, &mut Vec::new(), &mut with_smash);
                    }
                }
            }
        }
    }
}

/// Number of squares a spread can enter in a direction before hitting the
/// edge, a wall or a capstone, and whether the blocker is a wall
pub(crate) fn reach(board: &Board, from: Square, direction: Direction) -> (usize, bool) {
    let mut open = 0;
    let mut current = from;
    while let Some(next) = board.step(current, direction) {
        match board.top(next).map(|piece| piece.kind) {
            None | Some(PieceKind::Flat) => {
                open += 1;
                current = next;
            }
            Some(PieceKind::Wall) => return (open, true),
            Some(PieceKind::Cap) => return (open, false),
        }
    }
    (open, false)
}

/// Call `emit` with every sequence of positive counts summing to `total`
/// whose length lies in `min_len..=max_len`
fn compositions<F: FnMut(&[u8])>(
    total: usize,
    min_len: usize,
    max_len: usize,
    prefix: &mut Vec<u8>,
    emit: &mut F,
) {
    if prefix.len() >= max_len {
        return;
    }
    for first in 1..=total {
        prefix.push(first as u8);
        if first == total {
            if prefix.len() >= min_len {
                emit(prefix);
            }
        } else {
            compositions(total - first, min_len, max_len, prefix, emit);
        }
        prefix.pop();
    }
}
