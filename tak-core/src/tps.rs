//! Tak Positional System (TPS) notation
//!
//! `x5/x5/x2,12S,x2/x5/1,x4 2 3`: rows from the top rank down separated by
//! `/`, squares separated by `,`. `x` is an empty square, `xN` is N of them.
//! A stack lists colors bottom to top (`1` White, `2` Black), optionally
//! ending in `S` (wall) or `C` (capstone). Then the side to move (`1` or
//! `2`) and the full-move number starting at 1.

use crate::board::{Board, Square};
use crate::error::{ParseError, PositionError, TakError};
use crate::pieces::{Color, Piece, PieceKind, Stack};
use std::fmt::Write;

/// Parse TPS for a board of `size`, returning the board, side to move and ply
pub fn parse(text: &str, size: usize) -> Result<(Board, Color, u16), TakError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.is_empty() {
        return Err(ParseError::Empty.into());
    }
    if fields.len() != 3 {
        return Err(ParseError::FieldCount(fields.len()).into());
    }

    let rows: Vec<&str> = fields[0].split('/').collect();
    if rows.len() != size {
        return Err(PositionError::SizeMismatch {
            expected: size,
            found: rows.len(),
        }
        .into());
    }

    let mut board = Board::new(size);
    for (i, row_text) in rows.iter().enumerate() {
        let row = (size - 1 - i) as u8;
        for (col, stack) in parse_row(row_text, size, i + 1)?.into_iter().enumerate() {
            board.set(Square::new(col as u8, row), stack);
        }
    }

    let to_move = match fields[1] {
        "1" => Color::White,
        "2" => Color::Black,
        other => return Err(ParseError::SideToMove(other.to_string()).into()),
    };

    let bad_number = || ParseError::MoveNumber(fields[2].to_string());
    let move_number: u16 = fields[2].parse().map_err(|_| bad_number())?;
    let ply = move_number
        .checked_sub(1)
        .and_then(|full_moves| full_moves.checked_mul(2))
        .and_then(|ply| ply.checked_add(to_move as u16))
        .ok_or_else(bad_number)?;

    Ok((board, to_move, ply))
}

fn parse_row(text: &str, size: usize, row_number: usize) -> Result<Vec<Stack>, ParseError> {
    let mut stacks = Vec::with_capacity(size);
    for token in text.split(',') {
        if let Some(count) = token.strip_prefix('x') {
            let empties = if count.is_empty() {
                1
            } else {
                count
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0 && n <= size)
                    .ok_or_else(|| ParseError::Stack(token.to_string()))?
            };
            if stacks.len() + empties > size {
                return Err(ParseError::ColumnCount {
                    row: row_number,
                    found: stacks.len() + empties,
                    expected: size,
                });
            }
            stacks.resize(stacks.len() + empties, Stack::new());
        } else {
            stacks.push(parse_stack(token)?);
        }
    }
    if stacks.len() != size {
        return Err(ParseError::ColumnCount {
            row: row_number,
            found: stacks.len(),
            expected: size,
        });
    }
    Ok(stacks)
}

fn parse_stack(token: &str) -> Result<Stack, ParseError> {
    let bad = || ParseError::Stack(token.to_string());
    let mut pieces = Vec::new();
    let mut chars = token.chars().peekable();
    while let Some(ch) = chars.next() {
        if let Some(color) = Color::from_digit(ch) {
            pieces.push(Piece::flat(color));
            continue;
        }
        let kind = match ch {
            'S' => PieceKind::Wall,
            'C' => PieceKind::Cap,
            _ => return Err(bad()),
        };
        // Only the top piece can stand
        if chars.peek().is_some() {
            return Err(bad());
        }
        pieces.last_mut().ok_or_else(bad)?.kind = kind;
    }
    if pieces.is_empty() {
        return Err(bad());
    }
    Ok(Stack::from_pieces(pieces))
}

/// Canonical TPS, runs of empty squares merged
pub fn format(board: &Board, to_move: Color, ply: u16) -> String {
    let size = board.size();
    let mut out = String::new();
    for row in (0..size).rev() {
        if row != size - 1 {
            out.push('/');
        }
        let mut tokens: Vec<String> = Vec::with_capacity(size);
        let mut empties = 0;
        for col in 0..size {
            let stack = board.get(Square::new(col as u8, row as u8));
            if stack.is_empty() {
                empties += 1;
                continue;
            }
            if empties > 0 {
                tokens.push(empty_token(empties));
                empties = 0;
            }
            tokens.push(stack_token(stack));
        }
        if empties > 0 {
            tokens.push(empty_token(empties));
        }
        out.push_str(&tokens.join(","));
    }
    let _ = write!(out, " {} {}", to_move.digit(), ply / 2 + 1);
    out
}

fn empty_token(count: usize) -> String {
    if count == 1 {
        "x".to_string()
    } else {
        format!("x{count}")
    }
}

fn stack_token(stack: &Stack) -> String {
    let mut token: String = stack.colors().map(Color::digit).collect();
    if let Some(letter) = stack.top().and_then(|piece| piece.kind.letter()) {
        token.push(letter);
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let (board, to_move, ply) = parse("x5/x5/x5/x5/x5 1 1", 5).unwrap();
        assert_eq!(board, Board::new(5));
        assert_eq!(to_move, Color::White);
        assert_eq!(ply, 0);
        assert_eq!(format(&board, to_move, ply), "x5/x5/x5/x5/x5 1 1");
    }

    #[test]
    fn test_stacks_and_ply() {
        let (board, to_move, ply) = parse("x,1121C,1/x2,11S/x3 2 7", 3).unwrap();
        assert_eq!(to_move, Color::Black);
        assert_eq!(ply, 13);

        let b3 = board.get(Square::new(1, 2));
        let colors: Vec<Color> = b3.colors().collect();
        assert_eq!(
            colors,
            vec![Color::White, Color::White, Color::Black, Color::White]
        );
        assert_eq!(b3.top().map(|p| p.kind), Some(PieceKind::Cap));
        assert_eq!(board.top(Square::new(2, 1)).map(|p| p.kind), Some(PieceKind::Wall));
        assert!(board.get(Square::new(0, 0)).is_empty());
    }

    #[test]
    fn test_format_merges_empties() {
        let (board, to_move, ply) = parse("x,x,1/x,x,x/2,x,x 1 2", 3).unwrap();
        assert_eq!(format(&board, to_move, ply), "x2,1/x3/2,x2 1 2");
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(parse("", 3), Err(TakError::Parse(ParseError::Empty)));
        assert_eq!(parse("x3/x3/x3 1", 3), Err(TakError::Parse(ParseError::FieldCount(2))));
        assert_eq!(
            parse("x3/x3 1 1", 3),
            Err(TakError::Position(PositionError::SizeMismatch { expected: 3, found: 2 }))
        );
        assert_eq!(
            parse("x3/x2/x3 1 1", 3),
            Err(TakError::Parse(ParseError::ColumnCount { row: 2, found: 2, expected: 3 }))
        );
        assert_eq!(
            parse("x3/x2,1,1/x3 1 1", 3),
            Err(TakError::Parse(ParseError::ColumnCount { row: 2, found: 4, expected: 3 }))
        );
        assert_eq!(
            parse("x3/x,3,x/x3 1 1", 3),
            Err(TakError::Parse(ParseError::Stack("3".to_string())))
        );
        assert_eq!(
            parse("x3/x,1S2,x/x3 1 1", 3),
            Err(TakError::Parse(ParseError::Stack("1S2".to_string())))
        );
        assert_eq!(
            parse("x3/x,C,x/x3 1 1", 3),
            Err(TakError::Parse(ParseError::Stack("C".to_string())))
        );
        assert_eq!(
            parse("1,x18446744073709551615/x3/x3 1 1", 3),
            Err(TakError::Parse(ParseError::Stack("x18446744073709551615".to_string())))
        );
        assert_eq!(
            parse("x3/x9/x3 1 1", 3),
            Err(TakError::Parse(ParseError::Stack("x9".to_string())))
        );
        assert_eq!(
            parse("x3/x3/x3 3 1", 3),
            Err(TakError::Parse(ParseError::SideToMove("3".to_string())))
        );
        assert_eq!(
            parse("x3/x3/x3 1 0", 3),
            Err(TakError::Parse(ParseError::MoveNumber("0".to_string())))
        );
    }
}
