//! Square board geometry and stack storage

use crate::error::ParseError;
use crate::pieces::{Color, Piece, PieceKind, Stack, MAX_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board coordinates: column (file) and row (rank), both 0-indexed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub col: u8,
    pub row: u8,
}

impl Square {
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Index into row-major storage
    pub fn index(self, size: usize) -> usize {
        self.row as usize * size + self.col as usize
    }

    pub fn from_index(index: usize, size: usize) -> Self {
        Self::new((index % size) as u8, (index / size) as u8)
    }

    pub fn is_on_board(self, size: usize) -> bool {
        (self.col as usize) < size && (self.row as usize) < size
    }

    /// Neighbor in a direction, `None` when it would leave the board
    pub fn step(self, direction: Direction, size: usize) -> Option<Square> {
        let (dc, dr) = direction.delta();
        let col = self.col as i8 + dc;
        let row = self.row as i8 + dr;
        if col < 0 || row < 0 || col as usize >= size || row as usize >= size {
            return None;
        }
        Some(Square::new(col as u8, row as u8))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::Square(s.to_string()));
        }
        let (file, rank) = (bytes[0], bytes[1]);
        let max_file = b'a' + MAX_SIZE as u8;
        let max_rank = b'1' + MAX_SIZE as u8;
        if !(b'a'..max_file).contains(&file) || !(b'1'..max_rank).contains(&rank) {
            return Err(ParseError::Square(s.to_string()));
        }
        Ok(Square::new(file - b'a', rank - b'1'))
    }
}

/// Spread direction. Up increases the row (towards higher ranks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (dcol, drow)
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Direction::Up => '+',
            Direction::Down => '-',
            Direction::Left => '<',
            Direction::Right => '>',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Direction::Up),
            '-' => Some(Direction::Down),
            '<' => Some(Direction::Left),
            '>' => Some(Direction::Right),
            _ => None,
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// `size` x `size` grid of stacks in row-major order
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    squares: Vec<Stack>,
}

impl Board {
    /// Empty board. Size validation happens in `GameConfig`.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            squares: vec![Stack::new(); size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Maximum number of pieces one spread may pick up
    pub fn carry_limit(&self) -> usize {
        self.size
    }

    /// Stack at a square.
    ///
    /// # Panics
    /// Panics if the square is off the board.
    pub fn get(&self, square: Square) -> &Stack {
        assert!(square.is_on_board(self.size), "{square} is off the board");
        &self.squares[square.index(self.size)]
    }

    /// Replace the stack at a square
    pub fn set(&mut self, square: Square, stack: Stack) {
        assert!(square.is_on_board(self.size), "{square} is off the board");
        self.squares[square.index(self.size)] = stack;
    }

    pub(crate) fn get_mut(&mut self, square: Square) -> &mut Stack {
        assert!(square.is_on_board(self.size), "{square} is off the board");
        &mut self.squares[square.index(self.size)]
    }

    pub fn top(&self, square: Square) -> Option<Piece> {
        self.get(square).top()
    }

    pub fn push(&mut self, square: Square, piece: Piece) {
        self.get_mut(square).push(piece);
    }

    /// Pop the top `count` pieces of a square, bottom to top
    pub fn take(&mut self, square: Square, count: usize) -> Vec<Piece> {
        self.get_mut(square).take(count)
    }

    pub fn step(&self, square: Square, direction: Direction) -> Option<Square> {
        square.step(direction, self.size)
    }

    /// All squares in storage order
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        let size = self.size;
        (0..size * size).map(move |index| Square::from_index(index, size))
    }

    /// Squares paired with their stacks, in storage order
    pub fn stacks(&self) -> impl Iterator<Item = (Square, &Stack)> + '_ {
        let size = self.size;
        self.squares
            .iter()
            .enumerate()
            .map(move |(index, stack)| (Square::from_index(index, size), stack))
    }

    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|stack| !stack.is_empty())
    }

    /// Flats on top of stacks for one color
    pub fn flat_count(&self, color: Color) -> u32 {
        self.squares
            .iter()
            .filter(|stack| stack.top() == Some(Piece::flat(color)))
            .count() as u32
    }

    /// (stones, capstones) of one color anywhere on the board
    pub fn piece_count(&self, color: Color) -> (u32, u32) {
        self.squares
            .iter()
            .flat_map(|stack| stack.iter())
            .filter(|piece| piece.color == color)
            .fold((0, 0), |(stones, caps), piece| match piece.kind {
                PieceKind::Cap => (stones, caps + 1),
                PieceKind::Flat | PieceKind::Wall => (stones + 1, caps),
            })
    }
}
