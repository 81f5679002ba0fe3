//! Piece, stack and reserve definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// TPS digit for this color ('1' or '2')
    pub fn digit(self) -> char {
        match self {
            Color::White => '1',
            Color::Black => '2',
        }
    }

    pub fn from_digit(ch: char) -> Option<Self> {
        match ch {
            '1' => Some(Color::White),
            '2' => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Piece kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Flat,
    Wall,
    Cap,
}

impl PieceKind {
    pub const ALL: [PieceKind; 3] = [PieceKind::Flat, PieceKind::Wall, PieceKind::Cap];

    /// Flats and capstones count towards roads, walls do not
    pub fn is_road(self) -> bool {
        matches!(self, PieceKind::Flat | PieceKind::Cap)
    }

    /// Walls and capstones cannot be stacked on (except by a smash)
    pub fn is_blocking(self) -> bool {
        matches!(self, PieceKind::Wall | PieceKind::Cap)
    }

    /// Notation suffix/prefix, `None` for flats
    pub fn letter(self) -> Option<char> {
        match self {
            PieceKind::Flat => None,
            PieceKind::Wall => Some('S'),
            PieceKind::Cap => Some('C'),
        }
    }
}

/// A single piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    pub const fn flat(color: Color) -> Self {
        Self::new(PieceKind::Flat, color)
    }
}

// ============================================================================
// STACKS
// ============================================================================

/// Pieces on one square, bottom to top.
///
/// Only the top piece may be a wall or a capstone. Everything underneath is a
/// flat whose color is still tracked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stack {
    pieces: Vec<Piece>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pieces(pieces: Vec<Piece>) -> Self {
        Self { pieces }
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn height(&self) -> usize {
        self.pieces.len()
    }

    pub fn top(&self) -> Option<Piece> {
        self.pieces.last().copied()
    }

    /// Color of the top piece, which controls the stack
    pub fn controller(&self) -> Option<Color> {
        self.top().map(|piece| piece.color)
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn iter(&self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces.iter().copied()
    }

    /// Colors bottom to top
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.pieces.iter().map(|piece| piece.color)
    }

    /// Put a piece on top. Callers are responsible for flattening a wall first.
    pub fn push(&mut self, piece: Piece) {
        debug_assert!(
            self.top().map_or(true, |top| top.kind == PieceKind::Flat),
            "pushing onto a blocking piece"
        );
        self.pieces.push(piece);
    }

    /// Remove the top `count` pieces, returned bottom to top
    pub fn take(&mut self, count: usize) -> Vec<Piece> {
        let split = self.pieces.len().saturating_sub(count);
        self.pieces.split_off(split)
    }

    /// Turn a wall on top into a flat (capstone smash)
    pub fn flatten_top(&mut self) {
        if let Some(top) = self.pieces.last_mut() {
            if top.kind == PieceKind::Wall {
                top.kind = PieceKind::Flat;
            }
        }
    }
}

// ============================================================================
// RESERVES
// ============================================================================

/// Board sizes the engine supports
pub const MIN_SIZE: usize = 3;
pub const MAX_SIZE: usize = 8;

/// Starting (stones, capstones) per color, indexed by board size
const STARTING_RESERVES: [(u8, u8); MAX_SIZE + 1] = [
    (0, 0),
    (0, 0),
    (0, 0),
    (10, 0),
    (15, 0),
    (21, 1),
    (30, 1),
    (40, 2),
    (50, 2),
];

/// Pieces a player still has in hand
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reserves {
    /// Flats or walls
    pub stones: u8,
    pub caps: u8,
}

impl Reserves {
    pub const fn new(stones: u8, caps: u8) -> Self {
        Self { stones, caps }
    }

    /// Full starting allotment for a board size, empty for unsupported sizes
    pub fn for_size(size: usize) -> Self {
        STARTING_RESERVES
            .get(size)
            .map(|&(stones, caps)| Self::new(stones, caps))
            .unwrap_or_default()
    }

    pub fn is_depleted(&self) -> bool {
        self.stones == 0 && self.caps == 0
    }

    /// Whether a piece of this kind can still be placed
    pub fn has(&self, kind: PieceKind) -> bool {
        match kind {
            PieceKind::Flat | PieceKind::Wall => self.stones > 0,
            PieceKind::Cap => self.caps > 0,
        }
    }

    /// Take one piece of this kind out of the reserves
    pub(crate) fn spend(&mut self, kind: PieceKind) {
        match kind {
            PieceKind::Flat | PieceKind::Wall => self.stones -= 1,
            PieceKind::Cap => self.caps -= 1,
        }
    }

    pub fn total(&self) -> u32 {
        u32::from(self.stones) + u32::from(self.caps)
    }
}
