//! Error types for construction, parsing and play

use crate::game::GameResult;
use crate::moves::Move;
use crate::pieces::Color;

/// Invalid game configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported board size {0}, expected 3 to 8")]
    InvalidSize(usize),

    #[error("half-komi {half_komi} is out of range for size {size}")]
    InvalidKomi { half_komi: i8, size: usize },
}

/// Malformed position (TPS) or move (PTN) text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,

    #[error("invalid square \"{0}\"")]
    Square(String),

    #[error("invalid move \"{0}\"")]
    Move(String),

    #[error("invalid drop counts in move \"{0}\"")]
    Drops(String),

    #[error("expected 3 space-separated TPS fields, found {0}")]
    FieldCount(usize),

    #[error("invalid square token \"{0}\"")]
    Stack(String),

    #[error("row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("invalid side to move \"{0}\"")]
    SideToMove(String),

    #[error("invalid move number \"{0}\"")]
    MoveNumber(String),
}

/// Well-formed position that cannot be a legal game state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("position has {found} rows, expected size {expected}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("unsupported board size {0}, expected 3 to 8")]
    UnsupportedSize(usize),

    #[error("ply {ply} cannot have {to_move} to move")]
    PlyParity { ply: u16, to_move: Color },

    #[error("{color} has {found} stones on the board, only {allowed} allowed")]
    TooManyStones {
        color: Color,
        found: u32,
        allowed: u32,
    },

    #[error("{color} has {found} capstones on the board, only {allowed} allowed")]
    TooManyCaps {
        color: Color,
        found: u32,
        allowed: u32,
    },
}

/// Rejected call to `play`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    #[error("illegal move {0}")]
    IllegalMove(Move),

    #[error("game is already over ({0:?})")]
    GameOver(GameResult),

    #[error("ply counter exhausted at {0}")]
    PlyLimit(u16),
}

/// Any engine error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TakError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Play(#[from] PlayError),
}
