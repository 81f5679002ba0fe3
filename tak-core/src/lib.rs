//! Tak Core - Rules engine
//!
//! This crate provides the authoritative rules of Tak:
//! - Board and stack model (sizes 3 to 8)
//! - TPS position notation and PTN move notation
//! - Legal move generation, including the opening swap and capstone smashes
//! - Move application with cached legal moves and result
//! - Road, flat and stalemate detection

pub mod board;
pub mod pieces;
pub mod moves;
pub mod tps;
pub mod movegen;
pub mod rules;
pub mod game;
pub mod config;
pub mod error;
pub mod perft;

// Re-exports for convenient access
pub use board::{Board, Direction, Square};
pub use pieces::{Color, Piece, PieceKind, Reserves, Stack, MAX_SIZE, MIN_SIZE};
pub use moves::{Drops, Move};
pub use game::{GameResult, GameState, Reason};
pub use config::GameConfig;
pub use error::{ConfigError, ParseError, PlayError, PositionError, TakError};
pub use perft::{perft, perft_divide};

/// Fresh game on an empty board
pub fn new_game(size: usize, half_komi: i8) -> Result<GameState, ConfigError> {
    GameState::new(&GameConfig::new(size, half_komi))
}

/// Game loaded from a TPS position
pub fn game_from_notation(size: usize, tps: &str, half_komi: i8) -> Result<GameState, TakError> {
    GameState::from_tps(&GameConfig::new(size, half_komi), tps)
}
