//! Game state, move application and cached legal moves

use crate::board::{Board, Direction, Square};
use crate::config::GameConfig;
use crate::error::{ConfigError, PlayError, PositionError, TakError};
use crate::movegen::{generate_moves, MoveContext};
use crate::moves::{Drops, Move};
use crate::pieces::{Color, Piece, PieceKind, Reserves, MAX_SIZE, MIN_SIZE};
use crate::{rules, tps};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// RESULT
// ============================================================================

/// Why a game was won
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    Road,
    Flats,
    /// The loser had no legal move
    Stalemate,
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Winner { color: Color, reason: Reason },
    Draw,
}

impl GameResult {
    pub fn winner(color: Color, reason: Reason) -> Self {
        GameResult::Winner { color, reason }
    }

    pub fn is_ongoing(self) -> bool {
        self == GameResult::Ongoing
    }

    /// Winning color, `None` for draws and ongoing games
    pub fn winning_color(self) -> Option<Color> {
        match self {
            GameResult::Winner { color, .. } => Some(color),
            GameResult::Ongoing | GameResult::Draw => None,
        }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Full game state.
///
/// Legal moves and the result are derived from the position and recomputed
/// at the end of every mutation. Clone to explore alternatives; clones share
/// nothing.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    to_move: Color,
    white_reserves: Reserves,
    black_reserves: Reserves,
    /// Half-moves played since the start
    ply: u16,
    /// Consecutive plies without a placement, capture or smash
    reversible_plies: u16,
    half_komi: i8,

    moves: Vec<Move>,
    result: GameResult,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board with full reserves, White to move
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let reserves = Reserves::for_size(config.size);
        let mut state = Self {
            board: Board::new(config.size),
            to_move: Color::White,
            white_reserves: reserves,
            black_reserves: reserves,
            ply: 0,
            reversible_plies: 0,
            half_komi: config.half_komi,
            moves: Vec::new(),
            result: GameResult::Ongoing,
        };
        state.refresh();
        Ok(state)
    }

    /// Load a TPS position such as `x5/x5/x5/x5/x5 1 1`
    pub fn from_tps(config: &GameConfig, text: &str) -> Result<Self, TakError> {
        config.validate()?;
        let (board, to_move, ply) = tps::parse(text, config.size)?;
        let state = Self::from_position(board, to_move, ply, config.half_komi)?;
        tracing::debug!(tps = text, result = ?state.result, "loaded position");
        Ok(state)
    }

    /// Build a state around an existing board, deriving reserves from the
    /// pieces on it. The side to move must match the parity of `ply`.
    pub fn from_position(
        board: Board,
        to_move: Color,
        ply: u16,
        half_komi: i8,
    ) -> Result<Self, PositionError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&board.size()) {
            return Err(PositionError::UnsupportedSize(board.size()));
        }
        if ply % 2 != to_move as u16 {
            return Err(PositionError::PlyParity { ply, to_move });
        }
        let white_reserves = remaining_reserves(&board, Color::White)?;
        let black_reserves = remaining_reserves(&board, Color::Black)?;
        let mut state = Self {
            board,
            to_move,
            white_reserves,
            black_reserves,
            ply,
            reversible_plies: 0,
            half_komi,
            moves: Vec::new(),
            result: GameResult::Ongoing,
        };
        state.refresh();
        Ok(state)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn half_komi(&self) -> i8 {
        self.half_komi
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn reserves(&self, color: Color) -> Reserves {
        match color {
            Color::White => self.white_reserves,
            Color::Black => self.black_reserves,
        }
    }

    fn reserves_mut(&mut self, color: Color) -> &mut Reserves {
        match color {
            Color::White => &mut self.white_reserves,
            Color::Black => &mut self.black_reserves,
        }
    }

    pub fn ply(&self) -> u16 {
        self.ply
    }

    pub fn reversible_plies(&self) -> u16 {
        self.reversible_plies
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Legal moves for the side to move, empty once the game is over
    pub fn possible_moves(&self) -> &[Move] {
        &self.moves
    }

    /// First two plies: each side places one of the opponent's flats
    pub fn is_opening(&self) -> bool {
        self.ply < 2
    }

    /// Stable 64-bit hash of the position (same fields as `Eq`)
    pub fn position_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    pub fn to_tps(&self) -> String {
        tps::format(&self.board, self.to_move, self.ply)
    }

    // ========================================================================
    // PLAY
    // ========================================================================

    /// Apply a move from the legal move list.
    ///
    /// The state is untouched when the move is rejected.
    pub fn play(&mut self, mv: Move) -> Result<(), PlayError> {
        if !self.result.is_ongoing() {
            return Err(PlayError::GameOver(self.result));
        }
        if !self.moves.contains(&mv) {
            return Err(PlayError::IllegalMove(mv));
        }
        if self.ply == u16::MAX {
            return Err(PlayError::PlyLimit(self.ply));
        }
        self.apply(mv);
        Ok(())
    }

    /// Parse a PTN move and play it
    pub fn play_ptn(&mut self, text: &str) -> Result<Move, TakError> {
        let mv: Move = text.parse()?;
        self.play(mv)?;
        Ok(mv)
    }

    /// Play on a copy, leaving `self` unchanged
    pub fn clone_and_play(&self, mv: Move) -> Result<Self, PlayError> {
        let mut next = self.clone();
        next.play(mv)?;
        Ok(next)
    }

    fn apply(&mut self, mv: Move) {
        let irreversible = match mv {
            Move::Place { square, kind } => {
                let color = if self.is_opening() {
                    self.to_move.opponent()
                } else {
                    self.to_move
                };
                self.reserves_mut(color).spend(kind);
                self.board.push(square, Piece::new(kind, color));
                true
            }
            Move::Spread {
                square,
                direction,
                drops,
            } => self.apply_spread(square, direction, drops),
        };

        self.ply += 1;
        self.to_move = self.to_move.opponent();
        self.reversible_plies = if irreversible {
            0
        } else {
            self.reversible_plies.saturating_add(1)
        };
        self.refresh();

        tracing::trace!(ply = self.ply, mv = %mv, "applied move");
        if !self.result.is_ongoing() {
            tracing::debug!(ply = self.ply, result = ?self.result, "game over");
        }
    }

    /// Move pieces along a validated spread. Returns whether it captured an
    /// opponent stack or smashed a wall.
    fn apply_spread(&mut self, from: Square, direction: Direction, drops: Drops) -> bool {
        let mover = self.to_move;
        let size = self.board.size();
        let mut carried = self.board.take(from, drops.total()).into_iter();
        let path = std::iter::successors(from.step(direction, size), |square| {
            square.step(direction, size)
        });

        let mut irreversible = false;
        for (square, &count) in path.zip(drops.as_slice()) {
            let stack = self.board.get_mut(square);
            match stack.top() {
                Some(top) if top.kind == PieceKind::Wall => {
                    stack.flatten_top();
                    irreversible = true;
                }
                Some(top) if top.color != mover => irreversible = true,
                _ => {}
            }
            for piece in carried.by_ref().take(count as usize) {
                stack.push(piece);
            }
        }
        debug_assert!(carried.next().is_none(), "spread left pieces in hand");
        irreversible
    }

    /// Re-run the win detector and regenerate the legal move list
    fn refresh(&mut self) {
        self.moves.clear();
        self.result = rules::evaluate(
            &self.board,
            self.to_move.opponent(),
            self.white_reserves,
            self.black_reserves,
            self.half_komi,
        );
        if !self.result.is_ongoing() {
            return;
        }

        let opening = self.is_opening();
        let placing = if opening {
            self.reserves(self.to_move.opponent())
        } else {
            self.reserves(self.to_move)
        };
        let ctx = MoveContext {
            board: &self.board,
            to_move: self.to_move,
            placing,
            opening,
        };
        generate_moves(&ctx, &mut self.moves);

        if self.moves.is_empty() {
            self.result = rules::stalemate(self.to_move);
        }
    }
}

/// Starting allotment minus what is already on the board
fn remaining_reserves(board: &Board, color: Color) -> Result<Reserves, PositionError> {
    let start = Reserves::for_size(board.size());
    let (stones, caps) = board.piece_count(color);
    if stones > u32::from(start.stones) {
        return Err(PositionError::TooManyStones {
            color,
            found: stones,
            allowed: start.stones.into(),
        });
    }
    if caps > u32::from(start.caps) {
        return Err(PositionError::TooManyCaps {
            color,
            found: caps,
            allowed: start.caps.into(),
        });
    }
    Ok(Reserves::new(
        start.stones - stones as u8,
        start.caps - caps as u8,
    ))
}

// Equality and hashing cover the position only, never the caches

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.to_move == other.to_move
            && self.white_reserves == other.white_reserves
            && self.black_reserves == other.black_reserves
            && self.ply == other.ply
            && self.reversible_plies == other.reversible_plies
    }
}

impl Eq for GameState {}

impl Hash for GameState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.board.hash(state);
        self.to_move.hash(state);
        self.white_reserves.hash(state);
        self.black_reserves.hash(state);
        self.ply.hash(state);
        self.reversible_plies.hash(state);
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tps())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn game(size: usize) -> GameState {
        GameState::new(&GameConfig::new(size, 0)).unwrap()
    }

    fn play_all(state: &mut GameState, moves: &[&str]) {
        for text in moves {
            state
                .play_ptn(text)
                .unwrap_or_else(|e| panic!("{text}: {e}"));
        }
    }

    #[test]
    fn test_game_creation() {
        let state = game(5);
        assert_eq!(state.to_move(), Color::White);
        assert_eq!(state.ply(), 0);
        assert_eq!(state.result(), GameResult::Ongoing);
        assert_eq!(state.reserves(Color::White), Reserves::new(21, 1));
        assert_eq!(state.possible_moves().len(), 25);
    }

    #[test]
    fn test_invalid_size() {
        assert_eq!(
            GameState::new(&GameConfig::new(9, 0)).unwrap_err(),
            ConfigError::InvalidSize(9)
        );
    }

    #[test]
    fn test_opening_swap() {
        let mut state = game(5);
        state.play_ptn("a1").unwrap();
        assert_eq!(state.board().top(Square::new(0, 0)), Some(Piece::flat(Color::Black)));
        assert_eq!(state.to_move(), Color::Black);
        assert_eq!(state.reserves(Color::Black), Reserves::new(20, 1));
        assert_eq!(state.reserves(Color::White), Reserves::new(21, 1));

        // No spreads during the opening
        assert!(state.possible_moves().iter().all(Move::is_placement));
        state.play_ptn("e5").unwrap();
        assert_eq!(state.board().top(Square::new(4, 4)), Some(Piece::flat(Color::White)));
        assert!(!state.is_opening());
    }

    #[test]
    fn test_opening_rejects_walls() {
        let mut state = game(5);
        let before = state.clone();
        assert!(matches!(
            state.play_ptn("Sa1"),
            Err(TakError::Play(PlayError::IllegalMove(_)))
        ));
        assert!(matches!(
            state.play_ptn("Ca1"),
            Err(TakError::Play(PlayError::IllegalMove(_)))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_spread_from_uncontrolled_square_rejected() {
        let mut state = game(5);
        play_all(&mut state, &["a1", "e5", "b1"]);
        // a1 holds a black flat, White cannot move it
        assert_eq!(state.to_move(), Color::Black);
        play_all(&mut state, &["c1"]);
        let before = state.clone();
        let mv: Move = "a1>".parse().unwrap();
        assert_eq!(state.play(mv), Err(PlayError::IllegalMove(mv)));
        assert_eq!(state, before);
        assert_eq!(state.possible_moves(), before.possible_moves());
    }

    #[test]
    fn test_spread_moves_stack() {
        let mut state = game(5);
        // a1 black, b1 white after the opening
        play_all(&mut state, &["a1", "b1"]);
        play_all(&mut state, &["b1<"]);
        let a1 = state.board().get(Square::new(0, 0));
        assert_eq!(a1.height(), 2);
        assert_eq!(a1.controller(), Some(Color::White));
        assert!(state.board().get(Square::new(1, 0)).is_empty());
        // Covered an opponent stack
        assert_eq!(state.reversible_plies(), 0);

        play_all(&mut state, &["c3", "2a1+11"]);
        assert_eq!(state.board().top(Square::new(0, 1)), Some(Piece::flat(Color::Black)));
        assert_eq!(state.board().top(Square::new(0, 2)), Some(Piece::flat(Color::White)));
        assert_eq!(state.reversible_plies(), 1);
    }

    #[test]
    fn test_capstone_smash_flattens_wall() {
        let config = GameConfig::new(5, 0);
        let mut state = GameState::from_tps(&config, "x5/x5/x5/x5/1C,2S,x3 1 5").unwrap();
        let smash: Move = "a1>".parse().unwrap();
        assert!(state.possible_moves().contains(&smash));
        state.play(smash).unwrap();

        let b1 = state.board().get(Square::new(1, 0));
        assert_eq!(
            b1.pieces(),
            &[Piece::flat(Color::Black), Piece::new(PieceKind::Cap, Color::White)]
        );
        assert_eq!(state.reversible_plies(), 0);
    }

    #[test]
    fn test_flat_stack_cannot_enter_wall() {
        let config = GameConfig::new(5, 0);
        let state = GameState::from_tps(&config, "x5/x5/x5/x5/1,2S,x3 1 5").unwrap();
        let mv: Move = "a1>".parse().unwrap();
        assert!(!state.possible_moves().contains(&mv));
    }

    #[test]
    fn test_road_win_takes_priority() {
        let config = GameConfig::new(5, 0);
        // White completes rank 3 with c3; Black is one move from a road on rank 1
        let mut state =
            GameState::from_tps(&config, "x5/x5/1,1,x,1,1/x5/2,2,2,2,x 1 6").unwrap();
        state.play_ptn("c3").unwrap();
        assert_eq!(state.result(), GameResult::winner(Color::White, Reason::Road));
        assert!(state.possible_moves().is_empty());

        let err = state.play_ptn("a1").unwrap_err();
        assert!(matches!(err, TakError::Play(PlayError::GameOver(_))));
    }

    #[test]
    fn test_suicide_road_goes_to_mover() {
        let config = GameConfig::new(3, 0);
        // Moving the black flat off b2 uncovers White's rank 2 and completes rank 3
        let mut state = GameState::from_tps(&config, "2,x,2/1,12,1/x3 2 6").unwrap();
        state.play_ptn("b2+").unwrap();
        assert!(rules::has_road(state.board(), Color::White));
        assert!(rules::has_road(state.board(), Color::Black));
        assert_eq!(state.result(), GameResult::winner(Color::Black, Reason::Road));
    }

    #[test]
    fn test_full_board_flat_win() {
        let config = GameConfig::new(3, 0);
        let mut state = GameState::from_tps(&config, "1,2,1/2,1,2/1S,2,x 1 5").unwrap();
        state.play_ptn("c1").unwrap();
        // White 4 flats, Black 4 flats, one white wall
        assert_eq!(state.result(), GameResult::Draw);

        let komi = GameConfig::new(3, 1);
        let mut state = GameState::from_tps(&komi, "1,2,1/2,1,2/1S,2,x 1 5").unwrap();
        state.play_ptn("c1").unwrap();
        assert_eq!(state.result(), GameResult::winner(Color::White, Reason::Flats));

        let mut state = GameState::from_tps(&config, "1,2,1/2,1,2/1S,2,x 1 5").unwrap();
        state.play_ptn("Sc1").unwrap();
        assert_eq!(state.result(), GameResult::winner(Color::Black, Reason::Flats));
    }

    #[test]
    fn test_opening_stalemate_when_opponent_has_no_stones() {
        let config = GameConfig::new(5, 0);
        // White's 21 stones are all on the board; Black must place one of them
        let state = GameState::from_tps(
            &config,
            "1112,1112,1112,x2/1112,1112,1112,x2/1112,x4/x5/x5 2 1",
        )
        .unwrap();
        assert!(state.is_opening());
        assert_eq!(state.reserves(Color::White), Reserves::new(0, 1));
        assert!(state.possible_moves().is_empty());
        assert_eq!(state.result(), GameResult::winner(Color::White, Reason::Stalemate));
    }

    #[test]
    fn test_ply_counter_exhausted() {
        let config = GameConfig::new(3, 0);
        let mut state = GameState::from_tps(&config, "x3/x3/1,x2 2 32768").unwrap();
        assert_eq!(state.ply(), u16::MAX);
        let mv = state.possible_moves()[0];
        let before = state.clone();
        assert_eq!(state.play(mv), Err(PlayError::PlyLimit(u16::MAX)));
        assert_eq!(state, before);
        assert!(!state.is_opening());
    }

    #[test]
    fn test_from_position_validates_size_and_parity() {
        assert_eq!(
            GameState::from_position(Board::new(2), Color::White, 0, 0).unwrap_err(),
            PositionError::UnsupportedSize(2)
        );
        assert_eq!(
            GameState::from_position(Board::new(4), Color::White, 3, 0).unwrap_err(),
            PositionError::PlyParity { ply: 3, to_move: Color::White }
        );
        let state = GameState::from_position(Board::new(4), Color::Black, 3, 0).unwrap();
        assert_eq!(state.to_tps(), "x4/x4/x4/x4 2 2");
    }

    #[test]
    fn test_clone_and_play_leaves_original() {
        let mut state = game(4);
        play_all(&mut state, &["a1", "d4"]);
        let before = state.clone();
        let mv: Move = "b2".parse().unwrap();
        let next = state.clone_and_play(mv).unwrap();
        assert_eq!(state, before);
        state.play(mv).unwrap();
        assert_eq!(state, next);
        assert_eq!(state.position_hash(), next.position_hash());
    }

    #[test]
    fn test_equality_ignores_komi_and_caches() {
        let a = GameState::new(&GameConfig::new(5, 0)).unwrap();
        let b = GameState::new(&GameConfig::new(5, 4)).unwrap();
        assert_eq!(a, b);
        let mut c = a.clone();
        c.play_ptn("a1").unwrap();
        assert_ne!(a, c);
        assert_ne!(a.position_hash(), c.position_hash());
    }
}
