//! Integration tests for the Tak engine
//!
//! Random playouts check the invariants every reachable state must hold:
//! legal moves always play, pieces are conserved, clones are independent and
//! TPS round-trips.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use tak_core::{
    game_from_notation, new_game, perft, Color, GameConfig, GameResult, GameState, Move,
    PieceKind, PlayError, Reason, Reserves, Square, TakError,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

const MAX_PLIES: u16 = 300;

/// Play random legal moves, calling `check` on every state along the way
fn random_playout(size: usize, seed: u64, mut check: impl FnMut(&GameState)) -> GameState {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = new_game(size, 0).unwrap();
    check(&state);
    while state.result().is_ongoing() && state.ply() < MAX_PLIES {
        let mv = *state.possible_moves().choose(&mut rng).unwrap();
        state.play(mv).unwrap();
        check(&state);
    }
    state
}

fn assert_conserved(state: &GameState) {
    let start = Reserves::for_size(state.size());
    for color in [Color::White, Color::Black] {
        let (stones, caps) = state.board().piece_count(color);
        let reserves = state.reserves(color);
        assert_eq!(stones + u32::from(reserves.stones), u32::from(start.stones));
        assert_eq!(caps + u32::from(reserves.caps), u32::from(start.caps));
    }
}

fn assert_only_tops_stand(state: &GameState) {
    for (square, stack) in state.board().stacks() {
        let pieces = stack.pieces();
        if let Some((_, below)) = pieces.split_last() {
            assert!(
                below.iter().all(|piece| piece.kind == PieceKind::Flat),
                "standing piece buried at {square}"
            );
        }
    }
}

// ============================================================================
// PLAYOUT PROPERTIES
// ============================================================================

#[test]
fn test_every_generated_move_plays() {
    for size in 3..=5 {
        random_playout(size, size as u64, |state| {
            for &mv in state.possible_moves() {
                let next = state.clone_and_play(mv);
                assert!(next.is_ok(), "{mv} failed in {}", state.to_tps());
            }
        });
    }
}

#[test]
fn test_pieces_are_conserved() {
    for seed in 0..20 {
        let size = 3 + (seed as usize % 6);
        random_playout(size, seed, |state| {
            assert_conserved(state);
            assert_only_tops_stand(state);
        });
    }
}

#[test]
fn test_moves_are_unique_and_deterministic() {
    random_playout(5, 7, |state| {
        let unique: FxHashSet<Move> = state.possible_moves().iter().copied().collect();
        assert_eq!(unique.len(), state.possible_moves().len());

        let reloaded = state.clone();
        assert_eq!(reloaded.possible_moves(), state.possible_moves());
    });
}

#[test]
fn test_moves_empty_only_when_terminal() {
    for seed in 100..110 {
        random_playout(4, seed, |state| {
            assert_eq!(
                state.possible_moves().is_empty(),
                !state.result().is_ongoing(),
                "{}",
                state.to_tps()
            );
        });
    }
}

#[test]
fn test_clone_and_play_is_independent() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    random_playout(5, 42, |state| {
        if let Some(&mv) = state.possible_moves().choose(&mut rng) {
            let before = state.clone();
            let via_clone = state.clone_and_play(mv).unwrap();
            assert_eq!(*state, before);

            let mut manual = state.clone();
            manual.play(mv).unwrap();
            assert_eq!(manual, via_clone);
            assert_eq!(manual.possible_moves(), via_clone.possible_moves());
            assert_eq!(manual.result(), via_clone.result());
        }
    });
}

#[test]
fn test_tps_round_trip() {
    for seed in 0..12 {
        let size = 3 + (seed as usize % 6);
        random_playout(size, seed, |state| {
            let tps = state.to_tps();
            let parsed = game_from_notation(size, &tps, 0).unwrap();
            assert_eq!(parsed.to_tps(), tps);
            assert_eq!(parsed.board(), state.board());
            assert_eq!(parsed.to_move(), state.to_move());
            assert_eq!(parsed.ply(), state.ply());
            assert_eq!(parsed.reserves(Color::White), state.reserves(Color::White));
            assert_eq!(parsed.reserves(Color::Black), state.reserves(Color::Black));
            assert_eq!(parsed.possible_moves(), state.possible_moves());
            if state.reversible_plies() == 0 {
                assert_eq!(parsed, *state);
            }
        });
    }
}

#[test]
fn test_random_games_finish() {
    let mut outcomes = FxHashSet::default();
    for seed in 0..30 {
        let state = random_playout(3, seed, |_| {});
        outcomes.insert(state.result());
    }
    assert!(outcomes
        .iter()
        .any(|result| matches!(result, GameResult::Winner { reason: Reason::Road, .. })));
}

// ============================================================================
// RULE SCENARIOS
// ============================================================================

#[test]
fn test_first_ply_places_opponent_flat() {
    let mut state = new_game(5, 0).unwrap();
    state.play_ptn("a1").unwrap();
    let a1 = state.board().top(Square::new(0, 0)).unwrap();
    assert_eq!(a1.color, Color::Black);
    assert_eq!(a1.kind, PieceKind::Flat);
    assert_eq!(state.to_move(), Color::Black);
    assert_eq!(state.ply(), 1);
}

#[test]
fn test_row_road_ends_game_immediately() {
    let mut state = new_game(5, 0).unwrap();
    // White builds rank 1, Black builds rank 5 one step behind
    for (white, black) in [("e5", "a1"), ("b1", "b5"), ("c1", "c5"), ("d1", "d5"), ("e1", "a5")] {
        state.play_ptn(white).unwrap();
        if !state.result().is_ongoing() {
            break;
        }
        state.play_ptn(black).unwrap();
    }
    // Opening swap: e5 is a black flat, a1 a white flat
    assert_eq!(
        state.result(),
        GameResult::Winner {
            color: Color::White,
            reason: Reason::Road
        }
    );
    assert_eq!(state.ply(), 9);
    assert!(matches!(
        state.play_ptn("a5"),
        Err(TakError::Play(PlayError::GameOver(_)))
    ));
}

#[test]
fn test_full_small_board_counts_flats() {
    // White fills the last square: 5 white flats against 4 black flats
    let tps = "2,1,2/1,2,1/2,1,x 1 5";
    let mut state = game_from_notation(3, tps, 0).unwrap();
    state.play_ptn("c1").unwrap();
    assert_eq!(
        state.result(),
        GameResult::Winner {
            color: Color::White,
            reason: Reason::Flats
        }
    );

    let mut state = game_from_notation(3, tps, -2).unwrap();
    state.play_ptn("c1").unwrap();
    assert_eq!(state.result(), GameResult::Draw);
}

#[test]
fn test_illegal_spread_leaves_state_unchanged() {
    let mut state = new_game(5, 0).unwrap();
    for mv in ["a1", "e5", "c3"] {
        state.play_ptn(mv).unwrap();
    }
    let before = state.clone();
    let before_moves = state.possible_moves().to_vec();
    // Black to move; c3 is White's
    let err = state.play_ptn("c3+").unwrap_err();
    assert!(matches!(err, TakError::Play(PlayError::IllegalMove(_))));
    assert_eq!(state, before);
    assert_eq!(state.possible_moves(), before_moves.as_slice());
    // Spreading from an empty square is just as illegal
    assert!(state.play_ptn("b2>").is_err());
}

#[test]
fn test_construction_errors_are_distinguishable() {
    assert!(matches!(new_game(2, 0), Err(tak_core::ConfigError::InvalidSize(2))));
    assert!(matches!(
        game_from_notation(9, "x3/x3/x3 1 1", 0),
        Err(TakError::Config(_))
    ));
    assert!(matches!(
        game_from_notation(3, "x3/x3/x3 1 one", 0),
        Err(TakError::Parse(_))
    ));
    assert!(matches!(
        game_from_notation(4, "x3/x3/x3 1 1", 0),
        Err(TakError::Position(tak_core::PositionError::SizeMismatch { .. }))
    ));
    assert!(matches!(
        game_from_notation(3, "1C,x2/x3/x3 2 1", 0),
        Err(TakError::Position(tak_core::PositionError::TooManyCaps { .. }))
    ));
    assert!(matches!(
        game_from_notation(3, "111111,11111,x/x3/x3 2 3", 0),
        Err(TakError::Position(tak_core::PositionError::TooManyStones { .. }))
    ));
}

#[test]
fn test_config_builder_matches_free_function() {
    let config = GameConfig::default().with_size(6).with_half_komi(4);
    let a = GameState::new(&config).unwrap();
    let b = new_game(6, 4).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.half_komi(), 4);
    assert_eq!(a.possible_moves(), b.possible_moves());
}

// ============================================================================
// PERFT
// ============================================================================

#[test]
fn test_perft_depth_four() {
    // Depth 4 is the first depth where spreads from stacks matter
    assert_eq!(perft(&new_game(3, 0).unwrap(), 4), 17_792);
    assert_eq!(perft(&new_game(4, 0).unwrap(), 4), 216_464);
}

#[test]
fn test_opening_stalemate() {
    let tps = "1112,1112,1112,x2/1112,1112,1112,x2/1112,x4/x5/x5 2 1";
    let state = game_from_notation(5, tps, 0).unwrap();
    assert!(state.possible_moves().is_empty());
    assert_eq!(
        state.result(),
        GameResult::Winner {
            color: Color::White,
            reason: Reason::Stalemate
        }
    );
}
