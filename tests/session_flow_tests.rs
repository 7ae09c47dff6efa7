//! Session Flow Integration Tests
//!
//! Drives an [`AnalysisSession`] without an engine through:
//! - Setup editing and king protection
//! - Mode transitions
//! - Legal play, undo and reset
//! - The text front end

mod common;

use chess_predictor::cli::{self, Command};
use chess_predictor::game::components::Mode;
use chess_predictor::game::rules::{GameStatus, PromotionChoice};
use chess_predictor::AnalysisSession;
use common::{session_with, AFTER_E4_FEN, START_FEN};
use shakmaty::{CastlingSide, Color, Piece, Role, Square};
use tokio::runtime::Runtime;

fn offline() -> (Runtime, AnalysisSession) {
    session_with(None)
}

// ============================================================================
// Setup Mode Tests
// ============================================================================

#[test]
fn test_session_starts_in_setup_on_starting_position() {
    let (_rt, session) = offline();

    assert_eq!(session.mode(), Mode::Setup);
    assert_eq!(session.fen(), START_FEN);
    assert!(session.history().is_empty());
    assert!(!session.has_engine());
}

#[test]
fn test_setup_moves_pieces_without_rules() {
    let (_rt, mut session) = offline();

    // a knight "moves" like a rook; Setup does not care
    assert!(session.try_action(Square::B1, Square::B5));
    assert_eq!(session.position().piece_at(Square::B1), None);
    assert_eq!(
        session.position().piece_at(Square::B5),
        Some(Piece {
            color: Color::White,
            role: Role::Knight
        })
    );
    assert!(session.history().is_empty(), "Setup edits are not moves");
}

#[test]
fn test_setup_refuses_to_capture_a_king() {
    let (_rt, mut session) = offline();
    let before = session.fen();

    assert!(!session.try_action(Square::D1, Square::E8));
    assert!(!session.try_action(Square::E2, Square::E1));
    assert_eq!(session.fen(), before);
}

#[test]
fn test_setup_empty_source_rejected() {
    let (_rt, mut session) = offline();
    let before = session.fen();

    assert!(!session.try_action(Square::E4, Square::E5));
    assert_eq!(session.fen(), before);
}

#[test]
fn test_place_piece_only_in_setup_and_never_over_a_king() {
    let (_rt, mut session) = offline();
    let queen = Piece {
        color: Color::Black,
        role: Role::Queen,
    };

    assert!(session.place_piece(Square::D4, Some(queen)));
    assert_eq!(session.position().piece_at(Square::D4), Some(queen));
    assert!(!session.place_piece(Square::E1, None), "kings cannot be erased");
    assert!(!session.place_piece(Square::E8, Some(queen)));

    session.select_mode(Mode::Analysis);
    assert!(!session.place_piece(Square::D5, Some(queen)));
    assert_eq!(session.position().piece_at(Square::D5), None);
}

#[test]
fn test_side_to_move_and_castling_controls() {
    let (_rt, mut session) = offline();

    session.set_side_to_move(Color::Black);
    assert_eq!(session.position().turn(), Color::Black);
    assert_eq!(session.human_side(), Color::Black);

    assert!(!session.toggle_castling(Color::White, CastlingSide::KingSide));
    assert!(!session.castling().get(Color::White, CastlingSide::KingSide));
    assert!(session.castling().get(Color::Black, CastlingSide::QueenSide));
    assert!(session.fen().contains(" b Qkq "));
}

#[test]
fn test_clear_board_empties_everything() {
    let (_rt, mut session) = offline();
    session.select_mode(Mode::Play);
    session.try_action(Square::E2, Square::E4);
    session.select_mode(Mode::Setup);
    session.clear_board();

    assert!(Square::ALL
        .into_iter()
        .all(|sq| session.position().piece_at(sq).is_none()));
    assert!(session.history().is_empty());
    assert_eq!(session.status(), GameStatus::Invalid);
}

#[test]
fn test_staging_kings_on_a_cleared_board() {
    let (_rt, mut session) = offline();
    session.clear_board();
    let king = |color| Piece {
        color,
        role: Role::King,
    };

    assert!(session.place_piece(Square::E1, Some(king(Color::White))));
    assert!(session.place_piece(Square::E8, Some(king(Color::Black))));
    assert!(!session.place_piece(Square::E8, None));
    // two bare kings are playable but drawn
    assert_eq!(session.status(), GameStatus::InsufficientMaterial);
}

// ============================================================================
// Mode Transition Tests
// ============================================================================

#[test]
fn test_mode_transitions_leave_board_unchanged() {
    let (_rt, mut session) = offline();
    session.try_action(Square::G1, Square::G4);
    let staged = session.fen();

    for mode in [Mode::Analysis, Mode::Play, Mode::Setup, Mode::Play] {
        session.select_mode(mode);
        assert_eq!(session.mode(), mode);
        assert_eq!(session.fen(), staged);
    }
}

#[test]
fn test_mode_transition_clears_selection() {
    let (_rt, mut session) = offline();
    session.select_mode(Mode::Analysis);
    assert!(session.select(Square::E2));
    assert!(session.selection().is_target(Square::E4));

    session.select_mode(Mode::Play);
    assert!(!session.selection().is_selected());
}

#[test]
fn test_selecting_same_mode_is_a_no_op() {
    let (_rt, mut session) = offline();
    assert!(!session.select_mode(Mode::Setup));
    assert!(session.select_mode(Mode::Analysis));
    assert!(!session.select_mode(Mode::Analysis));
}

// ============================================================================
// Legal Play Tests
// ============================================================================

#[test]
fn test_reset_then_e4_in_play() {
    let (_rt, mut session) = offline();
    session.try_action(Square::A2, Square::A6);
    session.reset_to_start();
    session.select_mode(Mode::Play);

    assert!(session.try_action(Square::E2, Square::E4));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.position().turn(), Color::Black);
    assert_eq!(session.fen(), AFTER_E4_FEN);
    assert_eq!(session.history().last_move().unwrap().uci(), "e2e4");
}

#[test]
fn test_illegal_move_leaves_state_unchanged() {
    let (_rt, mut session) = offline();
    session.select_mode(Mode::Analysis);
    let before = session.fen();

    assert!(!session.try_action(Square::E2, Square::E5));
    assert!(!session.try_action(Square::E7, Square::E5), "not Black's turn");
    assert!(!session.try_action(Square::E3, Square::E4), "no piece");
    assert_eq!(session.fen(), before);
    assert!(session.history().is_empty());
}

#[test]
fn test_lone_king_has_five_steps() {
    //! White king alone on e1 against a black king on e8
    let (_rt, mut session) = offline();
    session.load_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    session.select_mode(Mode::Analysis);

    assert!(session.select(Square::E1));
    assert_eq!(session.selection().targets.len(), 5);
    assert!(!session.try_action(Square::E1, Square::E3));
    assert!(!session.try_action(Square::E1, Square::G1), "no castling without a rook");
    assert!(session.try_action(Square::E1, Square::D1));
    assert_eq!(session.position().turn(), Color::Black);
}

#[test]
fn test_castling_by_king_move() {
    let (_rt, mut session) = offline();
    session
        .load_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
        .unwrap();
    session.select_mode(Mode::Play);

    assert!(session.try_action(Square::E1, Square::G1));
    assert_eq!(session.history().last_move().unwrap().uci(), "e1g1");
    assert_eq!(
        session.position().piece_at(Square::F1).map(|p| p.role),
        Some(Role::Rook)
    );
    assert!(!session.castling().get(Color::White, CastlingSide::QueenSide));
}

#[test]
fn test_promotion_choice() {
    let (_rt, mut session) = offline();
    session.load_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
    session.select_mode(Mode::Analysis);

    assert!(session.try_action_with_promotion(Square::A7, Square::A8, PromotionChoice::Knight));
    assert_eq!(
        session.position().piece_at(Square::A8).map(|p| p.role),
        Some(Role::Knight)
    );
    assert_eq!(session.history().last_move().unwrap().uci(), "a7a8n");
}

#[test]
fn test_undo_restores_previous_position() {
    let (_rt, mut session) = offline();
    session.select_mode(Mode::Play);
    session.try_action(Square::E2, Square::E4);
    session.try_action(Square::E7, Square::E5);

    assert!(session.undo_last());
    assert_eq!(session.fen(), AFTER_E4_FEN);
    assert!(session.undo_last());
    assert_eq!(session.fen(), START_FEN);
    assert!(!session.undo_last());
}

#[test]
fn test_reset_then_undo_is_a_no_op() {
    let (_rt, mut session) = offline();
    session.select_mode(Mode::Play);
    session.try_action(Square::D2, Square::D4);
    session.reset_to_start();

    assert!(!session.undo_last());
    assert_eq!(session.fen(), START_FEN);
}

#[test]
fn test_status_reports_checkmate() {
    let (_rt, mut session) = offline();
    session
        .load_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
        .unwrap();

    assert_eq!(
        session.status(),
        GameStatus::Checkmate {
            winner: Color::Black
        }
    );
}

#[test]
fn test_invalid_fen_is_rejected_without_changes() {
    let (_rt, mut session) = offline();
    assert!(session.load_fen("not a fen").is_err());
    assert_eq!(session.fen(), START_FEN);
}

// ============================================================================
// Engine-less Suggestion Tests
// ============================================================================

#[test]
fn test_suggestion_without_engine_is_unavailable() {
    let (_rt, mut session) = offline();
    session.select_mode(Mode::Analysis);

    assert!(session.request_suggestion().is_none());
    let outcome = session.suggestion().expect("sentinel published");
    assert!(outcome.is_unavailable());
    assert!(outcome.suggestion().is_none());
    assert!(session.update().is_empty());
}

// ============================================================================
// Text Front End Tests
// ============================================================================

#[test]
fn test_cli_commands_drive_the_session() {
    let (_rt, mut session) = offline();

    for line in ["mode play", "move e2e4", "move e7e5"] {
        let command = Command::parse(line).unwrap();
        assert!(cli::execute(&mut session, command).is_some());
    }
    assert_eq!(session.history().uci_moves(), vec!["e2e4", "e7e5"]);

    let quit = Command::parse("quit").unwrap();
    assert!(cli::execute(&mut session, quit).is_none());
}

#[test]
fn test_cli_render_shows_turn_and_mode() {
    let (_rt, mut session) = offline();
    session.select_mode(Mode::Analysis);

    let board = cli::render_board(&session.snapshot());
    assert!(board.contains("White to move"));
    assert!(board.contains("analysis"));
}
