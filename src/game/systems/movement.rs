//! Move validation and application
//!
//! The single entry point for every board action, human or engine:
//! [`apply_action`]. The active [`Mode`] picks the validation policy.
//!
//! - **Setup**: a placement. The piece on `from` is relocated to `to`,
//!   discarding whatever stood there, unless `to` holds a king of either
//!   colour. An empty `from` is rejected.
//! - **Analysis / Play**: a chess move. Accepted only when the rules library
//!   lists it as legal for the side to move, then pushed onto history.
//!
//! A rejected action leaves the store untouched. Rejection is a normal
//! outcome, not an error.

use crate::game::components::Mode;
use crate::game::resources::{Position, PositionStore};
use crate::game::rules::{find_legal_move, uci_string, PromotionChoice};
use shakmaty::{Position as _, Role, Square};
use tracing::debug;

/// What an action did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Nothing changed
    Rejected,
    /// Setup placement performed
    Placed,
    /// Legal move applied; `ply` is its zero-based history index
    Moved { ply: usize, uci: String },
}

impl ActionOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, ActionOutcome::Rejected)
    }
}

/// True when `square` holds a king of either colour
pub fn holds_king(position: &Position, square: Square) -> bool {
    position
        .piece_at(square)
        .is_some_and(|piece| piece.role == Role::King)
}

/// Validate and apply an action from `from` to `to`
///
/// # Examples
///
/// ```
/// use chess_predictor::game::components::Mode;
/// use chess_predictor::game::resources::PositionStore;
/// use chess_predictor::game::rules::PromotionChoice;
/// use chess_predictor::game::systems::{apply_action, ActionOutcome};
/// use shakmaty::Square;
///
/// let mut store = PositionStore::default();
/// let outcome = apply_action(Mode::Play, &mut store, Square::E2, Square::E4, PromotionChoice::Queen);
/// assert!(matches!(outcome, ActionOutcome::Moved { ply: 0, .. }));
///
/// // Black to move now, so White cannot move again
/// let outcome = apply_action(Mode::Play, &mut store, Square::D2, Square::D4, PromotionChoice::Queen);
/// assert_eq!(outcome, ActionOutcome::Rejected);
/// ```
pub fn apply_action(
    mode: Mode,
    store: &mut PositionStore,
    from: Square,
    to: Square,
    promotion: PromotionChoice,
) -> ActionOutcome {
    match mode {
        Mode::Setup => place(store, from, to),
        Mode::Analysis | Mode::Play => play(store, from, to, promotion),
    }
}

fn place(store: &mut PositionStore, from: Square, to: Square) -> ActionOutcome {
    let Some(piece) = store.get().piece_at(from) else {
        debug!("[MOVE] Setup: {} is empty", from);
        return ActionOutcome::Rejected;
    };
    if holds_king(store.get(), to) {
        debug!("[MOVE] Setup: refusing to overwrite the king on {}", to);
        return ActionOutcome::Rejected;
    }
    if from == to {
        return ActionOutcome::Placed;
    }

    store.apply_placement(from, None);
    store.apply_placement(to, Some(piece));
    ActionOutcome::Placed
}

fn play(store: &mut PositionStore, from: Square, to: Square, promotion: PromotionChoice) -> ActionOutcome {
    let Some(mut chess) = store.get().to_chess() else {
        debug!("[MOVE] Position is not playable, rejecting {}{}", from, to);
        return ActionOutcome::Rejected;
    };
    let Some(m) = find_legal_move(&chess, from, to, promotion) else {
        debug!("[MOVE] Illegal move {}{}", from, to);
        return ActionOutcome::Rejected;
    };

    let uci = uci_string(&m);
    chess.play_unchecked(&m);
    let ply = store.history().len();
    store.apply_move(from, to, uci.clone(), Position::from_chess(&chess));
    ActionOutcome::Moved { ply, uci }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{Color, Piece};

    fn king_only_store() -> PositionStore {
        let mut store = PositionStore::default();
        store.reset(false);
        store.apply_placement(
            Square::E1,
            Some(Piece {
                color: Color::White,
                role: Role::King,
            }),
        );
        store.apply_placement(
            Square::E8,
            Some(Piece {
                color: Color::Black,
                role: Role::King,
            }),
        );
        store
    }

    #[test]
    fn test_setup_relocates_and_discards_occupant() {
        let mut store = PositionStore::default();
        let outcome = apply_action(Mode::Setup, &mut store, Square::D1, Square::D7, PromotionChoice::Queen);

        assert_eq!(outcome, ActionOutcome::Placed);
        assert!(store.get().piece_at(Square::D1).is_none());
        assert_eq!(store.get().piece_at(Square::D7).map(|p| p.role), Some(Role::Queen));
        assert_eq!(store.get().piece_at(Square::D7).map(|p| p.color), Some(Color::White));
        assert!(store.history().is_empty(), "placements never touch history");
    }

    #[test]
    fn test_setup_never_overwrites_a_king() {
        //! Either king is protected, whichever side moves onto it
        let mut store = PositionStore::default();
        let before = store.get().clone();

        for (from, to) in [(Square::D1, Square::E1), (Square::D1, Square::E8), (Square::D8, Square::E8)] {
            let outcome = apply_action(Mode::Setup, &mut store, from, to, PromotionChoice::Queen);
            assert_eq!(outcome, ActionOutcome::Rejected);
            assert_eq!(store.get(), &before);
        }
    }

    #[test]
    fn test_setup_empty_source_rejected() {
        let mut store = PositionStore::default();
        let before = store.get().clone();
        let outcome = apply_action(Mode::Setup, &mut store, Square::E4, Square::E5, PromotionChoice::Queen);
        assert_eq!(outcome, ActionOutcome::Rejected);
        assert_eq!(store.get(), &before);
    }

    #[test]
    fn test_setup_ignores_chess_rules() {
        //! Setup can produce positions that are illegal by chess rules
        let mut store = PositionStore::default();
        let outcome = apply_action(Mode::Setup, &mut store, Square::A2, Square::A8, PromotionChoice::Queen);
        assert_eq!(outcome, ActionOutcome::Placed);
        assert!(store.get().to_chess().is_none());
    }

    #[test]
    fn test_play_move_appends_history() {
        let mut store = PositionStore::default();
        let outcome = apply_action(Mode::Play, &mut store, Square::E2, Square::E4, PromotionChoice::Queen);

        assert_eq!(
            outcome,
            ActionOutcome::Moved {
                ply: 0,
                uci: "e2e4".to_string()
            }
        );
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.get().turn(), Color::Black);
    }

    #[test]
    fn test_illegal_move_leaves_store_unchanged() {
        let mut store = PositionStore::default();
        let before = store.get().clone();

        for (from, to) in [(Square::E2, Square::E5), (Square::E7, Square::E5), (Square::E1, Square::E2)] {
            let outcome = apply_action(Mode::Analysis, &mut store, from, to, PromotionChoice::Queen);
            assert_eq!(outcome, ActionOutcome::Rejected);
        }
        assert_eq!(store.get(), &before);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_king_only_board() {
        //! Only king steps exist; everything else fails
        let mut store = king_only_store();

        for (from, to) in [(Square::A1, Square::A2), (Square::E1, Square::E3), (Square::E8, Square::E7)] {
            assert!(!apply_action(Mode::Play, &mut store, from, to, PromotionChoice::Queen).succeeded());
        }
        assert!(apply_action(Mode::Play, &mut store, Square::E1, Square::D1, PromotionChoice::Queen).succeeded());
        assert_eq!(store.get().piece_at(Square::D1).map(|p| p.role), Some(Role::King));
    }

    #[test]
    fn test_promotion_follows_choice() {
        let mut store = PositionStore::default();
        store.load(Position::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap());

        let outcome = apply_action(Mode::Analysis, &mut store, Square::A7, Square::A8, PromotionChoice::Rook);
        assert!(matches!(outcome, ActionOutcome::Moved { ref uci, .. } if uci == "a7a8r"));
        assert_eq!(store.get().piece_at(Square::A8).map(|p| p.role), Some(Role::Rook));
    }

    #[test]
    fn test_unplayable_position_rejects_moves() {
        let mut store = PositionStore::default();
        store.reset(false);
        let outcome = apply_action(Mode::Play, &mut store, Square::E2, Square::E4, PromotionChoice::Queen);
        assert_eq!(outcome, ActionOutcome::Rejected);
    }
}
