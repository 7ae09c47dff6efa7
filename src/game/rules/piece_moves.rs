//! Legal move lookup
//!
//! Turns a (from, to) pair chosen on the board into a rules-library [`Move`].
//! Pure functions with no side effects - easy to test.

use super::PromotionChoice;
use shakmaty::{Chess, File, Move, Position as _, Square};

/// Destination square of a move as the user would click it
///
/// Castling is stored by the rules library as king-takes-rook; the user
/// drags the king two files instead.
pub fn destination(m: &Move) -> Square {
    match *m {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            Square::from_coords(file, king.rank())
        }
        _ => m.to(),
    }
}

/// UCI identifier of a move, e.g. `e2e4`, `e1g1` or `e7e8q`
pub fn uci_string(m: &Move) -> String {
    let from = m.from().map(|sq| sq.to_string()).unwrap_or_default();
    match m.promotion() {
        Some(role) => format!("{}{}{}", from, destination(m), role.char()),
        None => format!("{}{}", from, destination(m)),
    }
}

/// Find the legal move from `from` to `to` in `chess`
///
/// When several legal moves share the squares (a pawn reaching the last
/// rank), the one promoting to `promotion` wins.
pub fn find_legal_move(
    chess: &Chess,
    from: Square,
    to: Square,
    promotion: PromotionChoice,
) -> Option<Move> {
    let mut candidates = chess
        .legal_moves()
        .into_iter()
        .filter(|m| m.from() == Some(from) && destination(m) == to);

    let first = candidates.next()?;
    if first.promotion().is_none() {
        return Some(first);
    }

    std::iter::once(first.clone())
        .chain(candidates)
        .find(|m| m.promotion() == Some(promotion.role()))
        .or(Some(first))
}

/// Legal destinations for the piece on `from`, sorted and deduplicated
pub fn legal_targets(chess: &Chess, from: Square) -> Vec<Square> {
    let mut targets: Vec<Square> = chess
        .legal_moves()
        .iter()
        .filter(|m| m.from() == Some(from))
        .map(destination)
        .collect();
    targets.sort();
    targets.dedup();
    targets
}

/// Look up a legal move by its UCI identifier
pub fn find_by_uci(chess: &Chess, uci: &str) -> Option<Move> {
    let uci = uci.trim().to_ascii_lowercase();
    chess
        .legal_moves()
        .into_iter()
        .find(|m| uci_string(m) == uci)
}
