//! Board status queries for display
//!
//! Game-over detection is informational only: nothing stops a user from
//! continuing to edit or analyse a finished position.

use shakmaty::{Board, Chess, Color, Position as _, Role, Square};
use std::fmt;

/// Status of the position for the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    /// The arrangement is not a playable position (e.g. Setup with a king missing)
    Invalid,
}

impl GameStatus {
    /// True when the side to move has no legal moves (or cannot move at all)
    ///
    /// Insufficient material is a drawn result but still has legal moves.
    pub fn has_no_moves(self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate { .. } | GameStatus::Stalemate | GameStatus::Invalid
        )
    }

    pub fn is_game_over(self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate { .. } | GameStatus::Stalemate | GameStatus::InsufficientMaterial
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => f.write_str("ongoing"),
            GameStatus::Check => f.write_str("check"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", color_name(*winner)),
            GameStatus::Stalemate => f.write_str("stalemate"),
            GameStatus::InsufficientMaterial => f.write_str("draw by insufficient material"),
            GameStatus::Invalid => f.write_str("not a legal position"),
        }
    }
}

/// Compute the status of an optional rules-library position
pub fn status(chess: Option<&Chess>) -> GameStatus {
    let Some(chess) = chess else {
        return GameStatus::Invalid;
    };

    if chess.is_checkmate() {
        GameStatus::Checkmate {
            winner: !chess.turn(),
        }
    } else if chess.is_stalemate() {
        GameStatus::Stalemate
    } else if chess.is_insufficient_material() {
        GameStatus::InsufficientMaterial
    } else if chess.is_check() {
        GameStatus::Check
    } else {
        GameStatus::Ongoing
    }
}

/// Conventional centipawn value of a piece role (king counts zero)
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 100,
        Role::Knight => 320,
        Role::Bishop => 330,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 0,
    }
}

/// Material balance in centipawns, positive when White is ahead
pub fn material_balance(board: &Board) -> i32 {
    Square::ALL
        .iter()
        .filter_map(|&sq| board.piece_at(sq))
        .map(|piece| match piece.color {
            Color::White => piece_value(piece.role),
            Color::Black => -piece_value(piece.role),
        })
        .sum()
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}
