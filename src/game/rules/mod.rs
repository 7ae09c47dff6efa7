//! Chess rules module - legality through the rules library
//!
//! Every legality question in Analysis and Play mode is answered by
//! [`shakmaty`]; nothing here re-implements move generation. This module
//! only adapts board clicks to library moves and summarises positions.
//!
//! # Module Structure
//!
//! - `piece_moves` - Legal move lookup by (from, to) and by UCI string
//! - `board_state` - Game status and material balance
//!
//! Two small policy enums live here because both the store and the settings
//! file refer to them: [`PromotionChoice`] and [`CastlingExport`].

pub mod board_state;
pub mod piece_moves;


use crate::game::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use shakmaty::{Piece, Role, Square};
use std::str::FromStr;

// Re-export commonly used items
pub use board_state::{color_name, material_balance, piece_value, status, GameStatus};
pub use piece_moves::{destination, find_by_uci, find_legal_move, legal_targets, uci_string};

/// Piece a pawn turns into when a move does not say otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionChoice {
    #[default]
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionChoice {
    pub fn role(self) -> Role {
        match self {
            PromotionChoice::Queen => Role::Queen,
            PromotionChoice::Rook => Role::Rook,
            PromotionChoice::Bishop => Role::Bishop,
            PromotionChoice::Knight => Role::Knight,
        }
    }

    pub fn from_role(role: Role) -> Option<Self> {
        match role {
            Role::Queen => Some(PromotionChoice::Queen),
            Role::Rook => Some(PromotionChoice::Rook),
            Role::Bishop => Some(PromotionChoice::Bishop),
            Role::Knight => Some(PromotionChoice::Knight),
            Role::Pawn | Role::King => None,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(PromotionChoice::Queen),
            'r' => Some(PromotionChoice::Rook),
            'b' => Some(PromotionChoice::Bishop),
            'n' => Some(PromotionChoice::Knight),
            _ => None,
        }
    }
}

/// How castling flags are written into exported FEN
///
/// - `Verbatim`: the four flags as edited, even if no king or rook is home
/// - `Clamp`: only rights whose king and rook stand on their home squares
///
/// Legality checks always use the clamped rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastlingExport {
    #[default]
    Verbatim,
    Clamp,
}

/// Parse a square name such as `e4`
pub fn parse_square(input: &str) -> GameResult<Square> {
    Square::from_str(input.trim()).map_err(|_| GameError::InvalidSquare {
        input: input.to_string(),
    })
}

/// Parse a piece symbol (`P`, `n`, ...), uppercase for White
pub fn parse_piece(input: &str) -> GameResult<Piece> {
    let mut chars = input.trim().chars();
    let piece = match (chars.next(), chars.next()) {
        (Some(c), None) => Piece::from_char(c),
        _ => None,
    };
    piece.ok_or_else(|| GameError::InvalidPiece {
        input: input.to_string(),
    })
}
