//! Castling-rights flags
//!
//! Four independent booleans, edited freely in Setup mode. They are a
//! scratchpad: nothing forces them to agree with where the kings and rooks
//! actually stand. [`CastlingFlags::clamped`] derives the physically
//! realisable subset when a consumer needs it.

use shakmaty::{Bitboard, Board, CastlingSide, Color, Piece, Role, Square};

/// Castling availability for both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingFlags {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingFlags {
    pub const ALL: CastlingFlags = CastlingFlags {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub const NONE: CastlingFlags = CastlingFlags {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub fn get(&self, color: Color, side: CastlingSide) -> bool {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => self.white_kingside,
            (Color::White, CastlingSide::QueenSide) => self.white_queenside,
            (Color::Black, CastlingSide::KingSide) => self.black_kingside,
            (Color::Black, CastlingSide::QueenSide) => self.black_queenside,
        }
    }

    pub fn set(&mut self, color: Color, side: CastlingSide, value: bool) {
        let flag = match (color, side) {
            (Color::White, CastlingSide::KingSide) => &mut self.white_kingside,
            (Color::White, CastlingSide::QueenSide) => &mut self.white_queenside,
            (Color::Black, CastlingSide::KingSide) => &mut self.black_kingside,
            (Color::Black, CastlingSide::QueenSide) => &mut self.black_queenside,
        };
        *flag = value;
    }

    /// Flip one flag, returning its new value
    pub fn toggle(&mut self, color: Color, side: CastlingSide) -> bool {
        let value = !self.get(color, side);
        self.set(color, side, value);
        value
    }

    /// Home square of the rook for a color and side
    pub fn rook_square(color: Color, side: CastlingSide) -> Square {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => Square::H1,
            (Color::White, CastlingSide::QueenSide) => Square::A1,
            (Color::Black, CastlingSide::KingSide) => Square::H8,
            (Color::Black, CastlingSide::QueenSide) => Square::A8,
        }
    }

    fn king_square(color: Color) -> Square {
        match color {
            Color::White => Square::E1,
            Color::Black => Square::E8,
        }
    }

    fn each() -> [(Color, CastlingSide); 4] {
        [
            (Color::White, CastlingSide::KingSide),
            (Color::White, CastlingSide::QueenSide),
            (Color::Black, CastlingSide::KingSide),
            (Color::Black, CastlingSide::QueenSide),
        ]
    }

    /// Rights as a set of rook squares, the rules library's representation
    pub fn to_bitboard(&self) -> Bitboard {
        Self::each()
            .into_iter()
            .filter(|&(color, side)| self.get(color, side))
            .fold(Bitboard::EMPTY, |bb, (color, side)| {
                bb | Bitboard::from(Self::rook_square(color, side))
            })
    }

    /// Inverse of [`CastlingFlags::to_bitboard`]; other squares are ignored
    pub fn from_bitboard(bb: Bitboard) -> Self {
        let mut flags = Self::NONE;
        for (color, side) in Self::each() {
            flags.set(color, side, bb.contains(Self::rook_square(color, side)));
        }
        flags
    }

    /// Keep only the flags whose king and rook are on their home squares
    pub fn clamped(&self, board: &Board) -> Self {
        let mut flags = *self;
        for (color, side) in Self::each() {
            let king_home = board.piece_at(Self::king_square(color))
                == Some(Piece {
                    color,
                    role: Role::King,
                });
            let rook_home = board.piece_at(Self::rook_square(color, side))
                == Some(Piece {
                    color,
                    role: Role::Rook,
                });
            if !(king_home && rook_home) {
                flags.set(color, side, false);
            }
        }
        flags
    }

    /// FEN castling field, `-` when empty
    pub fn fen_field(&self) -> String {
        let field: String = [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, c)| *c)
        .collect();

        if field.is_empty() {
            "-".to_string()
        } else {
            field
        }
    }
}

impl Default for CastlingFlags {
    fn default() -> Self {
        Self::ALL
    }
}
