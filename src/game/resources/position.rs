//! Position store - the single owner of board state and move history
//!
//! # Ownership
//!
//! [`PositionStore`] is mutated only from the interaction thread. Background
//! work (engine suggestions, move ranking) never writes here; it publishes
//! into its own result slot and the interaction thread applies accepted
//! results through the store's operations.
//!
//! # Representation
//!
//! A [`Position`] is a board of optional pieces, the side to move and four
//! castling flags. En-passant square and move clocks are carried along so the
//! rules library can continue a game, but Setup edits reset them.

use crate::game::components::{CastlingFlags, MoveRecord};
use crate::game::error::{GameError, GameResult};
use crate::game::resources::MoveHistory;
use crate::game::rules::CastlingExport;
use shakmaty::fen::Fen;
use shakmaty::{
    Board, CastlingMode, CastlingSide, Chess, Color, EnPassantMode, File, FromSetup, Piece,
    Position as _, PositionError, Rank, Setup, Square,
};
use std::num::NonZeroU32;
use tracing::debug;

/// Board snapshot: pieces, side to move, castling flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    turn: Color,
    castling: CastlingFlags,
    ep_square: Option<Square>,
    halfmoves: u32,
    fullmoves: NonZeroU32,
}

impl Position {
    /// Standard starting position, White to move, all castling rights
    pub fn starting() -> Self {
        Self {
            board: Board::default(),
            turn: Color::White,
            castling: CastlingFlags::ALL,
            ep_square: None,
            halfmoves: 0,
            fullmoves: NonZeroU32::MIN,
        }
    }

    /// Empty board, White to move, no castling rights
    pub fn empty() -> Self {
        Self {
            board: Board::empty(),
            turn: Color::White,
            castling: CastlingFlags::NONE,
            ep_square: None,
            halfmoves: 0,
            fullmoves: NonZeroU32::MIN,
        }
    }

    /// Parse a FEN, keeping castling flags exactly as written
    pub fn from_fen(fen: &str) -> GameResult<Self> {
        let parsed = Fen::from_ascii(fen.trim().as_bytes()).map_err(|e| GameError::InvalidFen {
            fen: fen.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_setup(parsed.into_setup()))
    }

    pub(crate) fn from_setup(setup: Setup) -> Self {
        Self {
            castling: CastlingFlags::from_bitboard(setup.castling_rights),
            board: setup.board,
            turn: setup.turn,
            ep_square: setup.ep_square,
            halfmoves: setup.halfmoves,
            fullmoves: setup.fullmoves,
        }
    }

    pub(crate) fn from_chess(chess: &Chess) -> Self {
        Self::from_setup(chess.clone().into_setup(EnPassantMode::Legal))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn castling(&self) -> CastlingFlags {
        self.castling
    }

    /// Rules-library view of this position
    ///
    /// Castling flags that cannot be realised and stale en-passant squares are
    /// dropped. Returns `None` when the arrangement is not a playable chess
    /// position (missing king, pawns on the back rank, side not to move in
    /// check, ...).
    pub fn to_chess(&self) -> Option<Chess> {
        let mut setup = Setup::empty();
        setup.board = self.board.clone();
        setup.turn = self.turn;
        setup.castling_rights = self.castling.clamped(&self.board).to_bitboard();
        setup.ep_square = self.ep_square;
        setup.halfmoves = self.halfmoves;
        setup.fullmoves = self.fullmoves;

        Chess::from_setup(setup, CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_invalid_ep_square)
            .ok()
    }

    /// FEN of this position
    ///
    /// The castling field follows `export`: verbatim flags, or only the
    /// rights whose king and rook stand on their home squares.
    pub fn fen(&self, export: CastlingExport) -> String {
        let castling = match export {
            CastlingExport::Verbatim => self.castling,
            CastlingExport::Clamp => self.castling.clamped(&self.board),
        };
        let ep = self
            .ep_square
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());
        let turn = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };

        format!(
            "{} {} {} {} {} {}",
            self.placement_fen(),
            turn,
            castling.fen_field(),
            ep,
            self.halfmoves,
            self.fullmoves
        )
    }

    fn placement_fen(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8u32).rev() {
            let mut empty = 0;
            for file in 0..8u32 {
                let square = Square::from_coords(File::new(file), Rank::new(rank));
                match self.board.piece_at(square) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    fn touch(&mut self) {
        self.ep_square = None;
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

/// Owner of the current [`Position`] and its [`MoveHistory`]
///
/// All mutators are synchronous. `epoch` increases whenever history is
/// wiped so late background results for an old game can be recognised.
#[derive(Debug, Clone)]
pub struct PositionStore {
    position: Position,
    history: MoveHistory,
    epoch: u64,
    export: CastlingExport,
}

impl PositionStore {
    pub fn new(export: CastlingExport) -> Self {
        Self {
            position: Position::starting(),
            history: MoveHistory::default(),
            epoch: 0,
            export,
        }
    }

    pub fn get(&self) -> &Position {
        &self.position
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut MoveHistory {
        &mut self.history
    }

    /// Generation counter of the history, bumped by [`PositionStore::reset`]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// FEN of the current position using the configured castling export
    pub fn fen(&self) -> String {
        self.position.fen(self.export)
    }

    pub fn castling_export(&self) -> CastlingExport {
        self.export
    }

    /// Raw placement with no legality check
    ///
    /// Puts `piece` on `square` (or clears it), discarding any previous
    /// occupant, and returns what was there.
    pub fn apply_placement(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        self.position.touch();
        let previous = self.position.board.remove_piece_at(square);
        if let Some(piece) = piece {
            self.position.board.set_piece_at(square, piece);
        }
        previous
    }

    /// Push a move that the rules library already accepted
    ///
    /// `next` is the position after the move. Records the move together with
    /// a FEN snapshot of the position before it.
    pub fn apply_move(&mut self, from: Square, to: Square, uci: String, next: Position) -> &MoveRecord {
        let fen_before = self.fen();
        let before = std::mem::replace(&mut self.position, next);
        debug!("[STORE] Applied {} (ply {})", uci, self.history.len() + 1);
        self.history
            .add_move(MoveRecord::new(from, to, uci, fen_before, before));
        &self.history.moves[self.history.len() - 1]
    }

    /// Take back the last move, restoring the position stored with it
    ///
    /// Returns `None` when there is nothing to undo.
    pub fn undo_last(&mut self) -> Option<MoveRecord> {
        let record = self.history.pop()?;
        self.position = record.position_before().clone();
        debug!("[STORE] Undid {}", record.uci());
        Some(record)
    }

    /// Start over from the standard start position or an empty board
    ///
    /// History is cleared either way.
    pub fn reset(&mut self, to_starting_position: bool) {
        self.position = if to_starting_position {
            Position::starting()
        } else {
            Position::empty()
        };
        self.history.clear();
        self.epoch += 1;
        debug!("[STORE] Reset (start position: {})", to_starting_position);
    }

    /// Set the side to move without touching the pieces
    pub fn set_turn(&mut self, color: Color) {
        self.position.touch();
        self.position.turn = color;
    }

    /// Flip one castling flag, returning its new value
    pub fn toggle_castling(&mut self, color: Color, side: CastlingSide) -> bool {
        self.position.castling.toggle(color, side)
    }

    /// Replace the whole position (e.g. from a pasted FEN), clearing history
    pub fn load(&mut self, position: Position) {
        self.reset(false);
        self.position = position;
    }
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::new(CastlingExport::default())
    }
}
