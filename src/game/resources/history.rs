//! Move history tracking
//!
//! Maintains the chronological record of every move applied in Analysis or
//! Play mode. Each [`MoveRecord`] carries the FEN of the position before the
//! move, which is what the move-rank comparator analyses and what undo
//! restores.
//!
//! History is append-only during normal play. Only undo (one record at a
//! time) and an explicit reset/clear remove records.

use crate::game::ai::ComparisonResult;
use crate::game::components::MoveRecord;

/// Complete move history for the current game
///
/// Index 0 is the first move applied after the last reset, regardless of
/// which side made it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MoveHistory {
    /// Chronological list of all moves made in the game
    pub(crate) moves: Vec<MoveRecord>,
}

impl MoveHistory {
    /// Append a record. Called by the position store after a move is applied.
    pub fn add_move(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    /// Get the most recent move, if any
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    /// Number of half-moves (ply) recorded
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Check if there are moves that can be undone
    pub fn can_undo(&self) -> bool {
        !self.moves.is_empty()
    }

    /// Remove all records (reset / clear board)
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Get a specific move by zero-based ply index
    pub fn get_move(&self, index: usize) -> Option<&MoveRecord> {
        self.moves.get(index)
    }

    /// Iterate over all moves in chronological order
    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.moves.iter()
    }

    /// UCI identifiers of all moves, oldest first
    pub fn uci_moves(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.uci().to_string()).collect()
    }

    pub(crate) fn pop(&mut self) -> Option<MoveRecord> {
        self.moves.pop()
    }

    /// Attach a ranking to the record at `index` if it still holds `uci`
    ///
    /// Returns false when the record is gone, holds a different move, or
    /// already has a ranking.
    pub(crate) fn attach_comparison(
        &mut self,
        index: usize,
        uci: &str,
        comparison: ComparisonResult,
    ) -> bool {
        match self.moves.get_mut(index) {
            Some(record) if record.uci() == uci => record.attach_comparison(comparison),
            _ => false,
        }
    }
}
