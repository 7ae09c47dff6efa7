//! Engine result types and move selection policy
//!
//! Values published by the background engine work and read by the session:
//!
//! - [`EngineOutcome`] - latest suggestion, or the "unavailable" sentinel
//! - [`ComparisonResult`] - where a user's move ranks among the engine's choices
//!
//! # Selection policies
//!
//! The suggestion query asks for several candidates; a [`SelectionPolicy`]
//! decides which one becomes the suggested (or played) move:
//!
//! | Policy          | Picks                                          |
//! |-----------------|------------------------------------------------|
//! | `Best`          | The top-ranked candidate                       |
//! | `FixedRank(k)`  | The k-th candidate, or the last if fewer exist |
//! | `RandomTopN(n)` | A uniformly random one of the first n          |
//!
//! `FixedRank(10)` with twelve candidates reproduces a deliberately weaker
//! "teaching" opponent that rarely plays the engine's first choice.

use super::oracle::{RankedMove, Score};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shakmaty::Square;

/// Which candidate a suggestion query settles on
///
/// # Examples
///
/// ```
/// use chess_predictor::game::ai::{RankedMove, Score, SelectionPolicy};
///
/// let candidates = vec![
///     RankedMove::new("e2e4", Score::Centipawns(30)),
///     RankedMove::new("d2d4", Score::Centipawns(25)),
/// ];
///
/// assert_eq!(SelectionPolicy::Best.pick(&candidates).unwrap().0, 0);
/// // Asking for the 10th move with only two candidates falls back to the last
/// assert_eq!(SelectionPolicy::FixedRank(10).pick(&candidates).unwrap().0, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    Best,
    /// 1-based rank; 0 is treated as 1
    FixedRank(usize),
    /// Random pick among the first n candidates
    RandomTopN(usize),
}

impl SelectionPolicy {
    /// Choose a candidate, returning its zero-based index
    pub fn pick<'a>(&self, candidates: &'a [RankedMove]) -> Option<(usize, &'a RankedMove)> {
        if candidates.is_empty() {
            return None;
        }
        let last = candidates.len() - 1;
        let index = match *self {
            SelectionPolicy::Best => 0,
            SelectionPolicy::FixedRank(rank) => rank.saturating_sub(1).min(last),
            SelectionPolicy::RandomTopN(n) => {
                let upper = n.clamp(1, candidates.len());
                rand::rng().random_range(0..upper)
            }
        };
        Some((index, &candidates[index]))
    }

    pub fn description(&self) -> String {
        match self {
            SelectionPolicy::Best => "best move".to_string(),
            SelectionPolicy::FixedRank(k) => format!("rank {} move", k),
            SelectionPolicy::RandomTopN(n) => format!("random among top {}", n),
        }
    }
}

/// Move chosen by a suggestion query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSuggestion {
    /// UCI identifier of the chosen move
    pub uci: String,
    /// Evaluation of the chosen move, side to move's perspective
    pub score: Score,
    /// 1-based rank of the move in the engine's list
    pub rank: usize,
    /// Freshness token: FEN the suggestion was computed against
    pub fen: String,
    /// Destination square, used for the board highlight
    pub destination: Option<Square>,
}

/// Content of the suggestion slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    Suggested(EngineSuggestion),
    /// No engine, engine error, or no legal moves
    Unavailable { fen: String, reason: String },
}

impl EngineOutcome {
    pub fn suggestion(&self) -> Option<&EngineSuggestion> {
        match self {
            EngineOutcome::Suggested(s) => Some(s),
            EngineOutcome::Unavailable { .. } => None,
        }
    }

    /// FEN the outcome refers to
    pub fn fen(&self) -> &str {
        match self {
            EngineOutcome::Suggested(s) => &s.fen,
            EngineOutcome::Unavailable { fen, .. } => fen,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, EngineOutcome::Unavailable { .. })
    }
}

/// Ranking of a user's move against the engine's top candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    /// UCI identifier of the move the user played
    pub user_move: String,
    /// 1-based rank, `None` when the move is outside the list
    pub rank: Option<usize>,
    /// Engine candidates for the position before the move, best first
    pub candidates: Vec<RankedMove>,
    /// FEN of the position the candidates were computed for
    pub fen_before: String,
    /// Zero-based history index of the move
    pub ply: usize,
}

impl ComparisonResult {
    /// The engine's top choice, if any
    pub fn best(&self) -> Option<&RankedMove> {
        self.candidates.first()
    }

    pub fn summary(&self) -> String {
        match self.rank {
            Some(1) => format!("{} was the engine's top choice", self.user_move),
            Some(rank) => format!(
                "{} ranked #{} of {}",
                self.user_move,
                rank,
                self.candidates.len()
            ),
            None => format!(
                "{} was not in the engine's top {}",
                self.user_move,
                self.candidates.len()
            ),
        }
    }
}
