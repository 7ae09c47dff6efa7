//! Engine oracle abstraction
//!
//! An [`Oracle`] answers one question: "what are the top `n` moves in this
//! position, searched to this depth?". The session never talks to an engine
//! process directly; it goes through this trait so a scripted oracle can stand
//! in during tests.
//!
//! Each query carries its own FEN and MultiPV count, so concurrent callers
//! never observe a half-configured engine. Each query is also tagged with the
//! [`SearchTag`] of its owner; [`Oracle::interrupt`] only stops the search
//! carrying the given tag, so stopping a superseded suggestion never cuts a
//! move ranking short.
//!
//! # Scores
//!
//! [`Score`] is reported from the side to move's perspective, the way UCI
//! engines emit it: `Centipawns(35)` with Black to move means Black is better.
//! [`Score::white_relative`] converts for display.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shakmaty::Color;
use std::fmt;
use std::path::PathBuf;

/// Engine evaluation score, side to move's perspective
///
/// Mate: positive N = side to move mates in N moves,
/// negative N = side to move gets mated in N moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
}

impl Score {
    /// Convert to centipawns for comparison. Mate scores use large values.
    pub fn to_cp(&self) -> i32 {
        match *self {
            Score::Centipawns(cp) => cp,
            Score::Mate(m) if m > 0 => 30000 - m * 100,
            Score::Mate(m) => -30000 - m * 100,
        }
    }

    pub fn centipawns(&self) -> Option<i32> {
        match *self {
            Score::Centipawns(cp) => Some(cp),
            Score::Mate(_) => None,
        }
    }

    pub fn mate(&self) -> Option<i32> {
        match *self {
            Score::Mate(m) => Some(m),
            Score::Centipawns(_) => None,
        }
    }

    /// Negate the score (flip perspective)
    pub fn negate(&self) -> Self {
        match *self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::Mate(m) => Score::Mate(-m),
        }
    }

    /// Same score from White's point of view
    pub fn white_relative(&self, side_to_move: Color) -> Self {
        match side_to_move {
            Color::White => *self,
            Color::Black => self.negate(),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Score::Centipawns(cp) => write!(f, "{:+.2}", cp as f64 / 100.0),
            Score::Mate(m) if m > 0 => write!(f, "+M{}", m),
            Score::Mate(m) => write!(f, "-M{}", m.abs()),
        }
    }
}

/// One candidate move from a MultiPV search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMove {
    /// UCI identifier, e.g. `g1f3`
    pub uci: String,
    pub score: Score,
}

impl RankedMove {
    pub fn new(uci: impl Into<String>, score: Score) -> Self {
        Self {
            uci: uci.into(),
            score,
        }
    }
}

/// Who a search belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchTag {
    /// Suggestion request with its sequence number
    Suggestion(u64),
    /// Move ranking; never interrupted
    Comparison,
}

/// Errors raised by an engine oracle
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Engine binary could not be started
    #[error("Failed to start engine at {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the engine failed
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine did not answer in time
    #[error("Engine did not respond within {ms}ms")]
    Timeout { ms: u64 },

    /// Engine answered with something unexpected
    #[error("Engine protocol error: {message}")]
    Protocol { message: String },

    /// Search was stopped before it finished
    #[error("Engine search was interrupted")]
    Interrupted,

    /// Engine process has exited
    #[error("Engine process closed")]
    Closed,

    /// No engine is configured
    #[error("No engine configured")]
    Unavailable,
}

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Source of ranked candidate moves
///
/// Implementations must be callable from several tasks at once. A query that
/// is interrupted may return early with whatever lines it has.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Human-readable engine name
    fn name(&self) -> &str;

    /// Top `n` moves for `fen`, best first, searched to `depth` plies
    ///
    /// An empty list means the side to move has no legal moves. A search
    /// stopped through [`Oracle::interrupt`] fails with
    /// [`OracleError::Interrupted`] instead of returning partial lines.
    async fn top_moves(
        &self,
        fen: &str,
        n: usize,
        depth: u32,
        tag: SearchTag,
    ) -> OracleResult<Vec<RankedMove>>;

    /// Ask the running search to finish early if it carries `tag`
    ///
    /// Does nothing when another search (or none) is running.
    async fn interrupt(&self, _tag: SearchTag) -> OracleResult<()> {
        Ok(())
    }

    /// Release the engine
    async fn shutdown(&self) -> OracleResult<()> {
        Ok(())
    }
}
