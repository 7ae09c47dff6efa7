//! Engine analysis subsystem
//!
//! The engine runs asynchronously to avoid blocking the interaction thread.
//!
//! # Architecture
//!
//! - [`Oracle`]: trait over any source of ranked moves; [`UciEngine`] drives
//!   an external UCI process
//! - [`EngineQueryOrchestrator`]: single-flight suggestion requests with
//!   supersession and stale-result discard
//! - [`MoveRankComparator`]: ranks each human move against the engine's list
//! - [`ResultSlot`]: whole-value result publication
//!
//! # Integration Strategy
//!
//! The position store is the source of truth. For every query:
//! 1. The session exports the current position as FEN (the freshness token)
//! 2. A task on the tokio runtime asks the oracle for ranked candidates
//! 3. The task posts a [`crate::game::events::BackgroundEvent`]
//! 4. The session, on its next update, checks the event is still current and
//!    applies it through the same validation path as human moves

pub mod comparator;
pub mod oracle;
pub mod orchestrator;
pub mod resource;
pub mod slot;
pub mod uci;

// Re-export for convenience
pub use comparator::{compare_now, rank_of, ComparisonRequest, MoveRankComparator};
pub use oracle::{Oracle, OracleError, OracleResult, RankedMove, Score, SearchTag};
pub use orchestrator::{destination_of, EngineQueryOrchestrator, RequestHandle, SuggestionConfig};
pub use resource::{ComparisonResult, EngineOutcome, EngineSuggestion, SelectionPolicy};
pub use slot::ResultSlot;
pub use uci::{parse_info, InfoLine, UciEngine};
