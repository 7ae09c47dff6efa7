//! Messages sent from background engine tasks to the interaction thread
//!
//! Background tasks never touch the position store. They post one of these
//! on a crossbeam channel; [`crate::game::session::AnalysisSession::update`]
//! drains the channel and decides whether each result is still current.

use crate::game::ai::{ComparisonResult, OracleResult, RankedMove};

#[derive(Debug)]
pub enum BackgroundEvent {
    /// A suggestion query finished
    Suggestion {
        /// Request sequence number
        seq: u64,
        /// Freshness token the query ran against
        fen: String,
        result: OracleResult<Vec<RankedMove>>,
    },
    /// A move ranking finished
    Comparison {
        /// History generation the move belongs to
        epoch: u64,
        result: ComparisonResult,
    },
}
