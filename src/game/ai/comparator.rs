//! Move-Rank Comparator
//!
//! After a human move, asks the engine for its top candidates in the position
//! *before* the move and reports where the played move lands in that list.
//!
//! Each comparison is an independent task; comparisons do not share the
//! suggestion orchestrator's single-flight slot and may overlap with it and
//! with each other. The list is taken in the engine's order; no re-sorting.
//! Searches run under [`SearchTag::Comparison`], which suggestion requests
//! never stop.

use super::oracle::{Oracle, OracleError, OracleResult, RankedMove, SearchTag};
use super::resource::ComparisonResult;
use crate::game::events::BackgroundEvent;
use crossbeam_channel::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Everything needed to rank one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRequest {
    /// History generation the move belongs to
    pub epoch: u64,
    /// Zero-based history index of the move
    pub ply: usize,
    /// FEN of the position before the move
    pub fen_before: String,
    /// UCI identifier of the move played
    pub user_move: String,
}

/// 1-based position of `user_move` in `candidates`
///
/// # Examples
///
/// ```
/// use chess_predictor::game::ai::{rank_of, RankedMove, Score};
///
/// let top = vec![
///     RankedMove::new("e2e4", Score::Centipawns(30)),
///     RankedMove::new("d2d4", Score::Centipawns(25)),
/// ];
/// assert_eq!(rank_of(&top, "d2d4"), Some(2));
/// assert_eq!(rank_of(&top, "a2a3"), None);
/// ```
pub fn rank_of(candidates: &[RankedMove], user_move: &str) -> Option<usize> {
    candidates
        .iter()
        .position(|m| m.uci == user_move)
        .map(|index| index + 1)
}

/// Run one comparison to completion
pub async fn compare_now(
    oracle: &dyn Oracle,
    request: &ComparisonRequest,
    candidates: usize,
    depth: u32,
) -> OracleResult<ComparisonResult> {
    let list = oracle
        .top_moves(&request.fen_before, candidates, depth, SearchTag::Comparison)
        .await?;
    // a move was just played from this position, so it has legal moves
    if list.is_empty() {
        return Err(OracleError::Protocol {
            message: format!("no candidates to rank {} against", request.user_move),
        });
    }
    Ok(ComparisonResult {
        user_move: request.user_move.clone(),
        rank: rank_of(&list, &request.user_move),
        candidates: list,
        fen_before: request.fen_before.clone(),
        ply: request.ply,
    })
}

pub struct MoveRankComparator {
    oracle: Arc<dyn Oracle>,
    runtime: Handle,
    events: Sender<BackgroundEvent>,
    candidates: usize,
    depth: u32,
}

impl MoveRankComparator {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        runtime: Handle,
        events: Sender<BackgroundEvent>,
        candidates: usize,
        depth: u32,
    ) -> Self {
        Self {
            oracle,
            runtime,
            events,
            candidates,
            depth,
        }
    }

    /// Rank a move in the background
    ///
    /// The result arrives as [`BackgroundEvent::Comparison`]. Oracle failures
    /// are logged and produce no event.
    pub fn compare(&self, request: ComparisonRequest) {
        let oracle = Arc::clone(&self.oracle);
        let events = self.events.clone();
        let (candidates, depth) = (self.candidates, self.depth);

        debug!(
            "[COMPARE] Ranking {} (ply {}) against top {}",
            request.user_move,
            request.ply + 1,
            candidates
        );
        self.runtime.spawn(async move {
            match compare_now(oracle.as_ref(), &request, candidates, depth).await {
                Ok(result) => {
                    info!("[COMPARE] {}", result.summary());
                    let event = BackgroundEvent::Comparison {
                        epoch: request.epoch,
                        result,
                    };
                    if events.send(event).is_err() {
                        debug!("[COMPARE] Session gone, dropping result");
                    }
                }
                Err(e) => warn!("[COMPARE] Ranking {} failed: {}", request.user_move, e),
            }
        });
    }
}
