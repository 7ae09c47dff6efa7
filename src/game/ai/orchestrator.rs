//! Engine Query Orchestrator - single-flight suggestion requests
//!
//! Runs suggestion queries on the tokio runtime so the interaction thread
//! never waits for the engine, and makes sure only the newest request's
//! answer is ever used.
//!
//! # Request lifecycle
//!
//! ```text
//!   Idle --request_suggestion--> Busy --deliver--> Idle
//!                                 |  ^
//!                                 +--+ request_suggestion (supersedes)
//! ```
//!
//! Every request takes the next value of a monotonically increasing sequence
//! counter. A superseding request asks the engine to `stop` the running
//! search before starting its own. Results are checked twice:
//!
//! 1. In the background task: a result whose sequence number is no longer the
//!    latest is dropped without being sent.
//! 2. In [`EngineQueryOrchestrator::deliver`] on the interaction thread: the
//!    sequence number must still be the latest *and* the freshness token (the
//!    FEN the query ran against) must equal the current position's FEN.
//!
//! Accepted results are written to a [`ResultSlot`] as a single value.

use super::oracle::{Oracle, OracleError, OracleResult, RankedMove, SearchTag};
use super::resource::{EngineOutcome, EngineSuggestion, SelectionPolicy};
use super::slot::ResultSlot;
use crate::game::events::BackgroundEvent;
use crossbeam_channel::Sender;
use shakmaty::Square;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Query parameters for suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionConfig {
    /// How many candidates to request (MultiPV)
    pub candidates: usize,
    pub depth: u32,
    pub policy: SelectionPolicy,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            candidates: 12,
            depth: 8,
            policy: SelectionPolicy::Best,
        }
    }
}

/// Handle to an issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHandle {
    seq: u64,
}

impl RequestHandle {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    seq: u64,
    fen: String,
}

pub struct EngineQueryOrchestrator {
    oracle: Option<Arc<dyn Oracle>>,
    runtime: Handle,
    events: Sender<BackgroundEvent>,
    latest_seq: Arc<AtomicU64>,
    in_flight: Option<InFlight>,
    slot: Arc<ResultSlot<EngineOutcome>>,
    config: SuggestionConfig,
}

impl EngineQueryOrchestrator {
    pub fn new(
        oracle: Option<Arc<dyn Oracle>>,
        runtime: Handle,
        events: Sender<BackgroundEvent>,
        config: SuggestionConfig,
    ) -> Self {
        Self {
            oracle,
            runtime,
            events,
            latest_seq: Arc::new(AtomicU64::new(0)),
            in_flight: None,
            slot: Arc::new(ResultSlot::new()),
            config,
        }
    }

    pub fn config(&self) -> SuggestionConfig {
        self.config
    }

    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.config.policy = policy;
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// True while a request is outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Sequence number of the newest request
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq.load(Ordering::SeqCst)
    }

    /// Shared handle to the suggestion slot
    pub fn slot(&self) -> Arc<ResultSlot<EngineOutcome>> {
        Arc::clone(&self.slot)
    }

    /// Latest published outcome
    pub fn outcome(&self) -> Option<EngineOutcome> {
        self.slot.load()
    }

    fn next_seq(&self) -> u64 {
        self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Ask the engine for a move in the position described by `fen`
    ///
    /// Supersedes any outstanding request. Without an engine the
    /// "unavailable" outcome is published immediately.
    pub fn request_suggestion(&mut self, fen: &str) -> RequestHandle {
        let seq = self.next_seq();
        let handle = RequestHandle { seq };

        let Some(oracle) = self.oracle.clone() else {
            self.in_flight = None;
            self.slot.store(EngineOutcome::Unavailable {
                fen: fen.to_string(),
                reason: OracleError::Unavailable.to_string(),
            });
            return handle;
        };

        let superseded = self.in_flight.replace(InFlight {
            seq,
            fen: fen.to_string(),
        });
        if let Some(previous) = &superseded {
            debug!(
                "[AI] Request #{} supersedes #{} ({})",
                seq, previous.seq, previous.fen
            );
        }

        info!("[AI] Suggestion request #{} for {}", seq, fen);

        let latest = Arc::clone(&self.latest_seq);
        let events = self.events.clone();
        let config = self.config;
        let fen = fen.to_string();
        self.runtime.spawn(async move {
            if let Some(previous) = superseded {
                if let Err(e) = oracle.interrupt(SearchTag::Suggestion(previous.seq)).await {
                    debug!("[AI] Interrupt failed: {}", e);
                }
            }
            if latest.load(Ordering::SeqCst) != seq {
                debug!("[AI] Request #{} superseded before it started", seq);
                return;
            }

            let result = oracle
                .top_moves(&fen, config.candidates, config.depth, SearchTag::Suggestion(seq))
                .await;

            if latest.load(Ordering::SeqCst) != seq {
                debug!("[AI] Request #{} superseded, discarding result", seq);
                return;
            }
            if events
                .send(BackgroundEvent::Suggestion { seq, fen, result })
                .is_err()
            {
                debug!("[AI] Session gone, dropping request #{}", seq);
            }
        });

        handle
    }

    /// Publish the "unavailable" outcome for `fen` without asking the engine
    ///
    /// Used when the position cannot be searched at all. Supersedes any
    /// outstanding request.
    pub fn mark_unavailable(&mut self, fen: &str, reason: &str) {
        self.next_seq();
        self.in_flight = None;
        self.slot.store(EngineOutcome::Unavailable {
            fen: fen.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Forget the outstanding request; its result will be dropped
    pub fn cancel(&mut self) {
        self.next_seq();
        if let (Some(previous), Some(oracle)) = (self.in_flight.take(), self.oracle.clone()) {
            debug!("[AI] Cancelled request #{}", previous.seq);
            self.runtime.spawn(async move {
                if let Err(e) = oracle.interrupt(SearchTag::Suggestion(previous.seq)).await {
                    debug!("[AI] Interrupt failed: {}", e);
                }
            });
        }
    }

    /// Clear the published outcome
    pub fn clear(&self) {
        self.slot.clear();
    }

    /// Accept or drop a finished query
    ///
    /// `current_fen` is the FEN of the position on the board right now.
    /// Returns the accepted suggestion, if any.
    pub fn deliver(
        &mut self,
        seq: u64,
        fen: String,
        result: OracleResult<Vec<RankedMove>>,
        current_fen: &str,
    ) -> Option<EngineSuggestion> {
        if seq != self.latest_seq() {
            debug!("[AI] Dropping stale result #{} (latest #{})", seq, self.latest_seq());
            return None;
        }
        if self.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            self.in_flight = None;
        }
        if fen != current_fen {
            debug!("[AI] Position changed since request #{}, discarding", seq);
            return None;
        }

        let candidates = match result {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("[AI] Engine query failed: {}", e);
                self.slot.store(EngineOutcome::Unavailable {
                    fen,
                    reason: e.to_string(),
                });
                return None;
            }
        };

        let Some((index, chosen)) = self.config.policy.pick(&candidates) else {
            info!("[AI] Engine returned no candidates");
            self.slot.store(EngineOutcome::Unavailable {
                fen,
                reason: "no candidate moves".to_string(),
            });
            return None;
        };

        let suggestion = EngineSuggestion {
            uci: chosen.uci.clone(),
            score: chosen.score,
            rank: index + 1,
            destination: destination_of(&chosen.uci),
            fen,
        };
        info!(
            "[AI] Suggestion #{}: {} ({}, rank {}/{})",
            seq,
            suggestion.uci,
            suggestion.score,
            suggestion.rank,
            candidates.len()
        );
        self.slot
            .store(EngineOutcome::Suggested(suggestion.clone()));
        Some(suggestion)
    }
}

/// Destination square of a UCI move string
pub fn destination_of(uci: &str) -> Option<Square> {
    uci.get(2..4).and_then(|sq| sq.parse().ok())
}
