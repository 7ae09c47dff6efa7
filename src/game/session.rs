//! Analysis session - the presentation-facing facade
//!
//! [`AnalysisSession`] owns everything that lives on the interaction thread:
//! the [`PositionStore`], the [`ModeState`] and the [`Selection`]. It exposes
//!
//! - a write-only action intake (`select_mode`, `try_action`,
//!   `request_suggestion`, `toggle_vs_engine`, `clear_board`,
//!   `reset_to_start`, plus the Setup editing controls), and
//! - a read-only [`SessionSnapshot`] for rendering.
//!
//! # Update loop
//!
//! Engine work runs on a tokio runtime and reports back over a channel. The
//! front end calls [`AnalysisSession::update`] once per tick; it drains the
//! channel, keeps only results that still match the board, and applies
//! engine replies through the same validation path as human moves.
//!
//! ```rust,ignore
//! loop {
//!     handle_user_input(&mut session);
//!     for event in session.update() {
//!         render_event(&event);
//!     }
//!     render(&session.snapshot());
//! }
//! ```

use crate::core::AnalysisSettings;
use crate::game::ai::{
    ComparisonRequest, ComparisonResult, EngineOutcome, EngineQueryOrchestrator, EngineSuggestion,
    MoveRankComparator, Oracle, RequestHandle, ResultSlot, SelectionPolicy, SuggestionConfig,
};
use crate::game::components::{CastlingFlags, Mode, ModeState};
use crate::game::error::GameResult;
use crate::game::events::BackgroundEvent;
use crate::game::resources::{MoveHistory, Position, PositionStore, Selection};
use crate::game::rules::{
    destination, find_by_uci, legal_targets, material_balance, status, CastlingExport,
    GameStatus, PromotionChoice,
};
use crate::game::systems::{apply_action, holds_king, ActionOutcome};
use crossbeam_channel::{unbounded, Receiver};
use shakmaty::{CastlingSide, Color, Piece, Square};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Something the front end may want to show after [`AnalysisSession::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A suggestion was accepted into the suggestion slot
    Suggested(EngineSuggestion),
    /// The engine had nothing to offer for the current position
    Unavailable { reason: String },
    /// The engine's reply was applied to the board
    EngineMoved { uci: String },
    /// The engine's reply no longer fitted the board and was dropped
    EngineMoveRejected { uci: String },
    /// A user move received its ranking
    Compared(ComparisonResult),
}

/// Read-only view of the session for rendering
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub position: Position,
    pub fen: String,
    pub mode: Mode,
    pub vs_engine: bool,
    pub human_side: Color,
    pub selection: Selection,
    pub suggestion: Option<EngineOutcome>,
    /// Destination of the latest suggestion, if it belongs to this position
    pub suggestion_highlight: Option<Square>,
    pub comparison: Option<ComparisonResult>,
    pub history: MoveHistory,
    pub status: GameStatus,
    /// Centipawns, positive when White is ahead
    pub material: i32,
    pub engine_busy: bool,
    pub engine_name: Option<String>,
    /// How a suggestion is chosen from the engine's candidates
    pub selection_policy: SelectionPolicy,
}

pub struct AnalysisSession {
    store: PositionStore,
    modes: ModeState,
    selection: Selection,
    human_side: Color,
    promotion: PromotionChoice,
    oracle: Option<Arc<dyn Oracle>>,
    orchestrator: EngineQueryOrchestrator,
    comparator: Option<MoveRankComparator>,
    comparison: Arc<ResultSlot<ComparisonResult>>,
    events: Receiver<BackgroundEvent>,
    runtime: Handle,
}

impl AnalysisSession {
    /// Create a session on `runtime`, optionally backed by an engine
    ///
    /// Starts in Setup mode on the standard starting position.
    pub fn new(settings: &AnalysisSettings, oracle: Option<Arc<dyn Oracle>>, runtime: Handle) -> Self {
        let (tx, rx) = unbounded();
        let orchestrator = EngineQueryOrchestrator::new(
            oracle.clone(),
            runtime.clone(),
            tx.clone(),
            SuggestionConfig {
                candidates: settings.suggestion_candidates,
                depth: settings.suggestion_depth,
                policy: settings.selection_policy,
            },
        );
        let comparator = oracle.clone().map(|oracle| {
            MoveRankComparator::new(
                oracle,
                runtime.clone(),
                tx,
                settings.comparison_candidates,
                settings.search_depth,
            )
        });

        match &oracle {
            Some(oracle) => info!("[SESSION] Started with engine {}", oracle.name()),
            None => info!("[SESSION] Started without an engine, manual mode only"),
        }

        Self {
            store: PositionStore::new(settings.castling_export),
            modes: ModeState::default(),
            selection: Selection::default(),
            human_side: Color::White,
            promotion: settings.promotion,
            oracle,
            orchestrator,
            comparator,
            comparison: Arc::new(ResultSlot::new()),
            events: rx,
            runtime,
        }
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn position(&self) -> &Position {
        self.store.get()
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn mode_state(&self) -> ModeState {
        self.modes
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Side the human plays in Play mode against the engine
    pub fn human_side(&self) -> Color {
        self.human_side
    }

    pub fn history(&self) -> &MoveHistory {
        self.store.history()
    }

    /// FEN of the current position using the configured castling export
    pub fn fen(&self) -> String {
        self.store.fen()
    }

    pub fn suggestion(&self) -> Option<EngineOutcome> {
        self.orchestrator.outcome()
    }

    pub fn comparison(&self) -> Option<ComparisonResult> {
        self.comparison.load()
    }

    pub fn is_engine_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    pub fn has_engine(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn status(&self) -> GameStatus {
        status(self.store.get().to_chess().as_ref())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let suggestion = self.orchestrator.outcome();
        let query_fen = self.query_fen();
        let suggestion_highlight = suggestion
            .as_ref()
            .and_then(EngineOutcome::suggestion)
            .filter(|s| s.fen == query_fen)
            .and_then(|s| s.destination);

        SessionSnapshot {
            position: self.store.get().clone(),
            fen: self.store.fen(),
            mode: self.modes.mode(),
            vs_engine: self.modes.vs_engine(),
            human_side: self.human_side,
            selection: self.selection.clone(),
            suggestion,
            suggestion_highlight,
            comparison: self.comparison.load(),
            history: self.store.history().clone(),
            status: self.status(),
            material: material_balance(self.store.get().board()),
            engine_busy: self.orchestrator.is_busy(),
            engine_name: self.oracle.as_ref().map(|o| o.name().to_string()),
            selection_policy: self.orchestrator.config().policy,
        }
    }

    // ------------------------------------------------------------------
    // Action intake
    // ------------------------------------------------------------------

    /// Switch interaction mode. The board is left as it is.
    pub fn select_mode(&mut self, mode: Mode) -> bool {
        let changed = self.modes.transition(mode, &mut self.selection);
        if changed {
            info!("[SESSION] Mode: {}", mode);
        }
        changed
    }

    pub fn toggle_vs_engine(&mut self) -> bool {
        let on = self.modes.toggle_vs_engine();
        info!("[SESSION] Versus engine: {}", if on { "on" } else { "off" });
        on
    }

    /// Attempt an action from `from` to `to` using the configured promotion piece
    pub fn try_action(&mut self, from: Square, to: Square) -> bool {
        self.try_action_with_promotion(from, to, self.promotion)
    }

    /// Attempt an action, promoting to `promotion` if a pawn reaches the last rank
    pub fn try_action_with_promotion(
        &mut self,
        from: Square,
        to: Square,
        promotion: PromotionChoice,
    ) -> bool {
        let outcome = apply_action(self.modes.mode(), &mut self.store, from, to, promotion);
        self.selection.clear();

        match outcome {
            ActionOutcome::Rejected => false,
            ActionOutcome::Placed => true,
            ActionOutcome::Moved { ply, uci } => {
                self.after_human_move(ply, uci);
                true
            }
        }
    }

    /// Ask the engine for a move in the current position
    ///
    /// Returns `None` when no query was started; the suggestion slot then
    /// already holds the "unavailable" outcome.
    pub fn request_suggestion(&mut self) -> Option<RequestHandle> {
        let fen = self.query_fen();

        if !self.orchestrator.has_oracle() {
            self.orchestrator.request_suggestion(&fen);
            return None;
        }

        let status = self.status();
        if status.has_no_moves() {
            debug!("[SESSION] No suggestion possible: {}", status);
            self.orchestrator.mark_unavailable(&fen, &status.to_string());
            return None;
        }

        Some(self.orchestrator.request_suggestion(&fen))
    }

    /// Click on a square: select a piece and highlight its destinations
    ///
    /// Returns whether something is selected afterwards.
    pub fn select(&mut self, square: Square) -> bool {
        let position = self.store.get();
        let Some(piece) = position.piece_at(square) else {
            self.selection.clear();
            return false;
        };

        match self.modes.mode() {
            Mode::Setup => self.selection.select(square, Vec::new()),
            Mode::Analysis | Mode::Play if piece.color == position.turn() => {
                let targets = position
                    .to_chess()
                    .map(|chess| legal_targets(&chess, square))
                    .unwrap_or_default();
                self.selection.select(square, targets);
            }
            _ => self.selection.clear(),
        }
        self.selection.is_selected()
    }

    /// Setup palette: put `piece` on `square`, or erase it with `None`
    ///
    /// Refused outside Setup mode and on a square holding a king.
    pub fn place_piece(&mut self, square: Square, piece: Option<Piece>) -> bool {
        if self.modes.mode() != Mode::Setup || holds_king(self.store.get(), square) {
            return false;
        }
        self.store.apply_placement(square, piece);
        self.selection.clear();
        true
    }

    /// Set the side to move; the human then plays that side against the engine
    pub fn set_side_to_move(&mut self, color: Color) {
        self.store.set_turn(color);
        self.human_side = color;
        self.selection.clear();
        debug!("[SESSION] Side to move: {:?}", color);
    }

    /// Flip one castling flag, returning its new value
    pub fn toggle_castling(&mut self, color: Color, side: CastlingSide) -> bool {
        self.store.toggle_castling(color, side)
    }

    pub fn castling(&self) -> CastlingFlags {
        self.store.get().castling()
    }

    /// Empty the board and forget history and engine results
    pub fn clear_board(&mut self) {
        self.store.reset(false);
        self.forget_results();
        info!("[SESSION] Board cleared");
    }

    /// Back to the starting position, forgetting history and engine results
    pub fn reset_to_start(&mut self) {
        self.store.reset(true);
        self.forget_results();
        info!("[SESSION] Position reset to starting position");
    }

    /// Replace the position with one parsed from `fen`
    pub fn load_fen(&mut self, fen: &str) -> GameResult<()> {
        let position = Position::from_fen(fen)?;
        self.store.load(position);
        self.forget_results();
        info!("[SESSION] Loaded {}", fen.trim());
        Ok(())
    }

    /// Take back the last move. Returns false when history is empty.
    pub fn undo_last(&mut self) -> bool {
        let Some(record) = self.store.undo_last() else {
            return false;
        };
        info!("[SESSION] Took back {}", record.uci());
        self.orchestrator.cancel();
        self.orchestrator.clear();
        self.comparison.clear();
        self.selection.clear();
        true
    }

    /// Apply background results that arrived since the last call
    pub fn update(&mut self) -> Vec<SessionEvent> {
        let pending: Vec<BackgroundEvent> = self.events.try_iter().collect();
        let mut out = Vec::new();

        for event in pending {
            match event {
                BackgroundEvent::Suggestion { seq, fen, result } => {
                    let version = self.orchestrator.slot().version();
                    let current = self.query_fen();
                    match self.orchestrator.deliver(seq, fen, result, &current) {
                        Some(suggestion) => {
                            out.push(SessionEvent::Suggested(suggestion.clone()));
                            if self.engine_to_move() {
                                self.play_engine_move(&suggestion, &mut out);
                            }
                        }
                        None if self.orchestrator.slot().version() != version => {
                            if let Some(EngineOutcome::Unavailable { reason, .. }) =
                                self.orchestrator.outcome()
                            {
                                out.push(SessionEvent::Unavailable { reason });
                            }
                        }
                        None => {}
                    }
                }
                BackgroundEvent::Comparison { epoch, result } => {
                    if self.accept_comparison(epoch, &result) {
                        out.push(SessionEvent::Compared(result));
                    }
                }
            }
        }
        out
    }

    /// Stop background work and close the engine
    ///
    /// Must not be called from inside the tokio runtime.
    pub fn shutdown(&mut self) {
        self.orchestrator.cancel();
        if let Some(oracle) = self.oracle.take() {
            if let Err(e) = self.runtime.block_on(oracle.shutdown()) {
                warn!("[SESSION] Engine shutdown failed: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// FEN sent to the engine and used as freshness token
    ///
    /// Always carries clamped castling rights so the engine never sees a
    /// right it cannot realise.
    fn query_fen(&self) -> String {
        self.store.get().fen(CastlingExport::Clamp)
    }

    fn engine_to_move(&self) -> bool {
        self.modes.engine_plays() && self.store.get().turn() != self.human_side
    }

    fn forget_results(&mut self) {
        self.orchestrator.cancel();
        self.orchestrator.clear();
        self.comparison.clear();
        self.selection.clear();
    }

    fn after_human_move(&mut self, ply: usize, uci: String) {
        if let Some(comparator) = &self.comparator {
            if let Some(record) = self.store.history().get_move(ply) {
                comparator.compare(ComparisonRequest {
                    epoch: self.store.epoch(),
                    ply,
                    fen_before: record.position_before().fen(CastlingExport::Clamp),
                    user_move: uci,
                });
            }
        }

        if self.engine_to_move() {
            debug!("[SESSION] Engine to move");
            self.request_suggestion();
        }
    }

    fn play_engine_move(&mut self, suggestion: &EngineSuggestion, out: &mut Vec<SessionEvent>) {
        let found = self
            .store
            .get()
            .to_chess()
            .and_then(|chess| find_by_uci(&chess, &suggestion.uci));
        let Some((from, m)) = found.and_then(|m| m.from().map(|from| (from, m))) else {
            warn!("[SESSION] Engine move {} is not legal here", suggestion.uci);
            out.push(SessionEvent::EngineMoveRejected {
                uci: suggestion.uci.clone(),
            });
            return;
        };

        let promotion = m
            .promotion()
            .and_then(PromotionChoice::from_role)
            .unwrap_or(self.promotion);
        let outcome = apply_action(self.modes.mode(), &mut self.store, from, destination(&m), promotion);
        self.selection.clear();

        match outcome {
            ActionOutcome::Moved { uci, .. } => {
                info!("[SESSION] Engine played {}", uci);
                out.push(SessionEvent::EngineMoved { uci });
            }
            _ => out.push(SessionEvent::EngineMoveRejected {
                uci: suggestion.uci.clone(),
            }),
        }
    }

    fn accept_comparison(&mut self, epoch: u64, result: &ComparisonResult) -> bool {
        if epoch != self.store.epoch() {
            debug!("[SESSION] Dropping comparison from an earlier game");
            return false;
        }
        let still_current = self.store.history().get_move(result.ply).is_some_and(|record| {
            record.uci() == result.user_move
                && record.position_before().fen(CastlingExport::Clamp) == result.fen_before
        });
        if !still_current {
            debug!("[SESSION] Dropping comparison for {} (move no longer in history)", result.user_move);
            return false;
        }

        self.store
            .history_mut()
            .attach_comparison(result.ply, &result.user_move, result.clone());
        self.comparison.store(result.clone());
        true
    }
}
