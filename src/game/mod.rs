//! Chess game logic module - position state and engine analysis
//!
//! Tracks a board across three interaction modes, validates actions per mode
//! and coordinates non-blocking engine queries. Move generation and legality
//! come from `shakmaty`; search and evaluation come from an external engine.
//!
//! # Module Organization
//!
//! - `components` - Plain data (Mode, ModeState, MoveRecord, CastlingFlags)
//! - `resources` - State owned by the interaction thread (PositionStore, MoveHistory, Selection)
//! - `rules` - Rules-library adapters (legal move lookup, status, material)
//! - `systems` - The action intake (`apply_action`)
//! - `ai` - Oracle trait, UCI adapter, suggestion orchestrator, move ranking
//! - `events` - Background-to-interaction-thread messages
//! - `session` - `AnalysisSession`, the facade a front end talks to
//!
//! # Threading
//!
//! **Interaction thread**: owns `PositionStore`, `ModeState` and `Selection`;
//! no locks.
//!
//! **Tokio runtime**: runs engine queries; reports through a channel and
//! whole-value result slots, never by touching the store.

pub mod ai;
pub mod components;
pub mod error;
pub mod events;
pub mod resources;
pub mod rules;
pub mod session;
pub mod systems;

// Re-export the session (main entry point)
pub use error::{GameError, GameResult};
pub use session::{AnalysisSession, SessionEvent, SessionSnapshot};
