//! Chess game resources - state owned by the interaction thread
//!
//! # Resources
//!
//! - [`PositionStore`] - Current [`Position`] plus the [`MoveHistory`]
//! - [`MoveHistory`] - Move records for undo and move ranking
//! - [`Selection`] - Currently selected square and highlighted targets
//!
//! None of these are shared across threads. Background engine work publishes
//! into its own result slots (see [`crate::game::ai`]) and the session applies
//! accepted results through these types.

pub mod history;
pub mod position;
pub mod selection;


// Re-export all resources for convenience
pub use history::*;
pub use position::*;
pub use selection::*;
