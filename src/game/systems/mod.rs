//! Chess game systems module - action intake
//!
//! # System Organization
//!
//! - [`movement`] - Validates a (from, to) action against the active mode and
//!   applies it to the position store
//!
//! Engine moves go through the same function as human moves, so a suggestion
//! that no longer fits the board is rejected like any illegal click.

pub mod movement;

pub use movement::{apply_action, holds_king, ActionOutcome};
