//! Chess game components module
//!
//! Components are pure data structures with little logic:
//! the interaction [`Mode`], castling flags and move records.

pub mod castling;
pub mod game_state;


// Re-export all components for convenience
pub use castling::*;
pub use game_state::*;
