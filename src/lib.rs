//! Interactive chess position manager with asynchronous engine analysis
//!
//! Stage positions freely, analyse or play them under full chess rules, and
//! get suggestions and move rankings from an external UCI engine without
//! ever blocking the interaction thread.
//!
//! - [`core`] - settings, logging, infrastructure errors
//! - [`game`] - position state, rules adapters, engine orchestration, session
//! - [`cli`] - line-oriented text front end

pub mod cli;
pub mod core;
pub mod game;

pub use game::{AnalysisSession, SessionEvent, SessionSnapshot};
