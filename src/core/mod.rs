//! Core module - Application infrastructure
//!
//! Provides the pieces every front end needs before a session can start:
//!
//! - [`error`] - `CoreError` and the `CoreResult` alias
//! - [`settings`] - [`AnalysisSettings`] and JSON persistence in the user config dir
//! - [`logging`] - tracing subscriber bootstrap

pub mod error;
pub mod logging;
pub mod settings;

// Re-export commonly used items
pub use error::{CoreError, CoreResult};
pub use logging::init_tracing;
pub use settings::{load_settings, save_settings, settings_path, AnalysisSettings};
