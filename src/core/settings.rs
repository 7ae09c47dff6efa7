//! Analysis settings and their persistence
//!
//! Saves and loads [`AnalysisSettings`] to/from a JSON file in the user's
//! configuration directory.
//!
//! # File Location
//!
//! Settings are stored as `settings.json` under the platform config directory
//! (e.g. `~/.config/chesspredictor/settings.json` on Linux). When no config
//! directory can be resolved the file lives in the working directory.
//!
//! # Error Handling
//!
//! - Load failures fall back to default settings with a warning
//! - Save failures are returned to the caller, who decides whether to care
//!
//! # Environment
//!
//! `CHESS_PREDICTOR_ENGINE` overrides [`AnalysisSettings::engine_path`].

use crate::core::error::{CoreError, CoreResult};
use crate::game::ai::SelectionPolicy;
use crate::game::rules::{CastlingExport, PromotionChoice};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Environment variable overriding the engine path
pub const ENGINE_ENV_VAR: &str = "CHESS_PREDICTOR_ENGINE";

/// User-tunable settings for the analysis session and its oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Path to a UCI engine executable. `None` runs the session manual-only.
    pub engine_path: Option<PathBuf>,

    /// Depth used when ranking a user's move
    pub search_depth: u32,

    /// Depth used for suggestions and engine replies (kept shallower for latency)
    pub suggestion_depth: u32,

    /// UCI `Skill Level` option (0-20), if the engine supports it
    pub skill_level: Option<u8>,

    /// Number of ranked candidates requested for a suggestion
    pub suggestion_candidates: usize,

    /// Number of ranked candidates requested when ranking a user's move
    pub comparison_candidates: usize,

    /// How a suggestion is chosen from the ranked candidates
    pub selection_policy: SelectionPolicy,

    /// Piece chosen when a drag-and-drop move promotes a pawn
    pub promotion: PromotionChoice,

    /// How castling flags are written when exporting FEN
    pub castling_export: CastlingExport,

    /// Per-query oracle timeout in milliseconds
    pub engine_timeout_ms: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            engine_path: None,
            search_depth: 10,
            suggestion_depth: 8,
            skill_level: Some(15),
            suggestion_candidates: 12,
            comparison_candidates: 5,
            selection_policy: SelectionPolicy::Best,
            promotion: PromotionChoice::Queen,
            castling_export: CastlingExport::Verbatim,
            engine_timeout_ms: 30_000,
        }
    }
}

impl AnalysisSettings {
    /// Per-query oracle timeout as a [`Duration`]
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_timeout_ms)
    }

    /// Apply the `CHESS_PREDICTOR_ENGINE` override, if set and non-empty
    pub fn apply_env(mut self) -> Self {
        if let Ok(path) = std::env::var(ENGINE_ENV_VAR) {
            if !path.trim().is_empty() {
                info!("[SETTINGS] Engine path overridden by {}", ENGINE_ENV_VAR);
                self.engine_path = Some(PathBuf::from(path));
            }
        }
        self
    }
}

/// Resolve the settings file path
///
/// Returns `settings.json` in the user's configuration directory, or a local
/// `settings.json` if the system config dir cannot be found.
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "ChessPredictor") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Load settings from `path` (or the default location)
///
/// Missing or unreadable files yield [`AnalysisSettings::default`].
pub fn load_settings(path: Option<&Path>) -> AnalysisSettings {
    let settings_path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);

    if !settings_path.exists() {
        info!(
            "[SETTINGS] No settings file found at {:?}. Using defaults.",
            settings_path
        );
        return AnalysisSettings::default();
    }

    match read_settings(&settings_path) {
        Ok(settings) => {
            info!("[SETTINGS] Loaded settings from {:?}", settings_path);
            settings
        }
        Err(e) => {
            warn!("[SETTINGS] {}. Using defaults.", e);
            AnalysisSettings::default()
        }
    }
}

fn read_settings(path: &Path) -> CoreResult<AnalysisSettings> {
    let contents = fs::read_to_string(path).map_err(|source| CoreError::SettingsIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save settings to `path` (or the default location), creating parent directories
pub fn save_settings(settings: &AnalysisSettings, path: Option<&Path>) -> CoreResult<PathBuf> {
    let settings_path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);

    if let Some(parent) = settings_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| CoreError::SettingsIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&settings_path, json).map_err(|source| CoreError::SettingsIo {
        path: settings_path.clone(),
        source,
    })?;
    info!("[SETTINGS] Saved settings to {:?}", settings_path);
    Ok(settings_path)
}
