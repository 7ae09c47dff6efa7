//! Game state components: interaction mode and move records

use crate::game::ai::ComparisonResult;
use crate::game::error::{GameError, GameResult};
use crate::game::resources::{Position, Selection};
use serde::{Deserialize, Serialize};
use shakmaty::{Color, Square};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Interaction mode of the board
///
/// Decides which validation policy applies to a user action:
///
/// | Mode     | Validation                                 |
/// |----------|--------------------------------------------|
/// | Setup    | Free placement; only kings are protected   |
/// | Analysis | Legal moves only, both sides move manually |
/// | Play     | Legal moves only, optional engine opponent |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Free arrangement of pieces, no chess legality
    #[default]
    Setup,
    /// Legal moves for both sides, engine used for insight only
    Analysis,
    /// Legal moves, with the engine optionally replying as the opponent
    Play,
}

impl Mode {
    /// Whether actions in this mode go through the rules library
    pub fn validates_moves(self) -> bool {
        !matches!(self, Mode::Setup)
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Setup => "setup",
            Mode::Analysis => "analysis",
            Mode::Play => "play",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = GameError;

    fn from_str(s: &str) -> GameResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "setup" => Ok(Mode::Setup),
            "analysis" => Ok(Mode::Analysis),
            "play" => Ok(Mode::Play),
            _ => Err(GameError::UnknownMode {
                input: s.to_string(),
            }),
        }
    }
}

/// Mode state machine
///
/// Any mode may follow any other. The `vs_engine` flag is orthogonal to the
/// mode and only has an effect while in [`Mode::Play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeState {
    mode: Mode,
    vs_engine: bool,
}

impl ModeState {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn vs_engine(&self) -> bool {
        self.vs_engine
    }

    /// True when the engine is expected to answer moves
    pub fn engine_plays(&self) -> bool {
        self.mode == Mode::Play && self.vs_engine
    }

    /// Switch to `mode`, clearing any selection
    ///
    /// Board contents are never touched. Returns whether the mode changed.
    pub fn transition(&mut self, mode: Mode, selection: &mut Selection) -> bool {
        selection.clear();
        if self.mode == mode {
            return false;
        }
        debug!("[MODE] {} -> {}", self.mode, mode);
        self.mode = mode;
        true
    }

    /// Flip the vs-engine flag, returning the new value
    pub fn toggle_vs_engine(&mut self) -> bool {
        self.vs_engine = !self.vs_engine;
        self.vs_engine
    }
}

/// Record of one applied move
///
/// Immutable once created, apart from the engine ranking which arrives later
/// and can be attached exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    from: Square,
    to: Square,
    uci: String,
    mover: Color,
    fen_before: String,
    before: Position,
    comparison: Option<ComparisonResult>,
}

impl MoveRecord {
    pub(crate) fn new(
        from: Square,
        to: Square,
        uci: String,
        fen_before: String,
        before: Position,
    ) -> Self {
        Self {
            from,
            to,
            uci,
            mover: before.turn(),
            fen_before,
            before,
            comparison: None,
        }
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    /// UCI identifier, e.g. `e2e4` or `e7e8q`
    pub fn uci(&self) -> &str {
        &self.uci
    }

    /// Side that made the move
    pub fn mover(&self) -> Color {
        self.mover
    }

    /// FEN of the position before the move
    pub fn fen_before(&self) -> &str {
        &self.fen_before
    }

    /// Position before the move, used to undo it
    pub fn position_before(&self) -> &Position {
        &self.before
    }

    /// Engine ranking of this move, once the comparison has arrived
    pub fn comparison(&self) -> Option<&ComparisonResult> {
        self.comparison.as_ref()
    }

    /// Attach the engine ranking. Returns false if one is already attached.
    pub(crate) fn attach_comparison(&mut self, comparison: ComparisonResult) -> bool {
        if self.comparison.is_some() {
            return false;
        }
        self.comparison = Some(comparison);
        true
    }
}
