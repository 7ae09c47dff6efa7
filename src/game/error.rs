//! Error types for game module
//!
//! Covers input that cannot be turned into board terms: unparsable squares,
//! piece symbols, modes, commands and FEN strings. Illegal actions are *not* errors;
//! they are reported as a `false` return from the action intake.

/// Errors that can occur while interpreting game input
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Square name is not in `a1`..`h8`
    #[error("Invalid square: {input}")]
    InvalidSquare { input: String },

    /// Piece symbol is not one of `PNBRQKpnbrqk`
    #[error("Invalid piece symbol: {input}")]
    InvalidPiece { input: String },

    /// Mode label is not setup, analysis or play
    #[error("Unknown mode: {input}")]
    UnknownMode { input: String },

    /// Front-end command not understood
    #[error("Unknown command '{input}' (try 'help')")]
    UnknownCommand { input: String },

    /// FEN could not be parsed
    #[error("Invalid FEN '{fen}': {message}")]
    InvalidFen { fen: String, message: String },
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
