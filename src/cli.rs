//! Text front end: command parsing and board rendering
//!
//! A thin presentation layer over [`AnalysisSession`]. Each input line is one
//! [`Command`]; the board is drawn as an 8x8 grid of FEN piece letters.
//!
//! ```text
//!   8 r n b q k b n r
//!   7 p p p p p p p p
//!   6 . . . . . . . .
//!   ...
//!     a b c d e f g h
//! ```
//!
//! Selected square is shown in brackets, highlighted targets with `*` and the
//! engine's suggested destination with `+`.

use crate::game::ai::{ComparisonResult, EngineOutcome};
use crate::game::components::Mode;
use crate::game::error::{GameError, GameResult};
use crate::game::rules::{color_name, parse_piece, parse_square, PromotionChoice};
use crate::game::{AnalysisSession, SessionEvent, SessionSnapshot};
use shakmaty::{CastlingSide, Color, File, Piece, Rank, Square};
use std::fmt::Write as _;

pub const HELP: &str = "\
Commands:
  mode <setup|analysis|play>   switch interaction mode
  move <from><to>[q|r|b|n]     move or relocate a piece (also: move e2 e4)
  place <square> <piece|->     setup palette: drop a piece (KQRBNP / kqrbnp) or erase
  select <square>              select a piece and show its legal targets
  suggest                      ask the engine for a move
  vs                           toggle playing against the engine
  turn <white|black>           set side to move (and the side you play)
  castle <K|Q|k|q>             toggle a castling right
  undo                         take back the last move
  clear                        empty board
  reset                        starting position
  fen [<fen>]                  print the FEN, or load one
  show                         print the board and engine results
  help                         this text
  quit                         exit";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(Mode),
    Move {
        from: Square,
        to: Square,
        promotion: Option<PromotionChoice>,
    },
    Place {
        square: Square,
        piece: Option<Piece>,
    },
    Select(Square),
    Suggest,
    ToggleVsEngine,
    Turn(Color),
    Castle { color: Color, side: CastlingSide },
    Undo,
    Clear,
    Reset,
    Fen(Option<String>),
    Show,
    Help,
    Quit,
    /// Blank line
    Nothing,
}

impl Command {
    pub fn parse(line: &str) -> GameResult<Self> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Nothing);
        };
        let args: Vec<&str> = words.collect();
        let unknown = || GameError::UnknownCommand {
            input: line.to_string(),
        };

        let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("mode", [mode]) => Command::Mode(mode.parse()?),
            ("move" | "m", [uci]) => parse_uci_move(uci)?,
            ("move" | "m", [from, to]) => Command::Move {
                from: parse_square(from)?,
                to: parse_square(to)?,
                promotion: None,
            },
            ("place", [square, piece]) => Command::Place {
                square: parse_square(square)?,
                piece: match *piece {
                    "-" | "none" => None,
                    symbol => Some(parse_piece(symbol)?),
                },
            },
            ("select", [square]) => Command::Select(parse_square(square)?),
            ("suggest" | "hint", []) => Command::Suggest,
            ("vs", []) => Command::ToggleVsEngine,
            ("turn", [color]) => match color.to_ascii_lowercase().as_str() {
                "white" | "w" => Command::Turn(Color::White),
                "black" | "b" => Command::Turn(Color::Black),
                _ => return Err(unknown()),
            },
            ("castle", [flag]) => match *flag {
                "K" => Command::Castle { color: Color::White, side: CastlingSide::KingSide },
                "Q" => Command::Castle { color: Color::White, side: CastlingSide::QueenSide },
                "k" => Command::Castle { color: Color::Black, side: CastlingSide::KingSide },
                "q" => Command::Castle { color: Color::Black, side: CastlingSide::QueenSide },
                _ => return Err(unknown()),
            },
            ("undo", []) => Command::Undo,
            ("clear", []) => Command::Clear,
            ("reset", []) => Command::Reset,
            ("fen", []) => Command::Fen(None),
            ("fen", fen) => Command::Fen(Some(fen.join(" "))),
            ("show" | "board", []) => Command::Show,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(unknown()),
        };
        Ok(command)
    }
}

fn parse_uci_move(uci: &str) -> GameResult<Command> {
    let invalid = || GameError::InvalidSquare {
        input: uci.to_string(),
    };
    let from = parse_square(uci.get(0..2).ok_or_else(invalid)?)?;
    let to = parse_square(uci.get(2..4).ok_or_else(invalid)?)?;
    let promotion = match uci.get(4..) {
        None | Some("") => None,
        Some(rest) => {
            let mut chars = rest.chars();
            match (chars.next().and_then(PromotionChoice::from_char), chars.next()) {
                (Some(choice), None) => Some(choice),
                _ => return Err(invalid()),
            }
        }
    };
    Ok(Command::Move {
        from,
        to,
        promotion,
    })
}

/// Run one command against the session, returning text to print
///
/// `None` means the front end should exit.
pub fn execute(session: &mut AnalysisSession, command: Command) -> Option<String> {
    let text = match command {
        Command::Nothing => String::new(),
        Command::Mode(mode) => {
            session.select_mode(mode);
            format!("Mode: {}", mode)
        }
        Command::Move {
            from,
            to,
            promotion,
        } => {
            let accepted = match promotion {
                Some(choice) => session.try_action_with_promotion(from, to, choice),
                None => session.try_action(from, to),
            };
            if !accepted {
                format!("Rejected: {}{}", from, to)
            } else if session.status().is_game_over() && session.mode() != Mode::Setup {
                format!("{}\nGame over: {}", render_board(&session.snapshot()), session.status())
            } else {
                render_board(&session.snapshot())
            }
        }
        Command::Place { square, piece } => {
            if session.place_piece(square, piece) {
                render_board(&session.snapshot())
            } else {
                format!("Cannot place on {} (setup mode only, kings are protected)", square)
            }
        }
        Command::Select(square) => {
            if session.select(square) {
                render_board(&session.snapshot())
            } else {
                format!("Nothing selectable on {}", square)
            }
        }
        Command::Suggest => match session.request_suggestion() {
            Some(_) => "Engine thinking...".to_string(),
            None => session
                .suggestion()
                .map(|outcome| describe_outcome(&outcome))
                .unwrap_or_default(),
        },
        Command::ToggleVsEngine => {
            let on = session.toggle_vs_engine();
            format!("Versus engine: {}", if on { "on" } else { "off" })
        }
        Command::Turn(color) => {
            session.set_side_to_move(color);
            format!("{} to move", capitalise(color_name(color)))
        }
        Command::Castle { color, side } => {
            let on = session.toggle_castling(color, side);
            format!(
                "{} {:?} castling: {}",
                capitalise(color_name(color)),
                side,
                if on { "on" } else { "off" }
            )
        }
        Command::Undo => {
            if session.undo_last() {
                render_board(&session.snapshot())
            } else {
                "Nothing to undo".to_string()
            }
        }
        Command::Clear => {
            session.clear_board();
            render_board(&session.snapshot())
        }
        Command::Reset => {
            session.reset_to_start();
            render_board(&session.snapshot())
        }
        Command::Fen(None) => session.fen(),
        Command::Fen(Some(fen)) => match session.load_fen(&fen) {
            Ok(()) => render_board(&session.snapshot()),
            Err(e) => e.to_string(),
        },
        Command::Show => render_session(&session.snapshot()),
        Command::Help => HELP.to_string(),
        Command::Quit => return None,
    };
    Some(text)
}

/// Text for a background event
pub fn describe_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Suggested(s) => format!("Engine suggests {} ({}, rank {})", s.uci, s.score, s.rank),
        SessionEvent::Unavailable { reason } => format!("No suggestion available: {}", reason),
        SessionEvent::EngineMoved { uci } => format!("Engine plays {}", uci),
        SessionEvent::EngineMoveRejected { uci } => format!("Engine move {} no longer fits the board", uci),
        SessionEvent::Compared(result) => describe_comparison(result),
    }
}

pub fn describe_outcome(outcome: &EngineOutcome) -> String {
    match outcome {
        EngineOutcome::Suggested(s) => format!("Engine suggests {} ({}, rank {})", s.uci, s.score, s.rank),
        EngineOutcome::Unavailable { reason, .. } => format!("No suggestion available: {}", reason),
    }
}

pub fn describe_comparison(result: &ComparisonResult) -> String {
    let mut out = result.summary();
    for (i, candidate) in result.candidates.iter().take(3).enumerate() {
        let marker = if result.rank == Some(i + 1) { " <" } else { "" };
        let _ = write!(out, "\n  {}. {} ({}){}", i + 1, candidate.uci, candidate.score, marker);
    }
    out
}

/// Board grid, White at the bottom
pub fn render_board(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    for rank in (0..8u32).rev() {
        let _ = write!(out, "{} ", rank + 1);
        for file in 0..8u32 {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            let glyph = snapshot
                .position
                .piece_at(square)
                .map(|p| p.char())
                .unwrap_or('.');
            let cell = if snapshot.selection.square == Some(square) {
                format!("[{}]", glyph)
            } else if snapshot.selection.is_target(square) {
                format!(" {}*", glyph)
            } else if snapshot.suggestion_highlight == Some(square) {
                format!(" {}+", glyph)
            } else {
                format!(" {} ", glyph)
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    out.push_str("   a  b  c  d  e  f  g  h\n");
    let _ = write!(
        out,
        "{} to move | {} | {}",
        capitalise(color_name(snapshot.position.turn())),
        snapshot.mode,
        snapshot.status
    );
    out
}

/// Board plus engine state and history
pub fn render_session(snapshot: &SessionSnapshot) -> String {
    let mut out = render_board(snapshot);
    let _ = write!(out, "\nFEN: {}", snapshot.fen);
    let _ = write!(
        out,
        "\nMaterial: {:+.2} | vs engine: {} | engine: {}{}",
        snapshot.material as f64 / 100.0,
        if snapshot.vs_engine { "on" } else { "off" },
        snapshot.engine_name.as_deref().unwrap_or("none"),
        if snapshot.engine_busy { " (thinking)" } else { "" }
    );
    let _ = write!(out, "\nSuggestions pick: {}", snapshot.selection_policy.description());
    if let Some(outcome) = &snapshot.suggestion {
        let _ = write!(out, "\n{}", describe_outcome(outcome));
    }
    if let Some(comparison) = &snapshot.comparison {
        let _ = write!(out, "\n{}", describe_comparison(comparison));
    }
    if !snapshot.history.is_empty() {
        let _ = write!(out, "\nMoves: {}", snapshot.history.uci_moves().join(" "));
    }
    out
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
