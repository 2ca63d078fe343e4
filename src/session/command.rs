use std::path::PathBuf;

use crate::chess::core::{Move, Square};

/// One line of console input.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    Select(Square),
    SubmitMove(Square),
    MakeMove(Move),
    Cancel,
    Save(PathBuf),
    Load(PathBuf),
    Opponent,
    Hints,
    Show,
    NewGame,
    Help,
    Quit,
    Unknown(String),
}

/// Handles both `move <to>` (finishes the move of the selected piece) and
/// `move <from> <to>` or `move <from><to>` (moves in one go).
fn parse_move(parts: &[&str]) -> Option<Command> {
    match parts {
        [_, to] if to.len() == 2 => Square::try_from(*to).ok().map(Command::SubmitMove),
        [_, played] => Move::try_from(*played).ok().map(Command::MakeMove),
        [_, from, to] => Some(Command::MakeMove(Move::new(
            Square::try_from(*from).ok()?,
            Square::try_from(*to).ok()?,
        ))),
        _ => None,
    }
}

/// Joins everything after the command name so that paths with spaces survive.
fn parse_path(parts: &[&str]) -> Option<PathBuf> {
    (parts.len() > 1).then(|| PathBuf::from(parts[1..].join(" ")))
}

impl Command {
    /// Parses a single line. Malformed arguments (e.g. `select z9`) turn the
    /// whole line into [`Command::Unknown`].
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        let Some(&name) = parts.first() else {
            return Self::Unknown(input.to_string());
        };

        let command = match (name, parts.len()) {
            ("select" | "s", 2) => Square::try_from(parts[1]).ok().map(Self::Select),
            ("move" | "m", _) => parse_move(&parts),
            ("cancel" | "c", 1) => Some(Self::Cancel),
            ("save", _) => parse_path(&parts).map(Self::Save),
            ("load", _) => parse_path(&parts).map(Self::Load),
            ("ai", 1) => Some(Self::Opponent),
            ("hints", 1) => Some(Self::Hints),
            ("board" | "d", 1) => Some(Self::Show),
            ("new", 1) => Some(Self::NewGame),
            ("help", 1) => Some(Self::Help),
            ("quit" | "exit", 1) => Some(Self::Quit),
            _ => None,
        };
        command.unwrap_or_else(|| Self::Unknown(input.trim().to_string()))
    }
}
