//! Saving and restoring games.
//!
//! Every save format is an encoding of [`SavedGame`]: 64 cells in rank-major
//! order (a1, b1, ..., h1, a2, ..., h8), each either empty or holding a piece,
//! followed by the player to move. The selection of a move in progress is not
//! saved, a restored game always waits for a new selection.
//!
//! Two encodings are supported:
//!
//! - [`SaveFormat::Text`]: whitespace-separated decimal tags. An occupied cell
//!   is written as `kind owner`, an empty one as a single `-1`. Each rank goes
//!   on its own line and the player to move ends the file.
//! - [`SaveFormat::Binary`]: fixed-size records of little-endian `u32` tags.
//!   Each cell is a `(kind, owner)` pair with kind `0` standing for an empty
//!   cell, followed by the player to move.
//!
//! | Tag   | Kind   | Owner  |
//! | ----- | ------ | ------ |
//! | 0     | empty  | first  |
//! | 1     | Queen  | second |
//! | 2     | Knight |        |
//! | 3     | Rook   |        |
//! | 4     | Bishop |        |

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::bail;
use byteorder::{ByteOrder, LittleEndian};
use itertools::Itertools;
use log::{debug, info};
use serde::Deserialize;
use strum::IntoEnumIterator;

use crate::chess::board::Board;
use crate::chess::core::{Piece, PieceKind, Player, Square, BOARD_SIZE, BOARD_WIDTH};
use crate::chess::game::GameState;
use crate::error::GameError;

const CELLS: usize = BOARD_SIZE as usize;
const TAG_SIZE: usize = 4;
const RECORD_SIZE: usize = 2 * TAG_SIZE;
/// 64 `(kind, owner)` records followed by the player to move.
pub const BINARY_SAVE_SIZE: usize = CELLS * RECORD_SIZE + TAG_SIZE;

const EMPTY_KIND_TAG: u32 = 0;
const EMPTY_TEXT_SENTINEL: i64 = -1;

/// Concrete encoding of a save file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    /// Human-readable whitespace-separated tags.
    Text,
    /// Fixed-size little-endian records.
    Binary,
}

impl SaveFormat {
    /// Picks the encoding based on the file extension: `.txt` files are
    /// [`SaveFormat::Text`], anything else is [`SaveFormat::Binary`].
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("txt") => Self::Text,
            _ => Self::Binary,
        }
    }
}

impl FromStr for SaveFormat {
    type Err = anyhow::Error;

    fn from_str(format: &str) -> anyhow::Result<Self> {
        match format {
            "text" => Ok(Self::Text),
            "binary" => Ok(Self::Binary),
            _ => bail!("save format should be 'text' or 'binary', got '{format}'"),
        }
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Binary => "binary",
        })
    }
}

/// Format-independent contents of a save file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavedGame {
    /// Contents of every square in rank-major order.
    pub cells: [Option<Piece>; CELLS],
    #[allow(missing_docs)]
    pub current_player: Player,
}

impl SavedGame {
    /// Serializes the game in the requested format.
    #[must_use]
    pub fn encode(&self, format: SaveFormat) -> Vec<u8> {
        match format {
            SaveFormat::Text => self.encode_text().into_bytes(),
            SaveFormat::Binary => self.encode_binary().to_vec(),
        }
    }

    /// Parses a save file in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CorruptSaveData`] if the input has the wrong
    /// number of cells, out-of-range tags or anything after the player tag.
    pub fn decode(input: &[u8], format: SaveFormat) -> Result<Self, GameError> {
        match format {
            SaveFormat::Text => {
                let text = std::str::from_utf8(input)
                    .map_err(|e| corrupt(format!("text save is not valid UTF-8: {e}")))?;
                Self::decode_text(text)
            },
            SaveFormat::Binary => Self::decode_binary(input),
        }
    }

    fn encode_text(&self) -> String {
        let mut text = String::new();
        for rank in self.cells.chunks(BOARD_WIDTH as usize) {
            let line = rank
                .iter()
                .map(|cell| match cell {
                    Some(piece) => format!("{} {}", kind_tag(piece.kind), owner_tag(piece.owner)),
                    None => EMPTY_TEXT_SENTINEL.to_string(),
                })
                .join(" ");
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(&owner_tag(self.current_player).to_string());
        text.push('\n');
        text
    }

    fn decode_text(input: &str) -> Result<Self, GameError> {
        // Only the canonical spelling of a tag is accepted: no signs, no
        // leading zeros.
        let mut tokens = input.split_whitespace().map(|token| {
            token
                .parse::<i64>()
                .ok()
                .filter(|tag| tag.to_string() == token)
                .ok_or_else(|| corrupt(format!("expected a tag, got '{token}'")))
        });
        let mut next_tag = |what: &str, index: usize| {
            tokens
                .next()
                .unwrap_or_else(|| Err(corrupt(format!("missing {what} of cell {index}"))))
        };
        let mut cells = [None; CELLS];
        for (index, cell) in cells.iter_mut().enumerate() {
            let kind = next_tag("kind", index)?;
            if kind == EMPTY_TEXT_SENTINEL {
                continue;
            }
            let kind = u32::try_from(kind)
                .ok()
                .and_then(kind_from_tag)
                .ok_or_else(|| corrupt(format!("unknown piece kind tag {kind} in cell {index}")))?;
            let owner = next_tag("owner", index)?;
            let owner = u32::try_from(owner)
                .ok()
                .and_then(owner_from_tag)
                .ok_or_else(|| corrupt(format!("unknown owner tag {owner} in cell {index}")))?;
            *cell = Some(Piece::new(owner, kind));
        }
        let player = next_tag("current player", CELLS)?;
        let current_player = u32::try_from(player)
            .ok()
            .and_then(owner_from_tag)
            .ok_or_else(|| corrupt(format!("unknown current player tag {player}")))?;
        if let Some(extra) = tokens.next() {
            return Err(corrupt(format!(
                "unexpected data after the current player: {}",
                extra.map_or_else(|e| e.to_string(), |tag| tag.to_string())
            )));
        }
        Ok(Self {
            cells,
            current_player,
        })
    }

    fn encode_binary(&self) -> [u8; BINARY_SAVE_SIZE] {
        let mut bytes = [0; BINARY_SAVE_SIZE];
        for (record, cell) in bytes.chunks_exact_mut(RECORD_SIZE).zip(&self.cells) {
            let (kind, owner) = match cell {
                Some(piece) => (kind_tag(piece.kind), owner_tag(piece.owner)),
                None => (EMPTY_KIND_TAG, owner_tag(Player::First)),
            };
            LittleEndian::write_u32(&mut record[..TAG_SIZE], kind);
            LittleEndian::write_u32(&mut record[TAG_SIZE..], owner);
        }
        LittleEndian::write_u32(
            &mut bytes[CELLS * RECORD_SIZE..],
            owner_tag(self.current_player),
        );
        bytes
    }

    fn decode_binary(input: &[u8]) -> Result<Self, GameError> {
        if input.len() != BINARY_SAVE_SIZE {
            return Err(corrupt(format!(
                "binary save should be {BINARY_SAVE_SIZE} bytes, got {}",
                input.len()
            )));
        }
        let (records, player) = input.split_at(CELLS * RECORD_SIZE);
        let mut cells = [None; CELLS];
        for (index, (cell, record)) in cells
            .iter_mut()
            .zip(records.chunks_exact(RECORD_SIZE))
            .enumerate()
        {
            let kind = LittleEndian::read_u32(&record[..TAG_SIZE]);
            if kind == EMPTY_KIND_TAG {
                continue;
            }
            let kind = kind_from_tag(kind)
                .ok_or_else(|| corrupt(format!("unknown piece kind tag {kind} in cell {index}")))?;
            let owner = LittleEndian::read_u32(&record[TAG_SIZE..]);
            let owner = owner_from_tag(owner)
                .ok_or_else(|| corrupt(format!("unknown owner tag {owner} in cell {index}")))?;
            *cell = Some(Piece::new(owner, kind));
        }
        let player = LittleEndian::read_u32(player);
        let current_player = owner_from_tag(player)
            .ok_or_else(|| corrupt(format!("unknown current player tag {player}")))?;
        Ok(Self {
            cells,
            current_player,
        })
    }
}

impl From<&GameState> for SavedGame {
    fn from(game: &GameState) -> Self {
        let mut cells = [None; CELLS];
        for (cell, square) in cells.iter_mut().zip(Square::iter()) {
            *cell = game.board().at(square);
        }
        Self {
            cells,
            current_player: game.current_player(),
        }
    }
}

impl From<SavedGame> for GameState {
    fn from(saved: SavedGame) -> Self {
        let mut board = Board::empty();
        for (square, cell) in Square::iter().zip(saved.cells) {
            let _ = board.place(square, cell);
        }
        Self::from_parts(board, saved.current_player)
    }
}

/// Writes the game to `path`. The file is created (or truncated), written in
/// one go and closed before returning.
///
/// # Errors
///
/// Returns [`GameError::MediumUnavailable`] if the file can not be written.
pub fn save(game: &GameState, path: &Path, format: SaveFormat) -> Result<(), GameError> {
    let bytes = SavedGame::from(game).encode(format);
    fs::write(path, &bytes).map_err(|source| GameError::MediumUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved game to {} ({format}, {} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Reads a game from `path`. Nothing is returned unless the whole file is
/// valid, so a failed load can not leave a half-restored game behind.
///
/// # Errors
///
/// Returns [`GameError::MediumUnavailable`] if the file can not be read and
/// [`GameError::CorruptSaveData`] if its contents are invalid.
pub fn load(path: &Path, format: SaveFormat) -> Result<GameState, GameError> {
    let bytes = fs::read(path).map_err(|source| GameError::MediumUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    let saved = SavedGame::decode(&bytes, format)?;
    info!("Loaded game from {} ({format})", path.display());
    Ok(GameState::from(saved))
}

fn corrupt(reason: String) -> GameError {
    GameError::CorruptSaveData(reason)
}

const fn kind_tag(kind: PieceKind) -> u32 {
    match kind {
        PieceKind::Queen => 1,
        PieceKind::Knight => 2,
        PieceKind::Rook => 3,
        PieceKind::Bishop => 4,
    }
}

const fn kind_from_tag(tag: u32) -> Option<PieceKind> {
    match tag {
        1 => Some(PieceKind::Queen),
        2 => Some(PieceKind::Knight),
        3 => Some(PieceKind::Rook),
        4 => Some(PieceKind::Bishop),
        _ => None,
    }
}

const fn owner_tag(owner: Player) -> u32 {
    match owner {
        Player::First => 0,
        Player::Second => 1,
    }
}

const fn owner_from_tag(tag: u32) -> Option<Player> {
    match tag {
        0 => Some(Player::First),
        1 => Some(Player::Second),
        _ => None,
    }
}
