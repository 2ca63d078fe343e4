//! Game primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};
use std::mem;
use std::str::FromStr;

use anyhow::bail;
use itertools::Itertools;
use serde::Deserialize;

use crate::error::GameError;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Relocation of a single piece from one square to another. A move is the
/// only way to mutate [`crate::chess::board::Board`] once the game has
/// started; whether it is legal is decided by [`crate::chess::game::GameState`].
///
/// The text representation is the origin followed by the destination:
///
/// ```
/// use tetrachess::chess::core::{Move, Square};
///
/// let rook_lift = Move::new(Square::A1, Square::A4);
/// assert_eq!(rook_lift.to_string(), "a1a4");
/// assert_eq!(Move::try_from("a1a4").unwrap(), rook_lift);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
}

impl Move {
    #[must_use]
    #[allow(missing_docs)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl TryFrom<&str> for Move {
    type Error = anyhow::Error;

    fn try_from(input: &str) -> anyhow::Result<Self> {
        if !input.is_ascii() || input.len() != 4 {
            bail!("move should be two squares (e.g. a1a4), got '{input}'");
        }
        let (from, to) = input.split_at(2);
        Ok(Self::new(from.try_into()?, to.try_into()?))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Board squares: from left to right, from bottom to the top:
///
/// ```
/// use tetrachess::chess::core::Square;
///
/// assert_eq!(Square::A1 as u8, 0);
/// assert_eq!(Square::D1 as u8, 3);
/// assert_eq!(Square::H1 as u8, 7);
/// assert_eq!(Square::A4 as u8, 8 * 3);
/// assert_eq!(Square::H8 as u8, 63);
/// ```
///
/// The discriminant doubles as the row-major (rank-major) index used by the
/// board storage and the save formats. A [`Square`] can only be constructed
/// for coordinates within the board, so holding one is proof that it is safe
/// to index with.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub const fn new(file: File, rank: Rank) -> Self {
        unsafe { mem::transmute(file as u8 + (rank as u8) * BOARD_WIDTH) }
    }

    /// Validates raw `(file, rank)` coordinates, e.g. the ones decoded from a
    /// pointer click, before they are allowed anywhere near the board.
    ///
    /// ```
    /// use tetrachess::chess::core::Square;
    ///
    /// assert_eq!(Square::from_coords(0, 5).unwrap(), Square::A6);
    /// assert!(Square::from_coords(8, 0).is_err());
    /// assert!(Square::from_coords(-1, 3).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] if either coordinate is outside
    /// `0..BOARD_WIDTH`.
    pub fn from_coords(file: i32, rank: i32) -> Result<Self, GameError> {
        let out_of_bounds = || GameError::OutOfBounds { file, rank };
        let column = u8::try_from(file)
            .ok()
            .and_then(|column| File::try_from(column).ok())
            .ok_or_else(out_of_bounds)?;
        let row = u8::try_from(rank)
            .ok()
            .and_then(|row| Rank::try_from(row).ok())
            .ok_or_else(out_of_bounds)?;
        Ok(Self::new(column, row))
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub const fn file(self) -> File {
        unsafe { mem::transmute(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub const fn rank(self) -> Rank {
        unsafe { mem::transmute(self as u8 / BOARD_WIDTH) }
    }

    /// Zero-based `(file, rank)` pair, the inverse of
    /// [`Square::from_coords`].
    #[must_use]
    pub const fn coords(self) -> (u8, u8) {
        (self.file() as u8, self.rank() as u8)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let (file, rank) = match square.chars().collect_tuple() {
            Some((file, rank)) => (file, rank),
            None => bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            ),
        };
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Represents a column (vertical row) of the board. In text it is written
/// as a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter)]
#[allow(missing_docs)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(unsafe { mem::transmute(file as u8 - b'a') }),
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..=7 => Ok(unsafe { mem::transmute(column) }),
            _ => bail!("file should be within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

/// Represents a horizontal row of the board. In text it is written as a
/// number. The implementation assumes zero-based values (i.e. rank 1 would be
/// 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter)]
#[allow(missing_docs)]
pub enum Rank {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
}

impl Rank {
    /// The rank each player's pieces start on.
    pub(super) const fn home(player: Player) -> Self {
        match player {
            Player::First => Self::One,
            Player::Second => Self::Eight,
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute(rank as u8 - b'1') }),
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(unsafe { mem::transmute(row) }),
            _ => bail!("rank should be within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// The game is played between two players; [`Player::First`] has the
/// advantage of the first turn.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, strum::EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    First,
    Second,
}

impl Player {
    /// "Flips" the side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "first" | "1" => Ok(Self::First),
            "second" | "2" => Ok(Self::Second),
            _ => bail!("player should be 'first' or 'second', got '{player}'"),
        }
    }
}

impl FromStr for Player {
    type Err = anyhow::Error;

    fn from_str(player: &str) -> anyhow::Result<Self> {
        Self::try_from(player)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match &self {
            Self::First => "first",
            Self::Second => "second",
        })
    }
}

/// The reduced piece set: there are no pawns and no kings.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum PieceKind {
    Queen,
    Knight,
    Rook,
    Bishop,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::Queen => 'q',
            Self::Knight => 'n',
            Self::Rook => 'r',
            Self::Bishop => 'b',
        })
    }
}

/// Represents a specific piece owned by a player. Pieces never change: moving
/// one only changes the square holding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    #[allow(missing_docs)]
    pub owner: Player,
    #[allow(missing_docs)]
    pub kind: PieceKind,
}

impl Piece {
    #[must_use]
    #[allow(missing_docs)]
    pub const fn new(owner: Player, kind: PieceKind) -> Self {
        Self { owner, kind }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let kind = match symbol.to_ascii_lowercase() {
            'q' => PieceKind::Queen,
            'n' => PieceKind::Knight,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            _ => bail!("piece symbol should be within \"QNRBqnrb\", got '{symbol}'"),
        };
        let owner = if symbol.is_ascii_uppercase() {
            Player::First
        } else {
            Player::Second
        };
        Ok(Self { owner, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.kind {
            PieceKind::Queen => 'q',
            PieceKind::Knight => 'n',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
        };
        // First player: uppercase symbols, second player: lowercase.
        f.write_char(match self.owner {
            Player::First => symbol.to_ascii_uppercase(),
            Player::Second => symbol,
        })
    }
}
