//! Square-centric board representation: a fixed table holding an optional
//! piece for each of the 64 squares.
//!
//! The board owns every piece placed on it. Moving a piece relocates the value
//! between two slots of the table, so a piece can never be present on two
//! squares at once and capturing simply overwrites the destination slot.

use std::fmt::{self, Write};
use std::mem;

use anyhow::{bail, Context};
use strum::IntoEnumIterator;

use crate::chess::core::{File, Piece, PieceKind, Player, Rank, Square, BOARD_SIZE, BOARD_WIDTH};

/// Pieces each player starts with and the files they are placed on. Both
/// players use their own home rank.
const STARTING_LAYOUT: [(File, PieceKind); 4] = [
    (File::A, PieceKind::Rook),
    (File::B, PieceKind::Knight),
    (File::C, PieceKind::Bishop),
    (File::D, PieceKind::Queen),
];

/// 8×8 grid of optional pieces, indexed by [`Square`].
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; BOARD_SIZE as usize],
}

impl Board {
    /// Creates the board every new game starts with: Rook, Knight, Bishop and
    /// Queen on files a to d of each player's home rank.
    ///
    /// ```
    /// use tetrachess::chess::board::Board;
    ///
    /// assert_eq!(Board::starting().to_string(), "rnbq4/8/8/8/8/8/8/RNBQ4");
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut board = Self::empty();
        for player in Player::iter() {
            for (file, kind) in STARTING_LAYOUT {
                let square = Square::new(file, Rank::home(player));
                board.squares[square.index()] = Some(Piece::new(player, kind));
            }
        }
        board
    }

    /// Constructs a board without any pieces.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            squares: [None; BOARD_SIZE as usize],
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// Puts `piece` (or nothing) on the square and returns whatever was there
    /// before.
    pub(crate) fn place(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        mem::replace(&mut self.squares[square.index()], piece)
    }

    /// Moves the piece standing on `from` to `to`, leaving `from` empty.
    /// Returns the piece that previously occupied `to`, i.e. the captured one.
    pub(super) fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.squares[from.index()].take();
        self.place(to, piece)
    }

    /// Iterates over occupied squares in rank-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(move |square| self.at(square).map(|piece| (square, piece)))
    }

    /// Iterates over the squares occupied by `player`'s pieces.
    pub fn player_pieces(&self, player: Player) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.owner == player)
    }

    /// Number of pieces `player` still has on the board.
    #[must_use]
    pub fn count(&self, player: Player) -> usize {
        self.player_pieces(player).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl TryFrom<&str> for Board {
    type Error = anyhow::Error;

    /// Parses piece placement in the format produced by [`Board`]'s
    /// `Display`: ranks from the top separated by '/', digits for runs of
    /// empty squares.
    ///
    /// # Errors
    ///
    /// Returns [`anyhow::Error`] if the input does not describe exactly 8
    /// ranks of 8 squares each or contains unknown piece symbols.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        let ranks: Vec<&str> = input.split('/').collect();
        if ranks.len() != BOARD_WIDTH as usize {
            bail!("placement should have 8 ranks, got {}: {input}", ranks.len());
        }
        let mut board = Self::empty();
        for (rank, placement) in Rank::iter().rev().zip(ranks) {
            let mut file: u8 = 0;
            for symbol in placement.chars() {
                if let Some(skip) = symbol.to_digit(10) {
                    file += u8::try_from(skip)?;
                    if file > BOARD_WIDTH {
                        bail!("rank {rank} should have 8 squares, got {file}");
                    }
                    continue;
                }
                let square = Square::new(
                    File::try_from(file).with_context(|| format!("rank {rank} is too long"))?,
                    rank,
                );
                let _ = board.place(square, Some(Piece::try_from(symbol)?));
                file += 1;
            }
            if file != BOARD_WIDTH {
                bail!("rank {rank} should have 8 squares, got {file}");
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    /// Prints piece placement rank by rank from the top, the way FEN does:
    /// digits for runs of empty squares and '/' between ranks.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            let mut empty_squares = 0i32;
            for file in File::iter() {
                if let Some(piece) = self.at(Square::new(file, rank)) {
                    if empty_squares != 0 {
                        write!(f, "{empty_squares}")?;
                        empty_squares = 0;
                    }
                    write!(f, "{piece}")?;
                } else {
                    empty_squares += 1;
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if rank != Rank::One {
                const RANK_SEPARATOR: char = '/';
                f.write_char(RANK_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    /// Dumps the board in a simple format ('.' for empty square, piece symbol
    /// otherwise), top rank first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                match self.at(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{piece}"),
                    None => f.write_char('.'),
                }?;
                if file != File::H {
                    f.write_str(SQUARE_SEPARATOR)?;
                }
            }
            if rank != Rank::One {
                f.write_str(LINE_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starting_board() {
        let board = Board::starting();
        assert_eq!(
            format!("{board:?}"),
            "r n b q . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             R N B Q . . . ."
        );
        assert_eq!(board.to_string(), "rnbq4/8/8/8/8/8/8/RNBQ4");
        assert_eq!(board.count(Player::First), 4);
        assert_eq!(board.count(Player::Second), 4);
        assert_eq!(
            board.at(Square::D1),
            Some(Piece::new(Player::First, PieceKind::Queen))
        );
        assert_eq!(
            board.at(Square::B8),
            Some(Piece::new(Player::Second, PieceKind::Knight))
        );
        assert_eq!(board.at(Square::E1), None);
        assert_eq!(board, Board::starting());
    }

    #[test]
    fn empty_board() {
        assert_eq!(
            format!("{:?}", Board::empty()),
            ". . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . ."
        );
        assert_eq!(Board::empty().to_string(), "8/8/8/8/8/8/8/8");
        assert_eq!(Board::empty().pieces().count(), 0);
    }

    #[test]
    fn relocation() {
        let mut board = Board::starting();
        assert_eq!(board.relocate(Square::A1, Square::A5), None);
        assert_eq!(board.at(Square::A1), None);
        assert_eq!(
            board.at(Square::A5),
            Some(Piece::new(Player::First, PieceKind::Rook))
        );
        let captured = board.relocate(Square::A5, Square::A8);
        assert_eq!(captured, Some(Piece::new(Player::Second, PieceKind::Rook)));
        assert_eq!(board.count(Player::First), 4);
        assert_eq!(board.count(Player::Second), 3);
        assert_eq!(board.to_string(), "Rnbq4/8/8/8/8/8/8/1NBQ4");
    }

    #[test]
    fn parse_placement() {
        assert_eq!(
            Board::try_from("rnbq4/8/8/8/8/8/8/RNBQ4").unwrap(),
            Board::starting()
        );
        assert_eq!(Board::try_from("8/8/8/8/8/8/8/8").unwrap(), Board::empty());
        let board = Board::try_from("8/8/3q4/8/8/8/8/1N6").unwrap();
        assert_eq!(board.pieces().count(), 2);
        assert_eq!(
            board.at(Square::D6),
            Some(Piece::new(Player::Second, PieceKind::Queen))
        );
        assert_eq!(
            board.at(Square::B1),
            Some(Piece::new(Player::First, PieceKind::Knight))
        );
        for placement in [
            "8/8/8/8/8/8/8",
            "8/8/8/8/8/8/8/8/8",
            "8/8/8/8/8/8/8/7",
            "8/8/8/8/8/8/8/9",
            "8/8/8/8/8/8/8/Q8",
            "8/8/8/8/8/8/8/k7",
        ] {
            assert!(Board::try_from(placement).is_err(), "{placement}");
        }
    }

    #[test]
    fn piece_iteration_order() {
        let board = Board::starting();
        assert_eq!(
            board
                .player_pieces(Player::Second)
                .map(|(square, _)| square)
                .collect::<Vec<_>>(),
            vec![Square::A8, Square::B8, Square::C8, Square::D8]
        );
        assert_eq!(board.pieces().count(), 8);
    }
}
