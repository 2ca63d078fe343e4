//! Movement rules of the pieces.
//!
//! Legality is purely geometric: sliding pieces (rooks, bishops, queens) are
//! not blocked by pieces standing between the origin and the destination, and
//! there is no notion of check. Occupancy only matters for the destination
//! square and is handled by [`destinations`] and
//! [`crate::chess::game::GameState`].

use arrayvec::ArrayVec;
use strum::IntoEnumIterator;

use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Square, BOARD_SIZE};

/// Squares a single piece can reach from one origin. A queen in the center of
/// the board has the most options (27), so the whole board is a safe bound.
pub type Destinations = ArrayVec<Square, { BOARD_SIZE as usize }>;

/// Checks whether a piece of given `kind` can move from `from` to `to`.
///
/// | Kind   | Legal iff                                     |
/// | ------ | --------------------------------------------- |
/// | Rook   | same file or same rank                        |
/// | Bishop | same distance along files and ranks           |
/// | Queen  | Rook or Bishop rule                           |
/// | Knight | distance of (1, 2) or (2, 1) in either order  |
///
/// Zero displacement (`from == to`) satisfies the Rook, Bishop and Queen
/// rules; it is up to the caller to decide what staying in place means.
///
/// ```
/// use tetrachess::chess::core::{PieceKind, Square};
/// use tetrachess::chess::rules::is_legal;
///
/// assert!(is_legal(PieceKind::Rook, Square::A1, Square::A6));
/// assert!(!is_legal(PieceKind::Rook, Square::A1, Square::B2));
/// assert!(is_legal(PieceKind::Knight, Square::B2, Square::C4));
/// ```
#[must_use]
pub const fn is_legal(kind: PieceKind, from: Square, to: Square) -> bool {
    let (from_file, from_rank) = from.coords();
    let (to_file, to_rank) = to.coords();
    let file_distance = from_file.abs_diff(to_file);
    let rank_distance = from_rank.abs_diff(to_rank);
    match kind {
        PieceKind::Rook => file_distance == 0 || rank_distance == 0,
        PieceKind::Bishop => file_distance == rank_distance,
        PieceKind::Queen => {
            is_legal(PieceKind::Rook, from, to) || is_legal(PieceKind::Bishop, from, to)
        },
        PieceKind::Knight => matches!((file_distance, rank_distance), (1, 2) | (2, 1)),
    }
}

/// Calculates the squares the piece standing on `from` can move to: the
/// geometry has to be legal, the piece has to actually leave its square and
/// it can not land on a piece of the same owner. Returns nothing for an empty
/// square.
#[must_use]
pub fn destinations(board: &Board, from: Square) -> Destinations {
    let Some(piece) = board.at(from) else {
        return Destinations::new();
    };
    Square::iter()
        .filter(|&to| to != from && is_legal(piece.kind, from, to))
        .filter(|&to| board.at(to).map_or(true, |target| target.owner != piece.owner))
        .collect()
}
