//! Errors reported by the game core. None of them are fatal: a failed
//! operation leaves the game exactly as it was before the call.

use std::io;
use std::path::PathBuf;

use crate::chess::core::{Piece, PieceKind, Player, Square};

/// Everything that can go wrong while interacting with a
/// [`crate::chess::game::GameState`] or its save files.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Raw coordinates outside of the board. Rejected before any board access.
    #[error("square ({file}, {rank}) is outside of the board")]
    OutOfBounds {
        #[allow(missing_docs)]
        file: i32,
        #[allow(missing_docs)]
        rank: i32,
    },

    /// Selected square is empty.
    #[error("no movable piece at {0}")]
    NoPieceAtSelection(Square),

    /// Selected square holds an opponent's piece.
    #[error("piece at {square} belongs to {}", .piece.owner)]
    NotCurrentPlayersPiece {
        #[allow(missing_docs)]
        square: Square,
        #[allow(missing_docs)]
        piece: Piece,
    },

    /// The destination does not match the movement shape of the piece.
    #[error("illegal move for {kind:?}: {from} to {to}")]
    IllegalGeometry {
        #[allow(missing_docs)]
        kind: PieceKind,
        #[allow(missing_docs)]
        from: Square,
        #[allow(missing_docs)]
        to: Square,
    },

    /// The destination is occupied by a piece of the player to move.
    #[error("cannot capture own piece at {0}")]
    OccupiedByOwnPiece(Square),

    /// A square is already selected, the move has to be submitted or
    /// cancelled first.
    #[error("{0} is already selected")]
    SelectionPending(Square),

    /// Destination submitted (or selection cancelled) before selecting a
    /// piece.
    #[error("no piece is selected")]
    NothingSelected,

    /// The game is over, no more moves are accepted.
    #[error("the game is over, {winner} player won")]
    GameFinished {
        #[allow(missing_docs)]
        winner: Player,
    },

    /// The player to move has no piece with a legal destination.
    #[error("{0} player has no legal moves")]
    NoLegalMoves(Player),

    /// Save data does not describe a valid game.
    #[error("corrupt save data: {0}")]
    CorruptSaveData(String),

    /// Save file could not be opened, read or written.
    #[error("can not access {}: {source}", .path.display())]
    MediumUnavailable {
        #[allow(missing_docs)]
        path: PathBuf,
        #[allow(missing_docs)]
        source: io::Error,
    },
}
