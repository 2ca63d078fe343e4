//! Turn protocol of the game: who is to move, which piece is about to move and
//! whether the game is already decided.
//!
//! Moves are made in two phases, the way a player interacts with a board:
//! first a piece is selected ([`GameState::select`]), then its destination is
//! submitted ([`GameState::submit_move`]). Non-interactive callers can use
//! [`GameState::make_move`] which performs both steps at once.
//!
//! ```text
//!                  select(square)
//!   AwaitingSelection ──────────► AwaitingDestination(square)
//!          ▲   ◄──────────────────────┘  │
//!          │    cancel_selection()        │ submit_move(destination)
//!          │                              │
//!          └──── next player to move ◄────┤
//!                                         ▼
//!                               GameOver { winner }
//! ```

use log::debug;

use crate::chess::board::Board;
use crate::chess::core::{Move, Piece, PieceKind, Player, Square};
use crate::chess::rules::{self, Destinations};
use crate::error::GameError;

/// Where the game is in the move protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the player to move to pick one of their pieces.
    AwaitingSelection,
    /// The piece on the given square was selected and waits for a
    /// destination.
    AwaitingDestination(Square),
    /// One of the players has no pieces left. Terminal.
    GameOver {
        #[allow(missing_docs)]
        winner: Player,
    },
}

/// Result of a successful protocol operation. Rendering and input
/// collaborators use it to react to the change without re-inspecting the
/// board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The piece on the square is waiting for a destination.
    Selected(Square),
    /// Selection was dropped, the same player is still to move.
    Cancelled,
    /// A piece was moved and the turn passed to `next`.
    Moved {
        #[allow(missing_docs)]
        played: Move,
        #[allow(missing_docs)]
        captured: Option<Piece>,
        #[allow(missing_docs)]
        next: Player,
    },
    /// The move captured the last piece of the opponent.
    GameOver {
        #[allow(missing_docs)]
        played: Move,
        #[allow(missing_docs)]
        captured: Option<Piece>,
        #[allow(missing_docs)]
        winner: Player,
    },
}

/// State of a single game: the board, the player to move and the progress of
/// the current move. The board is only ever mutated through the move protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    phase: Phase,
}

impl GameState {
    /// Starts a new game from [`Board::starting`] with [`Player::First`] to
    /// move.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(Board::starting(), Player::First)
    }

    /// Resumes a game from a board and the player to move, e.g. after loading
    /// a save file. There is never a pending selection; if one of the players
    /// has no pieces left the game is already over. A player without pieces
    /// to move loses even if the opponent has none either.
    #[must_use]
    pub fn from_parts(board: Board, current_player: Player) -> Self {
        let phase = if board.count(current_player) == 0 {
            Phase::GameOver {
                winner: current_player.opponent(),
            }
        } else if board.count(current_player.opponent()) == 0 {
            Phase::GameOver {
                winner: current_player,
            }
        } else {
            Phase::AwaitingSelection
        };
        Self {
            board,
            current_player,
            phase,
        }
    }

    /// Read-only view of the board for rendering.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn current_player(&self) -> Player {
        self.current_player
    }

    /// Square selected in the first phase of the move, if any.
    #[must_use]
    pub const fn pending_selection(&self) -> Option<Square> {
        match self.phase {
            Phase::AwaitingDestination(square) => Some(square),
            _ => None,
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the winner once the game is over.
    #[must_use]
    pub const fn winner(&self) -> Option<Player> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    /// Calls `visit` for every piece on the board, in rank-major order.
    pub fn for_each_occupied(&self, mut visit: impl FnMut(Square, PieceKind, Player)) {
        for (square, piece) in self.board.pieces() {
            visit(square, piece.kind, piece.owner);
        }
    }

    /// Destinations available to the selected piece; empty when nothing is
    /// selected.
    #[must_use]
    pub fn hints(&self) -> Destinations {
        self.pending_selection()
            .map(|from| rules::destinations(&self.board, from))
            .unwrap_or_default()
    }

    /// First phase of a move: picks the piece standing on `square`.
    ///
    /// # Errors
    ///
    /// - [`GameError::NoPieceAtSelection`] if the square is empty.
    /// - [`GameError::NotCurrentPlayersPiece`] if the piece belongs to the
    ///   opponent.
    /// - [`GameError::SelectionPending`] if a piece is already selected.
    /// - [`GameError::GameFinished`] after the game is over.
    pub fn select(&mut self, square: Square) -> Result<Transition, GameError> {
        match self.phase {
            Phase::GameOver { winner } => Err(GameError::GameFinished { winner }),
            Phase::AwaitingDestination(selected) => Err(GameError::SelectionPending(selected)),
            Phase::AwaitingSelection => {
                let piece = self
                    .board
                    .at(square)
                    .ok_or(GameError::NoPieceAtSelection(square))?;
                if piece.owner != self.current_player {
                    return Err(GameError::NotCurrentPlayersPiece { square, piece });
                }
                self.phase = Phase::AwaitingDestination(square);
                Ok(Transition::Selected(square))
            },
        }
    }

    /// Second phase of a move: moves the selected piece to `destination`,
    /// capturing the opponent's piece standing there.
    ///
    /// Submitting the square of the selected piece itself is treated as
    /// cancelling the selection.
    ///
    /// # Errors
    ///
    /// The checks happen in this order:
    ///
    /// - [`GameError::OccupiedByOwnPiece`] if the destination holds a piece of
    ///   the player to move.
    /// - [`GameError::IllegalGeometry`] if the piece can not move like that.
    ///
    /// [`GameError::NothingSelected`] and [`GameError::GameFinished`] are
    /// returned when there is no pending selection.
    ///
    /// The state is not changed on failure: the selection stays pending.
    pub fn submit_move(&mut self, destination: Square) -> Result<Transition, GameError> {
        let from = match self.phase {
            Phase::GameOver { winner } => return Err(GameError::GameFinished { winner }),
            Phase::AwaitingSelection => return Err(GameError::NothingSelected),
            Phase::AwaitingDestination(from) => from,
        };
        if destination == from {
            self.phase = Phase::AwaitingSelection;
            return Ok(Transition::Cancelled);
        }
        let piece = self
            .board
            .at(from)
            .ok_or(GameError::NoPieceAtSelection(from))?;
        if let Some(target) = self.board.at(destination) {
            if target.owner == self.current_player {
                return Err(GameError::OccupiedByOwnPiece(destination));
            }
        }
        if !rules::is_legal(piece.kind, from, destination) {
            return Err(GameError::IllegalGeometry {
                kind: piece.kind,
                from,
                to: destination,
            });
        }
        let played = Move::new(from, destination);
        let captured = self.board.relocate(from, destination);
        debug!(
            "{} played {piece} {played}{}",
            self.current_player,
            captured.map_or_else(String::new, |captured| format!(" capturing {captured}"))
        );
        let opponent = self.current_player.opponent();
        if self.board.count(opponent) == 0 {
            let winner = self.current_player;
            self.phase = Phase::GameOver { winner };
            return Ok(Transition::GameOver {
                played,
                captured,
                winner,
            });
        }
        self.current_player = opponent;
        self.phase = Phase::AwaitingSelection;
        Ok(Transition::Moved {
            played,
            captured,
            next: opponent,
        })
    }

    /// Drops the pending selection without passing the turn.
    ///
    /// # Errors
    ///
    /// [`GameError::NothingSelected`] if there is no selection and
    /// [`GameError::GameFinished`] after the game is over.
    pub fn cancel_selection(&mut self) -> Result<Transition, GameError> {
        match self.phase {
            Phase::GameOver { winner } => Err(GameError::GameFinished { winner }),
            Phase::AwaitingSelection => Err(GameError::NothingSelected),
            Phase::AwaitingDestination(_) => {
                self.phase = Phase::AwaitingSelection;
                Ok(Transition::Cancelled)
            },
        }
    }

    /// Selects `from` and submits `to` in one call. Performs the same checks
    /// in the same order as [`GameState::select`] followed by
    /// [`GameState::submit_move`]; on failure no selection is left behind.
    ///
    /// # Errors
    ///
    /// Any error of [`GameState::select`] or [`GameState::submit_move`].
    pub fn make_move(&mut self, from: Square, to: Square) -> Result<Transition, GameError> {
        let _ = self.select(from)?;
        self.submit_move(to).map_err(|error| {
            self.phase = Phase::AwaitingSelection;
            error
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn position(placement: &str, player: Player) -> GameState {
        GameState::from_parts(Board::try_from(placement).unwrap(), player)
    }

    #[test]
    fn new_game() {
        let game = GameState::new();
        assert_eq!(game.current_player(), Player::First);
        assert_eq!(game.phase(), Phase::AwaitingSelection);
        assert_eq!(game.pending_selection(), None);
        assert_eq!(game.winner(), None);
        assert_eq!(game.board(), &Board::starting());
        assert!(game.hints().is_empty());
    }

    #[test]
    fn select_and_cancel() {
        let mut game = GameState::new();
        assert_eq!(game.select(Square::B1).unwrap(), Transition::Selected(Square::B1));
        assert_eq!(game.pending_selection(), Some(Square::B1));
        assert_eq!(game.hints().len(), 3);
        assert!(matches!(
            game.select(Square::A1),
            Err(GameError::SelectionPending(Square::B1))
        ));
        assert_eq!(game.cancel_selection().unwrap(), Transition::Cancelled);
        assert_eq!(game.phase(), Phase::AwaitingSelection);
        assert_eq!(game.current_player(), Player::First);
        assert!(matches!(
            game.cancel_selection(),
            Err(GameError::NothingSelected)
        ));
    }

    #[test]
    fn selection_errors() {
        let mut game = GameState::new();
        assert!(matches!(
            game.select(Square::E4),
            Err(GameError::NoPieceAtSelection(Square::E4))
        ));
        assert!(matches!(
            game.select(Square::A8),
            Err(GameError::NotCurrentPlayersPiece {
                square: Square::A8,
                ..
            })
        ));
        assert!(matches!(
            game.submit_move(Square::A4),
            Err(GameError::NothingSelected)
        ));
        assert_eq!(game, GameState::new());
    }

    #[test]
    fn same_square_cancels() {
        let mut game = GameState::new();
        let _ = game.select(Square::D1).unwrap();
        assert_eq!(game.submit_move(Square::D1).unwrap(), Transition::Cancelled);
        assert_eq!(game, GameState::new());
        assert_eq!(
            game.make_move(Square::C1, Square::C1).unwrap(),
            Transition::Cancelled
        );
        assert_eq!(game, GameState::new());
    }

    #[test]
    fn failed_submission_keeps_selection() {
        let mut game = GameState::new();
        let _ = game.select(Square::B1).unwrap();
        assert!(matches!(
            game.submit_move(Square::B4),
            Err(GameError::IllegalGeometry {
                kind: PieceKind::Knight,
                from: Square::B1,
                to: Square::B4,
            })
        ));
        assert!(matches!(
            game.submit_move(Square::B3),
            Err(GameError::IllegalGeometry { .. })
        ));
        assert_eq!(game.pending_selection(), Some(Square::B1));
        assert_eq!(game.board(), &Board::starting());
        assert_eq!(
            game.submit_move(Square::C3).unwrap(),
            Transition::Moved {
                played: Move::new(Square::B1, Square::C3),
                captured: None,
                next: Player::Second,
            }
        );
    }

    #[test]
    fn own_piece_is_checked_before_geometry() {
        let mut game = GameState::new();
        let _ = game.select(Square::D1).unwrap();
        assert!(matches!(
            game.submit_move(Square::A1),
            Err(GameError::OccupiedByOwnPiece(Square::A1))
        ));
        let _ = game.cancel_selection().unwrap();
        // Knight can not reach c1 either, the own piece is reported first.
        let _ = game.select(Square::B1).unwrap();
        assert!(matches!(
            game.submit_move(Square::C1),
            Err(GameError::OccupiedByOwnPiece(Square::C1))
        ));
    }

    #[test]
    fn make_move_leaves_no_selection_behind() {
        let mut game = GameState::new();
        assert!(matches!(
            game.make_move(Square::A1, Square::B2),
            Err(GameError::IllegalGeometry { .. })
        ));
        assert_eq!(game, GameState::new());
        assert!(matches!(
            game.make_move(Square::E5, Square::E6),
            Err(GameError::NoPieceAtSelection(Square::E5))
        ));
        assert_eq!(game, GameState::new());
    }

    #[test]
    fn last_capture_ends_the_game() {
        let mut game = position("7q/8/8/8/8/8/8/R7", Player::First);
        assert_eq!(game.phase(), Phase::AwaitingSelection);
        assert_eq!(
            game.make_move(Square::A1, Square::A8).unwrap(),
            Transition::Moved {
                played: Move::new(Square::A1, Square::A8),
                captured: None,
                next: Player::Second,
            }
        );
        assert_eq!(
            game.make_move(Square::H8, Square::A8).unwrap(),
            Transition::GameOver {
                played: Move::new(Square::H8, Square::A8),
                captured: Some(Piece::new(Player::First, PieceKind::Rook)),
                winner: Player::Second,
            }
        );
        assert_eq!(game.winner(), Some(Player::Second));
        // The winner stays the "current" player.
        assert_eq!(game.current_player(), Player::Second);
        assert!(matches!(
            game.select(Square::A8),
            Err(GameError::GameFinished {
                winner: Player::Second
            })
        ));
        assert!(matches!(
            game.submit_move(Square::A1),
            Err(GameError::GameFinished { .. })
        ));
        assert!(matches!(
            game.cancel_selection(),
            Err(GameError::GameFinished { .. })
        ));
    }

    #[test]
    fn resumed_games_detect_finished_positions() {
        assert_eq!(
            position("8/8/8/8/8/8/8/R7", Player::First).winner(),
            Some(Player::First)
        );
        assert_eq!(
            position("8/8/8/8/8/8/8/R7", Player::Second).winner(),
            Some(Player::First)
        );
        assert_eq!(
            position("8/8/8/8/8/8/8/8", Player::Second).winner(),
            Some(Player::First)
        );
    }

    #[test]
    fn occupied_squares_for_rendering() {
        let game = GameState::new();
        let mut seen = vec![];
        game.for_each_occupied(|square, kind, owner| seen.push((square, kind, owner)));
        assert_eq!(seen.len(), 8);
        assert_eq!(seen[0], (Square::A1, PieceKind::Rook, Player::First));
        assert_eq!(seen[7], (Square::D8, PieceKind::Queen, Player::Second));
    }
}
