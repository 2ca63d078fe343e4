//! Computer opponent that plays uniformly random legal moves.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::chess::core::Move;
use crate::chess::game::GameState;
use crate::chess::rules;
use crate::error::GameError;

/// Lists every move the player to move can make, grouped by origin square in
/// rank-major order.
#[must_use]
pub fn legal_moves(game: &GameState) -> Vec<Move> {
    let board = game.board();
    board
        .player_pieces(game.current_player())
        .flat_map(|(from, _)| {
            rules::destinations(board, from)
                .into_iter()
                .map(move |to| Move::new(from, to))
        })
        .collect()
}

/// Picks one of the [`legal_moves`] uniformly at random. The move is only
/// chosen, not played: pass it to [`GameState::make_move`].
///
/// # Errors
///
/// [`GameError::GameFinished`] after the game is over and
/// [`GameError::NoLegalMoves`] if none of the player's pieces can move.
pub fn choose_move<R: Rng + ?Sized>(game: &GameState, rng: &mut R) -> Result<Move, GameError> {
    if let Some(winner) = game.winner() {
        return Err(GameError::GameFinished { winner });
    }
    let moves = legal_moves(game);
    let chosen = *moves
        .choose(rng)
        .ok_or(GameError::NoLegalMoves(game.current_player()))?;
    debug!(
        "{} picked {chosen} out of {} moves",
        game.current_player(),
        moves.len()
    );
    Ok(chosen)
}
