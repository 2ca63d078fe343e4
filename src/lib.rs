//! Two-player chess variant played with four pieces per side: Rook, Knight,
//! Bishop and Queen. There are no pawns and no kings, sliding pieces jump
//! over anything in their way and the game is won by capturing every piece of
//! the opponent. For more information, see [README].
//!
//! The crate is split into the rules ([`chess`]), a computer player that
//! moves at random ([`opponent`]) and a text console front-end ([`Session`])
//! used by the `tetrachess` binary.
//!
//! ```
//! use tetrachess::chess::core::{Player, Square};
//! use tetrachess::chess::game::GameState;
//!
//! let mut game = GameState::new();
//! assert!(game.select(Square::B1).is_ok());
//! assert!(game.submit_move(Square::C3).is_ok());
//! assert_eq!(game.current_player(), Player::Second);
//! ```
//!
//! [README]: https://github.com/kirillbobyrev/tetrachess/blob/main/README.md

pub mod chess;
pub mod config;
pub mod error;
pub mod opponent;

mod session;
pub use session::Session;
use shadow_rs::shadow;

shadow!(build);

/// Returns the full version that can be used to identify how the binary was
/// built in the first place.
#[must_use]
pub fn version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints the version and where to find the project on startup.
pub fn print_game_info() {
    println!("Tetrachess {}", version());
    println!("<https://github.com/kirillbobyrev/tetrachess>");
}

/// Prints the build type, target and whether the build is clean on startup.
pub fn print_binary_info() {
    println!("Release build: {}", !shadow_rs::is_debug());
    println!("Target: {}", build::BUILD_TARGET);
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!("Type 'help' for the list of commands.");
    println!();
}
