//! The session connects the game, its save files and the computer opponent to
//! a line-oriented text console.
//!
//! [`Session::run`] is the main loop: it reads one [command] per line from the
//! input stream, applies it and writes the outcome to the output stream. Game
//! errors are reported and the loop continues; only I/O failures on the
//! streams themselves end the session early.
//!
//! [command]: Command

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::chess::core::{Move, Piece, Player};
use crate::chess::game::{GameState, Phase, Transition};
use crate::chess::save::{self, SaveFormat};
use crate::config::Config;
use crate::error::GameError;
use crate::opponent;
use crate::session::command::Command;

mod command;

const HELP: &str = "\
commands:
  select <square>        pick a piece, e.g. 'select b1'
  move <square>          move the selected piece
  move <from> <to>       select and move in one go, also 'move b1c3'
  cancel                 drop the selection
  hints                  list destinations of the selected piece
  ai                     let the computer move for the player to move
  save <path>            save the game ('.txt' files are saved as text)
  load <path>            load a saved game
  board, d               show the board
  new                    start a new game
  help                   show this message
  quit                   leave
";

/// Interactive game driven by text commands, with I/O provided by the
/// caller.
pub struct Session<'a, R: BufRead, W: Write> {
    game: GameState,
    input: &'a mut R,
    output: &'a mut W,
    opponent: Option<Player>,
    save_format: Option<SaveFormat>,
    autosave: Option<PathBuf>,
    rng: StdRng,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Creates a session with a new game. Without a seed in `config` the
    /// opponent's random number generator is seeded by the OS.
    #[must_use]
    pub fn new(input: &'a mut R, output: &'a mut W, config: Config) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            game: GameState::new(),
            input,
            output,
            opponent: config.opponent,
            save_format: config.save_format,
            autosave: config.autosave,
            rng,
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn game(&self) -> &GameState {
        &self.game
    }

    /// Replaces the current game with the one saved at `path`.
    ///
    /// # Errors
    ///
    /// Returns the [`GameError`] of [`save::load`]; the current game is left
    /// untouched in that case.
    pub fn load(&mut self, path: &Path) -> Result<(), GameError> {
        self.game = save::load(path, self.format_for(path))?;
        Ok(())
    }

    /// Reads and executes commands until `quit` or the end of the input.
    ///
    /// # Errors
    ///
    /// Only reading from the input or writing to the output can fail.
    pub fn run(&mut self) -> anyhow::Result<()> {
        info!(
            "Starting session, computer plays {}",
            self.opponent.map_or_else(|| "nobody".to_string(), |p| p.to_string())
        );
        self.show()?;
        self.play_opponent()?;
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            debug!("Received command: {}", line.trim());
            match Command::parse(&line) {
                Command::Select(square) => {
                    let selected = self.game.select(square);
                    self.apply(selected)?;
                },
                Command::SubmitMove(destination) => {
                    let moved = self.game.submit_move(destination);
                    self.apply(moved)?;
                },
                Command::MakeMove(played) => {
                    let moved = self.game.make_move(played.from, played.to);
                    self.apply(moved)?;
                },
                Command::Cancel => {
                    let cancelled = self.game.cancel_selection();
                    self.apply(cancelled)?;
                },
                Command::Save(path) => self.handle_save(&path)?,
                Command::Load(path) => self.handle_load(&path)?,
                Command::Opponent => {
                    let moved = self.opponent_move();
                    self.apply(moved)?;
                },
                Command::Hints => self.handle_hints()?,
                Command::Show => self.show()?,
                Command::NewGame => {
                    self.game = GameState::new();
                    self.show()?;
                    self.play_opponent()?;
                },
                Command::Help => write!(self.output, "{HELP}")?,
                Command::Quit => break,
                Command::Unknown(command) => writeln!(
                    self.output,
                    "error: unknown command '{command}', type 'help' for the list of commands"
                )?,
            }
            self.output.flush()?;
        }
        info!("Session finished");
        Ok(())
    }

    /// Reports the outcome of a protocol operation. Once a move is accepted
    /// the game is autosaved and the computer replies if it is its turn.
    fn apply(&mut self, result: Result<Transition, GameError>) -> anyhow::Result<()> {
        match result {
            Ok(transition) => {
                self.report(transition)?;
                if matches!(
                    transition,
                    Transition::Moved { .. } | Transition::GameOver { .. }
                ) {
                    self.autosave()?;
                    self.play_opponent()?;
                }
                Ok(())
            },
            Err(error) => self.report_error(&error),
        }
    }

    fn report(&mut self, transition: Transition) -> anyhow::Result<()> {
        match transition {
            Transition::Selected(square) => writeln!(self.output, "selected {square}")?,
            Transition::Cancelled => writeln!(self.output, "selection cancelled")?,
            Transition::Moved {
                played,
                captured,
                next,
            } => self.report_move(next.opponent(), played, captured)?,
            Transition::GameOver {
                played,
                captured,
                winner,
            } => self.report_move(winner, played, captured)?,
        }
        Ok(())
    }

    fn report_move(
        &mut self,
        mover: Player,
        played: Move,
        captured: Option<Piece>,
    ) -> anyhow::Result<()> {
        info!("{mover} played {played}");
        write!(self.output, "{mover} played {played}")?;
        if let Some(captured) = captured {
            write!(self.output, " capturing {captured}")?;
        }
        writeln!(self.output)?;
        self.show()
    }

    fn report_error(&mut self, error: &GameError) -> anyhow::Result<()> {
        debug!("Rejected: {error:?}");
        writeln!(self.output, "error: {error}")?;
        Ok(())
    }

    /// Prints the board followed by the status line.
    fn show(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{:?}", self.game.board())?;
        let player = self.game.current_player();
        match self.game.phase() {
            Phase::AwaitingSelection => writeln!(self.output, "{player} to move")?,
            Phase::AwaitingDestination(square) => {
                writeln!(self.output, "{player} to move, {square} selected")?;
            },
            Phase::GameOver { winner } => writeln!(self.output, "game over, {winner} wins")?,
        }
        Ok(())
    }

    fn handle_hints(&mut self) -> anyhow::Result<()> {
        let Some(selected) = self.game.pending_selection() else {
            return self.report_error(&GameError::NothingSelected);
        };
        let hints = self.game.hints();
        if hints.is_empty() {
            writeln!(self.output, "{selected} can not move")?;
        } else {
            writeln!(self.output, "{selected} can move to {}", hints.iter().join(" "))?;
        }
        Ok(())
    }

    fn handle_save(&mut self, path: &Path) -> anyhow::Result<()> {
        match save::save(&self.game, path, self.format_for(path)) {
            Ok(()) => writeln!(self.output, "saved {}", path.display())?,
            Err(error) => self.report_error(&error)?,
        }
        Ok(())
    }

    fn handle_load(&mut self, path: &Path) -> anyhow::Result<()> {
        match self.load(path) {
            Ok(()) => {
                writeln!(self.output, "loaded {}", path.display())?;
                self.show()?;
                self.play_opponent()
            },
            Err(error) => self.report_error(&error),
        }
    }

    fn autosave(&mut self) -> anyhow::Result<()> {
        let Some(path) = self.autosave.clone() else {
            return Ok(());
        };
        if let Err(error) = save::save(&self.game, &path, self.format_for(&path)) {
            warn!("Autosave failed: {error}");
            self.report_error(&error)?;
        }
        Ok(())
    }

    /// Lets the computer move if the game is waiting for it.
    fn play_opponent(&mut self) -> anyhow::Result<()> {
        if self.game.is_over() || self.opponent != Some(self.game.current_player()) {
            return Ok(());
        }
        let moved = self.opponent_move();
        match moved {
            Ok(transition) => {
                self.report(transition)?;
                self.autosave()
            },
            Err(error) => self.report_error(&error),
        }
    }

    fn opponent_move(&mut self) -> Result<Transition, GameError> {
        let chosen = opponent::choose_move(&self.game, &mut self.rng)?;
        self.game.make_move(chosen.from, chosen.to)
    }

    fn format_for(&self, path: &Path) -> SaveFormat {
        self.save_format
            .unwrap_or_else(|| SaveFormat::from_path(path))
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::board::Board;
    use crate::chess::core::{PieceKind, Square};

    fn play(commands: &str, config: Config) -> (String, GameState) {
        let mut input = commands.as_bytes();
        let mut output = Vec::new();
        let game = {
            let mut session = Session::new(&mut input, &mut output, config);
            session.run().unwrap();
            session.game().clone()
        };
        (String::from_utf8(output).unwrap(), game)
    }

    fn scratch_file(name: &str) -> PathBuf {
        env::temp_dir().join(format!("tetrachess-session-{}-{name}", process::id()))
    }

    fn knight_on_c3() -> Board {
        Board::try_from("rnbq4/8/8/8/8/2N5/8/R1BQ4").unwrap()
    }

    #[test]
    fn two_phase_move() {
        let (output, game) = play("select b1\nhints\nmove c3\n", Config::default());
        assert!(output.starts_with(&format!("{:?}\nfirst to move\n", Board::starting())));
        assert!(output.contains("selected b1\n"));
        assert!(output.contains("b1 can move to d2 a3 c3\n"));
        assert!(output.contains("first played b1c3\n"));
        assert!(output.ends_with("second to move\n"));
        assert_eq!(game.board(), &knight_on_c3());
        assert_eq!(game.current_player(), Player::Second);
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let (output, game) = play(
            "select e4\nselect a8\nmove c3\nhints\ncastle\n\nmove b1 b3\nboard\n",
            Config::default(),
        );
        for expected in [
            "error: no movable piece at e4",
            "error: piece at a8 belongs to second",
            "error: no piece is selected",
            "error: unknown command 'castle'",
            "error: illegal move for Knight: b1 to b3",
        ] {
            assert!(output.contains(expected), "{expected}\n{output}");
        }
        assert!(output.ends_with("first to move\n"));
        assert_eq!(game, GameState::new());
    }

    #[test]
    fn quit_stops_reading() {
        let (output, game) = play("quit\nmove b1 c3\n", Config::default());
        assert_eq!(game, GameState::new());
        assert!(!output.contains("played"));
    }

    #[test]
    fn computer_replies() {
        let config = Config {
            opponent: Some(Player::Second),
            seed: Some(1),
            ..Config::default()
        };
        let (output, game) = play("move b1 c3\n", config);
        assert!(output.contains("first played b1c3\n"));
        assert!(output.contains("second played "));
        assert_eq!(game.current_player(), Player::First);
        assert_eq!(
            game.board().at(Square::C3),
            Some(Piece::new(Player::First, PieceKind::Knight))
        );
    }

    #[test]
    fn computer_opens_the_game() {
        let config = Config {
            opponent: Some(Player::First),
            seed: Some(1),
            ..Config::default()
        };
        let (output, game) = play("", config);
        assert!(output.contains("first played "));
        assert_eq!(game.current_player(), Player::Second);
    }

    #[test]
    fn computer_move_on_request() {
        let config = Config {
            seed: Some(5),
            ..Config::default()
        };
        let (output, game) = play("ai\nai\n", config);
        assert!(output.contains("first played "));
        assert!(output.contains("second played "));
        assert_eq!(game.current_player(), Player::First);
    }

    #[test]
    fn save_and_load() {
        for name in ["game.txt", "game.sav"] {
            let path = scratch_file(name);
            let (output, game) = play(
                &format!(
                    "move b1 c3\nsave {path}\nnew\nload {path}\n",
                    path = path.display()
                ),
                Config::default(),
            );
            assert!(output.contains(&format!("saved {}\n", path.display())));
            assert!(output.contains(&format!("loaded {}\n", path.display())));
            assert_eq!(game.board(), &knight_on_c3());
            assert_eq!(game.current_player(), Player::Second);
            fs::remove_file(&path).unwrap();
        }
    }

    #[test]
    fn forced_format() {
        let path = scratch_file("forced.txt");
        let config = Config {
            save_format: Some(SaveFormat::Binary),
            ..Config::default()
        };
        drop(play(&format!("save {}\n", path.display()), config));
        assert_eq!(fs::read(&path).unwrap().len(), save::BINARY_SAVE_SIZE);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_load_keeps_the_game() {
        let missing = scratch_file("missing.sav");
        let corrupt = scratch_file("corrupt.txt");
        fs::write(&corrupt, "3 0 -1\n").unwrap();
        let (output, game) = play(
            &format!(
                "move b1 c3\nload {}\nload {}\n",
                missing.display(),
                corrupt.display()
            ),
            Config::default(),
        );
        assert!(output.contains("error: can not access"));
        assert!(output.contains("error: corrupt save data"));
        assert_eq!(game.board(), &knight_on_c3());
        fs::remove_file(&corrupt).unwrap();
    }

    #[test]
    fn autosave_after_moves() {
        let path = scratch_file("autosave.txt");
        let config = Config {
            autosave: Some(path.clone()),
            ..Config::default()
        };
        let (_, game) = play("move b1 c3\nselect d8\n", config);
        assert_eq!(save::load(&path, SaveFormat::Text).unwrap().board(), game.board());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn game_over() {
        let path = scratch_file("endgame.txt");
        save::save(
            &GameState::from_parts(
                Board::try_from("7q/8/8/8/8/8/8/R7").unwrap(),
                Player::First,
            ),
            &path,
            SaveFormat::Text,
        )
        .unwrap();
        let (output, game) = play(
            &format!(
                "load {}\nmove a1 h1\nmove h8 h1\nselect h1\n",
                path.display()
            ),
            Config::default(),
        );
        assert!(output.contains("second played h8h1 capturing R\n"));
        assert!(output.contains("game over, second wins\n"));
        assert!(output.ends_with("error: the game is over, second player won\n"));
        assert_eq!(game.winner(), Some(Player::Second));
        fs::remove_file(&path).unwrap();
    }
}
