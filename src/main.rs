//! Terminal front-end: reads commands from stdin and prints the game to
//! stdout. Logs go to stderr, the level is controlled by `TETRACHESS_LOG`.

use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::debug;
use tetrachess::chess::core::Player;
use tetrachess::chess::save::SaveFormat;
use tetrachess::config::Config;
use tetrachess::Session;

/// Plays the four-piece chess variant in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// YAML configuration file. Defaults to $TETRACHESS_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Resume the game saved in this file.
    #[arg(long)]
    load: Option<PathBuf>,
    /// Let the computer play for this side ("first" or "second").
    #[arg(long)]
    opponent: Option<Player>,
    /// Seed for the computer's moves.
    #[arg(long)]
    seed: Option<u64>,
    /// Save format ("text" or "binary") instead of guessing by extension.
    #[arg(long)]
    format: Option<SaveFormat>,
    /// Do not print the startup banner.
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    /// Reads the configuration file and applies the flags on top of it.
    fn config(&self) -> anyhow::Result<Config> {
        let path = self
            .config
            .clone()
            .or_else(|| env::var_os("TETRACHESS_CONFIG").map(PathBuf::from));
        let mut config = Config::load(path.as_deref())?;
        config.opponent = self.opponent.or(config.opponent);
        config.seed = self.seed.or(config.seed);
        config.save_format = self.format.or(config.save_format);
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().filter_or("TETRACHESS_LOG", "warn")).init();

    let cli = Cli::parse();
    debug!("{cli:?}");
    let config = cli.config()?;

    if !cli.quiet {
        tetrachess::print_game_info();
        tetrachess::print_binary_info();
    }

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut session = Session::new(&mut input, &mut output, config);
    if let Some(path) = &cli.load {
        session
            .load(path)
            .with_context(|| format!("failed to resume the game from {}", path.display()))?;
    }
    session.run()
}
