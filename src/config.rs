//! Session settings read from an optional YAML file.
//!
//! ```yaml
//! opponent: second        # side played by the computer
//! seed: 42                # makes computer moves reproducible
//! save_format: text       # overrides the extension-based format choice
//! autosave: autosave.sav  # written after every accepted move
//! ```
//!
//! All fields are optional. Command-line flags take precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::debug;
use serde::Deserialize;

use crate::chess::core::Player;
use crate::chess::save::SaveFormat;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct Config {
    /// Player whose moves are picked by [`crate::opponent::choose_move`].
    pub opponent: Option<Player>,
    /// Seed of the opponent's random number generator. Taken from the OS
    /// when not set.
    pub seed: Option<u64>,
    /// Format used for every save and load. Inferred from the file extension
    /// when not set.
    pub save_format: Option<SaveFormat>,
    pub autosave: Option<PathBuf>,
}

impl Config {
    /// Reads the configuration file. A missing file (or no path at all) means
    /// default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can not be read or parsed.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        debug!("Loaded {config:?} from {}", path.display());
        Ok(config)
    }

    /// Parses YAML configuration. Empty input means default settings.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed YAML, unknown keys and invalid values.
    pub fn parse(yaml: &str) -> anyhow::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn full_config() {
        let config = Config::parse(
            "opponent: second\n\
             seed: 42\n\
             save_format: text\n\
             autosave: /tmp/autosave.txt\n",
        )
        .unwrap();
        assert_eq!(
            config,
            Config {
                opponent: Some(Player::Second),
                seed: Some(42),
                save_format: Some(SaveFormat::Text),
                autosave: Some(PathBuf::from("/tmp/autosave.txt")),
            }
        );
    }

    #[test]
    fn partial_config() {
        assert_eq!(
            Config::parse("save_format: binary").unwrap(),
            Config {
                save_format: Some(SaveFormat::Binary),
                ..Config::default()
            }
        );
        assert_eq!(Config::parse("").unwrap(), Config::default());
        assert_eq!(Config::parse("# nothing here\n").unwrap(), Config::default());
    }

    #[test]
    fn invalid_config() {
        assert!(Config::parse("opponent: third").is_err());
        assert!(Config::parse("seed: -1").is_err());
        assert!(Config::parse("save_format: yaml").is_err());
        assert!(Config::parse("difficulty: hard").is_err());
        assert!(Config::parse("opponent: [first").is_err());
    }

    #[test]
    fn config_files() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
        let missing = env::temp_dir().join(format!("tetrachess-{}-missing.yaml", process::id()));
        assert_eq!(Config::load(Some(&missing)).unwrap(), Config::default());

        let path = env::temp_dir().join(format!("tetrachess-{}-config.yaml", process::id()));
        fs::write(&path, "opponent: first\nseed: 3\n").unwrap();
        assert_eq!(
            Config::load(Some(&path)).unwrap(),
            Config {
                opponent: Some(Player::First),
                seed: Some(3),
                ..Config::default()
            }
        );
        fs::write(&path, "seed: many\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
        fs::remove_file(&path).unwrap();
    }
}
