use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use budgetcut_game::{ConfigError, ConfigLoader, GameConfig, GameEngine, GameState, StandardConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Loads game rules and roster from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigLoader for FileConfig {
    type Error = LoadError;

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        let json = fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(GameConfig::from_json(&json)?)
    }
}

/// Build the not-yet-started game every run is cloned from.
pub fn load_template(path: Option<&Path>) -> Result<GameState> {
    match path {
        Some(path) => GameEngine::new(FileConfig::new(path))
            .create_game()
            .with_context(|| format!("loading game config from {}", path.display())),
        None => GameEngine::new(StandardConfig)
            .create_game()
            .context("building the standard game"),
    }
}
