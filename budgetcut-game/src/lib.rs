//! Budget Cut Game Engine
//!
//! Platform-agnostic core logic for the timed budget-cutting game.
//! This crate owns budgets, cut accounting, the countdown, and win/lose
//! determination without UI, audio, or platform-specific dependencies.

pub mod command;
pub mod config;
pub mod constants;
pub mod cues;
pub mod error;
pub mod numbers;
pub mod program;
pub mod result;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use command::{Command, Transition};
pub use config::GameConfig;
pub use cues::{
    Cue, CueKind, CueSink, RecordingSink, SilentSink, classify_cut, classify_ending,
    classify_tick,
};
pub use error::{ConfigError, EngineError, Rejection};
pub use program::{CutAmount, InvalidCutAmount, Program, Roster};
pub use result::{Ending, ResultSummary, result_summary, select_ending};
pub use session::GameSession;
pub use state::{
    CutOutcome, CutReceipt, GamePhase, GameSnapshot, GameState, ProgramView, TickOutcome,
};

/// Trait for abstracting configuration loading.
/// Platform-specific implementations should provide this
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the game configuration from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<GameConfig, Self::Error>;
}

/// Loader that always yields the built-in rules and roster.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConfig;

impl ConfigLoader for StandardConfig {
    type Error = std::convert::Infallible;

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        Ok(GameConfig::default())
    }
}

/// Main game engine for creating game instances
pub struct GameEngine<L>
where
    L: ConfigLoader,
{
    loader: L,
}

impl<L> GameEngine<L>
where
    L: ConfigLoader,
{
    /// Create a new game engine with the provided configuration loader
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Create a new, not-yet-started game
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn create_game(&self) -> Result<GameState, EngineError<L::Error>> {
        let config = self
            .loader
            .load_config()
            .map_err(EngineError::Load)?;
        GameState::new(config).map_err(EngineError::Config)
    }

    /// Create a session that routes cues to `sink`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn create_session<S: CueSink>(
        &self,
        sink: S,
    ) -> Result<GameSession<S>, EngineError<L::Error>> {
        self.create_game().map(|state| GameSession::new(state, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("config source unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    struct FixtureLoader(Option<&'static str>);

    impl ConfigLoader for FixtureLoader {
        type Error = Unavailable;

        fn load_config(&self) -> Result<GameConfig, Self::Error> {
            let json = self.0.ok_or(Unavailable)?;
            Ok(serde_json::from_str(json).unwrap())
        }
    }

    #[test]
    fn engine_creates_games_from_standard_config() {
        let engine = GameEngine::new(StandardConfig);
        let state = engine.create_game().unwrap();
        assert_eq!(state.phase(), GamePhase::NotStarted);
        assert_eq!(state.programs().len(), 9);

        let mut session = engine.create_session(RecordingSink::default()).unwrap();
        session.player_cut("chip", CutAmount::One);
        assert!(session.state().is_running());
    }

    #[test]
    fn engine_surfaces_load_and_validation_errors() {
        let missing = GameEngine::new(FixtureLoader(None));
        assert!(matches!(missing.create_game(), Err(EngineError::Load(_))));

        let invalid = GameEngine::new(FixtureLoader(Some(r#"{"target_cuts": -1.0}"#)));
        assert!(matches!(
            invalid.create_game(),
            Err(EngineError::Config(ConfigError::InvalidTarget { .. }))
        ));
    }
}
