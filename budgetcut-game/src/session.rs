use log::debug;

use crate::command::{Command, Transition};
use crate::config::GameConfig;
use crate::cues::{Cue, CueKind, CueSink, classify_cut, classify_ending, classify_tick};
use crate::error::ConfigError;
use crate::program::CutAmount;
use crate::state::{CutOutcome, GameState, TickOutcome};

/// High-level session binding a game state to a cue sink, honoring the
/// caller contract: auto-start on the first cut, check the win right after
/// every cut, and stop the clock loop when the run leaves `Running`.
#[derive(Debug, Clone)]
pub struct GameSession<S: CueSink> {
    state: GameState,
    sink: S,
}

impl<S: CueSink> GameSession<S> {
    #[must_use]
    pub const fn new(state: GameState, sink: S) -> Self {
        Self { state, sink }
    }

    /// Build a session from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: GameConfig, sink: S) -> Result<Self, ConfigError> {
        Ok(Self::new(GameState::new(config)?, sink))
    }

    fn emit(&mut self, kind: CueKind) {
        let cue = Cue::new(kind, self.state.sound_enabled());
        debug!("cue {kind} (audible: {})", cue.audible());
        self.sink.dispatch(cue);
    }

    /// Start a fresh run, stopping the clock loop of any run in progress.
    pub fn restart(&mut self) {
        if self.state.is_running() {
            self.emit(CueKind::TickLoopStop);
        }
        self.state.start();
        self.emit(CueKind::TickLoopStart);
    }

    /// Handle a player pressing a cut button.
    pub fn player_cut(&mut self, program_id: &str, amount: CutAmount) -> CutOutcome {
        if !self.state.is_started() {
            debug!("first cut before start; starting run");
            self.restart();
        }
        let outcome = self.state.cut(program_id, amount);
        let ended = self.state.check_win_condition();
        if let Some(receipt) = outcome.receipt() {
            let kind = classify_cut(receipt);
            self.emit(kind);
        }
        if ended {
            self.finish();
        }
        outcome
    }

    /// Handle one second of the external timer.
    pub fn timer_tick(&mut self) -> TickOutcome {
        let outcome = self.state.tick();
        match classify_tick(outcome, &self.state) {
            Some(CueKind::Lose) => self.finish(),
            Some(kind) => self.emit(kind),
            None => {}
        }
        outcome
    }

    fn finish(&mut self) {
        self.emit(CueKind::TickLoopStop);
        if let Some(kind) = classify_ending(&self.state) {
            self.emit(kind);
        }
    }

    /// Lift protection, but only once the override control would be offered.
    pub fn override_protection(&mut self) -> bool {
        if !self.state.override_available() {
            debug!("protection override ignored; not yet available");
            return false;
        }
        self.state.toggle_protection_override()
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.state.toggle_sound()
    }

    /// Whether the external timer should keep calling [`Self::timer_tick`].
    #[must_use]
    pub const fn timer_should_run(&self) -> bool {
        self.state.is_running()
    }

    /// Route a queued command through the session so cues fire as they
    /// would for direct calls.
    pub fn handle(&mut self, command: Command) -> Transition {
        match command {
            Command::Start => {
                self.restart();
                Transition::Started
            }
            Command::Cut { program_id, amount } => {
                Transition::Cut(self.player_cut(&program_id, amount))
            }
            Command::Tick => Transition::Ticked(self.timer_tick()),
            Command::CheckWin => {
                let ended = self.state.check_win_condition();
                if ended {
                    self.finish();
                }
                Transition::WinChecked { ended }
            }
            Command::OverrideProtection => Transition::ProtectionOverridden {
                changed: self.override_protection(),
            },
            Command::ToggleSound => Transition::SoundToggled {
                enabled: self.toggle_sound(),
            },
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the session, returning the state and sink.
    #[must_use]
    pub fn into_parts(self) -> (GameState, S) {
        (self.state, self.sink)
    }
}
