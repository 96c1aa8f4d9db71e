//! Closed set of actions accepted by the state machine.
//!
//! Presentation layers and test drivers that queue actions (rather than
//! calling [`GameState`] methods directly) send [`Command`]s and get back a
//! [`Transition`] describing what changed.

use serde::{Deserialize, Serialize};

use crate::program::CutAmount;
use crate::state::{CutOutcome, GamePhase, GameState, TickOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Start,
    Cut {
        program_id: String,
        amount: CutAmount,
    },
    Tick,
    CheckWin,
    OverrideProtection,
    ToggleSound,
}

impl Command {
    #[must_use]
    pub fn cut(program_id: impl Into<String>, amount: CutAmount) -> Self {
        Self::Cut {
            program_id: program_id.into(),
            amount,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Cut { .. } => "cut",
            Self::Tick => "tick",
            Self::CheckWin => "check_win",
            Self::OverrideProtection => "override_protection",
            Self::ToggleSound => "toggle_sound",
        }
    }
}

/// Result of applying one [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    Started,
    Cut(CutOutcome),
    Ticked(TickOutcome),
    WinChecked { ended: bool },
    ProtectionOverridden { changed: bool },
    SoundToggled { enabled: bool },
}

impl Transition {
    /// Whether this transition moved the game into its terminal phase.
    #[must_use]
    pub const fn ended_run(&self) -> bool {
        matches!(
            self,
            Self::Ticked(TickOutcome::Expired) | Self::WinChecked { ended: true }
        )
    }
}

impl GameState {
    /// Apply a command, dispatching exhaustively over every action kind.
    pub fn apply(&mut self, command: Command) -> Transition {
        match command {
            Command::Start => {
                self.start();
                Transition::Started
            }
            Command::Cut { program_id, amount } => Transition::Cut(self.cut(&program_id, amount)),
            Command::Tick => Transition::Ticked(self.tick()),
            Command::CheckWin => Transition::WinChecked {
                ended: self.check_win_condition(),
            },
            Command::OverrideProtection => Transition::ProtectionOverridden {
                changed: self.toggle_protection_override(),
            },
            Command::ToggleSound => Transition::SoundToggled {
                enabled: self.toggle_sound(),
            },
        }
    }

    /// Apply a sequence of commands, returning the phase after the last one.
    pub fn apply_all<I>(&mut self, commands: I) -> GamePhase
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.apply(command);
        }
        self.phase()
    }
}
