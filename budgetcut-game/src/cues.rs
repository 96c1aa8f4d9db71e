//! Audio/video cue classification.
//!
//! The core never plays anything. It classifies transitions into cue kinds
//! and hands them to a [`CueSink`] supplied by the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::{CutReceipt, GameState, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    /// A cut that left budget behind (button press).
    Cut,
    /// A cut that emptied the program (crowd groan).
    Depleted,
    /// A timer tick inside the warning window.
    Warning,
    Win,
    Lose,
    /// Start the looping clock when a run begins.
    TickLoopStart,
    /// Stop the looping clock when a run ends or restarts.
    TickLoopStop,
}

impl CueKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Depleted => "depleted",
            Self::Warning => "warning",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::TickLoopStart => "tick_loop_start",
            Self::TickLoopStop => "tick_loop_stop",
        }
    }
}

impl fmt::Display for CueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified cue together with the sound preference at the time it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub kind: CueKind,
    pub sound_enabled: bool,
}

impl Cue {
    #[must_use]
    pub const fn new(kind: CueKind, sound_enabled: bool) -> Self {
        Self {
            kind,
            sound_enabled,
        }
    }

    /// Whether a sink should actually make noise for this cue.
    #[must_use]
    pub const fn audible(&self) -> bool {
        self.sound_enabled
    }
}

/// Receives cues from a [`crate::GameSession`].
/// Platform-specific implementations should provide this.
pub trait CueSink {
    fn dispatch(&mut self, cue: Cue);
}

/// Sink that drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl CueSink for SilentSink {
    fn dispatch(&mut self, _cue: Cue) {}
}

/// Sink that records cues in order; useful for tests and replays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub cues: Vec<Cue>,
}

impl RecordingSink {
    #[must_use]
    pub fn kinds(&self) -> Vec<CueKind> {
        self.cues.iter().map(|cue| cue.kind).collect()
    }
}

impl CueSink for RecordingSink {
    fn dispatch(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}

impl<T: CueSink + ?Sized> CueSink for &mut T {
    fn dispatch(&mut self, cue: Cue) {
        (**self).dispatch(cue);
    }
}

/// Classify an applied cut. A program counts as depleted when its budget
/// was positive and no larger than the requested denomination.
#[must_use]
pub fn classify_cut(receipt: &CutReceipt) -> CueKind {
    let prior = receipt.previous_budget;
    if prior > 0.0 && prior <= receipt.requested.as_f64() && receipt.depleted() {
        CueKind::Depleted
    } else {
        CueKind::Cut
    }
}

/// Classify a timer tick against the state it produced.
#[must_use]
pub fn classify_tick(outcome: TickOutcome, state: &GameState) -> Option<CueKind> {
    match outcome {
        TickOutcome::Ignored => None,
        TickOutcome::Expired => Some(CueKind::Lose),
        TickOutcome::Counted { time_remaining } => {
            (time_remaining <= state.config().warning_threshold_secs).then_some(CueKind::Warning)
        }
    }
}

/// Cue for a terminal state, if the game is over.
#[must_use]
pub fn classify_ending(state: &GameState) -> Option<CueKind> {
    if !state.is_over() {
        return None;
    }
    Some(if state.has_won() {
        CueKind::Win
    } else {
        CueKind::Lose
    })
}
