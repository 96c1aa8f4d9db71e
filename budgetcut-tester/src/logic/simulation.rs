use budgetcut_game::numbers::currency_eq;
use budgetcut_game::{CueKind, GameSession, GameState, RecordingSink, Transition};
use serde::Serialize;
use thiserror::Error;

use crate::logic::policy::{GameplayStrategy, PlayerAction, PlayerPolicy, PolicyDecision};

pub const MILLIS_PER_SECOND: u64 = 1_000;
const OVERSHOOT_EPSILON: f64 = 1e-9;

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub max_steps: usize,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_steps: 10_000,
        }
    }

    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// A rule of the game that a simulated run broke.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    #[error("program `{program_id}` has negative budget {budget}")]
    NegativeBudget { program_id: String, budget: f64 },
    #[error("cut ledger {ledger} does not match running cuts {cuts}")]
    LedgerMismatch { ledger: f64, cuts: f64 },
    #[error("protected program `{program_id}` moved from {initial} to {budget}")]
    ProtectedBudgetMoved {
        program_id: String,
        initial: f64,
        budget: f64,
    },
    #[error("time remaining {time_remaining}s exceeds the initial {initial}s")]
    ClockOverflow { time_remaining: u32, initial: u32 },
    #[error("run won with ${cuts}B of ${target}B")]
    UnearnedWin { cuts: f64, target: f64 },
    #[error("run lost with {time_remaining}s on the clock")]
    EarlyLoss { time_remaining: u32 },
    #[error("designated cut overshot the target: {before} -> {after} (target {target})")]
    DesignatedOvershoot { before: f64, after: f64, target: f64 },
}

/// Check every state-level rule that must hold between actions.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let roster = &state.config().roster;

    for program in state.programs() {
        if program.budget < 0.0 {
            violations.push(InvariantViolation::NegativeBudget {
                program_id: program.id.clone(),
                budget: program.budget,
            });
        }
        if program.protected
            && let Some(initial) = roster.initial_budget(&program.id)
            && !currency_eq(initial, program.budget)
        {
            violations.push(InvariantViolation::ProtectedBudgetMoved {
                program_id: program.id.clone(),
                initial,
                budget: program.budget,
            });
        }
    }

    let ledger = state.total_cut_from_roster();
    if !currency_eq(ledger, state.current_cuts()) {
        violations.push(InvariantViolation::LedgerMismatch {
            ledger,
            cuts: state.current_cuts(),
        });
    }

    let initial = state.config().initial_time_secs;
    if state.time_remaining() > initial {
        violations.push(InvariantViolation::ClockOverflow {
            time_remaining: state.time_remaining(),
            initial,
        });
    }

    if state.has_won() && !state.target_met() {
        violations.push(InvariantViolation::UnearnedWin {
            cuts: state.current_cuts(),
            target: state.target_cuts(),
        });
    }
    if state.is_over() && !state.has_won() && state.time_remaining() > 0 {
        violations.push(InvariantViolation::EarlyLoss {
            time_remaining: state.time_remaining(),
        });
    }

    violations
}

/// Snapshot of one policy decision and what it did.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub elapsed_millis: u64,
    pub action: String,
    pub applied: bool,
    pub policy_name: String,
    pub rationale: Option<String>,
    pub time_remaining: u32,
    pub current_cuts: f64,
}

/// Result of advancing the simulation by one decision.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub record: StepRecord,
    pub game_ended: bool,
}

/// Deterministic harness: a session driven by a policy against a simulated
/// clock that ticks once per simulated second while the run is live.
pub struct SimulationSession {
    session: GameSession<RecordingSink>,
    clock_millis: u64,
    next_tick_millis: Option<u64>,
    violations: Vec<InvariantViolation>,
    rejections: usize,
}

impl SimulationSession {
    #[must_use]
    pub fn new(state: GameState) -> Self {
        Self {
            session: GameSession::new(state, RecordingSink::default()),
            clock_millis: 0,
            next_tick_millis: None,
            violations: Vec::new(),
            rejections: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        self.session.state()
    }

    #[must_use]
    pub const fn clock_millis(&self) -> u64 {
        self.clock_millis
    }

    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    #[must_use]
    pub const fn rejections(&self) -> usize {
        self.rejections
    }

    #[must_use]
    pub fn cues(&self) -> Vec<CueKind> {
        self.session.sink().kinds()
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.session.into_parts().0
    }

    /// Let simulated time pass, firing the timer on every whole second.
    pub fn advance_clock(&mut self, millis: u64) {
        self.clock_millis = self.clock_millis.saturating_add(millis);
        while let Some(next) = self.next_tick_millis.filter(|next| *next <= self.clock_millis) {
            self.session.timer_tick();
            self.record_violations();
            self.next_tick_millis = self
                .session
                .timer_should_run()
                .then_some(next + MILLIS_PER_SECOND);
        }
    }

    pub fn advance(&mut self, policy: &mut dyn PlayerPolicy) -> StepOutcome {
        let PolicyDecision {
            action,
            think_millis,
            rationale,
        } = policy.next_action(self.session.state());

        self.advance_clock(think_millis);
        let applied = if self.session.state().is_over() {
            false
        } else {
            self.press(&action)
        };
        if !self.session.timer_should_run() {
            self.next_tick_millis = None;
        }
        self.record_violations();

        let state = self.session.state();
        StepOutcome {
            record: StepRecord {
                elapsed_millis: self.clock_millis,
                action: action.label(),
                applied,
                policy_name: policy.name().to_string(),
                rationale,
                time_remaining: state.time_remaining(),
                current_cuts: state.current_cuts(),
            },
            game_ended: state.is_over(),
        }
    }

    fn press(&mut self, action: &PlayerAction) -> bool {
        let Some(command) = action.command() else {
            return false;
        };
        let was_started = self.session.state().is_started();
        let before = self.session.state().current_cuts();
        let designated = matches!(
            action,
            PlayerAction::Cut { program_id, .. }
                if *program_id == self.session.state().config().protected_program_id
        );

        let applied = match self.session.handle(command) {
            Transition::Cut(outcome) => outcome.is_applied(),
            Transition::ProtectionOverridden { changed } => changed,
            _ => true,
        };
        if !applied {
            self.rejections += 1;
        }

        if !was_started && self.session.timer_should_run() {
            self.next_tick_millis = Some(self.clock_millis + MILLIS_PER_SECOND);
        }

        let state = self.session.state();
        let after = state.current_cuts();
        let target = state.target_cuts();
        if designated && applied && after > before.max(target) + OVERSHOOT_EPSILON {
            self.violations
                .push(InvariantViolation::DesignatedOvershoot {
                    before,
                    after,
                    target,
                });
        }
        applied
    }

    fn record_violations(&mut self) {
        for violation in check_invariants(self.session.state()) {
            if !self.violations.contains(&violation) {
                self.violations.push(violation);
            }
        }
    }
}
