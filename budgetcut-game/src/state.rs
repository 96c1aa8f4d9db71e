use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::constants::{
    AUTO_ZERO_EPSILON, LOG_CUT_APPLIED, LOG_CUT_AUTO_ZERO, LOG_CUT_DEPLETED, LOG_GAME_STARTED,
    LOG_HISTORY_LIMIT, LOG_PROTECTION_OVERRIDDEN, LOG_PROTECTION_OVERRIDE_MISSING,
    LOG_SOUND_TOGGLED, LOG_TARGET_REACHED, LOG_TIME_EXPIRED, SUB_UNIT_BUDGET,
};
use crate::error::{ConfigError, Rejection};
use crate::numbers::{round_currency, round_f64_to_i32};
use crate::program::{CutAmount, Program, Roster};

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    NotStarted,
    Running,
    Over {
        won: bool,
    },
}

impl GamePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Over { won: true } => "won",
            Self::Over { won: false } => "lost",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accounting details of an applied cut, enough for a cue dispatcher to
/// classify the event without re-reading the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutReceipt {
    pub program_id: String,
    pub requested: CutAmount,
    pub previous_budget: f64,
    /// Amount removed from the program, before any auto-zero residual.
    pub effective_cut: f64,
    /// Sub-epsilon remainder folded into the cuts when the budget snapped to zero.
    pub residual: f64,
    pub budget_after: f64,
    pub current_cuts: f64,
    /// The designated program's cut was truncated at the remaining target.
    pub capped: bool,
}

impl CutReceipt {
    /// The cut took the program from a positive budget to exactly zero.
    #[must_use]
    pub fn depleted(&self) -> bool {
        self.previous_budget > 0.0 && self.budget_after == 0.0
    }

    /// Total added to the running cuts by this action.
    #[must_use]
    pub fn total_cut(&self) -> f64 {
        round_currency(self.effective_cut + self.residual)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CutOutcome {
    Applied(CutReceipt),
    Rejected(Rejection),
}

impl CutOutcome {
    #[must_use]
    pub const fn receipt(&self) -> Option<&CutReceipt> {
        match self {
            Self::Applied(receipt) => Some(receipt),
            Self::Rejected(_) => None,
        }
    }

    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// The game was not running; nothing changed.
    Ignored,
    Counted { time_remaining: u32 },
    /// The countdown hit zero and the run was lost.
    Expired,
}

/// Presentation view of a single program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub budget: f64,
    pub protected: bool,
    pub depleted: bool,
    pub percent_cut: i32,
}

/// Copy of everything a renderer reads after each state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub programs: Vec<ProgramView>,
    pub current_cuts: f64,
    pub target_cuts: f64,
    pub time_remaining: u32,
    pub started: bool,
    pub over: bool,
    pub won: bool,
    pub sound_enabled: bool,
    pub progress: f64,
    pub override_available: bool,
}

/// The budget game state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredGameState")]
pub struct GameState {
    config: GameConfig,
    programs: Vec<Program>,
    current_cuts: f64,
    time_remaining: u32,
    phase: GamePhase,
    sound_enabled: bool,
    logs: Vec<String>,
}

/// Serialized form of [`GameState`], checked before it becomes a live game.
#[derive(Deserialize)]
struct StoredGameState {
    config: GameConfig,
    programs: Vec<Program>,
    current_cuts: f64,
    time_remaining: u32,
    phase: GamePhase,
    sound_enabled: bool,
    #[serde(default)]
    logs: Vec<String>,
}

impl TryFrom<StoredGameState> for GameState {
    type Error = ConfigError;

    fn try_from(stored: StoredGameState) -> Result<Self, Self::Error> {
        stored.config.validate()?;
        if !stored.current_cuts.is_finite() || stored.current_cuts < 0.0 {
            return Err(ConfigError::InconsistentState {
                reason: format!("cuts total {}", stored.current_cuts),
            });
        }
        if stored.time_remaining > stored.config.initial_time_secs {
            return Err(ConfigError::InconsistentState {
                reason: format!(
                    "{}s left of a {}s clock",
                    stored.time_remaining, stored.config.initial_time_secs
                ),
            });
        }
        let live = Roster::new(stored.programs)?;
        let matches_roster = live.len() == stored.config.roster.len()
            && live
                .programs()
                .iter()
                .all(|program| stored.config.roster.contains(&program.id));
        if !matches_roster {
            return Err(ConfigError::InconsistentState {
                reason: "programs differ from the roster".to_string(),
            });
        }
        let programs = live.instantiate();
        Ok(Self {
            config: stored.config,
            programs,
            current_cuts: round_currency(stored.current_cuts),
            time_remaining: stored.time_remaining,
            phase: stored.phase,
            sound_enabled: stored.sound_enabled,
            logs: stored.logs,
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::from_valid_config(GameConfig::default())
    }
}

impl GameState {
    /// Create a not-yet-started game from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration violates its invariants.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: GameConfig) -> Self {
        let programs = config.roster.instantiate();
        let time_remaining = config.initial_time_secs;
        Self {
            config,
            programs,
            current_cuts: 0.0,
            time_remaining,
            phase: GamePhase::NotStarted,
            sound_enabled: true,
            logs: Vec::new(),
        }
    }

    /// Begin a fresh run from any phase, rebuilding every program from the
    /// reference roster.
    pub fn start(&mut self) {
        self.programs = self.config.roster.instantiate();
        self.current_cuts = 0.0;
        self.time_remaining = self.config.initial_time_secs;
        self.phase = GamePhase::Running;
        self.push_log(LOG_GAME_STARTED);
        info!(
            "run started: target ${}B in {}s",
            self.config.target_cuts, self.time_remaining
        );
    }

    /// Cut `amount` from `program_id`. Never ends the game; callers follow
    /// up with [`GameState::check_win_condition`].
    pub fn cut(&mut self, program_id: &str, amount: CutAmount) -> CutOutcome {
        if self.phase != GamePhase::Running {
            return self.reject(Rejection::NotRunning);
        }
        let Some(index) = self.programs.iter().position(|p| p.id == program_id) else {
            return self.reject(Rejection::UnknownProgram {
                program_id: program_id.to_string(),
            });
        };
        if self.programs[index].protected {
            return self.reject(Rejection::Protected {
                program_id: program_id.to_string(),
            });
        }

        let previous_budget = self.programs[index].budget;
        let mut effective = if previous_budget < SUB_UNIT_BUDGET && amount.is_smallest() {
            previous_budget
        } else {
            amount.as_f64().min(previous_budget)
        };

        let mut capped = false;
        if program_id == self.config.protected_program_id {
            let remaining = round_currency(self.config.target_cuts - self.current_cuts).max(0.0);
            if effective > remaining {
                effective = remaining;
                capped = true;
            }
        }
        let effective_cut = round_currency(effective.max(0.0));

        let mut raw_after = previous_budget - effective_cut;
        let mut residual = 0.0;
        if raw_after > 0.0 && raw_after < AUTO_ZERO_EPSILON {
            residual = raw_after;
            raw_after = 0.0;
        }
        let budget_after = round_currency(raw_after).max(0.0);
        self.programs[index].budget = budget_after;
        self.current_cuts = round_currency(self.current_cuts + effective_cut + residual);

        let receipt = CutReceipt {
            program_id: program_id.to_string(),
            requested: amount,
            previous_budget,
            effective_cut,
            residual,
            budget_after,
            current_cuts: self.current_cuts,
            capped,
        };
        if residual > 0.0 {
            self.push_log(LOG_CUT_AUTO_ZERO);
        }
        if receipt.depleted() {
            self.push_log(LOG_CUT_DEPLETED);
        } else {
            self.push_log(LOG_CUT_APPLIED);
        }
        debug!(
            "cut {program_id} by {effective_cut} (requested {amount}): {previous_budget} -> {budget_after}, total {}",
            self.current_cuts
        );
        CutOutcome::Applied(receipt)
    }

    fn reject(&mut self, rejection: Rejection) -> CutOutcome {
        warn!("cut rejected: {rejection}");
        self.push_log(rejection.log_key());
        CutOutcome::Rejected(rejection)
    }

    /// End the run as a win once the target is met. Returns whether the
    /// phase changed; repeated calls after the win are no-ops.
    pub fn check_win_condition(&mut self) -> bool {
        if self.phase != GamePhase::Running || !self.target_met() {
            return false;
        }
        self.phase = GamePhase::Over { won: true };
        self.push_log(LOG_TARGET_REACHED);
        info!(
            "target reached: ${}B cut with {}s left",
            self.current_cuts, self.time_remaining
        );
        true
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != GamePhase::Running {
            return TickOutcome::Ignored;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining > 0 {
            return TickOutcome::Counted {
                time_remaining: self.time_remaining,
            };
        }
        self.phase = GamePhase::Over { won: false };
        self.push_log(LOG_TIME_EXPIRED);
        info!("time expired with ${}B cut", self.current_cuts);
        TickOutcome::Expired
    }

    /// Lift protection from the designated program for the rest of the run.
    /// Callers check [`GameState::override_available`] first; this does not.
    /// Returns whether a protection flag was actually cleared.
    pub fn toggle_protection_override(&mut self) -> bool {
        let id = self.config.protected_program_id.clone();
        let Some(index) = self.programs.iter().position(|p| p.id == id) else {
            warn!("protection override requested but `{id}` is not in play");
            self.push_log(LOG_PROTECTION_OVERRIDE_MISSING);
            return false;
        };
        let changed = self.programs[index].protected;
        self.programs[index].protected = false;
        if changed {
            self.push_log(LOG_PROTECTION_OVERRIDDEN);
            info!("protection lifted from `{id}`");
        }
        changed
    }

    /// Flip the sound preference, returning the new value.
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.push_log(LOG_SOUND_TOGGLED);
        self.sound_enabled
    }

    fn push_log(&mut self, key: &str) {
        if self.logs.len() >= LOG_HISTORY_LIMIT {
            self.logs.remove(0);
        }
        self.logs.push(key.to_string());
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    #[must_use]
    pub fn program(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub const fn current_cuts(&self) -> f64 {
        self.current_cuts
    }

    #[must_use]
    pub const fn target_cuts(&self) -> f64 {
        self.config.target_cuts
    }

    #[must_use]
    pub const fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Running)
    }

    /// Matches the presentation's "started" flag, which stays set after the run ends.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        !matches!(self.phase, GamePhase::NotStarted)
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Over { .. })
    }

    #[must_use]
    pub const fn has_won(&self) -> bool {
        matches!(self.phase, GamePhase::Over { won: true })
    }

    #[must_use]
    pub const fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    #[must_use]
    pub fn target_met(&self) -> bool {
        round_currency(self.current_cuts - self.config.target_cuts) >= 0.0
    }

    /// Unprotected programs that still have budget to cut.
    #[must_use]
    pub fn depletable_remaining(&self) -> usize {
        self.programs.iter().filter(|p| p.is_cuttable()).count()
    }

    /// Fraction of the target achieved, clamped to `[0, 1]` for display.
    #[must_use]
    pub fn progress(&self) -> f64 {
        (self.current_cuts / self.config.target_cuts).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn remaining_to_target(&self) -> f64 {
        round_currency(self.config.target_cuts - self.current_cuts).max(0.0)
    }

    /// Whole-number percentage cut from the program's starting budget.
    #[must_use]
    pub fn percent_cut(&self, id: &str) -> Option<i32> {
        let program = self.program(id)?;
        let initial = self.config.roster.initial_budget(id)?;
        if initial <= 0.0 {
            return Some(0);
        }
        Some(round_f64_to_i32(
            (initial - program.budget) / initial * 100.0,
        ))
    }

    /// Σ(initial − current) over the roster; equals `current_cuts` at the
    /// accounting precision.
    #[must_use]
    pub fn total_cut_from_roster(&self) -> f64 {
        let total: f64 = self
            .programs
            .iter()
            .map(|p| self.config.roster.initial_budget(&p.id).unwrap_or(p.budget) - p.budget)
            .sum();
        round_currency(total)
    }

    /// Every unprotected program is empty and the target is still unmet, so
    /// the only way forward is cutting the protected program.
    #[must_use]
    pub fn override_available(&self) -> bool {
        self.is_running()
            && self.depletable_remaining() == 0
            && !self.target_met()
            && self
                .program(&self.config.protected_program_id)
                .is_some_and(|p| p.protected)
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let programs = self
            .programs
            .iter()
            .map(|p| ProgramView {
                id: p.id.clone(),
                name: p.name.clone(),
                description: p.description.clone(),
                budget: p.budget,
                protected: p.protected,
                depleted: p.is_depleted(),
                percent_cut: self.percent_cut(&p.id).unwrap_or(0),
            })
            .collect();
        GameSnapshot {
            programs,
            current_cuts: self.current_cuts,
            target_cuts: self.config.target_cuts,
            time_remaining: self.time_remaining,
            started: self.is_started(),
            over: self.is_over(),
            won: self.has_won(),
            sound_enabled: self.sound_enabled,
            progress: self.progress(),
            override_available: self.override_available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> GameState {
        let mut state = GameState::default();
        state.start();
        state
    }

    fn deplete_unprotected(state: &mut GameState) {
        let ids: Vec<String> = state
            .programs()
            .iter()
            .filter(|p| !p.protected)
            .map(|p| p.id.clone())
            .collect();
        for id in ids {
            while state.program(&id).is_some_and(Program::is_cuttable) {
                assert!(state.cut(&id, CutAmount::Ten).is_applied());
            }
        }
    }

    #[test]
    fn new_state_is_not_started() {
        let state = GameState::default();
        assert_eq!(state.phase(), GamePhase::NotStarted);
        assert!(!state.is_started());
        assert_eq!(state.time_remaining(), 60);
        assert!(state.current_cuts().abs() < f64::EPSILON);
        assert!(state.sound_enabled());
        assert_eq!(state.programs(), Roster::standard().programs());
    }

    #[test]
    fn cut_rejected_before_start() {
        let mut state = GameState::default();
        let outcome = state.cut("chip", CutAmount::One);
        assert_eq!(outcome, CutOutcome::Rejected(Rejection::NotRunning));
        assert!((state.program("chip").unwrap().budget - 17.0).abs() < f64::EPSILON);
        assert_eq!(state.logs().last().unwrap(), "log.cut.rejected.not-running");
    }

    #[test]
    fn cut_rejects_unknown_and_protected_programs() {
        let mut state = running();
        let before = state.clone();
        assert!(matches!(
            state.cut("nasa", CutAmount::Ten),
            CutOutcome::Rejected(Rejection::UnknownProgram { .. })
        ));
        assert!(matches!(
            state.cut("medicaid", CutAmount::Ten),
            CutOutcome::Rejected(Rejection::Protected { .. })
        ));
        assert_eq!(state.programs(), before.programs());
        assert!(state.current_cuts().abs() < f64::EPSILON);
    }

    #[test]
    fn ten_cut_is_bounded_by_budget() {
        let mut state = running();
        let receipt = state.cut("fda", CutAmount::Ten).receipt().cloned().unwrap();
        assert!((receipt.effective_cut - 6.5).abs() < f64::EPSILON);
        assert_eq!(receipt.budget_after, 0.0);
        assert!(receipt.depleted());
        assert!((state.current_cuts() - 6.5).abs() < f64::EPSILON);
        assert_eq!(state.logs().last().unwrap(), "log.cut.depleted");
    }

    #[test]
    fn smallest_denomination_depletes_sub_unit_budget() {
        let mut state = running();
        let receipt = state.cut("ntia", CutAmount::One).receipt().cloned().unwrap();
        assert_eq!(receipt.budget_after, 0.0);
        assert!(receipt.budget_after.is_sign_positive());
        assert!((state.current_cuts() - 0.072).abs() < f64::EPSILON);
    }

    #[test]
    fn repeated_ones_leave_no_fractional_remainder() {
        let mut state = running();
        for _ in 0..8 {
            state.cut("cdc", CutAmount::One);
        }
        assert!((state.program("cdc").unwrap().budget - 0.1).abs() < 1e-12);
        state.cut("cdc", CutAmount::One);
        assert_eq!(state.program("cdc").unwrap().budget, 0.0);
        assert_eq!(state.current_cuts(), 8.1);
    }

    #[test]
    fn cutting_depleted_program_applies_nothing() {
        let mut state = running();
        state.cut("fda", CutAmount::Ten);
        let receipt = state.cut("fda", CutAmount::One).receipt().cloned().unwrap();
        assert_eq!(receipt.effective_cut, 0.0);
        assert!(!receipt.depleted());
        assert!((state.current_cuts() - 6.5).abs() < f64::EPSILON);
    }

    #[test]
    fn auto_zero_folds_float_noise_into_cuts() {
        let roster = Roster::new(vec![
            Program::new("medicaid", "Medicaid", 100.0, "").protected(),
            Program::new("tiny", "Tiny", 1.0, ""),
        ])
        .unwrap();
        let mut state = GameState::new(GameConfig::default().with_roster(roster)).unwrap();
        state.start();
        // Force a sub-epsilon remainder as if float drift had left one behind.
        state.programs[1].budget = 1.000_4;
        let receipt = state.cut("tiny", CutAmount::One).receipt().cloned().unwrap();
        assert_eq!(receipt.budget_after, 0.0);
        assert!(receipt.residual > 0.0);
        assert!(state.logs().iter().any(|key| key == "log.cut.auto-zero"));
        assert_eq!(state.current_cuts(), 1.0);
    }

    #[test]
    fn override_lifts_protection_and_caps_at_target() {
        let mut state = running();
        deplete_unprotected(&mut state);
        assert!((state.current_cuts() - 86.39).abs() < 1e-9);
        assert!(state.override_available());
        assert!(matches!(
            state.cut("medicaid", CutAmount::Ten),
            CutOutcome::Rejected(Rejection::Protected { .. })
        ));

        assert!(state.toggle_protection_override());
        assert!(!state.toggle_protection_override());
        assert!(!state.override_available());

        let receipt = state
            .cut("medicaid", CutAmount::Ten)
            .receipt()
            .cloned()
            .unwrap();
        assert!(receipt.capped);
        assert!((receipt.effective_cut - 1.61).abs() < 1e-9);
        assert_eq!(state.current_cuts(), 88.0);
        assert!((state.program("medicaid").unwrap().budget - 559.39).abs() < 1e-9);

        let extra = state
            .cut("medicaid", CutAmount::Ten)
            .receipt()
            .cloned()
            .unwrap();
        assert_eq!(extra.effective_cut, 0.0);
        assert_eq!(state.current_cuts(), 88.0);
    }

    #[test]
    fn win_check_is_idempotent() {
        let mut state = running();
        deplete_unprotected(&mut state);
        assert!(!state.check_win_condition());
        state.toggle_protection_override();
        state.cut("medicaid", CutAmount::One);
        state.cut("medicaid", CutAmount::One);
        assert!(state.check_win_condition());
        let after_first = state.clone();
        assert!(!state.check_win_condition());
        assert!(!state.check_win_condition());
        assert_eq!(state, after_first);
        assert!(state.has_won());
        assert!(state.is_over());
    }

    #[test]
    fn sixty_ticks_expire_the_run_at_zero() {
        let mut state = running();
        for second in 1..60 {
            assert_eq!(
                state.tick(),
                TickOutcome::Counted {
                    time_remaining: 60 - second
                }
            );
        }
        assert_eq!(state.tick(), TickOutcome::Expired);
        assert_eq!(state.time_remaining(), 0);
        assert_eq!(state.phase(), GamePhase::Over { won: false });
        assert_eq!(state.tick(), TickOutcome::Ignored);
        assert_eq!(state.time_remaining(), 0);
    }

    #[test]
    fn tick_ignored_before_start() {
        let mut state = GameState::default();
        assert_eq!(state.tick(), TickOutcome::Ignored);
        assert_eq!(state.time_remaining(), 60);
    }

    #[test]
    fn start_restores_protection_and_budgets() {
        let mut state = running();
        deplete_unprotected(&mut state);
        state.toggle_protection_override();
        state.cut("medicaid", CutAmount::Ten);
        state.check_win_condition();
        assert!(state.is_over());

        state.start();
        assert_eq!(state.phase(), GamePhase::Running);
        assert!(state.program("medicaid").unwrap().protected);
        assert_eq!(state.programs(), Roster::standard().programs());
        assert!(state.current_cuts().abs() < f64::EPSILON);
        assert_eq!(state.time_remaining(), 60);
    }

    #[test]
    fn percent_cut_is_relative_to_reference_budget() {
        let mut state = running();
        state.cut("chip", CutAmount::Ten);
        assert_eq!(state.percent_cut("chip"), Some(59));
        assert_eq!(state.percent_cut("cdc"), Some(0));
        assert_eq!(state.percent_cut("nasa"), None);
    }

    #[test]
    fn sound_toggle_is_orthogonal_to_phase() {
        let mut state = GameState::default();
        assert!(!state.toggle_sound());
        assert_eq!(state.phase(), GamePhase::NotStarted);
        assert!(state.toggle_sound());
    }

    #[test]
    fn snapshot_reflects_derived_fields() {
        let mut state = running();
        state.cut("ntia", CutAmount::One);
        let snapshot = state.snapshot();
        let ntia = snapshot.programs.iter().find(|p| p.id == "ntia").unwrap();
        assert!(ntia.depleted);
        assert_eq!(ntia.percent_cut, 100);
        assert!(snapshot.started);
        assert!(!snapshot.over);
        assert!(snapshot.progress > 0.0 && snapshot.progress < 0.01);
    }

    #[test]
    fn log_history_is_bounded() {
        let mut state = GameState::default();
        for _ in 0..(LOG_HISTORY_LIMIT + 10) {
            state.toggle_sound();
        }
        assert_eq!(state.logs().len(), LOG_HISTORY_LIMIT);
    }

    #[test]
    fn stored_state_reloads_mid_run() {
        let mut state = running();
        state.cut("chip", CutAmount::Ten);
        state.tick();
        let json = serde_json::to_string(&state).unwrap();
        let reloaded: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, state);
    }

    #[test]
    fn stored_state_with_broken_rules_is_refused() {
        let state = running();
        let mut value = serde_json::to_value(&state).unwrap();
        value["config"]["target_cuts"] = serde_json::json!(0.0);
        assert!(serde_json::from_value::<GameState>(value).is_err());

        let mut value = serde_json::to_value(&state).unwrap();
        value["time_remaining"] = serde_json::json!(999);
        let err = serde_json::from_value::<GameState>(value).unwrap_err();
        assert!(err.to_string().contains("999s left of a 60s clock"));

        let mut value = serde_json::to_value(&state).unwrap();
        value["programs"][1]["id"] = serde_json::json!("nasa");
        assert!(serde_json::from_value::<GameState>(value).is_err());
    }
}
