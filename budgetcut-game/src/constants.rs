//! Centralized rules and tuning constants for Budget Cut game logic.
//!
//! These values define the deterministic math for the core state machine.
//! Keeping them together ensures the rules can only be adjusted via code
//! changes reviewed in version control.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_GAME_STARTED: &str = "log.game.started";
pub(crate) const LOG_CUT_APPLIED: &str = "log.cut.applied";
pub(crate) const LOG_CUT_DEPLETED: &str = "log.cut.depleted";
pub(crate) const LOG_CUT_AUTO_ZERO: &str = "log.cut.auto-zero";
pub(crate) const LOG_CUT_REJECTED_NOT_RUNNING: &str = "log.cut.rejected.not-running";
pub(crate) const LOG_CUT_REJECTED_UNKNOWN: &str = "log.cut.rejected.unknown-program";
pub(crate) const LOG_CUT_REJECTED_PROTECTED: &str = "log.cut.rejected.protected";
pub(crate) const LOG_TARGET_REACHED: &str = "log.target.reached";
pub(crate) const LOG_TIME_EXPIRED: &str = "log.time.expired";
pub(crate) const LOG_PROTECTION_OVERRIDDEN: &str = "log.protection.overridden";
pub(crate) const LOG_PROTECTION_OVERRIDE_MISSING: &str = "log.protection.override-missing";
pub(crate) const LOG_SOUND_TOGGLED: &str = "log.sound.toggled";

/// Maximum number of diagnostic log keys retained on a game state.
pub(crate) const LOG_HISTORY_LIMIT: usize = 64;

// Rules --------------------------------------------------------------------
/// Cumulative cut (billions) required to win a run.
pub const TARGET_CUTS: f64 = 88.0;
/// Countdown length of a run, in seconds.
pub const INITIAL_TIME_SECS: u32 = 60;
/// Remaining seconds at or below which the timer plays warning cues.
pub const WARNING_THRESHOLD_SECS: u32 = 10;
/// Program that starts every run protected and is capped at the target.
pub const PROTECTED_PROGRAM_ID: &str = "medicaid";
/// Satirical multiplier for the tax savings headline shown on a win.
pub const TAX_SAVINGS_MULTIPLIER: f64 = 1.5;

// Accounting ---------------------------------------------------------------
/// Budgets strictly between zero and this value snap to zero after a cut.
pub const AUTO_ZERO_EPSILON: f64 = 0.001;
/// Decimal places kept after each cut and accumulation.
pub const ROUNDING_DECIMALS: i32 = 3;
/// Budgets below this value are fully depleted by the smaller denomination.
pub const SUB_UNIT_BUDGET: f64 = 1.0;
