//! Error types for roster/config loading and rejected player actions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when roster or game configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("roster must contain at least one program")]
    EmptyRoster,
    #[error("program id must not be empty (position {index})")]
    EmptyProgramId { index: usize },
    #[error("duplicate program id `{id}`")]
    DuplicateProgram { id: String },
    #[error("program `{id}` has invalid budget {budget}")]
    InvalidBudget { id: String, budget: f64 },
    #[error("target cuts must be positive and finite (got {value})")]
    InvalidTarget { value: f64 },
    #[error("target cuts must use at most 3 decimal places (got {value})")]
    TargetPrecision { value: f64 },
    #[error("initial time must be at least one second")]
    ZeroDuration,
    #[error("warning threshold {threshold}s exceeds initial time {initial}s")]
    WarningThreshold { threshold: u32, initial: u32 },
    #[error("protected program `{id}` is not in the roster")]
    MissingProtectedProgram { id: String },
    #[error("stored game is inconsistent: {reason}")]
    InconsistentState { reason: String },
}

/// Errors raised while creating a game through [`crate::GameEngine`].
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to load configuration")]
    Load(#[source] E),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Reasons a cut is refused. Rejections are non-fatal: the state is left
/// untouched and the reason is logged and handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("game is not running")]
    NotRunning,
    #[error("unknown program `{program_id}`")]
    UnknownProgram { program_id: String },
    #[error("program `{program_id}` is protected")]
    Protected { program_id: String },
}

impl Rejection {
    /// Diagnostic log key recorded on the game state.
    #[must_use]
    pub const fn log_key(&self) -> &'static str {
        match self {
            Self::NotRunning => crate::constants::LOG_CUT_REJECTED_NOT_RUNNING,
            Self::UnknownProgram { .. } => crate::constants::LOG_CUT_REJECTED_UNKNOWN,
            Self::Protected { .. } => crate::constants::LOG_CUT_REJECTED_PROTECTED,
        }
    }
}
