//! End-of-run result calculation
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::TAX_SAVINGS_MULTIPLIER;
use crate::numbers::round_currency;
use crate::state::GameState;

/// Possible run endings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Target reached before the clock ran out
    Victory,
    /// Countdown hit zero
    Timeout,
    /// Run ended below the target with time still on the clock
    ShortOfTarget,
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory => write!(f, "victory"),
            Self::Timeout => write!(f, "timeout"),
            Self::ShortOfTarget => write!(f, "short_of_target"),
        }
    }
}

/// Summary of a finished run for display on the result modal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub ending: Ending,
    pub headline: String,
    pub message: String,
    pub current_cuts: f64,
    pub target_cuts: f64,
    pub time_remaining: u32,
    /// Only reported on a win.
    pub tax_savings: Option<f64>,
}

/// Select the ending of a finished run, or `None` while it is still in play.
#[must_use]
pub fn select_ending(gs: &GameState) -> Option<Ending> {
    if !gs.is_over() {
        return None;
    }
    if gs.has_won() {
        return Some(Ending::Victory);
    }
    if gs.time_remaining() == 0 {
        Some(Ending::Timeout)
    } else {
        Some(Ending::ShortOfTarget)
    }
}

/// Build the result summary for a finished run.
#[must_use]
pub fn result_summary(gs: &GameState) -> Option<ResultSummary> {
    let ending = select_ending(gs)?;
    let cuts = gs.current_cuts();
    let target = gs.target_cuts();
    let (headline, message, tax_savings) = match ending {
        Ending::Victory => (
            "Game Over - Billionaires Win!".to_string(),
            format!("Congratulations! You successfully cut ${cuts:.1}B from public programs!"),
            Some(round_currency(target * TAX_SAVINGS_MULTIPLIER)),
        ),
        Ending::Timeout => (
            "Failed to Follow the Law!".to_string(),
            format!("You ran out of time. The law requires ${target}B in cuts - no exceptions!"),
            None,
        ),
        Ending::ShortOfTarget => (
            "Failed to Follow the Law!".to_string(),
            format!(
                "You only cut ${cuts:.1}B. The law requires ${target}B in cuts - no exceptions!"
            ),
            None,
        ),
    };
    Some(ResultSummary {
        ending,
        headline,
        message,
        current_cuts: cuts,
        target_cuts: target,
        time_remaining: gs.time_remaining(),
        tax_savings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::CutAmount;

    #[test]
    fn no_summary_while_running() {
        let mut gs = GameState::default();
        assert!(result_summary(&gs).is_none());
        gs.start();
        assert!(result_summary(&gs).is_none());
    }

    #[test]
    fn timeout_summary_mentions_time() {
        let mut gs = GameState::default();
        gs.start();
        gs.cut("chip", CutAmount::Ten);
        for _ in 0..60 {
            gs.tick();
        }
        let summary = result_summary(&gs).unwrap();
        assert_eq!(summary.ending, Ending::Timeout);
        assert!(summary.message.contains("ran out of time"));
        assert!(summary.message.contains("$88B"));
        assert!(summary.tax_savings.is_none());
    }

    #[test]
    fn victory_reports_tax_savings() {
        let mut gs = GameState::default();
        gs.start();
        for id in ["chip", "chip", "cdc", "fda", "doe", "doe", "doe", "doe", "doe", "epa"] {
            gs.cut(id, CutAmount::Ten);
        }
        for id in ["fcc", "ntia", "ftc"] {
            gs.cut(id, CutAmount::One);
        }
        gs.toggle_protection_override();
        gs.cut("medicaid", CutAmount::Ten);
        assert!(gs.check_win_condition());
        let summary = result_summary(&gs).unwrap();
        assert_eq!(summary.ending, Ending::Victory);
        assert_eq!(summary.headline, "Game Over - Billionaires Win!");
        assert!(summary.message.contains("$88.0B"));
        assert_eq!(summary.tax_savings, Some(132.0));
    }

    #[test]
    fn ending_display_is_snake_case() {
        assert_eq!(Ending::ShortOfTarget.to_string(), "short_of_target");
    }
}
