//! Game configuration passed explicitly into the state machine.
use serde::{Deserialize, Serialize};

use crate::constants::{
    INITIAL_TIME_SECS, PROTECTED_PROGRAM_ID, TARGET_CUTS, WARNING_THRESHOLD_SECS,
};
use crate::error::ConfigError;
use crate::numbers::round_currency;
use crate::program::Roster;

/// Rules and reference roster for a game. Owned by the state machine and
/// never mutated; every `start` re-instantiates programs from `roster`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_target_cuts")]
    pub target_cuts: f64,
    #[serde(default = "GameConfig::default_initial_time_secs")]
    pub initial_time_secs: u32,
    #[serde(default = "GameConfig::default_warning_threshold_secs")]
    pub warning_threshold_secs: u32,
    /// Program capped at the remaining target once its protection is lifted.
    #[serde(default = "GameConfig::default_protected_program_id")]
    pub protected_program_id: String,
    #[serde(default)]
    pub roster: Roster,
}

impl GameConfig {
    const fn default_target_cuts() -> f64 {
        TARGET_CUTS
    }

    const fn default_initial_time_secs() -> u32 {
        INITIAL_TIME_SECS
    }

    const fn default_warning_threshold_secs() -> u32 {
        WARNING_THRESHOLD_SECS
    }

    fn default_protected_program_id() -> String {
        PROTECTED_PROGRAM_ID.to_string()
    }

    /// Parse a configuration document; missing fields take the standard rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the reference roster.
    #[must_use]
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    #[must_use]
    pub fn with_target_cuts(mut self, target_cuts: f64) -> Self {
        self.target_cuts = target_cuts;
        self
    }

    #[must_use]
    pub fn with_initial_time(mut self, secs: u32) -> Self {
        self.initial_time_secs = secs;
        self
    }

    /// Check rule invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_cuts.is_finite() || self.target_cuts <= 0.0 {
            return Err(ConfigError::InvalidTarget {
                value: self.target_cuts,
            });
        }
        if round_currency(self.target_cuts) != self.target_cuts {
            return Err(ConfigError::TargetPrecision {
                value: self.target_cuts,
            });
        }
        if self.initial_time_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.warning_threshold_secs > self.initial_time_secs {
            return Err(ConfigError::WarningThreshold {
                threshold: self.warning_threshold_secs,
                initial: self.initial_time_secs,
            });
        }
        if !self.roster.contains(&self.protected_program_id) {
            return Err(ConfigError::MissingProtectedProgram {
                id: self.protected_program_id.clone(),
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            target_cuts: TARGET_CUTS,
            initial_time_secs: INITIAL_TIME_SECS,
            warning_threshold_secs: WARNING_THRESHOLD_SECS,
            protected_program_id: PROTECTED_PROGRAM_ID.to_string(),
            roster: Roster::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert!((config.target_cuts - 88.0).abs() < f64::EPSILON);
        assert_eq!(config.initial_time_secs, 60);
        assert_eq!(config.protected_program_id, "medicaid");
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = GameConfig::from_json(r#"{"initial_time_secs": 30}"#).unwrap();
        assert_eq!(config.initial_time_secs, 30);
        assert_eq!(&config.roster, Roster::standard());
    }

    #[test]
    fn validate_flags_missing_protected_program() {
        let roster = Roster::new(vec![Program::new("chip", "CHIP", 17.0, "")]).unwrap();
        let config = GameConfig::default().with_roster(roster);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingProtectedProgram { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_rules() {
        let zero_target = GameConfig::default().with_target_cuts(0.0);
        assert!(matches!(
            zero_target.validate(),
            Err(ConfigError::InvalidTarget { .. })
        ));
        let zero_time = GameConfig::default().with_initial_time(0);
        assert!(matches!(zero_time.validate(), Err(ConfigError::ZeroDuration)));
        let short = GameConfig::default().with_initial_time(5);
        assert!(matches!(
            short.validate(),
            Err(ConfigError::WarningThreshold { .. })
        ));
    }

    #[test]
    fn target_finer_than_accounting_precision_is_refused() {
        let err = GameConfig::from_json(r#"{"target_cuts": 10.0005}"#).unwrap_err();
        assert!(matches!(err, ConfigError::TargetPrecision { .. }));
        assert!(err.to_string().contains("3 decimal places"));

        let config = GameConfig::from_json(r#"{"target_cuts": 12.345}"#).unwrap();
        assert!((config.target_cuts - 12.345).abs() < f64::EPSILON);
    }
}
