//! Programs, cut denominations, and the immutable reference roster.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::error::ConfigError;
use crate::numbers::round_currency;

const STANDARD_ROSTER: &str = include_str!("../assets/programs.json");

/// A government budget line that can be cut during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    /// Remaining budget in billions.
    pub budget: f64,
    /// Protected programs refuse every cut until the override is used.
    #[serde(default, alias = "isUntouchable")]
    pub protected: bool,
    #[serde(default)]
    pub description: String,
}

impl Program {
    #[must_use]
    pub fn new(id: &str, name: &str, budget: f64, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            budget,
            protected: false,
            description: description.to_string(),
        }
    }

    #[must_use]
    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.budget == 0.0
    }

    /// Whether a cut could still reduce this program right now.
    #[must_use]
    pub fn is_cuttable(&self) -> bool {
        !self.protected && self.budget > 0.0
    }
}

/// The two fixed cut denominations, in billions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CutAmount {
    One,
    Ten,
}

impl CutAmount {
    pub const ALL: [Self; 2] = [Self::Ten, Self::One];

    #[must_use]
    pub const fn billions(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Ten => 10,
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.billions())
    }

    /// The smaller denomination fully depletes sub-unit budgets.
    #[must_use]
    pub const fn is_smallest(self) -> bool {
        matches!(self, Self::One)
    }
}

impl fmt::Display for CutAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-${}B", self.billions())
    }
}

/// A denomination other than 1 or 10 was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cut amount must be 1 or 10 (got {0})")]
pub struct InvalidCutAmount(pub u32);

impl TryFrom<u32> for CutAmount {
    type Error = InvalidCutAmount;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            10 => Ok(Self::Ten),
            other => Err(InvalidCutAmount(other)),
        }
    }
}

impl From<CutAmount> for u32 {
    fn from(value: CutAmount) -> Self {
        value.billions()
    }
}

/// Immutable list of starting programs used as the reset template and as
/// the baseline for percentage-cut displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Program>", into = "Vec<Program>")]
pub struct Roster {
    programs: Vec<Program>,
}

impl Roster {
    /// Build a roster, validating ids and budgets. Budgets are normalized to
    /// the accounting precision.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster is empty, an id is empty or repeated,
    /// or a budget is negative or non-finite.
    pub fn new(mut programs: Vec<Program>) -> Result<Self, ConfigError> {
        if programs.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        let mut seen = HashSet::with_capacity(programs.len());
        for (index, program) in programs.iter().enumerate() {
            if program.id.trim().is_empty() {
                return Err(ConfigError::EmptyProgramId { index });
            }
            if !seen.insert(program.id.as_str()) {
                return Err(ConfigError::DuplicateProgram {
                    id: program.id.clone(),
                });
            }
            if !program.budget.is_finite() || program.budget < 0.0 {
                return Err(ConfigError::InvalidBudget {
                    id: program.id.clone(),
                    budget: program.budget,
                });
            }
        }
        for program in &mut programs {
            program.budget = round_currency(program.budget);
        }
        Ok(Self { programs })
    }

    /// Load a roster from a JSON array of programs.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the roster is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse the embedded roster asset. A broken asset yields an empty
    /// roster, which every config built on it then fails to validate.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(STANDARD_ROSTER).unwrap_or_else(|err| {
            log::error!("embedded roster failed to load: {err}");
            Self {
                programs: Vec::new(),
            }
        })
    }

    /// The built-in Energy & Commerce roster.
    #[must_use]
    pub fn standard() -> &'static Self {
        static STANDARD: OnceLock<Roster> = OnceLock::new();
        STANDARD.get_or_init(Self::load_from_static)
    }

    #[must_use]
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|program| program.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Starting budget for `id`, or `None` for programs outside the roster.
    #[must_use]
    pub fn initial_budget(&self, id: &str) -> Option<f64> {
        self.get(id).map(|program| program.budget)
    }

    #[must_use]
    pub fn total_budget(&self) -> f64 {
        self.programs.iter().map(|program| program.budget).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Fresh live copies of every program for a new run.
    #[must_use]
    pub fn instantiate(&self) -> Vec<Program> {
        self.programs.clone()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl TryFrom<Vec<Program>> for Roster {
    type Error = ConfigError;

    fn try_from(value: Vec<Program>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Roster> for Vec<Program> {
    fn from(value: Roster) -> Self {
        value.programs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_roster_comes_from_asset() {
        let parsed = Roster::from_json(STANDARD_ROSTER).unwrap();
        assert_eq!(&parsed, Roster::standard());
        assert_eq!(Roster::load_from_static(), parsed);
        assert_eq!(parsed.len(), 9);
        assert!(parsed.get("medicaid").unwrap().protected);
        assert!(!parsed.get("ntia").unwrap().protected);
        assert!((parsed.initial_budget("fcc").unwrap() - 0.388).abs() < 1e-12);
    }

    #[test]
    fn roster_rejects_duplicates_and_negative_budgets() {
        let dup = vec![
            Program::new("a", "A", 1.0, ""),
            Program::new("a", "A again", 2.0, ""),
        ];
        assert!(matches!(
            Roster::new(dup),
            Err(ConfigError::DuplicateProgram { id }) if id == "a"
        ));

        let negative = vec![Program::new("a", "A", -1.0, "")];
        assert!(matches!(
            Roster::new(negative),
            Err(ConfigError::InvalidBudget { .. })
        ));
        assert!(matches!(Roster::new(Vec::new()), Err(ConfigError::EmptyRoster)));
    }

    #[test]
    fn roster_json_validates_on_parse() {
        let err = Roster::from_json(r#"[{"id":"","name":"x","budget":1.0}]"#).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn instantiate_returns_independent_copies() {
        let roster = Roster::standard();
        let mut live = roster.instantiate();
        live[1].budget = 0.0;
        assert_eq!(roster.initial_budget("chip"), Some(17.0));
    }

    #[test]
    fn cut_amount_round_trips_through_integers() {
        assert_eq!(CutAmount::try_from(10), Ok(CutAmount::Ten));
        assert_eq!(CutAmount::try_from(5), Err(InvalidCutAmount(5)));
        let parsed: CutAmount = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, CutAmount::One);
        assert!(serde_json::from_str::<CutAmount>("3").is_err());
        assert_eq!(CutAmount::Ten.to_string(), "-$10B");
    }

    #[test]
    fn program_accepts_untouchable_alias() {
        let program: Program = serde_json::from_str(
            r#"{"id":"medicaid","name":"Medicaid","budget":561,"isUntouchable":true}"#,
        )
        .unwrap();
        assert!(program.protected);
        assert!(!program.is_cuttable());
    }
}
