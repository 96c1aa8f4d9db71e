use std::fmt;
use std::str::FromStr;

use budgetcut_game::{Command, CutAmount, GameState, Program};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// What a policy wants to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Cut {
        program_id: String,
        amount: CutAmount,
    },
    OverrideProtection,
    /// Nothing useful to press; let the clock run.
    Wait,
}

impl PlayerAction {
    /// Command to queue for this action, if it presses anything.
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        match self {
            Self::Cut { program_id, amount } => Some(Command::cut(program_id.clone(), *amount)),
            Self::OverrideProtection => Some(Command::OverrideProtection),
            Self::Wait => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Cut { program_id, amount } => format!("cut {program_id} {amount}"),
            Self::OverrideProtection => "override".to_string(),
            Self::Wait => "wait".to_string(),
        }
    }
}

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: PlayerAction,
    /// Simulated time the player spends before pressing.
    pub think_millis: u64,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub const fn new(action: PlayerAction, think_millis: u64, rationale: Option<String>) -> Self {
        Self {
            action,
            think_millis,
            rationale,
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Choose the next press given the current state.
    fn next_action(&mut self, state: &GameState) -> PolicyDecision;
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown strategy `{0}` (try --list-strategies)")]
pub struct UnknownStrategy(pub String);

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameplayStrategy {
    Greedy,
    Frugal,
    Random,
    Dawdler,
    Override,
}

impl GameplayStrategy {
    pub const ALL: [Self; 5] = [
        Self::Greedy,
        Self::Frugal,
        Self::Random,
        Self::Dawdler,
        Self::Override,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Frugal => "frugal",
            Self::Random => "random",
            Self::Dawdler => "dawdler",
            Self::Override => "override",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Greedy => "Greedy",
            Self::Frugal => "Frugal",
            Self::Random => "Random",
            Self::Dawdler => "Dawdler",
            Self::Override => "Override",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Greedy => "Largest cuttable program first, always $10B presses",
            Self::Frugal => "Only $1B presses, smallest program first",
            Self::Random => "Seeded random presses, occasionally lifting protection",
            Self::Dawdler => "Hesitates for seconds between presses and runs out the clock",
            Self::Override => "Depletes everything, lifts protection, finishes on the designated program",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Greedy => Box::new(GreedyPolicy),
            Self::Frugal => Box::new(FrugalPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Dawdler => Box::new(DawdlerPolicy),
            Self::Override => Box::new(OverridePolicy),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key() == wanted)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

const QUICK_PRESS_MILLIS: u64 = 250;
const RANDOM_PRESS_MILLIS: u64 = 400;
const DAWDLE_MILLIS: u64 = 3_000;

struct GreedyPolicy;
struct FrugalPolicy;
struct DawdlerPolicy;
struct OverridePolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn cuttable(state: &GameState) -> impl Iterator<Item = &Program> {
    state.programs().iter().filter(|p| p.is_cuttable())
}

fn largest_cuttable(state: &GameState) -> Option<&Program> {
    cuttable(state).max_by(|a, b| a.budget.total_cmp(&b.budget))
}

fn smallest_cuttable(state: &GameState) -> Option<&Program> {
    cuttable(state).min_by(|a, b| a.budget.total_cmp(&b.budget))
}

fn cut_largest(state: &GameState, think_millis: u64) -> Option<PolicyDecision> {
    largest_cuttable(state).map(|program| {
        PolicyDecision::new(
            PlayerAction::Cut {
                program_id: program.id.clone(),
                amount: CutAmount::Ten,
            },
            think_millis,
            Some(format!("largest remaining ${}B", program.budget)),
        )
    })
}

fn wait(think_millis: u64, reason: &str) -> PolicyDecision {
    PolicyDecision::new(PlayerAction::Wait, think_millis, Some(reason.to_string()))
}

impl PlayerPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn next_action(&mut self, state: &GameState) -> PolicyDecision {
        cut_largest(state, QUICK_PRESS_MILLIS)
            .unwrap_or_else(|| wait(QUICK_PRESS_MILLIS, "nothing left to cut"))
    }
}

impl PlayerPolicy for FrugalPolicy {
    fn name(&self) -> &'static str {
        "Frugal"
    }

    fn next_action(&mut self, state: &GameState) -> PolicyDecision {
        smallest_cuttable(state).map_or_else(
            || wait(QUICK_PRESS_MILLIS, "nothing left to cut"),
            |program| {
                PolicyDecision::new(
                    PlayerAction::Cut {
                        program_id: program.id.clone(),
                        amount: CutAmount::One,
                    },
                    QUICK_PRESS_MILLIS,
                    Some(format!("smallest remaining ${}B", program.budget)),
                )
            },
        )
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn next_action(&mut self, state: &GameState) -> PolicyDecision {
        if state.override_available() && self.rng.gen_bool(0.3) {
            return PolicyDecision::new(
                PlayerAction::OverrideProtection,
                RANDOM_PRESS_MILLIS,
                Some("coin flip".to_string()),
            );
        }
        // Any program, including protected and depleted ones, so rejections get exercised.
        let programs = state.programs();
        if programs.is_empty() {
            return wait(RANDOM_PRESS_MILLIS, "empty roster");
        }
        let program = &programs[self.rng.gen_range(0..programs.len())];
        let amount = CutAmount::ALL[self.rng.gen_range(0..CutAmount::ALL.len())];
        let think_millis = self.rng.gen_range(100..=RANDOM_PRESS_MILLIS * 2);
        PolicyDecision::new(
            PlayerAction::Cut {
                program_id: program.id.clone(),
                amount,
            },
            think_millis,
            None,
        )
    }
}

impl PlayerPolicy for DawdlerPolicy {
    fn name(&self) -> &'static str {
        "Dawdler"
    }

    fn next_action(&mut self, state: &GameState) -> PolicyDecision {
        smallest_cuttable(state).map_or_else(
            || wait(DAWDLE_MILLIS, "nothing left to cut"),
            |program| {
                PolicyDecision::new(
                    PlayerAction::Cut {
                        program_id: program.id.clone(),
                        amount: CutAmount::One,
                    },
                    DAWDLE_MILLIS,
                    Some("hesitating".to_string()),
                )
            },
        )
    }
}

impl PlayerPolicy for OverridePolicy {
    fn name(&self) -> &'static str {
        "Override"
    }

    fn next_action(&mut self, state: &GameState) -> PolicyDecision {
        if let Some(decision) = cut_largest(state, QUICK_PRESS_MILLIS) {
            return decision;
        }
        if state.override_available() {
            return PolicyDecision::new(
                PlayerAction::OverrideProtection,
                QUICK_PRESS_MILLIS,
                Some("every other program is depleted".to_string()),
            );
        }
        wait(QUICK_PRESS_MILLIS, "override unavailable")
    }
}
