use budgetcut_game::numbers::currency_eq;
use budgetcut_game::{
    CueKind, Ending, GameConfig, GameState, ResultSummary, result_summary, select_ending,
};
use colored::Colorize;
use log::debug;

use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::{
    InvariantViolation, SimulationConfig, SimulationSession, StepRecord,
};

/// Everything observed during one simulated run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub strategy: GameplayStrategy,
    pub seed: u64,
    pub game_ended: bool,
    pub ending: Option<Ending>,
    pub result: Option<ResultSummary>,
    pub final_state: GameState,
    pub cues: Vec<CueKind>,
    pub steps: Vec<StepRecord>,
    pub violations: Vec<InvariantViolation>,
    pub rejections: usize,
    pub elapsed_millis: u64,
}

/// Runs strategies against fresh copies of a not-yet-started game.
#[derive(Debug, Clone)]
pub struct GameTester {
    template: GameState,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(template: GameState, verbose: bool) -> Self {
        Self { template, verbose }
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        self.template.config()
    }

    /// Whether the unprotected programs alone can cover the target.
    #[must_use]
    pub fn target_reachable_without_override(&self) -> bool {
        let config = self.config();
        let unprotected: f64 = config
            .roster
            .programs()
            .iter()
            .filter(|p| !p.protected)
            .map(|p| p.budget)
            .sum();
        unprotected + 1e-9 >= config.target_cuts
    }

    #[must_use]
    pub fn run_plan(&self, plan: SimulationConfig) -> SimulationSummary {
        let mut sim = SimulationSession::new(self.template.clone());
        let mut policy = plan.strategy.create_policy(plan.seed);
        let mut steps = Vec::new();
        let mut game_ended = false;

        while steps.len() < plan.max_steps {
            let outcome = sim.advance(policy.as_mut());
            if self.verbose {
                let record = &outcome.record;
                println!(
                    "    {:>6}ms {:<24} {} cuts ${}B, {}s left",
                    record.elapsed_millis,
                    record.action,
                    if record.applied {
                        "ok".green()
                    } else {
                        "--".dimmed()
                    },
                    record.current_cuts,
                    record.time_remaining
                );
            }
            steps.push(outcome.record);
            if outcome.game_ended {
                game_ended = true;
                break;
            }
        }
        debug!(
            "{} seed {} finished after {} steps",
            plan.strategy,
            plan.seed,
            steps.len()
        );

        let cues = sim.cues();
        let violations = sim.violations().to_vec();
        let rejections = sim.rejections();
        let elapsed_millis = sim.clock_millis();
        let final_state = sim.into_state();
        SimulationSummary {
            strategy: plan.strategy,
            seed: plan.seed,
            game_ended,
            ending: select_ending(&final_state),
            result: result_summary(&final_state),
            final_state,
            cues,
            steps,
            violations,
            rejections,
            elapsed_millis,
        }
    }

    /// Check a finished run against what its strategy should produce.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unmet expectation.
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<(), String> {
        if let Some(violation) = summary.violations.first() {
            return Err(format!("invariant violated: {violation}"));
        }
        if !summary.game_ended {
            return Err(format!(
                "run halted after {} steps without ending",
                summary.steps.len()
            ));
        }
        if !cue_trail_is_consistent(summary) {
            return Err(format!("unexpected cue trail {:?}", summary.cues));
        }

        let reachable = self.target_reachable_without_override();
        let state = &summary.final_state;
        match summary.strategy {
            GameplayStrategy::Greedy if reachable => expect_ending(summary, Ending::Victory),
            GameplayStrategy::Greedy => {
                expect_ending(summary, Ending::Timeout)?;
                if state.depletable_remaining() == 0 {
                    Ok(())
                } else {
                    Err(format!(
                        "{} programs left uncut",
                        state.depletable_remaining()
                    ))
                }
            }
            GameplayStrategy::Frugal if !reachable => expect_ending(summary, Ending::Timeout),
            GameplayStrategy::Dawdler => expect_ending(summary, Ending::Timeout),
            GameplayStrategy::Override => {
                expect_ending(summary, Ending::Victory)?;
                if reachable || currency_eq(state.current_cuts(), state.target_cuts()) {
                    Ok(())
                } else {
                    Err(format!(
                        "finished at ${}B instead of exactly ${}B",
                        state.current_cuts(),
                        state.target_cuts()
                    ))
                }
            }
            GameplayStrategy::Frugal | GameplayStrategy::Random => Ok(()),
        }
    }
}

fn expect_ending(summary: &SimulationSummary, expected: Ending) -> Result<(), String> {
    match summary.ending {
        Some(ending) if ending == expected => Ok(()),
        Some(ending) => Err(format!("expected {expected}, got {ending}")),
        None => Err(format!("expected {expected}, run still in play")),
    }
}

/// The clock loop starts once, stops once, and the ending cue comes last.
fn cue_trail_is_consistent(summary: &SimulationSummary) -> bool {
    let starts = summary
        .cues
        .iter()
        .filter(|k| **k == CueKind::TickLoopStart)
        .count();
    let stops = summary
        .cues
        .iter()
        .filter(|k| **k == CueKind::TickLoopStop)
        .count();
    let last_ok = match summary.ending {
        Some(Ending::Victory) => summary.cues.last() == Some(&CueKind::Win),
        Some(_) => summary.cues.last() == Some(&CueKind::Lose),
        None => true,
    };
    starts == 1 && stops == usize::from(summary.game_ended) && last_ok
}
