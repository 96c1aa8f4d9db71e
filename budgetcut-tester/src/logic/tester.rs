use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use budgetcut_game::Ending;

use crate::logic::game_tester::{GameTester, SimulationSummary};
use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::SimulationConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub strategy: GameplayStrategy,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub victories: usize,
    pub timeouts: usize,
    pub average_cuts: f64,
    pub average_time_remaining: f64,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

impl ScenarioResult {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn win_rate(&self) -> f64 {
        if self.iterations_run == 0 {
            return 0.0;
        }
        self.victories as f64 / self.iterations_run as f64
    }
}

pub struct LogicTester {
    game_tester: GameTester,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(game_tester: GameTester, verbose: bool) -> Self {
        Self {
            game_tester,
            verbose,
        }
    }

    pub fn run_strategy(
        &self,
        strategy: GameplayStrategy,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing strategy: {} (seed: {})",
                    strategy.label().bright_white(),
                    seed
                );
            }

            results.push(self.run_single_strategy(strategy, seed, iterations));
        }

        results
    }

    fn run_single_strategy(
        &self,
        strategy: GameplayStrategy,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut victories = 0;
        let mut timeouts = 0;
        let mut total_cuts = 0.0;
        let mut total_time_remaining = 0.0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let summary = self
                .game_tester
                .run_plan(SimulationConfig::new(strategy, iteration_seed));

            match summary.ending {
                Some(Ending::Victory) => victories += 1,
                Some(Ending::Timeout) => timeouts += 1,
                Some(Ending::ShortOfTarget) | None => {}
            }
            total_cuts += summary.final_state.current_cuts();
            total_time_remaining += f64::from(summary.final_state.time_remaining());

            if let Err(err) = self.game_tester.evaluate(&summary) {
                failures.push(format!(
                    "Iteration {} (strategy {}, seed {}, steps {}, ending {}): {} | {}",
                    i + 1,
                    strategy.label(),
                    summary.seed,
                    summary.steps.len(),
                    summary
                        .ending
                        .map_or_else(|| "none".to_string(), |e| e.to_string()),
                    err,
                    summarize_decision_path(&summary)
                ));

                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                }
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) cuts:${}B time left:{}s rejections:{}",
                        i + 1,
                        iterations,
                        summary.final_state.current_cuts(),
                        summary.final_state.time_remaining(),
                        summary.rejections
                    );
                }
            }
        }

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };
        #[allow(clippy::cast_precision_loss)]
        let runs = iterations.max(1) as f64;

        ScenarioResult {
            scenario_name: format!("{} (seed {seed})", strategy.label()),
            strategy,
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            victories,
            timeouts,
            average_cuts: total_cuts / runs,
            average_time_remaining: total_time_remaining / runs,
            failures,
            average_duration: avg_duration,
            performance_data,
        }
    }
}

fn summarize_decision_path(summary: &SimulationSummary) -> String {
    if summary.steps.is_empty() {
        return "no decisions recorded".to_string();
    }

    summary
        .steps
        .iter()
        .rev()
        .take(3)
        .map(|step| {
            format!(
                "{}ms: {} [{}] {} reason {}",
                step.elapsed_millis,
                step.action,
                step.policy_name,
                if step.applied { "applied" } else { "refused" },
                step.rationale.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let micros: Vec<u128> = durations.iter().map(Duration::as_micros).collect();
        micros.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(micros_vec
            .into_iter()
            .map(|m| Duration::from_micros(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
