use std::time::Duration;

use anyhow::Result;
use budgetcut_game::{Cue, CueKind, CueSink, GameSession, GameState, ResultSummary, result_summary};
use colored::Colorize;
use log::info;
use tokio::time;

use crate::logic::GameplayStrategy;
use crate::timer::TimerDriver;

/// Prints each cue as it fires, with the mute state shown.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    pub quiet: bool,
}

impl CueSink for ConsoleSink {
    fn dispatch(&mut self, cue: Cue) {
        if self.quiet {
            return;
        }
        let speaker = if cue.audible() { "🔊" } else { "🔇" };
        let name = cue.kind.as_str();
        let line = match cue.kind {
            CueKind::Win => name.green().bold(),
            CueKind::Lose => name.red().bold(),
            CueKind::Warning => name.yellow(),
            CueKind::TickLoopStart | CueKind::TickLoopStop => name.dimmed(),
            CueKind::Cut | CueKind::Depleted => name.normal(),
        };
        println!("  {speaker} {line}");
    }
}

/// Real time spent on a decision when one game second lasts `tick`.
#[must_use]
pub fn scaled_think(think_millis: u64, tick: Duration) -> Duration {
    let tick_millis = u64::try_from(tick.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(think_millis.saturating_mul(tick_millis) / 1_000)
}

/// Play one run of `strategy` against the real-time driver.
///
/// # Errors
///
/// Returns an error if the driver task stops unexpectedly.
pub async fn play_realtime(
    template: GameState,
    strategy: GameplayStrategy,
    seed: u64,
    tick: Duration,
    quiet: bool,
) -> Result<(GameState, Option<ResultSummary>)> {
    info!("real-time run: {strategy} seed {seed}, {tick:?} per game second");
    let session = GameSession::new(template, ConsoleSink { quiet });
    let driver = TimerDriver::spawn(session, tick);
    let mut policy = strategy.create_policy(seed);

    loop {
        let state = driver.state();
        if state.is_over() {
            break;
        }
        let decision = policy.next_action(&state);
        time::sleep(scaled_think(decision.think_millis, tick)).await;
        if driver.state().is_over() {
            break;
        }
        if let Some(command) = decision.action.command() {
            driver.send(command).await?;
        }
    }

    let session = driver.shutdown().await?;
    let state = session.state().clone();
    let summary = result_summary(&state);
    Ok((state, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetcut_game::Ending;

    #[test]
    fn think_time_scales_with_the_tick() {
        assert_eq!(
            scaled_think(250, Duration::from_secs(1)),
            Duration::from_millis(250)
        );
        assert_eq!(
            scaled_think(3_000, Duration::from_millis(10)),
            Duration::from_millis(30)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn override_strategy_wins_in_real_time() {
        let (state, summary) = play_realtime(
            GameState::default(),
            GameplayStrategy::Override,
            1,
            Duration::from_millis(100),
            true,
        )
        .await
        .unwrap();
        assert!(state.has_won());
        assert_eq!(summary.map(|s| s.ending), Some(Ending::Victory));
    }

    #[tokio::test(start_paused = true)]
    async fn dawdler_runs_out_the_clock_in_real_time() {
        let (state, summary) = play_realtime(
            GameState::default(),
            GameplayStrategy::Dawdler,
            1,
            Duration::from_millis(100),
            true,
        )
        .await
        .unwrap();
        assert_eq!(state.time_remaining(), 0);
        assert_eq!(summary.map(|s| s.ending), Some(Ending::Timeout));
    }
}
