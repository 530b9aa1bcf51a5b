//! The authoritative clock. Variable wall-clock delta is accumulated and
//! drained in fixed `dt` steps — each step always advances by exactly
//! `1/TICK_RATE`, so a slow scheduler produces catch-up multi-stepping
//! rather than a larger, non-deterministic step.

use crate::events::GameEvent;
use crate::match_state::Match;
use crate::snapshot::SnapshotPayload;

pub struct FixedTimestep {
    accumulator: f32,
    dt: f32,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            accumulator: 0.0,
            dt: 1.0 / tick_rate as f32,
        }
    }

    pub fn accumulate(&mut self, wall_delta: f32) {
        self.accumulator += wall_delta;
    }

    pub fn should_tick(&self) -> bool {
        self.accumulator >= self.dt
    }

    pub fn consume_tick(&mut self) {
        self.accumulator -= self.dt;
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Result of attempting one sim step.
pub enum SimOutcome {
    Tick {
        events: Vec<GameEvent>,
        snapshot: Option<SnapshotPayload>,
    },
    /// The step panicked. The match must be disposed; the caller is
    /// responsible for broadcasting `game-over` if a channel is still
    /// alive (§7's fatal-error policy).
    Fatal(String),
}

/// Drain the accumulator, running `match_.step()` once per fixed tick.
/// Stops early (returning a trailing `Fatal`) if a step panics.
pub fn advance(timestep: &mut FixedTimestep, match_: &mut Match, wall_delta: f32) -> Vec<SimOutcome> {
    timestep.accumulate(wall_delta);
    let mut outcomes = Vec::new();

    while timestep.should_tick() {
        timestep.consume_tick();

        let step_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| match_.step()));
        match step_result {
            Ok(events) => {
                let patch_period = (match_.config.tick_rate / match_.config.patch_rate).max(1) as u64;
                let snapshot = (match_.current_tick % patch_period == 0).then(|| match_.snapshot());
                outcomes.push(SimOutcome::Tick { events, snapshot });
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "sim step panicked".to_string());
                log::error!("match {}: sim step panicked: {message}", match_.id);
                outcomes.push(SimOutcome::Fatal(message));
                break;
            }
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;

    #[test]
    fn fixed_timestep_accumulates_and_drains() {
        let mut ts = FixedTimestep::new(60);
        ts.accumulate(1.0 / 60.0 * 2.5);
        assert!(ts.should_tick());
        ts.consume_tick();
        assert!(ts.should_tick());
        ts.consume_tick();
        assert!(!ts.should_tick());
    }

    #[test]
    fn advance_runs_one_step_per_whole_tick() {
        let mut ts = FixedTimestep::new(60);
        let mut m = Match::new("m1".into(), MatchConfig::default(), 1, "classic".into());
        let outcomes = advance(&mut ts, &mut m, 1.0 / 60.0 * 3.0);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(m.current_tick, 3);
    }
}
