//! Authoritative goal detection, scoring attribution and cooldown.

use crate::config::{GOAL_HEIGHT, GOAL_LINE_X, GOAL_WIDTH_HALF};
use crate::entities::{Ball, SessionId, Team};

pub struct GoalOutcome {
    pub team: Team,
    pub scorer: Option<SessionId>,
    pub assist: Option<SessionId>,
}

/// Whether a goal should be awarded this tick. Cooldown is timestamp-based
/// so a match that misses ticks (a slow host, a GC pause) still enforces
/// the minimum interval correctly rather than drifting.
pub fn is_goal(ball: &Ball, now_secs: f32, last_goal_time_secs: f32, cooldown_secs: f32) -> bool {
    if now_secs - last_goal_time_secs < cooldown_secs {
        return false;
    }
    ball.x.abs() > GOAL_LINE_X + crate::config::BALL_RADIUS
        && ball.z.abs() < GOAL_WIDTH_HALF
        && ball.y < GOAL_HEIGHT
}

/// Attribute the goal once `is_goal` has fired. `team_of` resolves a
/// session id to its team, used only for assist eligibility.
pub fn adjudicate(
    ball: &Ball,
    last_touch: Option<&SessionId>,
    second_last_touch: Option<&SessionId>,
    team_of: impl Fn(&SessionId) -> Option<Team>,
) -> GoalOutcome {
    let team = if ball.x > 0.0 { Team::Red } else { Team::Blue };
    let scorer = last_touch.cloned();
    let scorer_team = last_touch.and_then(|s| team_of(s));

    let assist = match (second_last_touch, last_touch) {
        (Some(second), Some(last)) if second != last => {
            if team_of(second) == scorer_team {
                Some(second.clone())
            } else {
                None
            }
        }
        _ => None,
    };

    GoalOutcome {
        team,
        scorer,
        assist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_blocks_second_goal() {
        let mut ball = Ball::at_kickoff();
        ball.x = 11.5;
        ball.z = 0.0;
        ball.y = 1.0;
        assert!(is_goal(&ball, 10.0, 5.0, 5.0));
        assert!(!is_goal(&ball, 10.5, 10.0, 5.0));
        assert!(is_goal(&ball, 15.1, 10.0, 5.0));
    }

    #[test]
    fn assist_requires_same_team_and_different_session() {
        let mut ball = Ball::at_kickoff();
        ball.x = 11.5;
        let a: SessionId = "a".into();
        let b: SessionId = "b".into();
        let teams = |s: &SessionId| {
            if s == "a" || s == "b" {
                Some(Team::Red)
            } else {
                Some(Team::Blue)
            }
        };
        let outcome = adjudicate(&ball, Some(&b), Some(&a), teams);
        assert_eq!(outcome.scorer.as_deref(), Some("b"));
        assert_eq!(outcome.assist.as_deref(), Some("a"));
    }

    #[test]
    fn no_assist_when_same_session() {
        let mut ball = Ball::at_kickoff();
        ball.x = 11.5;
        let a: SessionId = "a".into();
        let teams = |_: &SessionId| Some(Team::Red);
        let outcome = adjudicate(&ball, Some(&a), Some(&a), teams);
        assert!(outcome.assist.is_none());
    }
}
