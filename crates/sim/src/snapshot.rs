//! The periodic, schema-driven state broadcast. Built fresh every
//! `PATCH_RATE` tick from the authoritative `Match` state; no client-facing
//! field is ever mutated in place here.

use serde::Serialize;

use crate::entities::{Ball, Player, PowerUp, PowerUpType, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Waiting,
    Playing,
    Ended,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub team: Team,
    pub character: String,
    pub pose: [f32; 3],
    #[serde(rename = "rotY")]
    pub rot_y: f32,
    pub flags: PlayerFlagsSnapshot,
    pub multipliers: MultipliersSnapshot,
    pub stats: PlayerStatsSnapshot,
    pub tick: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlayerFlagsSnapshot {
    pub invisible: bool,
    pub giant: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MultipliersSnapshot {
    #[serde(rename = "speedMult")]
    pub speed_mult: f32,
    #[serde(rename = "jumpMult")]
    pub jump_mult: f32,
    #[serde(rename = "kickMult")]
    pub kick_mult: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlayerStatsSnapshot {
    pub goals: u32,
    pub assists: u32,
    pub shots: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerUpSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PowerUpType,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct BallSnapshot {
    pub pose: [f32; 3],
    pub velocity: [f32; 3],
    pub quaternion: [f32; 4],
    pub tick: u64,
    #[serde(rename = "ownerSessionId")]
    pub owner_session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotPayload {
    #[serde(rename = "currentTick")]
    pub current_tick: u64,
    #[serde(rename = "gamePhase")]
    pub game_phase: GamePhase,
    pub timer: f32,
    #[serde(rename = "redScore")]
    pub red_score: u32,
    #[serde(rename = "blueScore")]
    pub blue_score: u32,
    #[serde(rename = "selectedMap")]
    pub selected_map: String,
    pub players: Vec<PlayerSnapshot>,
    #[serde(rename = "powerUps")]
    pub power_ups: Vec<PowerUpSnapshot>,
    pub ball: BallSnapshot,
}

#[allow(clippy::too_many_arguments)]
pub fn build<'a>(
    players: impl Iterator<Item = &'a Player>,
    ball: &Ball,
    power_ups: &[PowerUp],
    current_tick: u64,
    game_phase: GamePhase,
    timer: f32,
    red_score: u32,
    blue_score: u32,
    selected_map: &str,
) -> SnapshotPayload {
    let players = players
        .map(|p| PlayerSnapshot {
            session_id: p.session_id.clone(),
            team: p.team,
            character: p.character.clone(),
            pose: [p.x, p.y, p.z],
            rot_y: p.rot_y,
            flags: PlayerFlagsSnapshot {
                invisible: p.flags.invisible,
                giant: p.flags.giant,
            },
            multipliers: MultipliersSnapshot {
                speed_mult: p.multipliers.speed,
                jump_mult: p.multipliers.jump,
                kick_mult: p.multipliers.kick,
            },
            stats: PlayerStatsSnapshot {
                goals: p.stats.goals,
                assists: p.stats.assists,
                shots: p.stats.shots,
            },
            tick: current_tick,
        })
        .collect();

    let power_ups = power_ups
        .iter()
        .map(|p| PowerUpSnapshot {
            id: p.id.clone(),
            kind: p.kind,
            position: [p.x, p.y, p.z],
        })
        .collect();

    let ball = BallSnapshot {
        pose: [ball.x, ball.y, ball.z],
        velocity: [ball.vx, ball.vy, ball.vz],
        quaternion: ball.orientation.to_array(),
        tick: ball.tick,
        owner_session_id: ball.owner_session_id.clone(),
    };

    SnapshotPayload {
        current_tick,
        game_phase,
        timer,
        red_score,
        blue_score,
        selected_map: selected_map.to_string(),
        players,
        power_ups,
        ball,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Team;

    #[test]
    fn builds_payload_with_one_player_and_ball() {
        let player = Player::new("s1".into(), Team::Red, "default".into(), "p".into());
        let ball = Ball::at_kickoff();
        let payload = build(
            std::iter::once(&player),
            &ball,
            &[],
            42,
            GamePhase::Playing,
            250.0,
            1,
            0,
            "classic",
        );
        assert_eq!(payload.players.len(), 1);
        assert_eq!(payload.current_tick, 42);
        assert_eq!(payload.red_score, 1);
    }
}
