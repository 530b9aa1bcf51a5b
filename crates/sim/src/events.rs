//! Internal representation of the discrete, out-of-band events the sim
//! emits alongside the periodic snapshot. Kept separate from the wire
//! format (`message::ServerMessage`) so sim code never constructs JSON
//! directly.

use glam::Vec3;

use crate::entities::{PowerUpType, SessionId, Team};

/// All discrete events in this system are delivered over an already
/// ordered, reliable transport (WebSocket), so every variant is
/// `Reliable` today. The enum is kept so a future transport swap has
/// somewhere to hang an `Unreliable` tier without touching call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reliability {
    Reliable,
}

#[derive(Debug, Clone)]
pub enum GameEvent {
    PlayerJoined {
        session_id: SessionId,
        team: Team,
        character: String,
    },
    PlayerLeft {
        session_id: SessionId,
    },
    RoomCode {
        code: String,
    },
    BallKicked {
        impulse: Vec3,
    },
    BallTouched {
        velocity: Vec3,
        position: Vec3,
    },
    PowerupCollected {
        session_id: SessionId,
        powerup_type: PowerUpType,
    },
    GoalScored {
        team: Team,
        scorer: Option<SessionId>,
        assist: Option<SessionId>,
        red_score: u32,
        blue_score: u32,
    },
    GameStarted,
    GameOver {
        winner: String,
    },
    GameReset,
    ChatMessage {
        session_id: SessionId,
        message: String,
    },
    Pong,
}

impl GameEvent {
    pub fn reliability(&self) -> Reliability {
        Reliability::Reliable
    }
}
