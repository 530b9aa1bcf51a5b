//! Wire format: JSON objects carrying a string `type` tag, exchanged one per
//! WebSocket frame. Deserializing a malformed or unknown-tag message never
//! panics — callers get a `MessageError` and drop the record.

use serde::{Deserialize, Serialize};

use crate::entities::{PowerUpType, Team};
use crate::events::GameEvent;
use crate::snapshot::SnapshotPayload;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub tick: u64,
    pub x: f32,
    pub z: f32,
    #[serde(rename = "rotY")]
    pub rot_y: f32,
    #[serde(rename = "jumpRequestId")]
    pub jump_request_id: u32,
}

impl Default for InputRecord {
    fn default() -> Self {
        Self {
            tick: 0,
            x: 0.0,
            z: 0.0,
            rot_y: 0.0,
            jump_request_id: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinOptions {
    pub name: Option<String>,
    pub team: Option<Team>,
    pub character: Option<String>,
    pub map: Option<String>,
    #[serde(rename = "isPublic")]
    pub is_public: Option<bool>,
    pub code: Option<String>,
    pub mode: Option<String>,
}

/// Accepts either a single input record or a batch, per §6's `input`
/// message shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputPayload {
    Batch { inputs: Vec<InputRecord> },
    Single(InputRecord),
}

impl InputPayload {
    pub fn into_records(self) -> Vec<InputRecord> {
        match self {
            InputPayload::Batch { inputs } => inputs,
            InputPayload::Single(record) => vec![record],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join(JoinOptions),
    Input(InputPayload),
    Kick {
        #[serde(rename = "impulseX")]
        impulse_x: f32,
        #[serde(rename = "impulseY")]
        impulse_y: f32,
        #[serde(rename = "impulseZ")]
        impulse_z: f32,
    },
    JoinTeam {
        name: Option<String>,
        team: Team,
        character: Option<String>,
    },
    Chat {
        message: String,
    },
    StartGame,
    EndGame,
    UpdateState {
        key: String,
        value: serde_json::Value,
    },
    Ping,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Snapshot(SnapshotPayload),
    PlayerJoined {
        #[serde(rename = "sessionId")]
        session_id: String,
        team: Team,
        character: String,
    },
    PlayerLeft {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    RoomCode {
        code: String,
    },
    BallKicked {
        #[serde(rename = "impulseX")]
        impulse_x: f32,
        #[serde(rename = "impulseY")]
        impulse_y: f32,
        #[serde(rename = "impulseZ")]
        impulse_z: f32,
    },
    BallTouched {
        velocity: [f32; 3],
        position: [f32; 3],
    },
    PowerupCollected {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "powerupType")]
        powerup_type: PowerUpType,
    },
    GoalScored {
        team: Team,
        scorer: Option<String>,
        assist: Option<String>,
        #[serde(rename = "redScore")]
        red_score: u32,
        #[serde(rename = "blueScore")]
        blue_score: u32,
    },
    GameStarted,
    GameOver {
        winner: String,
    },
    GameReset,
    ChatMessage {
        #[serde(rename = "sessionId")]
        session_id: String,
        message: String,
    },
    Pong,
}

impl From<GameEvent> for ServerMessage {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::PlayerJoined {
                session_id,
                team,
                character,
            } => ServerMessage::PlayerJoined {
                session_id,
                team,
                character,
            },
            GameEvent::PlayerLeft { session_id } => ServerMessage::PlayerLeft { session_id },
            GameEvent::RoomCode { code } => ServerMessage::RoomCode { code },
            GameEvent::BallKicked { impulse } => ServerMessage::BallKicked {
                impulse_x: impulse.x,
                impulse_y: impulse.y,
                impulse_z: impulse.z,
            },
            GameEvent::BallTouched { velocity, position } => ServerMessage::BallTouched {
                velocity: velocity.to_array(),
                position: position.to_array(),
            },
            GameEvent::PowerupCollected {
                session_id,
                powerup_type,
            } => ServerMessage::PowerupCollected {
                session_id,
                powerup_type,
            },
            GameEvent::GoalScored {
                team,
                scorer,
                assist,
                red_score,
                blue_score,
            } => ServerMessage::GoalScored {
                team,
                scorer,
                assist,
                red_score,
                blue_score,
            },
            GameEvent::GameStarted => ServerMessage::GameStarted,
            GameEvent::GameOver { winner } => ServerMessage::GameOver { winner },
            GameEvent::GameReset => ServerMessage::GameReset,
            GameEvent::ChatMessage {
                session_id,
                message,
            } => ServerMessage::ChatMessage {
                session_id,
                message,
            },
            GameEvent::Pong => ServerMessage::Pong,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_input_normalizes_to_one_record() {
        let json = r#"{"tick":1,"x":0.5,"z":0.0,"rotY":0.0,"jumpRequestId":0}"#;
        let payload: InputPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.into_records().len(), 1);
    }

    #[test]
    fn batched_input_normalizes_to_many_records() {
        let json = r#"{"inputs":[{"tick":1,"x":0.0,"z":0.0,"rotY":0.0,"jumpRequestId":0},
                                   {"tick":2,"x":0.0,"z":0.0,"rotY":0.0,"jumpRequestId":0}]}"#;
        let payload: InputPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.into_records().len(), 2);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let json = r#"{"type":"not-a-real-message"}"#;
        let result: Result<ClientMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
