mod ball;
mod player;
mod powerup;

pub use ball::Ball;
pub use player::{Player, PlayerFlags, PlayerStats};
pub use powerup::{PowerUp, PowerUpType};

use serde::{Deserialize, Serialize};

/// Stable per-connection identity. Opaque to the sim crate; the transport
/// layer decides how these are minted.
pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn spawn_x(self) -> f32 {
        match self {
            Team::Red => -6.0,
            Team::Blue => 6.0,
        }
    }
}
