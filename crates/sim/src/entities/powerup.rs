use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpType {
    Speed,
    Kick,
    Jump,
    Invisible,
    Giant,
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 5] = [
        PowerUpType::Speed,
        PowerUpType::Kick,
        PowerUpType::Jump,
        PowerUpType::Invisible,
        PowerUpType::Giant,
    ];
}

pub struct PowerUp {
    pub id: String,
    pub kind: PowerUpType,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub spawned_at_secs: f32,
}

impl PowerUp {
    pub fn is_expired(&self, now_secs: f32, lifetime_secs: f32) -> bool {
        now_secs - self.spawned_at_secs >= lifetime_secs
    }
}
