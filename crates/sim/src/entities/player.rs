use std::collections::VecDeque;

use crate::config::INPUT_QUEUE_MAX;
use crate::message::InputRecord;
use crate::physics::BodyHandle;

use super::{SessionId, Team};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerStats {
    pub goals: u32,
    pub assists: u32,
    pub shots: u32,
}

/// Visual-only state flags granted by power-ups. The server only tracks
/// these so it can gate the `update-state` whitelist and broadcast them;
/// they have no gameplay effect of their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerFlags {
    pub invisible: bool,
    pub giant: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Multipliers {
    pub speed: f32,
    pub jump: f32,
    pub kick: f32,
}

impl Multipliers {
    pub fn neutral() -> Self {
        Self {
            speed: 1.0,
            jump: 1.0,
            kick: 1.0,
        }
    }
}

/// Active power-up timers on a player, tracked as the absolute match-time
/// the effect was (re-)activated. A repeated pickup of the same type just
/// overwrites the start time (last-write-wins), matching the overlapping-
/// pickup rule; elapsed-since-start is what `powerup_service` uses to
/// compute ramps and expiry.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerUpTimers {
    pub speed_started_at: Option<f32>,
    pub jump_started_at: Option<f32>,
    pub kick_started_at: Option<f32>,
    pub invisible_started_at: Option<f32>,
    pub giant_started_at: Option<f32>,
}

pub struct Player {
    pub session_id: SessionId,
    pub team: Team,
    pub character: String,
    pub name: String,

    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rot_y: f32,

    pub vx: f32,
    pub vy: f32,
    pub vz: f32,

    pub jump_count: u32,
    pub last_processed_jump_request_id: u32,

    pub input_queue: VecDeque<InputRecord>,
    pub last_input: InputRecord,
    pub last_received_tick: u64,

    pub reset_position: bool,

    pub multipliers: Multipliers,
    pub flags: PlayerFlags,
    pub timers: PowerUpTimers,
    pub stats: PlayerStats,

    pub body: Option<BodyHandle>,
}

impl Player {
    pub fn new(session_id: SessionId, team: Team, character: String, name: String) -> Self {
        let (x, y, z) = Self::spawn_position(team);
        Self {
            session_id,
            team,
            character,
            name,
            x,
            y,
            z,
            rot_y: 0.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            jump_count: 0,
            last_processed_jump_request_id: 0,
            input_queue: VecDeque::new(),
            last_input: InputRecord::default(),
            last_received_tick: 0,
            reset_position: false,
            multipliers: Multipliers::neutral(),
            flags: PlayerFlags::default(),
            timers: PowerUpTimers::default(),
            stats: PlayerStats::default(),
            body: None,
        }
    }

    pub fn spawn_position(team: Team) -> (f32, f32, f32) {
        (team.spawn_x(), 0.1, 0.0)
    }

    pub fn reset_to_spawn(&mut self) {
        let (x, y, z) = Self::spawn_position(self.team);
        self.x = x;
        self.y = y;
        self.z = z;
        self.vx = 0.0;
        self.vy = 0.0;
        self.vz = 0.0;
        self.jump_count = 0;
    }

    /// Accept a validated, tick-ordered input record into this player's
    /// queue, trimming from the front if it would exceed the anti-flood cap.
    pub fn enqueue_input(&mut self, record: InputRecord) {
        self.input_queue.push_back(record);
        while self.input_queue.len() > INPUT_QUEUE_MAX {
            self.input_queue.pop_front();
        }
    }

    /// Consume exactly one input for this tick: the oldest queued record, or
    /// a zero-movement replay of the last accepted input.
    pub fn consume_input(&mut self) -> InputRecord {
        match self.input_queue.pop_front() {
            Some(record) => {
                self.last_input = record;
                record
            }
            None => InputRecord {
                x: 0.0,
                z: 0.0,
                ..self.last_input
            },
        }
    }

    pub fn radius(&self) -> f32 {
        if self.flags.giant {
            crate::config::PLAYER_RADIUS_GIANT
        } else {
            crate::config::PLAYER_RADIUS
        }
    }

    pub fn horizontal_speed(&self) -> f32 {
        (self.vx * self.vx + self.vz * self.vz).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_input_falls_back_to_zeroed_last_input() {
        let mut p = Player::new("s1".into(), Team::Red, "default".into(), "p".into());
        p.last_input = InputRecord {
            tick: 5,
            x: 1.0,
            z: 1.0,
            rot_y: 0.0,
            jump_request_id: 3,
        };
        let replayed = p.consume_input();
        assert_eq!(replayed.x, 0.0);
        assert_eq!(replayed.z, 0.0);
        assert_eq!(replayed.jump_request_id, 3);
    }

    #[test]
    fn enqueue_trims_to_cap() {
        let mut p = Player::new("s1".into(), Team::Red, "default".into(), "p".into());
        for i in 0..(INPUT_QUEUE_MAX as u64 + 10) {
            p.enqueue_input(InputRecord {
                tick: i + 1,
                ..Default::default()
            });
        }
        assert_eq!(p.input_queue.len(), INPUT_QUEUE_MAX);
    }
}
