use glam::{Quat, Vec3};

use super::SessionId;
use crate::physics::BodyHandle;

pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    pub orientation: Quat,
    pub tick: u64,
    pub owner_session_id: Option<SessionId>,
    pub body: Option<BodyHandle>,
}

impl Ball {
    pub fn at_kickoff() -> Self {
        Self {
            x: 0.0,
            y: 2.0,
            z: 0.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            orientation: Quat::IDENTITY,
            tick: 0,
            owner_session_id: None,
            body: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::new(self.vx, self.vy, self.vz)
    }

    pub fn set_position(&mut self, p: Vec3) {
        self.x = p.x;
        self.y = p.y;
        self.z = p.z;
    }

    pub fn set_velocity(&mut self, v: Vec3) {
        self.vx = v.x;
        self.vy = v.y;
        self.vz = v.z;
    }

    pub fn reset_to_kickoff(&mut self) {
        self.x = 0.0;
        self.y = 2.0;
        self.z = 0.0;
        self.vx = 0.0;
        self.vy = 0.0;
        self.vz = 0.0;
        self.owner_session_id = None;
    }
}
