//! Tuning constants for one match. Servers and clients must agree on these
//! values for client-side reconciliation to make sense; this struct is the
//! single source of truth the sim crate consults.

/// Sim step cadence.
pub const TICK_RATE: u32 = 60;
/// Snapshot broadcast cadence: every other sim tick at 60 Hz.
pub const PATCH_RATE: u32 = 30;
pub const FIXED_TIMESTEP: f32 = 1.0 / TICK_RATE as f32;

pub const GOAL_COOLDOWN_SECS: f32 = 5.0;
pub const EMPTY_DISPOSE_DELAY_SECS: f32 = 30.0;
pub const GOAL_RESET_GRACE_SECS: f32 = 3.0;
pub const MAX_CLIENTS: usize = 4;
pub const INPUT_QUEUE_MAX: usize = 60;
pub const POWERUP_SPAWN_INTERVAL_SECS: f32 = 20.0;
pub const POWERUP_LIFETIME_SECS: f32 = 15.0;
pub const POWERUP_EFFECT_DURATION_SECS: f32 = 15.0;
pub const POWERUP_MAX_ACTIVE: usize = 3;
pub const POWERUP_PICKUP_RANGE: f32 = 1.5;
pub const MATCH_TIMER_START_SECS: f32 = 300.0;

pub const JOIN_CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const JOIN_CODE_LEN: usize = 4;
pub const JOIN_CODE_MAX_ATTEMPTS: usize = 50;

pub const MOVE_SPEED: f32 = 8.0;
pub const GRAVITY: f32 = 20.0;
pub const JUMP_FORCE: f32 = 8.0;
pub const MAX_JUMPS: u32 = 2;
pub const GROUND_Y: f32 = 0.1;
pub const GROUND_CHECK_EPSILON: f32 = 0.05;
pub const VELOCITY_SMOOTHING: f32 = 0.95;
pub const DOUBLE_JUMP_MULTIPLIER: f32 = 0.8;

pub const ARENA_HALF_WIDTH: f32 = 14.5;
pub const ARENA_HALF_DEPTH: f32 = 9.5;
pub const WALL_HEIGHT: f32 = 10.0;
pub const GOAL_LINE_X: f32 = 10.8;
pub const GOAL_BACK_X: f32 = 17.0;
pub const GOAL_WIDTH_HALF: f32 = 2.5;
pub const GOAL_HEIGHT: f32 = 4.0;

pub const BALL_RADIUS: f32 = 0.8;
pub const BALL_MASS: f32 = 1.0;
pub const BALL_RESTITUTION: f32 = 0.85;
pub const MAX_ANG_VEL: f32 = 15.0;

pub const PLAYER_RADIUS: f32 = 0.4;
pub const PLAYER_RADIUS_GIANT: f32 = 2.0;
pub const KICK_RANGE: f32 = 3.0;
pub const KICK_VERTICAL_BOOST: f32 = 2.0;

pub const BALL_STABILITY_HEIGHT_MIN: f32 = 0.3;
pub const BALL_STABILITY_VELOCITY_THRESHOLD: f32 = 1.5;
pub const BALL_STABILITY_DAMPING: f32 = 0.92;
pub const BALL_STABILITY_CORRECTION: f32 = 0.3;
pub const BALL_STABILITY_IMPULSE_CAP: f32 = 2.0;
pub const BALL_CARRY_CLEARANCE: f32 = 0.05;

pub const COLLISION_VELOCITY_THRESHOLD: f32 = 3.0;
pub const PLAYER_BALL_VELOCITY_TRANSFER: f32 = 0.7;
pub const PLAYER_BALL_APPROACH_BOOST: f32 = 1.4;
pub const PLAYER_BALL_APPROACH_DOT_MIN: f32 = 0.5;
pub const PLAYER_BALL_RESTITUTION: f32 = 0.85;
pub const PLAYER_BALL_IMPULSE_MIN: f32 = 8.0;
pub const COLLISION_LIFT: f32 = 8.0;
pub const COLLISION_LIFT_GIANT: f32 = 10.0;

pub const WALL_RESTITUTION: f32 = 0.3;
pub const GOAL_RESTITUTION: f32 = 0.3;
pub const GROUND_RESTITUTION: f32 = 0.9;
pub const CEILING_DAMPING: f32 = 0.1;

pub const SPEED_POWERUP_MULT: f32 = 2.0;
pub const JUMP_POWERUP_MULT: f32 = 1.5;
pub const KICK_POWERUP_MULT: f32 = 2.0;

pub const CHAT_MAX_LEN: usize = 500;
pub const CHAT_RATE_LIMIT_PER_SEC: u32 = 5;

/// Mutable per-match tuning table. Every constant above has a matching field
/// here so a future server could expose room-level overrides without
/// touching the sim logic; today only `Default` is used.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    pub tick_rate: u32,
    pub patch_rate: u32,
    pub goal_cooldown_secs: f32,
    pub empty_dispose_delay_secs: f32,
    pub max_clients: usize,
    pub input_queue_max: usize,
    pub powerup_spawn_interval_secs: f32,
    pub powerup_lifetime_secs: f32,
    pub powerup_effect_duration_secs: f32,
    pub match_timer_start_secs: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            patch_rate: PATCH_RATE,
            goal_cooldown_secs: GOAL_COOLDOWN_SECS,
            empty_dispose_delay_secs: EMPTY_DISPOSE_DELAY_SECS,
            max_clients: MAX_CLIENTS,
            input_queue_max: INPUT_QUEUE_MAX,
            powerup_spawn_interval_secs: POWERUP_SPAWN_INTERVAL_SECS,
            powerup_lifetime_secs: POWERUP_LIFETIME_SECS,
            powerup_effect_duration_secs: POWERUP_EFFECT_DURATION_SECS,
            match_timer_start_secs: MATCH_TIMER_START_SECS,
        }
    }
}
