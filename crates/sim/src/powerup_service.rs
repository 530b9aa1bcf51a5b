//! Power-up spawn cadence, pickup, and per-tick effect upkeep.
//!
//! Effects are not driven by callbacks or scheduled timers (`setTimeout`
//! style); instead each player simply remembers when an effect started and
//! `refresh_effects` recomputes the current multiplier from elapsed time
//! every tick, the same timestamp-based approach `goal::is_goal` uses for
//! the cooldown. That makes the whole thing trivially resilient to a
//! missed tick.

use glam::Vec3;
use rand::Rng;

use crate::config::*;
use crate::entities::{Ball, Player, PowerUp, PowerUpType};
use crate::physics::PhysicsWorld;

const SPEED_RAMP_UP_SECS: f32 = 0.5;
const SPEED_RAMP_UP_STEPS: u32 = 10;
const SPEED_RAMP_DOWN_SECS: f32 = 1.0;
const SPEED_RAMP_DOWN_STEPS: u32 = 20;

fn random_point(rng: &mut impl Rng) -> (f32, f32) {
    let x = rng.random_range(-ARENA_HALF_WIDTH + 1.0..ARENA_HALF_WIDTH - 1.0);
    let z = rng.random_range(-ARENA_HALF_DEPTH + 1.0..ARENA_HALF_DEPTH - 1.0);
    (x, z)
}

/// If the spawn interval has elapsed, either spawn a new power-up (if under
/// the active cap) or simply reset the interval clock.
pub fn tick_spawn(
    power_ups: &mut Vec<PowerUp>,
    now_secs: f32,
    last_spawn_at: &mut f32,
    next_id: &mut u64,
    rng: &mut impl Rng,
) {
    if now_secs - *last_spawn_at < POWERUP_SPAWN_INTERVAL_SECS {
        return;
    }
    *last_spawn_at = now_secs;
    if power_ups.len() >= POWERUP_MAX_ACTIVE {
        return;
    }
    let kind = PowerUpType::ALL[rng.random_range(0..PowerUpType::ALL.len())];
    let (x, z) = random_point(rng);
    *next_id += 1;
    power_ups.push(PowerUp {
        id: format!("pu-{}", *next_id),
        kind,
        x,
        y: 0.5,
        z,
        spawned_at_secs: now_secs,
    });
}

pub fn despawn_expired(power_ups: &mut Vec<PowerUp>, now_secs: f32) {
    power_ups.retain(|p| !p.is_expired(now_secs, POWERUP_LIFETIME_SECS));
}

/// Look for a power-up within pickup range of `player`; if found, remove
/// it from the field and activate its effect.
pub fn try_pickup(
    power_ups: &mut Vec<PowerUp>,
    player: &mut Player,
    ball: &mut Ball,
    physics: &mut PhysicsWorld,
    now_secs: f32,
) -> Option<PowerUpType> {
    let index = power_ups.iter().position(|p| {
        let dx = p.x - player.x;
        let dz = p.z - player.z;
        (dx * dx + dz * dz).sqrt() < POWERUP_PICKUP_RANGE
    })?;
    let picked = power_ups.remove(index);
    activate(player, ball, physics, picked.kind, now_secs);
    Some(picked.kind)
}

fn activate(
    player: &mut Player,
    ball: &mut Ball,
    physics: &mut PhysicsWorld,
    kind: PowerUpType,
    now_secs: f32,
) {
    match kind {
        PowerUpType::Speed => player.timers.speed_started_at = Some(now_secs),
        PowerUpType::Jump => player.timers.jump_started_at = Some(now_secs),
        PowerUpType::Kick => player.timers.kick_started_at = Some(now_secs),
        PowerUpType::Invisible => {
            player.timers.invisible_started_at = Some(now_secs);
            player.flags.invisible = true;
        }
        PowerUpType::Giant => {
            player.timers.giant_started_at = Some(now_secs);
            player.flags.giant = true;
            if let Some(handle) = player.body {
                physics.set_player_radius(handle, PLAYER_RADIUS_GIANT, 0.9);
            }
            let player_pos = Vec3::new(player.x, player.y, player.z);
            if player_pos.distance(ball.position()) < 3.5 {
                let away = (ball.position() - player_pos).normalize_or_zero();
                let away = if away == Vec3::ZERO { Vec3::X } else { away };
                ball.set_position(player_pos + away * 4.0);
                if let Some(bh) = ball.body {
                    physics.set_translation(bh, ball.position());
                    physics.apply_impulse(bh, away * 4.0);
                }
            }
        }
    }
}

fn speed_multiplier(elapsed: f32) -> f32 {
    if elapsed < SPEED_RAMP_UP_SECS {
        let step = ((elapsed / SPEED_RAMP_UP_SECS) * SPEED_RAMP_UP_STEPS as f32).floor();
        1.0 + (step / SPEED_RAMP_UP_STEPS as f32)
    } else if elapsed < POWERUP_EFFECT_DURATION_SECS {
        SPEED_POWERUP_MULT
    } else {
        let into_rampdown = elapsed - POWERUP_EFFECT_DURATION_SECS;
        if into_rampdown >= SPEED_RAMP_DOWN_SECS {
            1.0
        } else {
            let step = (into_rampdown / SPEED_RAMP_DOWN_SECS * SPEED_RAMP_DOWN_STEPS as f32).floor();
            SPEED_POWERUP_MULT - (SPEED_POWERUP_MULT - 1.0) * (step / SPEED_RAMP_DOWN_STEPS as f32)
        }
    }
}

/// Recompute every active multiplier/flag from elapsed time since
/// activation, clearing timers whose effect has fully expired.
pub fn refresh_effects(player: &mut Player, physics: &mut PhysicsWorld, now_secs: f32) {
    if let Some(start) = player.timers.speed_started_at {
        let elapsed = now_secs - start;
        if elapsed >= POWERUP_EFFECT_DURATION_SECS + SPEED_RAMP_DOWN_SECS {
            player.multipliers.speed = 1.0;
            player.timers.speed_started_at = None;
        } else {
            player.multipliers.speed = speed_multiplier(elapsed);
        }
    }

    if let Some(start) = player.timers.jump_started_at {
        if now_secs - start >= POWERUP_EFFECT_DURATION_SECS {
            player.multipliers.jump = 1.0;
            player.timers.jump_started_at = None;
        } else {
            player.multipliers.jump = JUMP_POWERUP_MULT;
        }
    }

    if let Some(start) = player.timers.kick_started_at {
        if now_secs - start >= POWERUP_EFFECT_DURATION_SECS {
            player.multipliers.kick = 1.0;
            player.timers.kick_started_at = None;
        } else {
            player.multipliers.kick = KICK_POWERUP_MULT;
        }
    }

    if let Some(start) = player.timers.invisible_started_at {
        if now_secs - start >= POWERUP_EFFECT_DURATION_SECS {
            player.flags.invisible = false;
            player.timers.invisible_started_at = None;
        }
    }

    if let Some(start) = player.timers.giant_started_at {
        if now_secs - start >= POWERUP_EFFECT_DURATION_SECS {
            player.flags.giant = false;
            player.timers.giant_started_at = None;
            if let Some(handle) = player.body {
                physics.set_player_radius(handle, PLAYER_RADIUS, 0.9);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Team;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn spawns_when_under_cap_and_interval_elapsed() {
        let mut power_ups = Vec::new();
        let mut last_spawn = 0.0;
        let mut next_id = 0;
        let mut rng = StdRng::seed_from_u64(1);
        tick_spawn(&mut power_ups, 20.0, &mut last_spawn, &mut next_id, &mut rng);
        assert_eq!(power_ups.len(), 1);
        assert_eq!(last_spawn, 20.0);
    }

    #[test]
    fn does_not_spawn_before_interval() {
        let mut power_ups = Vec::new();
        let mut last_spawn = 0.0;
        let mut next_id = 0;
        let mut rng = StdRng::seed_from_u64(1);
        tick_spawn(&mut power_ups, 5.0, &mut last_spawn, &mut next_id, &mut rng);
        assert!(power_ups.is_empty());
    }

    #[test]
    fn speed_ramp_reaches_full_multiplier_and_decays() {
        assert!((speed_multiplier(0.0) - 1.0).abs() < 1e-6);
        assert!((speed_multiplier(1.0) - SPEED_POWERUP_MULT).abs() < 1e-6);
        assert!((speed_multiplier(POWERUP_EFFECT_DURATION_SECS + SPEED_RAMP_DOWN_SECS - 0.01) - 1.0) < 0.1);
    }

    #[test]
    fn jump_multiplier_expires_after_duration() {
        let mut physics = PhysicsWorld::new(-9.81);
        let mut player = Player::new("s1".into(), Team::Red, "d".into(), "p".into());
        player.timers.jump_started_at = Some(0.0);
        refresh_effects(&mut player, &mut physics, 1.0);
        assert_eq!(player.multipliers.jump, JUMP_POWERUP_MULT);
        refresh_effects(&mut player, &mut physics, POWERUP_EFFECT_DURATION_SECS + 1.0);
        assert_eq!(player.multipliers.jump, 1.0);
        assert!(player.timers.jump_started_at.is_none());
    }
}
