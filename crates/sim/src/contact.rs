//! Custom player-vs-ball contact model layered on top of the physics
//! world's own collision response. Runs once per player, per tick, after
//! the physics step.

use glam::Vec3;

use crate::config::*;
use crate::entities::{Ball, Player};
use crate::physics::PhysicsWorld;

/// Outcome of resolving one player against the ball this tick.
pub enum Contact {
    /// No contact, or contact absorbed by the stability ("ball on head")
    /// mode, which does not count toward goal/assist touch history.
    None,
    /// An impulse was applied; touch history should be updated.
    Touch { velocity: Vec3, position: Vec3 },
}

/// Resolve one player against the ball. Reads player/ball state from the
/// authoritative structs, applies the result to both the physics world and
/// the mirrored struct fields.
pub fn resolve(physics: &mut PhysicsWorld, player: &mut Player, ball: &mut Ball) -> Contact {
    let player_pos = Vec3::new(player.x, player.y, player.z);
    let ball_pos = ball.position();
    let d = ball_pos - player_pos;
    let dist = d.length();
    if dist < 1e-5 {
        return Contact::None;
    }
    if dist > player.radius() + BALL_RADIUS {
        return Contact::None;
    }
    let n = d / dist;
    let dy = d.y;

    let player_v = Vec3::new(player.vx, player.vy, player.vz);
    let ball_v = ball.velocity();
    let v_rel = player_v - ball_v;

    let geometric_head_contact = dy > BALL_STABILITY_HEIGHT_MIN && n.y > 0.5;

    if geometric_head_contact && v_rel.length() < BALL_STABILITY_VELOCITY_THRESHOLD {
        let new_vx = player.vx;
        let new_vy = ball.vy * BALL_STABILITY_DAMPING;
        let new_vz = player.vz;
        ball.set_velocity(Vec3::new(new_vx, new_vy, new_vz));

        let target = Vec3::new(
            player.x,
            player.y + player.radius() + BALL_RADIUS + BALL_CARRY_CLEARANCE,
            player.z,
        );
        let pulled = ball.position() + (target - ball.position()) * BALL_STABILITY_CORRECTION;
        let y = pulled.y.max(ball.y);
        ball.set_position(Vec3::new(pulled.x, y, pulled.z));

        ball.owner_session_id = Some(player.session_id.clone());

        if let Some(handle) = ball.body {
            physics.set_translation(handle, ball.position());
            physics.set_linear_velocity(handle, ball.velocity());
        }
        return Contact::None;
    }

    let approach_speed = v_rel.dot(n);
    if approach_speed <= 0.0 {
        return Contact::None;
    }

    let player_speed = player.horizontal_speed();
    let is_running = player_speed > COLLISION_VELOCITY_THRESHOLD;
    let momentum_factor = if is_running {
        (player_speed / 8.0) * PLAYER_BALL_VELOCITY_TRANSFER
    } else {
        0.5
    };
    let approach_dot = (player.vx * n.x + player.vz * n.z) / (player_speed + f32::EPSILON);
    let approach_boost = if approach_dot > PLAYER_BALL_APPROACH_DOT_MIN {
        PLAYER_BALL_APPROACH_BOOST
    } else {
        1.0
    };

    let mut impulse_mag =
        approach_speed * BALL_MASS * (1.0 + PLAYER_BALL_RESTITUTION) * momentum_factor * approach_boost;

    if geometric_head_contact {
        impulse_mag = impulse_mag.min(BALL_STABILITY_IMPULSE_CAP * player_speed);
    } else {
        impulse_mag = impulse_mag.max(PLAYER_BALL_IMPULSE_MIN);
    }

    let lift = if player.flags.giant {
        COLLISION_LIFT_GIANT
    } else {
        COLLISION_LIFT
    };

    let impulse = Vec3::new(
        n.x * impulse_mag,
        (n.y * impulse_mag).max(0.5) + lift,
        n.z * impulse_mag,
    );

    if let Some(handle) = ball.body {
        physics.apply_impulse(handle, impulse);
        ball.set_velocity(physics.linear_velocity(handle));
    }
    ball.owner_session_id = Some(player.session_id.clone());

    Contact::Touch {
        velocity: ball.velocity(),
        position: ball.position(),
    }
}

/// Explicit client-triggered kick. Returns `true` if the player was in
/// range and the impulse was applied.
pub fn kick(physics: &mut PhysicsWorld, player: &Player, ball: &mut Ball, impulse: Vec3) -> bool {
    let player_pos = Vec3::new(player.x, player.y, player.z);
    if player_pos.distance(ball.position()) > KICK_RANGE {
        return false;
    }
    let boosted = Vec3::new(impulse.x, impulse.y + KICK_VERTICAL_BOOST, impulse.z);
    if let Some(handle) = ball.body {
        physics.apply_impulse(handle, boosted);
        ball.set_velocity(physics.linear_velocity(handle));
    }
    ball.owner_session_id = Some(player.session_id.clone());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Team;

    #[test]
    fn stability_mode_carries_ball_horizontally() {
        let mut physics = PhysicsWorld::new(-9.81);
        let mut player = Player::new("s1".into(), Team::Red, "d".into(), "p".into());
        player.x = 0.0;
        player.y = 0.1;
        player.z = 0.0;
        player.vx = 2.0;
        player.vz = 0.0;

        let mut ball = Ball::at_kickoff();
        ball.x = 0.0;
        ball.y = 0.1 + 0.6;
        ball.z = 0.0;
        ball.vx = 0.0;
        ball.vy = 0.0;
        ball.vz = 0.0;
        ball.body = Some(physics.add_dynamic_ball(ball.position(), BALL_RADIUS, BALL_MASS, BALL_RESTITUTION, 0.5, 0.5));

        let outcome = resolve(&mut physics, &mut player, &mut ball);
        assert!(matches!(outcome, Contact::None));
        assert_eq!(ball.vx, 2.0);
        assert_eq!(ball.owner_session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn fast_approach_applies_minimum_impulse() {
        let mut physics = PhysicsWorld::new(0.0);
        let mut player = Player::new("s1".into(), Team::Red, "d".into(), "p".into());
        player.x = -1.0;
        player.y = 0.1;
        player.z = 0.0;
        player.vx = 6.0;

        let mut ball = Ball::at_kickoff();
        ball.x = 0.0;
        ball.y = 0.1;
        ball.z = 0.0;
        ball.body = Some(physics.add_dynamic_ball(ball.position(), BALL_RADIUS, BALL_MASS, BALL_RESTITUTION, 0.0, 0.0));

        let outcome = resolve(&mut physics, &mut player, &mut ball);
        assert!(matches!(outcome, Contact::Touch { .. }));
    }

    #[test]
    fn kick_out_of_range_is_rejected() {
        let mut physics = PhysicsWorld::new(0.0);
        let player = Player::new("s1".into(), Team::Red, "d".into(), "p".into());
        let mut ball = Ball::at_kickoff();
        ball.x = 100.0;
        ball.body = Some(physics.add_dynamic_ball(ball.position(), BALL_RADIUS, BALL_MASS, BALL_RESTITUTION, 0.0, 0.0));
        assert!(!kick(&mut physics, &player, &mut ball, Vec3::new(1.0, 0.0, 0.0)));
    }
}
