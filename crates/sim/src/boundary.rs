//! Zone-aware boundary and goal-net enforcement. Runs after the physics
//! step and after `ContactResolver`, independent of whatever CCD the
//! physics world itself provides — this is the safety net, not an
//! optimization of it.

use crate::config::*;
use crate::entities::Ball;
use crate::physics::PhysicsWorld;

/// Clamp the ball against the arena envelope. Idempotent: calling this
/// twice in a row with no intervening motion leaves the state unchanged.
pub fn enforce(physics: &mut PhysicsWorld, ball: &mut Ball) {
    let r = BALL_RADIUS;
    let mut x = ball.x;
    let mut y = ball.y;
    let mut z = ball.z;
    let mut vx = ball.vx;
    let mut vy = ball.vy;
    let mut vz = ball.vz;

    if y < r {
        y = r;
        vy = -vy * GROUND_RESTITUTION;
    }
    if y > WALL_HEIGHT - r {
        y = WALL_HEIGHT - r;
        vy *= CEILING_DAMPING;
    }

    let deep_in_goal = x.abs() > ARENA_HALF_WIDTH;
    let in_goal_opening = x.abs() > GOAL_LINE_X && z.abs() < GOAL_WIDTH_HALF && y < GOAL_HEIGHT;

    if deep_in_goal {
        let net_half_width = GOAL_WIDTH_HALF - r;
        if z.abs() > net_half_width {
            let sign = x.signum();
            x = sign * (ARENA_HALF_WIDTH - r);
            vx = -vx * WALL_RESTITUTION;
        } else {
            z = z.clamp(-net_half_width, net_half_width);
        }
        let max_x = GOAL_BACK_X - r;
        if x.abs() > max_x {
            let sign = x.signum();
            x = sign * max_x;
            vx = -vx * GOAL_RESTITUTION;
        }
    } else if in_goal_opening {
        let max_x = GOAL_BACK_X - r;
        if x.abs() > max_x {
            let sign = x.signum();
            x = sign * max_x;
            vx = -vx * GOAL_RESTITUTION;
        }
    } else {
        let max_x = ARENA_HALF_WIDTH - r;
        if x.abs() > max_x {
            let sign = x.signum();
            x = sign * max_x;
            vx = -vx * WALL_RESTITUTION;
        }
        let max_z = ARENA_HALF_DEPTH - r;
        if z.abs() > max_z {
            let sign = z.signum();
            z = sign * max_z;
            vz = -vz * WALL_RESTITUTION;
        }
    }

    ball.x = x;
    ball.y = y;
    ball.z = z;
    ball.vx = vx;
    ball.vy = vy;
    ball.vz = vz;

    if let Some(handle) = ball.body {
        physics.set_translation(handle, ball.position());
        physics.set_linear_velocity(handle, ball.velocity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotent_when_applied_twice() {
        let mut physics = PhysicsWorld::new(0.0);
        let mut ball = Ball::at_kickoff();
        ball.x = 20.0;
        ball.z = 0.0;
        ball.y = 2.0;
        ball.vx = 5.0;
        ball.body = Some(physics.add_dynamic_ball(ball.position(), BALL_RADIUS, BALL_MASS, BALL_RESTITUTION, 0.0, 0.0));

        enforce(&mut physics, &mut ball);
        let (x1, y1, z1) = (ball.x, ball.y, ball.z);
        enforce(&mut physics, &mut ball);
        assert_eq!((ball.x, ball.y, ball.z), (x1, y1, z1));
    }

    #[test]
    fn floor_reflects_with_ground_restitution() {
        let mut physics = PhysicsWorld::new(0.0);
        let mut ball = Ball::at_kickoff();
        ball.y = 0.1;
        ball.vy = -4.0;
        ball.body = Some(physics.add_dynamic_ball(ball.position(), BALL_RADIUS, BALL_MASS, BALL_RESTITUTION, 0.0, 0.0));
        enforce(&mut physics, &mut ball);
        assert_eq!(ball.y, BALL_RADIUS);
        assert!((ball.vy - 4.0 * GROUND_RESTITUTION).abs() < 1e-4);
    }

    #[test]
    fn deep_in_goal_outside_net_width_pushed_back_to_arena() {
        let mut physics = PhysicsWorld::new(0.0);
        let mut ball = Ball::at_kickoff();
        ball.x = 16.0;
        ball.z = 5.0;
        ball.y = 1.0;
        ball.body = Some(physics.add_dynamic_ball(ball.position(), BALL_RADIUS, BALL_MASS, BALL_RESTITUTION, 0.0, 0.0));
        enforce(&mut physics, &mut ball);
        assert!((ball.x - (ARENA_HALF_WIDTH - BALL_RADIUS)).abs() < 1e-4);
    }
}
