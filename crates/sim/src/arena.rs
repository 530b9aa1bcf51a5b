//! Authoritative static geometry for the pitch. Built once per match.

use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::config::{GOAL_LINE_X, GOAL_WIDTH_HALF};
use crate::physics::PhysicsWorld;

const GROUND_FRICTION: f32 = 0.8;
const GROUND_RESTITUTION: f32 = 0.0;
const WALL_FRICTION: f32 = 0.2;
const WALL_RESTITUTION: f32 = 0.3;
const POST_FRICTION: f32 = 0.2;
const POST_RESTITUTION: f32 = 0.5;

/// Builds every static collider described by the authoritative arena
/// layout. The handles are discarded: nothing ever moves or removes this
/// geometry for the lifetime of a match.
pub fn build(world: &mut PhysicsWorld) {
    // Ground: 30 x 0.5 x 20 centered at y = -0.25.
    world.add_static_cuboid(
        Vec3::new(15.0, 0.25, 10.0),
        Vec3::new(0.0, -0.25, 0.0),
        Quat::IDENTITY,
        GROUND_FRICTION,
        GROUND_RESTITUTION,
    );

    // Back walls, full width, 10 m tall, at z = +-11.
    for sign in [-1.0, 1.0] {
        world.add_static_cuboid(
            Vec3::new(15.0, 5.0, 0.25),
            Vec3::new(0.0, 5.0, sign * 11.0),
            Quat::IDENTITY,
            WALL_FRICTION,
            WALL_RESTITUTION,
        );
    }

    // Side walls broken by goal gaps: four segments at x = +-16, z = +-6.5,
    // each 3.5 m deep (covering from the back wall down to the goal mouth).
    for x_sign in [-1.0, 1.0] {
        for z_sign in [-1.0, 1.0] {
            world.add_static_cuboid(
                Vec3::new(0.25, 5.0, 1.75),
                Vec3::new(x_sign * 16.0, 5.0, z_sign * 6.5),
                Quat::IDENTITY,
                WALL_FRICTION,
                WALL_RESTITUTION,
            );
        }
    }

    // Goal back walls at x = +-17.2.
    for sign in [-1.0, 1.0] {
        world.add_static_cuboid(
            Vec3::new(0.25, 5.0, GOAL_WIDTH_HALF),
            Vec3::new(sign * 17.2, 5.0, 0.0),
            Quat::IDENTITY,
            WALL_FRICTION,
            WALL_RESTITUTION,
        );
    }

    // Vertical goal posts (cylinders) at (+-10.8, +-2.5).
    for x_sign in [-1.0, 1.0] {
        for z_sign in [-1.0, 1.0] {
            world.add_static_cylinder(
                2.0,
                0.1,
                Vec3::new(x_sign * GOAL_LINE_X, 2.0, z_sign * GOAL_WIDTH_HALF),
                Quat::IDENTITY,
                POST_FRICTION,
                POST_RESTITUTION,
            );
        }
    }

    // Crossbars: cylinders rotated to lie along z, at (+-10.8, 0), y = 4.
    for x_sign in [-1.0, 1.0] {
        world.add_static_cylinder(
            GOAL_WIDTH_HALF,
            0.1,
            Vec3::new(x_sign * GOAL_LINE_X, 4.0, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
            POST_FRICTION,
            POST_RESTITUTION,
        );
    }

    // Goal net side walls: x in [10.8, 17.2], z = +-2.5, sealing the net.
    for x_sign in [-1.0, 1.0] {
        for z_sign in [-1.0, 1.0] {
            world.add_static_cuboid(
                Vec3::new(3.2, 2.0, 0.1),
                Vec3::new(x_sign * 14.0, 2.0, z_sign * GOAL_WIDTH_HALF),
                Quat::IDENTITY,
                WALL_FRICTION,
                WALL_RESTITUTION,
            );
        }
    }

    // Ceiling at y = 10.
    world.add_static_cuboid(
        Vec3::new(15.0, 0.25, 10.0),
        Vec3::new(0.0, 10.0, 0.0),
        Quat::IDENTITY,
        0.0,
        0.0,
    );
}
