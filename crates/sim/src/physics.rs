//! Thin wrapper around the third-party rigid-body world. This is the only
//! module that touches `rapier3d` types directly; everything above it talks
//! in terms of handles, translations and velocities.

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

/// Opaque handle to a body registered with a [`PhysicsWorld`].
pub type BodyHandle = RigidBodyHandle;

pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<f32>,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    pub fn new(gravity_y: f32) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, gravity_y, 0.0],
            integration_parameters: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Advance the world by exactly one fixed timestep.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    pub fn add_static_cuboid(
        &mut self,
        half_extents: Vec3,
        translation: Vec3,
        rotation: Quat,
        friction: f32,
        restitution: f32,
    ) -> BodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(to_vector(translation))
            .rotation(to_rotation_vec(rotation))
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .friction(friction)
            .restitution(restitution)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn add_static_cylinder(
        &mut self,
        half_height: f32,
        radius: f32,
        translation: Vec3,
        rotation: Quat,
        friction: f32,
        restitution: f32,
    ) -> BodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(to_vector(translation))
            .rotation(to_rotation_vec(rotation))
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cylinder(half_height, radius)
            .friction(friction)
            .restitution(restitution)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn add_kinematic_player(&mut self, position: Vec3, radius: f32, half_height: f32) -> BodyHandle {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(to_vector(position))
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cylinder(half_height, radius)
            .friction(0.0)
            .restitution(0.0)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Swap a player's collider shape, used by the `giant` power-up effect.
    pub fn set_player_radius(&mut self, handle: BodyHandle, radius: f32, half_height: f32) {
        let body = match self.bodies.get(handle) {
            Some(b) => b,
            None => return,
        };
        let collider_handle = body.colliders().first().copied();
        if let Some(ch) = collider_handle {
            if let Some(collider) = self.colliders.get_mut(ch) {
                *collider.shape_mut() = SharedShape::cylinder(half_height, radius);
            }
        }
    }

    pub fn add_dynamic_ball(
        &mut self,
        position: Vec3,
        radius: f32,
        mass: f32,
        restitution: f32,
        linear_damping: f32,
        angular_damping: f32,
    ) -> BodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .linear_damping(linear_damping)
            .angular_damping(angular_damping)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(radius)
            .restitution(restitution)
            .density(mass / ((4.0 / 3.0) * std::f32::consts::PI * radius.powi(3)))
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn set_kinematic_translation(&mut self, handle: BodyHandle, translation: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_next_kinematic_translation(to_vector(translation));
        }
    }

    pub fn translation(&self, handle: BodyHandle) -> Vec3 {
        self.bodies
            .get(handle)
            .map(|b| from_vector(*b.translation()))
            .unwrap_or_default()
    }

    pub fn set_translation(&mut self, handle: BodyHandle, translation: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(to_vector(translation), true);
        }
    }

    pub fn rotation(&self, handle: BodyHandle) -> Quat {
        self.bodies
            .get(handle)
            .map(|b| {
                let r = b.rotation();
                Quat::from_xyzw(r.i, r.j, r.k, r.w)
            })
            .unwrap_or(Quat::IDENTITY)
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Vec3 {
        self.bodies
            .get(handle)
            .map(|b| from_vector(*b.linvel()))
            .unwrap_or_default()
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    pub fn angular_velocity(&self, handle: BodyHandle) -> Vec3 {
        self.bodies
            .get(handle)
            .map(|b| from_vector(*b.angvel()))
            .unwrap_or_default()
    }

    pub fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_angvel(to_vector(velocity), true);
        }
    }

    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse(to_vector(impulse), true);
        }
    }

    pub fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }
}

fn to_vector(v: Vec3) -> Vector<f32> {
    vector![v.x, v.y, v.z]
}

fn from_vector(v: Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_rotation_vec(q: Quat) -> Vector<f32> {
    // axis-angle form rapier's `rotation()` builder expects; only
    // y-axis rotations are used by the authoritative arena, so the
    // general quaternion case is approximated as its y-axis component.
    let (axis, angle) = q.to_axis_angle();
    axis * angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ball_falls_under_gravity() {
        let mut world = PhysicsWorld::new(-9.81);
        let handle = world.add_dynamic_ball(Vec3::new(0.0, 5.0, 0.0), 0.8, 1.0, 0.85, 0.1, 0.1);
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        assert!(world.translation(handle).y < 5.0);
    }

    #[test]
    fn kinematic_player_does_not_fall() {
        let mut world = PhysicsWorld::new(-9.81);
        let handle = world.add_kinematic_player(Vec3::new(0.0, 0.1, 0.0), 0.4, 0.9);
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(world.translation(handle).y, 0.1);
    }

    #[test]
    fn impulse_moves_dynamic_body() {
        let mut world = PhysicsWorld::new(0.0);
        let handle = world.add_dynamic_ball(Vec3::ZERO, 0.8, 1.0, 0.85, 0.0, 0.0);
        world.apply_impulse(handle, Vec3::new(10.0, 0.0, 0.0));
        world.step(1.0 / 60.0);
        assert!(world.linear_velocity(handle).x > 0.0);
    }
}
