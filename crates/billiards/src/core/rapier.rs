use std::collections::HashMap;
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use crate::api::config::MaterialTuning;
use crate::api::types::BallId;
use crate::core::physics::{Contact, ContactBody, PhysicsHandle, TableWorld};
use crate::game::table::Table;

// ---------------------------------------------------------------------------
// Conversion helpers, glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// `user_data` tag: 0 marks a cushion, `n + 1` marks the ball numbered `n`.
fn ball_tag(id: BallId) -> u128 {
    id.number() as u128 + 1
}

fn tag_to_body(tag: u128) -> Option<ContactBody> {
    match tag {
        0 => Some(ContactBody::Cushion),
        n => u8::try_from(n - 1)
            .ok()
            .and_then(BallId::from_number)
            .map(ContactBody::Ball),
    }
}

/// Physics body of one ball.
#[derive(Debug, Clone, Copy)]
struct BallBody {
    body_handle: RigidBodyHandle,
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        match self.collisions.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let Ok(mut guard) = self.collisions.lock() {
            guard.push(event);
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

// ---------------------------------------------------------------------------
// RapierWorld
// ---------------------------------------------------------------------------

/// Rapier2D-backed table: top-down, zero gravity, rotation-locked balls.
pub struct RapierWorld {
    material: MaterialTuning,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    balls: HashMap<BallId, BallBody>,
    cushions: Vec<RigidBodyHandle>,
}

impl RapierWorld {
    pub fn new(material: MaterialTuning) -> Self {
        Self {
            material,
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            balls: HashMap::with_capacity(16),
            cushions: Vec::new(),
        }
    }

    /// Number of cushion bodies installed.
    pub fn cushion_count(&self) -> usize {
        self.cushions.len()
    }

    fn remove_handle(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    fn collider_to_body(&self, collider_handle: ColliderHandle) -> Option<ContactBody> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        tag_to_body(body.user_data)
    }
}

impl PhysicsHandle for RapierWorld {
    fn position(&self, id: BallId) -> Option<Vec2> {
        let ball = self.balls.get(&id)?;
        self.bodies
            .get(ball.body_handle)
            .map(|rb| na_to_vec2(rb.translation()))
    }

    fn velocity(&self, id: BallId) -> Option<Vec2> {
        let ball = self.balls.get(&id)?;
        self.bodies
            .get(ball.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
    }

    fn set_position(&mut self, id: BallId, pos: Vec2) {
        if let Some(ball) = self.balls.get(&id) {
            if let Some(rb) = self.bodies.get_mut(ball.body_handle) {
                rb.set_translation(vec2_to_na(pos), true);
            }
        }
    }

    fn set_velocity(&mut self, id: BallId, vel: Vec2) {
        if let Some(ball) = self.balls.get(&id) {
            if let Some(rb) = self.bodies.get_mut(ball.body_handle) {
                rb.set_linvel(vec2_to_na(vel), true);
            }
        }
    }
}

impl TableWorld for RapierWorld {
    fn insert_ball(&mut self, id: BallId, pos: Vec2, radius: f32) {
        self.remove_ball(id);

        let rb = RigidBodyBuilder::dynamic()
            .translation(vec2_to_na(pos))
            .gravity_scale(0.0)
            .locked_axes(LockedAxes::ROTATION_LOCKED)
            .ccd_enabled(true)
            .linear_damping(self.material.ball_linear_damping)
            .user_data(ball_tag(id))
            .build();
        let body_handle = self.bodies.insert(rb);

        let collider = ColliderBuilder::ball(radius)
            .restitution(self.material.ball_restitution)
            .friction(self.material.ball_friction)
            .density(self.material.ball_density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, body_handle, &mut self.bodies);

        self.balls.insert(id, BallBody { body_handle });
    }

    fn remove_ball(&mut self, id: BallId) -> bool {
        match self.balls.remove(&id) {
            Some(ball) => {
                self.remove_handle(ball.body_handle);
                true
            }
            None => false,
        }
    }

    fn clear_balls(&mut self) {
        let handles: Vec<_> = self.balls.drain().map(|(_, b)| b.body_handle).collect();
        for handle in handles {
            self.remove_handle(handle);
        }
    }

    fn build_cushions(&mut self, table: &Table) {
        for handle in std::mem::take(&mut self.cushions) {
            self.remove_handle(handle);
        }

        for cushion in table.cushions() {
            let rb = RigidBodyBuilder::fixed()
                .translation(vec2_to_na(cushion.center))
                .user_data(0)
                .build();
            let body_handle = self.bodies.insert(rb);
            let collider =
                ColliderBuilder::cuboid(cushion.half_extents.x, cushion.half_extents.y)
                    .restitution(self.material.cushion_restitution)
                    .friction(self.material.cushion_friction)
                    .active_events(ActiveEvents::COLLISION_EVENTS)
                    .build();
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);
            self.cushions.push(body_handle);
        }
    }

    fn step(&mut self, dt: f32, contacts: &mut Vec<Contact>) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &vector![0.0, 0.0],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Only collision starts matter to the session
        for event in self.event_collector.drain_collisions() {
            let CollisionEvent::Started(h1, h2, _) = event else {
                continue;
            };
            if let (Some(a), Some(b)) = (self.collider_to_body(h1), self.collider_to_body(h2)) {
                contacts.push(Contact { a, b });
            }
        }
    }

    fn ball_count(&self) -> usize {
        self.balls.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
