//! Collision-free table world.
//!
//! Integrates positions with explicit Euler and nothing else: no cushions,
//! no ball-ball contacts. Used for headless runs without the `physics`
//! feature and as a deterministic stand-in for the engine in tests.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::api::types::BallId;
use crate::core::physics::{Contact, PhysicsHandle, TableWorld};
use crate::game::table::Table;

#[derive(Debug, Clone, Copy)]
struct KinematicBody {
    pos: Vec2,
    vel: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct KinematicWorld {
    bodies: BTreeMap<BallId, KinematicBody>,
    /// Contacts to report on the next step, for driving contact handling in tests.
    scripted_contacts: Vec<Contact>,
}

impl KinematicWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a contact to be reported by the next [`TableWorld::step`].
    pub fn script_contact(&mut self, contact: Contact) {
        self.scripted_contacts.push(contact);
    }
}

impl PhysicsHandle for KinematicWorld {
    fn position(&self, id: BallId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.pos)
    }

    fn velocity(&self, id: BallId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.vel)
    }

    fn set_position(&mut self, id: BallId, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
        }
    }

    fn set_velocity(&mut self, id: BallId, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.vel = vel;
        }
    }
}

impl TableWorld for KinematicWorld {
    fn insert_ball(&mut self, id: BallId, pos: Vec2, _radius: f32) {
        self.bodies.insert(id, KinematicBody { pos, vel: Vec2::ZERO });
    }

    fn remove_ball(&mut self, id: BallId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn clear_balls(&mut self) {
        self.bodies.clear();
    }

    fn build_cushions(&mut self, _table: &Table) {}

    fn step(&mut self, dt: f32, contacts: &mut Vec<Contact>) {
        for body in self.bodies.values_mut() {
            body.pos += body.vel * dt;
        }
        contacts.append(&mut self.scripted_contacts);
    }

    fn ball_count(&self) -> usize {
        self.bodies.len()
    }
}
