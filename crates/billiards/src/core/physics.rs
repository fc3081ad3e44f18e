use glam::Vec2;

use crate::api::types::BallId;
use crate::game::table::Table;

/// Per-ball read/write access to the physics engine.
///
/// The rack generator, shot controller and pocket resolver depend only on
/// this capability, so the engine behind it can be swapped or mocked.
pub trait PhysicsHandle {
    /// Current center of a ball, or `None` if the ball has no body.
    fn position(&self, id: BallId) -> Option<Vec2>;

    /// Current linear velocity of a ball, or `None` if the ball has no body.
    fn velocity(&self, id: BallId) -> Option<Vec2>;

    /// Teleport a ball. No-op for unknown ids.
    fn set_position(&mut self, id: BallId, pos: Vec2);

    /// Overwrite a ball's linear velocity. No-op for unknown ids.
    fn set_velocity(&mut self, id: BallId, vel: Vec2);

    fn speed(&self, id: BallId) -> f32 {
        self.velocity(id).map(Vec2::length).unwrap_or(0.0)
    }
}

/// One side of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactBody {
    Ball(BallId),
    Cushion,
}

impl ContactBody {
    pub fn ball(self) -> Option<BallId> {
        match self {
            ContactBody::Ball(id) => Some(id),
            ContactBody::Cushion => None,
        }
    }
}

/// A collision that started during the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: ContactBody,
    pub b: ContactBody,
}

impl Contact {
    /// The balls involved (zero, one or two).
    pub fn balls(&self) -> impl Iterator<Item = BallId> {
        [self.a.ball(), self.b.ball()].into_iter().flatten()
    }
}

/// The whole simulated table: body lifecycle plus stepping.
pub trait TableWorld: PhysicsHandle {
    /// Create a dynamic ball body at `pos`. Replaces any body with the same id.
    fn insert_ball(&mut self, id: BallId, pos: Vec2, radius: f32);

    /// Remove a ball body. Returns `false` if there was none.
    fn remove_ball(&mut self, id: BallId) -> bool;

    /// Remove every ball body, keeping cushions.
    fn clear_balls(&mut self);

    /// Install the fixed cushion segments of `table`.
    fn build_cushions(&mut self, table: &Table);

    /// Advance the simulation by `dt` seconds, appending collision starts to `contacts`.
    fn step(&mut self, dt: f32, contacts: &mut Vec<Contact>);

    /// Number of ball bodies currently simulated.
    fn ball_count(&self) -> usize;
}
