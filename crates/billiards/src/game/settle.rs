//! Cloth friction approximation and the "all balls stopped" decision.

use glam::Vec2;

use crate::api::config::SettleTuning;
use crate::api::types::BallId;
use crate::core::physics::PhysicsHandle;

#[derive(Debug, Clone)]
pub struct SettlingMonitor {
    tuning: SettleTuning,
}

impl SettlingMonitor {
    pub fn new(tuning: SettleTuning) -> Self {
        Self { tuning }
    }

    /// Damped velocity for one step: slow balls stop dead, fast balls lose
    /// less than slow ones.
    pub fn damp(&self, vel: Vec2) -> Vec2 {
        let speed = vel.length();
        if speed < self.tuning.stop_threshold {
            Vec2::ZERO
        } else if speed > self.tuning.fast_threshold {
            vel * self.tuning.fast_damping
        } else {
            vel * self.tuning.slow_damping
        }
    }

    /// Whether a velocity counts as stopped: both components under the threshold.
    pub fn is_at_rest(&self, vel: Vec2) -> bool {
        vel.x.abs() < self.tuning.stop_threshold && vel.y.abs() < self.tuning.stop_threshold
    }

    /// Damp every ball in `ids` and report whether all of them are at rest afterwards.
    pub fn apply<P, I>(&self, physics: &mut P, ids: I) -> bool
    where
        P: PhysicsHandle + ?Sized,
        I: IntoIterator<Item = BallId>,
    {
        let mut settled = true;
        for id in ids {
            let Some(vel) = physics.velocity(id) else {
                continue;
            };
            let damped = self.damp(vel);
            if damped != vel {
                physics.set_velocity(id, damped);
            }
            settled &= self.is_at_rest(damped);
        }
        settled
    }
}
