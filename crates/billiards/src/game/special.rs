//! The "stop the ball" special action.

use glam::Vec2;

use crate::api::config::StopBallTuning;
use crate::api::types::BallId;
use crate::core::physics::PhysicsHandle;

/// Result of a stop-ball request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Cue ball velocity was zeroed; the action is spent for this turn.
    Stopped,
    /// No shot in flight.
    NotInFlight,
    /// Already used this turn.
    AlreadyUsed,
    /// Cue ball too slow to be worth stopping. The action stays available.
    TooSlow,
}

/// Once-per-turn eligibility for stopping the cue ball mid-shot.
#[derive(Debug, Clone)]
pub struct StopBallAction {
    min_speed: f32,
    used: bool,
}

impl StopBallAction {
    pub fn new(tuning: StopBallTuning) -> Self {
        Self {
            min_speed: tuning.min_speed,
            used: false,
        }
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Available again. Called when a shot is released and when balls settle.
    pub fn rearm(&mut self) {
        self.used = false;
    }

    pub fn try_stop<P: PhysicsHandle + ?Sized>(&mut self, physics: &mut P, in_flight: bool) -> StopOutcome {
        if !in_flight {
            return StopOutcome::NotInFlight;
        }
        if self.used {
            return StopOutcome::AlreadyUsed;
        }
        if physics.speed(BallId::Cue) <= self.min_speed {
            return StopOutcome::TooSlow;
        }
        physics.set_velocity(BallId::Cue, Vec2::ZERO);
        self.used = true;
        StopOutcome::Stopped
    }
}
