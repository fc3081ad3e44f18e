//! Aim / power / release state machine.

use glam::Vec2;

use crate::api::config::ShotTuning;
use crate::api::error::ShotError;

pub const MAX_POWER: f32 = 100.0;

/// Controller phase. Release is instantaneous and always lands back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPhase {
    Idle,
    Aiming,
}

/// A shot ready to be applied to the cue ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub velocity: Vec2,
    pub power: f32,
}

#[derive(Debug, Clone)]
pub struct ShotController {
    tuning: ShotTuning,
    phase: ShotPhase,
    power: f32,
    aim_point: Option<Vec2>,
}

impl ShotController {
    pub fn new(tuning: ShotTuning) -> Self {
        Self {
            tuning,
            phase: ShotPhase::Idle,
            power: 0.0,
            aim_point: None,
        }
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    pub fn is_aiming(&self) -> bool {
        self.phase == ShotPhase::Aiming
    }

    /// Accumulated power, 0..=100.
    pub fn power(&self) -> f32 {
        self.power
    }

    /// Last known pointer position, tracked even while idle for the guide line.
    pub fn aim_point(&self) -> Option<Vec2> {
        self.aim_point
    }

    /// Angle of the shot direction (cue ball toward aim point), if defined.
    pub fn aim_angle(&self, cue_pos: Vec2) -> Option<f32> {
        let dir = (self.aim_point? - cue_pos).try_normalize()?;
        Some(dir.y.atan2(dir.x))
    }

    /// Press-and-hold: start charging from zero.
    pub fn begin(&mut self, aim_point: Vec2) {
        self.phase = ShotPhase::Aiming;
        self.power = 0.0;
        self.aim_point = Some(aim_point);
    }

    pub fn update_aim(&mut self, aim_point: Vec2) {
        self.aim_point = Some(aim_point);
    }

    /// One animation frame of charging. No-op unless aiming.
    pub fn charge(&mut self) {
        if self.is_aiming() {
            self.power = (self.power + self.tuning.power_rate).clamp(0.0, MAX_POWER);
        }
    }

    /// Abandon the charge without firing.
    pub fn cancel(&mut self) {
        self.phase = ShotPhase::Idle;
        self.power = 0.0;
    }

    /// Release the charge. Always returns to idle with power reset, whether
    /// or not a shot results.
    pub fn release(&mut self, cue_pos: Vec2) -> Result<Shot, ShotError> {
        if !self.is_aiming() {
            return Err(ShotError::NotAiming);
        }
        let power = self.power;
        self.cancel();

        let aim = self.aim_point.ok_or(ShotError::DegenerateAim)?;
        let direction = (aim - cue_pos)
            .try_normalize()
            .ok_or(ShotError::DegenerateAim)?;

        Ok(Shot {
            velocity: direction * self.release_speed(power),
            power,
        })
    }

    /// Release speed for a given power: linear between base and max speed,
    /// then scaled. Out-of-range power is clamped.
    pub fn release_speed(&self, power: f32) -> f32 {
        let t = if power.is_nan() { 0.0 } else { power.clamp(0.0, MAX_POWER) / MAX_POWER };
        let ShotTuning { base_speed, max_speed, speed_scale, .. } = self.tuning;
        (base_speed + t * (max_speed - base_speed)) * speed_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller() -> ShotController {
        ShotController::new(ShotTuning::default())
    }

    #[test]
    fn charge_accumulates_and_clamps() {
        let mut shot = controller();
        shot.charge();
        assert_eq!(shot.power(), 0.0, "idle controller must not charge");

        shot.begin(Vec2::new(300.0, 200.0));
        for _ in 0..10 {
            shot.charge();
        }
        assert!((shot.power() - 20.0).abs() < 1e-4);

        for _ in 0..100 {
            shot.charge();
        }
        assert_eq!(shot.power(), MAX_POWER);
    }

    #[test]
    fn begin_resets_power() {
        let mut shot = controller();
        shot.begin(Vec2::ZERO);
        shot.charge();
        shot.begin(Vec2::ONE);
        assert_eq!(shot.power(), 0.0);
    }

    #[test]
    fn release_points_from_cue_toward_aim() {
        let mut shot = controller();
        let cue = Vec2::new(200.0, 200.0);
        shot.begin(Vec2::new(200.0, 100.0));
        let fired = shot.release(cue).unwrap();

        assert!(fired.velocity.x.abs() < 1e-4);
        assert!(fired.velocity.y < 0.0);
        assert!((fired.velocity.length() - 90.0).abs() < 1e-3);
        assert_eq!(shot.phase(), ShotPhase::Idle);
        assert_eq!(shot.power(), 0.0);
    }

    #[test]
    fn release_without_charge_is_rejected() {
        let mut shot = controller();
        assert_eq!(shot.release(Vec2::ZERO), Err(ShotError::NotAiming));
    }

    #[test]
    fn degenerate_aim_rejected_without_nan() {
        let mut shot = controller();
        let cue = Vec2::new(200.0, 200.0);
        shot.begin(cue);
        for _ in 0..25 {
            shot.charge();
        }
        assert_eq!(shot.release(cue), Err(ShotError::DegenerateAim));
        assert_eq!(shot.phase(), ShotPhase::Idle);
        assert_eq!(shot.power(), 0.0);
        assert_eq!(shot.aim_angle(cue), None);
    }

    #[test]
    fn non_finite_aim_rejected() {
        let mut shot = controller();
        shot.begin(Vec2::new(f32::NAN, 10.0));
        assert_eq!(shot.release(Vec2::ZERO), Err(ShotError::DegenerateAim));
    }

    #[test]
    fn cancel_returns_to_idle_without_firing() {
        let mut shot = controller();
        shot.begin(Vec2::new(10.0, 0.0));
        shot.charge();
        shot.cancel();
        assert_eq!(shot.phase(), ShotPhase::Idle);
        assert_eq!(shot.release(Vec2::ZERO), Err(ShotError::NotAiming));
    }

    #[test]
    fn speed_endpoints() {
        let shot = controller();
        let t = ShotTuning::default();
        assert!((shot.release_speed(0.0) - t.base_speed * t.speed_scale).abs() < 1e-4);
        assert!((shot.release_speed(100.0) - t.max_speed * t.speed_scale).abs() < 1e-4);
        assert_eq!(shot.release_speed(-50.0), shot.release_speed(0.0));
        assert_eq!(shot.release_speed(250.0), shot.release_speed(100.0));
        assert_eq!(shot.release_speed(f32::NAN), shot.release_speed(0.0));
    }

    #[test]
    fn aim_angle_tracks_pointer() {
        let mut shot = controller();
        shot.update_aim(Vec2::new(100.0, 0.0));
        let angle = shot.aim_angle(Vec2::ZERO).unwrap();
        assert!(angle.abs() < 1e-6);
        assert!(!shot.is_aiming());
    }

    proptest! {
        #[test]
        fn speed_monotonic_in_power(a in 0.0f32..=100.0, b in 0.0f32..=100.0) {
            let shot = controller();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(shot.release_speed(lo) <= shot.release_speed(hi));
        }

        #[test]
        fn released_velocity_is_finite(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0) {
            let mut shot = controller();
            shot.begin(Vec2::new(x, y));
            if let Ok(fired) = shot.release(Vec2::ZERO) {
                prop_assert!(fired.velocity.is_finite());
            }
        }
    }
}
