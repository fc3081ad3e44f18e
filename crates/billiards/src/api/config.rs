use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;
use crate::game::rack::RackGenerator;
use crate::game::table::{Table, POCKET_COUNT};

/// Full session configuration. Loaded from JSON at runtime or taken from defaults.
///
/// Every velocity-like value is in world units per second; damping multipliers
/// are applied once per fixed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub table: TableSpec,
    pub shot: ShotTuning,
    pub settle: SettleTuning,
    pub scoring: ScoringRules,
    pub stop_ball: StopBallTuning,
    pub contact: ContactTuning,
    pub material: MaterialTuning,
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Cap on fixed steps run for one browser frame.
    pub max_catch_up_steps: u32,
    /// Seed for rack shuffling. `None` lets the host pick one.
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table: TableSpec::default(),
            shot: ShotTuning::default(),
            settle: SettleTuning::default(),
            scoring: ScoringRules::default(),
            stop_ball: StopBallTuning::default(),
            contact: ContactTuning::default(),
            material: MaterialTuning::default(),
            fixed_dt: 1.0 / 60.0,
            max_catch_up_steps: 10,
            seed: None,
        }
    }
}

/// Table geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    pub width: f32,
    pub height: f32,
    pub ball_radius: f32,
    pub pocket_radius: f32,
    pub pockets: Vec<Vec2>,
    pub cue_start: Vec2,
    /// Apex of the rack triangle; rows grow toward +x.
    pub rack_apex: Vec2,
    /// Ball spacing in the rack as a multiple of the ball diameter.
    pub rack_packing: f32,
    /// Extra clearance kept between a ball's edge and the table bounds.
    pub clamp_margin: f32,
    pub cushions: Vec<CushionSpec>,
}

impl Default for TableSpec {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            ball_radius: 15.0,
            pocket_radius: 20.0,
            pockets: vec![
                Vec2::new(30.0, 30.0),
                Vec2::new(400.0, 15.0),
                Vec2::new(770.0, 30.0),
                Vec2::new(30.0, 370.0),
                Vec2::new(400.0, 385.0),
                Vec2::new(770.0, 370.0),
            ],
            cue_start: Vec2::new(200.0, 200.0),
            rack_apex: Vec2::new(600.0, 200.0),
            rack_packing: 1.05,
            clamp_margin: 5.0,
            cushions: default_cushions(),
        }
    }
}

/// A fixed rectangular cushion segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CushionSpec {
    pub center: Vec2,
    pub half_extents: Vec2,
}

/// Eight rail segments, leaving gaps at the pockets.
fn default_cushions() -> Vec<CushionSpec> {
    let long = Vec2::new(160.0, 10.0);
    let short = Vec2::new(10.0, 80.0);
    [
        (Vec2::new(200.0, 0.0), long),
        (Vec2::new(600.0, 0.0), long),
        (Vec2::new(200.0, 400.0), long),
        (Vec2::new(600.0, 400.0), long),
        (Vec2::new(0.0, 100.0), short),
        (Vec2::new(0.0, 300.0), short),
        (Vec2::new(800.0, 100.0), short),
        (Vec2::new(800.0, 300.0), short),
    ]
    .into_iter()
    .map(|(center, half_extents)| CushionSpec { center, half_extents })
    .collect()
}

/// Power charge and release speed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotTuning {
    /// Power gained per frame while charging.
    pub power_rate: f32,
    pub base_speed: f32,
    pub max_speed: f32,
    /// Multiplier applied after interpolating between base and max speed.
    pub speed_scale: f32,
}

impl Default for ShotTuning {
    fn default() -> Self {
        Self {
            power_rate: 2.0,
            base_speed: 3.0,
            max_speed: 15.0,
            speed_scale: 30.0,
        }
    }
}

/// Cloth friction approximation layered over the physics engine.
/// Empirically tuned; treat as knobs, not invariants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleTuning {
    /// Below this speed a ball is stopped outright.
    pub stop_threshold: f32,
    /// Above this speed the lighter `fast_damping` applies.
    pub fast_threshold: f32,
    pub fast_damping: f32,
    pub slow_damping: f32,
}

impl Default for SettleTuning {
    fn default() -> Self {
        Self {
            stop_threshold: 9.0,
            fast_threshold: 300.0,
            fast_damping: 0.995,
            slow_damping: 0.99,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub pocket_bonus: i32,
    pub scratch_penalty: i32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            pocket_bonus: 10,
            scratch_penalty: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StopBallTuning {
    /// The cue ball must be moving faster than this for the stop to apply.
    pub min_speed: f32,
}

impl Default for StopBallTuning {
    fn default() -> Self {
        Self { min_speed: 6.0 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactTuning {
    /// Ball speed cap applied when a collision starts.
    pub max_speed: f32,
    /// Minimum speed for a collision to produce a sound cue.
    pub sound_threshold: f32,
}

impl Default for ContactTuning {
    fn default() -> Self {
        Self {
            max_speed: 900.0,
            sound_threshold: 60.0,
        }
    }
}

/// Rigid-body material properties handed to the physics engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialTuning {
    pub ball_restitution: f32,
    pub ball_friction: f32,
    pub ball_density: f32,
    pub ball_linear_damping: f32,
    pub cushion_restitution: f32,
    pub cushion_friction: f32,
}

impl Default for MaterialTuning {
    fn default() -> Self {
        Self {
            ball_restitution: 0.9,
            ball_friction: 0.05,
            ball_density: 0.0008,
            ball_linear_damping: 0.03,
            cushion_restitution: 0.6,
            cushion_friction: 0.3,
        }
    }
}

impl TableConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.table;
        positive("table.width", t.width)?;
        positive("table.height", t.height)?;
        positive("table.ball_radius", t.ball_radius)?;
        positive("table.pocket_radius", t.pocket_radius)?;
        positive("shot.power_rate", self.shot.power_rate)?;
        positive("shot.speed_scale", self.shot.speed_scale)?;
        positive("settle.stop_threshold", self.settle.stop_threshold)?;
        positive("contact.max_speed", self.contact.max_speed)?;
        positive("fixed_dt", self.fixed_dt)?;
        finite("shot.base_speed", self.shot.base_speed)?;
        finite("shot.max_speed", self.shot.max_speed)?;
        finite("settle.fast_threshold", self.settle.fast_threshold)?;
        finite("stop_ball.min_speed", self.stop_ball.min_speed)?;
        finite("contact.sound_threshold", self.contact.sound_threshold)?;
        finite("table.rack_packing", t.rack_packing)?;

        if t.rack_packing < 1.0 {
            return Err(ConfigError::OverlappingRack(t.rack_packing));
        }
        if self.shot.base_speed > self.shot.max_speed || self.shot.base_speed < 0.0 {
            return Err(ConfigError::InvertedSpeedRange {
                base: self.shot.base_speed,
                max: self.shot.max_speed,
            });
        }
        damping("settle.fast_damping", self.settle.fast_damping)?;
        damping("settle.slow_damping", self.settle.slow_damping)?;

        if t.pockets.len() != POCKET_COUNT {
            return Err(ConfigError::PocketCount {
                expected: POCKET_COUNT,
                found: t.pockets.len(),
            });
        }
        let inside = |p: Vec2| p.x >= 0.0 && p.y >= 0.0 && p.x <= t.width && p.y <= t.height;
        for &pocket in &t.pockets {
            if !inside(pocket) {
                return Err(ConfigError::OutsideTable { what: "pocket", x: pocket.x, y: pocket.y });
            }
        }

        self.validate_placement()
    }

    /// Every starting spot must already sit inside the clamp bounds, or the
    /// first step would pull balls on top of each other.
    fn validate_placement(&self) -> Result<(), ConfigError> {
        let t = &self.table;
        if !(t.clamp_margin >= 0.0 && t.clamp_margin.is_finite()) {
            return Err(ConfigError::NegativeMargin(t.clamp_margin));
        }
        let inset = t.ball_radius + t.clamp_margin;
        if t.width <= 2.0 * inset || t.height <= 2.0 * inset {
            return Err(ConfigError::TableTooSmall {
                width: t.width,
                height: t.height,
                radius: t.ball_radius,
                margin: t.clamp_margin,
            });
        }

        let table = Table::from_spec(t);
        let spots = std::iter::once(("cue start", t.cue_start)).chain(
            RackGenerator::new(&table)
                .slot_positions()
                .into_iter()
                .map(|p| ("rack slot", p)),
        );
        for (what, p) in spots {
            if table.clamp(p, t.ball_radius).is_some() {
                return Err(ConfigError::OutsideTable { what, x: p.x, y: p.y });
            }
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn damping(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::DampingOutOfRange { field, value })
    }
}
