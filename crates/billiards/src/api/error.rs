use thiserror::Error;

use crate::api::types::BallId;

/// Invalid table or tuning configuration. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("rack packing constant must be at least 1.0, got {0}")]
    OverlappingRack(f32),

    #[error("{field} must lie in (0, 1], got {value}")]
    DampingOutOfRange { field: &'static str, value: f32 },

    #[error("base shot speed {base} exceeds max shot speed {max}")]
    InvertedSpeedRange { base: f32, max: f32 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("table.clamp_margin must be zero or more, got {0}")]
    NegativeMargin(f32),

    #[error("table needs exactly {expected} pockets, got {found}")]
    PocketCount { expected: usize, found: usize },

    #[error("table {width}x{height} has no room for a ball of radius {radius} plus margin {margin}")]
    TableTooSmall {
        width: f32,
        height: f32,
        radius: f32,
        margin: f32,
    },

    #[error("{what} at ({x}, {y}) lies outside the table")]
    OutsideTable { what: &'static str, x: f32, y: f32 },
}

/// Rack generation produced an illegal arrangement. Fatal at generation time.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RackError {
    #[error("expected {expected} rack slots, got {found}")]
    SlotCount { expected: usize, found: usize },

    #[error("ball {0:?} appears more than once in the rack")]
    Duplicate(BallId),

    #[error("ball {0:?} is not a valid object ball")]
    InvalidBall(BallId),

    #[error("slot {slot} must hold {expected:?}, found {found:?}")]
    FixedSlot {
        slot: usize,
        expected: BallId,
        found: BallId,
    },

    #[error("back-row corners {0:?} and {1:?} share a category")]
    MatchingCorners(BallId, BallId),
}

/// A shot could not be taken. Local and recoverable: the controller returns to idle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotError {
    #[error("no shot is being charged")]
    NotAiming,

    #[error("aim point coincides with the cue ball")]
    DegenerateAim,

    #[error("cue ball has no physics body")]
    MissingCueBall,
}

/// Errors surfaced at the session boundary.
#[derive(Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rack(#[from] RackError),

    #[error(transparent)]
    Shot(#[from] ShotError),
}

impl GameError {
    /// Shot errors leave the session playable; the rest are configuration faults.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GameError::Shot(_))
    }
}
