use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Identity of a ball on the table: the cue ball or a numbered object ball (1-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BallId {
    Cue,
    Object(u8),
}

impl BallId {
    /// Numbered balls in a full rack.
    pub const OBJECT_COUNT: usize = 15;

    /// The eight ball.
    pub const EIGHT: BallId = BallId::Object(8);

    /// Numeric value used on the wire: 0 for the cue ball, 1-15 otherwise.
    pub fn number(self) -> u8 {
        match self {
            BallId::Cue => 0,
            BallId::Object(n) => n,
        }
    }

    /// Inverse of [`BallId::number`]. Returns `None` outside 0..=15.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            0 => Some(BallId::Cue),
            1..=15 => Some(BallId::Object(number)),
            _ => None,
        }
    }

    pub fn is_cue(self) -> bool {
        matches!(self, BallId::Cue)
    }

    pub fn category(self) -> Category {
        match self {
            BallId::Cue => Category::Cue,
            BallId::Object(8) => Category::Eight,
            BallId::Object(n) if n < 8 => Category::Solid,
            BallId::Object(_) => Category::Stripe,
        }
    }
}

/// Ball category. Determines placement rules in the rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cue,
    Solid,
    Stripe,
    Eight,
}

impl Category {
    /// Wire code used in flat presentation buffers.
    pub fn code(self) -> f32 {
        match self {
            Category::Cue => 0.0,
            Category::Solid => 1.0,
            Category::Stripe => 2.0,
            Category::Eight => 3.0,
        }
    }
}

/// Display color of a ball (linear RGB, 0..1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl BallColor {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A sound cue emitted by the session.
/// The numeric value maps to a sound in the browser-side audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    pub const COLLISION: SoundEvent = SoundEvent(1);
    pub const POCKET: SoundEvent = SoundEvent(2);
    pub const SCRATCH: SoundEvent = SoundEvent(3);
    pub const STOP_BALL: SoundEvent = SoundEvent(4);
}

/// A game event handed to JavaScript through a flat f32 buffer.
/// `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;
}
