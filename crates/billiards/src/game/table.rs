//! Fixed table geometry: bounds, pockets and cushions.

use glam::Vec2;

use crate::api::config::{CushionSpec, TableSpec};

/// Four corner pockets and two side pockets.
pub const POCKET_COUNT: usize = 6;

/// A pocket zone. A ball whose center comes within `capture_radius` of
/// `center` is pocketed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pocket {
    pub index: usize,
    pub center: Vec2,
    pub capture_radius: f32,
}

impl Pocket {
    pub fn captures(&self, pos: Vec2) -> bool {
        pos.distance(self.center) < self.capture_radius
    }
}

/// Immutable table description built from a [`TableSpec`].
#[derive(Debug, Clone)]
pub struct Table {
    width: f32,
    height: f32,
    ball_radius: f32,
    clamp_margin: f32,
    cue_start: Vec2,
    rack_apex: Vec2,
    rack_packing: f32,
    pockets: Vec<Pocket>,
    cushions: Vec<CushionSpec>,
}

impl Table {
    pub fn from_spec(spec: &TableSpec) -> Self {
        let pockets = spec
            .pockets
            .iter()
            .enumerate()
            .map(|(index, &center)| Pocket {
                index,
                center,
                capture_radius: spec.pocket_radius,
            })
            .collect();

        Self {
            width: spec.width,
            height: spec.height,
            ball_radius: spec.ball_radius,
            clamp_margin: spec.clamp_margin,
            cue_start: spec.cue_start,
            rack_apex: spec.rack_apex,
            rack_packing: spec.rack_packing,
            pockets,
            cushions: spec.cushions.clone(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn ball_radius(&self) -> f32 {
        self.ball_radius
    }

    /// Where the cue ball starts and is re-spotted after a scratch.
    pub fn cue_start(&self) -> Vec2 {
        self.cue_start
    }

    pub fn rack_apex(&self) -> Vec2 {
        self.rack_apex
    }

    pub fn rack_packing(&self) -> f32 {
        self.rack_packing
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    pub fn cushions(&self) -> &[CushionSpec] {
        &self.cushions
    }

    /// Pull a ball center back inside the bounds minus radius and margin.
    /// Returns `None` when the position is already inside.
    pub fn clamp(&self, pos: Vec2, radius: f32) -> Option<Vec2> {
        let inset = radius + self.clamp_margin;
        let min = Vec2::splat(inset);
        let max = Vec2::new(self.width - inset, self.height - inset);
        let clamped = pos.clamp(min, max);
        (clamped != pos).then_some(clamped)
    }
}
