//! Rack generation: fixed triangular slots, randomized constrained fill.
//!
//! Slots are numbered row by row from the apex:
//! ```text
//!  0                 <- apex, ball 1
//!  1  2
//!  3  4  5           <- 4 is the center of the middle row, ball 8
//!  6  7  8  9
//! 10 11 12 13 14     <- back row, corners 10 and 14
//! ```
//! The apex points toward the cue ball (-x); rows grow toward +x.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::api::error::RackError;
use crate::api::types::{BallId, Category};
use crate::game::table::Table;

pub const RACK_SLOTS: usize = 15;
pub const APEX_SLOT: usize = 0;
pub const EIGHT_SLOT: usize = 4;
pub const BACK_LEFT: usize = 10;
pub const BACK_RIGHT: usize = 14;

const ROW_SIZES: [usize; 5] = [1, 2, 3, 4, 5];

/// A ball with its starting position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RackedBall {
    pub id: BallId,
    pub position: Vec2,
}

/// Outcome of a rack generation: the cue ball spot plus the 15 racked balls in slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct Rack {
    pub cue: RackedBall,
    pub balls: Vec<RackedBall>,
}

impl Rack {
    pub fn ids(&self) -> impl Iterator<Item = BallId> + '_ {
        self.balls.iter().map(|b| b.id)
    }

    /// Check every placement invariant.
    pub fn validate(&self) -> Result<(), RackError> {
        if self.balls.len() != RACK_SLOTS {
            return Err(RackError::SlotCount {
                expected: RACK_SLOTS,
                found: self.balls.len(),
            });
        }

        let mut seen = [false; RACK_SLOTS + 1];
        for id in self.ids() {
            let n = match id {
                BallId::Object(n @ 1..=15) => n as usize,
                other => return Err(RackError::InvalidBall(other)),
            };
            if std::mem::replace(&mut seen[n], true) {
                return Err(RackError::Duplicate(id));
            }
        }

        for (slot, expected) in [(APEX_SLOT, BallId::Object(1)), (EIGHT_SLOT, BallId::EIGHT)] {
            let found = self.balls[slot].id;
            if found != expected {
                return Err(RackError::FixedSlot { slot, expected, found });
            }
        }

        let left = self.balls[BACK_LEFT].id;
        let right = self.balls[BACK_RIGHT].id;
        if left.category() == right.category() {
            return Err(RackError::MatchingCorners(left, right));
        }
        Ok(())
    }
}

/// A corrective swap applied after shuffling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerSwap {
    pub corner: usize,
    pub partner: usize,
}

/// Produces a fresh rack for each new game or reset.
#[derive(Debug, Clone)]
pub struct RackGenerator {
    apex: Vec2,
    cue_start: Vec2,
    radius: f32,
    packing: f32,
}

impl RackGenerator {
    pub fn new(table: &Table) -> Self {
        Self {
            apex: table.rack_apex(),
            cue_start: table.cue_start(),
            radius: table.ball_radius(),
            packing: table.rack_packing(),
        }
    }

    /// Center-to-center distance between neighbouring balls.
    pub fn spacing(&self) -> f32 {
        self.radius * 2.0 * self.packing
    }

    /// The 15 slot centers, row by row.
    pub fn slot_positions(&self) -> [Vec2; RACK_SLOTS] {
        let spacing = self.spacing();
        let row_offset = spacing * (std::f32::consts::PI / 3.0).sin();

        let mut positions = [Vec2::ZERO; RACK_SLOTS];
        let mut slot = 0;
        for (row, &count) in ROW_SIZES.iter().enumerate() {
            let row_width = (count - 1) as f32 * spacing;
            for i in 0..count {
                positions[slot] = Vec2::new(
                    self.apex.x + row as f32 * row_offset,
                    self.apex.y - row_width / 2.0 + i as f32 * spacing,
                );
                slot += 1;
            }
        }
        positions
    }

    /// Generate a legal rack using `rng` for the shuffle.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Rack, RackError> {
        let mut order = shuffled_order(rng);
        if let Some(swap) = correct_corners(&mut order) {
            log::debug!("Rack corners corrected: slot {} <-> slot {}", swap.corner, swap.partner);
        }

        let positions = self.slot_positions();
        let rack = Rack {
            cue: RackedBall {
                id: BallId::Cue,
                position: self.cue_start,
            },
            balls: order
                .iter()
                .zip(positions)
                .map(|(&id, position)| RackedBall { id, position })
                .collect(),
        };
        rack.validate()?;
        Ok(rack)
    }
}

/// Slots left for the shuffle once the apex and the eight are placed.
const FREE_SLOTS: [usize; 13] = [1, 2, 3, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14];
/// Every object ball except 1 and 8.
const FREE_BALLS: [u8; 13] = [2, 3, 4, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15];

/// First phase: ball 1 at the apex, ball 8 in the middle, the other 13 in a
/// uniform random permutation.
pub fn shuffled_order<R: Rng + ?Sized>(rng: &mut R) -> [BallId; RACK_SLOTS] {
    let mut free = FREE_BALLS.map(BallId::Object);
    free.shuffle(rng);

    let mut order = [BallId::EIGHT; RACK_SLOTS];
    order[APEX_SLOT] = BallId::Object(1);
    for (slot, id) in FREE_SLOTS.into_iter().zip(free) {
        order[slot] = id;
    }
    order
}

/// Second phase: make the two back-row corners differ in category with at
/// most one swap of the left corner.
///
/// A partner always exists. The free balls are 6 solids (2-7) and 7 stripes
/// (9-15). If no interior back-row ball has the opposite category, the back
/// row is monochrome, so all 6 or 7 balls of the opposite category sit in
/// the eight free slots of rows 1-3. Either search therefore finds a
/// partner, and after the swap the left corner's category differs from the
/// right corner's. [`Rack::validate`] re-checks the result.
pub fn correct_corners(order: &mut [BallId; RACK_SLOTS]) -> Option<CornerSwap> {
    let right = order[BACK_RIGHT].category();
    if order[BACK_LEFT].category() != right {
        return None;
    }

    let wanted = match right {
        Category::Solid => Category::Stripe,
        _ => Category::Solid,
    };
    let is_partner = |slot: &usize| order[*slot].category() == wanted;

    let partner = (BACK_LEFT + 1..BACK_RIGHT)
        .find(is_partner)
        .or_else(|| (1..BACK_LEFT).filter(|&s| s != EIGHT_SLOT).find(is_partner))?;

    order.swap(BACK_LEFT, partner);
    Some(CornerSwap {
        corner: BACK_LEFT,
        partner,
    })
}
