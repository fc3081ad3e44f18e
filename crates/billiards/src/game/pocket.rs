//! Pocket detection and scoring.
//!
//! Resolution runs in two passes: every active ball is tested against the
//! pockets using positions from the same physics step, then all hits are
//! applied. Hits never depend on each other, so the outcome is the same in
//! any ball order.

use glam::Vec2;

use crate::api::config::ScoringRules;
use crate::api::types::BallId;
use crate::core::physics::{PhysicsHandle, TableWorld};
use crate::game::balls::BallSet;
use crate::game::table::{Pocket, Table};

/// Something that happened at a pocket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PocketEvent {
    /// An object ball dropped and left play.
    Pocketed { ball: BallId, pocket: usize, at: Vec2 },
    /// The cue ball dropped and was re-spotted.
    Scratch { pocket: usize, at: Vec2 },
}

/// A ball found inside a pocket's capture radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PocketHit {
    pub ball: BallId,
    pub pocket: usize,
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PocketReport {
    pub score_delta: i32,
    pub events: Vec<PocketEvent>,
}

#[derive(Debug, Clone)]
pub struct PocketResolver {
    pockets: Vec<Pocket>,
    cue_start: Vec2,
    rules: ScoringRules,
}

impl PocketResolver {
    pub fn new(table: &Table, rules: ScoringRules) -> Self {
        Self {
            pockets: table.pockets().to_vec(),
            cue_start: table.cue_start(),
            rules,
        }
    }

    /// Detection pass. A ball inside several capture radii goes to the first pocket.
    pub fn detect<P: PhysicsHandle + ?Sized>(&self, physics: &P, balls: &BallSet) -> Vec<PocketHit> {
        balls
            .iter()
            .filter_map(|ball| {
                let pos = physics.position(ball.id)?;
                let pocket = self.pockets.iter().find(|p| p.captures(pos))?;
                Some(PocketHit {
                    ball: ball.id,
                    pocket: pocket.index,
                })
            })
            .collect()
    }

    /// Score change for a set of hits.
    pub fn score_delta(&self, hits: &[PocketHit]) -> i32 {
        hits.iter().fold(0i32, |acc, hit| {
            if hit.ball.is_cue() {
                acc.saturating_sub(self.rules.scratch_penalty)
            } else {
                acc.saturating_add(self.rules.pocket_bonus)
            }
        })
    }

    /// Detect and apply: object balls leave `balls` and the world, the cue
    /// ball goes back to its start spot at rest.
    pub fn resolve<W: TableWorld + ?Sized>(&self, world: &mut W, balls: &mut BallSet) -> PocketReport {
        let hits = self.detect(&*world, balls);
        let mut report = PocketReport {
            score_delta: self.score_delta(&hits),
            events: Vec::with_capacity(hits.len()),
        };

        for hit in hits {
            let at = self
                .pockets
                .get(hit.pocket)
                .map(|p| p.center)
                .unwrap_or_default();

            if hit.ball.is_cue() {
                world.set_position(BallId::Cue, self.cue_start);
                world.set_velocity(BallId::Cue, Vec2::ZERO);
                log::info!("Scratch in pocket {} - cue ball re-spotted", hit.pocket);
                report.events.push(PocketEvent::Scratch { pocket: hit.pocket, at });
            } else {
                balls.remove(hit.ball);
                world.remove_ball(hit.ball);
                log::info!("Ball {} pocketed into pocket {}", hit.ball.number(), hit.pocket);
                report.events.push(PocketEvent::Pocketed {
                    ball: hit.ball,
                    pocket: hit.pocket,
                    at,
                });
            }
        }
        report
    }
}
