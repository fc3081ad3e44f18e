//! Ball data: palette, categories and the active-ball collection.

use crate::api::types::{BallColor, BallId, Category};

const WHITE: BallColor = BallColor::rgb(1.0, 1.0, 1.0);
const BLACK: BallColor = BallColor::rgb(0.0, 0.0, 0.0);

/// Colors for balls 1-7; stripes 9-15 reuse them.
const PALETTE: [BallColor; 7] = [
    BallColor::rgb(0.99, 0.82, 0.09), // Yellow
    BallColor::rgb(0.12, 0.27, 0.99), // Blue
    BallColor::rgb(0.89, 0.13, 0.09), // Red
    BallColor::rgb(0.45, 0.21, 0.21), // Maroon
    BallColor::rgb(0.30, 0.77, 0.09), // Green
    BallColor::rgb(0.77, 0.54, 0.09), // Ochre
    BallColor::rgb(0.91, 0.54, 0.38), // Salmon
];

/// Display color for a ball.
pub fn color_of(id: BallId) -> BallColor {
    match id {
        BallId::Cue => WHITE,
        BallId::Object(8) => BLACK,
        BallId::Object(n @ 1..=7) => PALETTE[(n - 1) as usize],
        BallId::Object(n @ 9..=15) => PALETTE[(n - 9) as usize],
        BallId::Object(_) => WHITE,
    }
}

/// A ball in play. Position and velocity live in the physics world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub id: BallId,
    pub category: Category,
    pub radius: f32,
    pub color: BallColor,
}

impl Ball {
    pub fn new(id: BallId, radius: f32) -> Self {
        Self {
            id,
            category: id.category(),
            radius,
            color: color_of(id),
        }
    }

    pub fn cue(radius: f32) -> Self {
        Self::new(BallId::Cue, radius)
    }
}

/// The active balls: the cue ball, which is never removed, plus the object
/// balls still on the table. No id appears twice.
#[derive(Debug, Clone)]
pub struct BallSet {
    cue: Ball,
    objects: Vec<Ball>,
}

impl BallSet {
    pub fn new(cue: Ball) -> Self {
        Self {
            cue,
            objects: Vec::with_capacity(BallId::OBJECT_COUNT),
        }
    }

    /// Add an object ball. Returns `false` and leaves the set unchanged if
    /// the ball is the cue ball or its id is already present.
    pub fn insert(&mut self, ball: Ball) -> bool {
        if ball.id.is_cue() || self.contains(ball.id) {
            return false;
        }
        self.objects.push(ball);
        true
    }

    /// Remove an object ball. The cue ball cannot be removed.
    pub fn remove(&mut self, id: BallId) -> Option<Ball> {
        let idx = self.objects.iter().position(|b| b.id == id)?;
        Some(self.objects.remove(idx))
    }

    pub fn contains(&self, id: BallId) -> bool {
        id.is_cue() || self.objects.iter().any(|b| b.id == id)
    }

    /// Cue ball first, then object balls in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Ball> {
        std::iter::once(&self.cue).chain(self.objects.iter())
    }

    /// Object balls left on the table.
    pub fn remaining(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripes_share_solid_colors() {
        assert_eq!(color_of(BallId::Object(3)), color_of(BallId::Object(11)));
        assert_eq!(color_of(BallId::EIGHT), BLACK);
        assert_eq!(color_of(BallId::Cue), WHITE);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut set = BallSet::new(Ball::cue(15.0));
        assert!(set.insert(Ball::new(BallId::Object(4), 15.0)));
        assert!(!set.insert(Ball::new(BallId::Object(4), 15.0)));
        assert!(!set.insert(Ball::cue(15.0)));
        assert_eq!(set.remaining(), 1);
    }

    #[test]
    fn cue_ball_always_present() {
        let mut set = BallSet::new(Ball::cue(15.0));
        set.insert(Ball::new(BallId::Object(12), 15.0));
        assert!(set.remove(BallId::Cue).is_none());
        assert!(set.remove(BallId::Object(12)).is_some());
        assert!(set.contains(BallId::Cue));
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn iteration_starts_with_cue() {
        let mut set = BallSet::new(Ball::cue(15.0));
        set.insert(Ball::new(BallId::Object(9), 15.0));
        set.insert(Ball::new(BallId::Object(2), 15.0));
        let ids: Vec<_> = set.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![BallId::Cue, BallId::Object(9), BallId::Object(2)]);
        let two = set.iter().find(|b| b.id == BallId::Object(2)).unwrap();
        assert_eq!(two.category, Category::Solid);
    }
}
