//! Read-only JSON view of a session for presentation layers.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use crate::api::types::{BallColor, BallId, Category};
use crate::core::physics::TableWorld;
use crate::game::session::{GameSession, SessionEvent};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub id: BallId,
    pub number: u8,
    pub category: Category,
    pub position: Vec2,
    pub radius: f32,
    pub color: BallColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CueView {
    pub aiming: bool,
    /// 0-100.
    pub power: f32,
    /// Radians, cue ball toward the pointer. `None` until the pointer is known.
    pub aim_angle: Option<f32>,
    pub aim_point: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub balls: Vec<BallView>,
    pub cue: CueView,
    pub events: Vec<SessionEvent>,
    pub score: i32,
    pub turn: u32,
    pub in_motion: bool,
}

impl Snapshot {
    pub fn capture<W: TableWorld, R: Rng>(session: &GameSession<W, R>, events: Vec<SessionEvent>) -> Self {
        let world = session.world();
        let balls = session
            .balls()
            .iter()
            .filter_map(|ball| {
                Some(BallView {
                    id: ball.id,
                    number: ball.id.number(),
                    category: ball.category,
                    position: world.position(ball.id)?,
                    radius: ball.radius,
                    color: ball.color,
                })
            })
            .collect();

        let shot = session.shot();
        let aim_angle = world
            .position(BallId::Cue)
            .and_then(|cue| shot.aim_angle(cue));

        Self {
            balls,
            cue: CueView {
                aiming: shot.is_aiming(),
                power: shot.power(),
                aim_angle,
                aim_point: shot.aim_point(),
            },
            events,
            score: session.score(),
            turn: session.turn(),
            in_motion: session.in_motion(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::TableConfig;
    use crate::core::kinematic::KinematicWorld;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn snapshot_serializes_session_state() {
        let mut s = GameSession::new(
            TableConfig::default(),
            KinematicWorld::new(),
            ChaCha8Rng::seed_from_u64(3),
        )
        .unwrap();
        s.begin_aim(Vec2::new(200.0, 300.0));
        s.tick().unwrap();

        let snap = s.snapshot();
        assert_eq!(snap.balls.len(), 16);
        assert_eq!(snap.balls[0].id, BallId::Cue);
        assert!(snap.cue.aiming);
        assert!((snap.cue.power - 2.0).abs() < 1e-4);
        let angle = snap.cue.aim_angle.unwrap();
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);

        let json: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(json["turn"], 1);
        assert_eq!(json["balls"][0]["category"], "cue");
        assert_eq!(json["balls"][0]["position"], serde_json::json!([200.0, 200.0]));
        assert_eq!(json["in_motion"], false);
    }

    #[test]
    fn events_are_drained_into_one_snapshot() {
        let mut s = GameSession::new(
            TableConfig::default(),
            KinematicWorld::new(),
            ChaCha8Rng::seed_from_u64(4),
        )
        .unwrap();
        s.reset().unwrap();

        let first = s.snapshot();
        assert_eq!(first.events, vec![SessionEvent::Reset]);
        assert!(s.snapshot().events.is_empty());

        let json = serde_json::to_value(&first).unwrap();
        assert_eq!(json["events"][0]["type"], "reset");
    }
}
