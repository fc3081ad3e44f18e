//! Top-level game state and the per-frame pipeline.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use crate::api::config::TableConfig;
use crate::api::error::{GameError, RackError, ShotError};
use crate::api::types::BallId;
use crate::bridge::snapshot::Snapshot;
use crate::core::physics::{Contact, TableWorld};
use crate::game::balls::{Ball, BallSet};
use crate::game::pocket::{PocketEvent, PocketResolver};
use crate::game::rack::RackGenerator;
use crate::game::settle::SettlingMonitor;
use crate::game::shot::{Shot, ShotController};
use crate::game::special::{StopBallAction, StopOutcome};
use crate::game::table::Table;
use crate::input::queue::{keys, InputEvent, InputQueue};

/// Loudest collision cue.
const MAX_COLLISION_VOLUME: f32 = 0.3;

/// Something presentation layers may animate or play a sound for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ShotFired { power: f32, speed: f32 },
    Collision { ball: BallId, speed: f32, volume: f32 },
    Pocketed { ball: BallId, pocket: usize, at: Vec2 },
    Scratch { pocket: usize, at: Vec2 },
    StopBall,
    Settled,
    Reset,
}

impl From<PocketEvent> for SessionEvent {
    fn from(event: PocketEvent) -> Self {
        match event {
            PocketEvent::Pocketed { ball, pocket, at } => SessionEvent::Pocketed { ball, pocket, at },
            PocketEvent::Scratch { pocket, at } => SessionEvent::Scratch { pocket, at },
        }
    }
}

/// Owns the score, turn counter and ball collection, and drives every
/// component through one fixed step at a time.
pub struct GameSession<W, R> {
    config: TableConfig,
    table: Table,
    world: W,
    rng: R,
    racks: RackGenerator,
    shot: ShotController,
    settle: SettlingMonitor,
    pockets: PocketResolver,
    stop_ball: StopBallAction,
    balls: BallSet,
    score: i32,
    turn: u32,
    in_motion: bool,
    input: InputQueue,
    events: Vec<SessionEvent>,
    contacts: Vec<Contact>,
}

impl<W: TableWorld, R: Rng> GameSession<W, R> {
    /// Validate `config`, install the cushions into `world` and rack the balls.
    pub fn new(config: TableConfig, mut world: W, rng: R) -> Result<Self, GameError> {
        config.validate()?;
        let table = Table::from_spec(&config.table);
        world.build_cushions(&table);

        let mut session = Self {
            racks: RackGenerator::new(&table),
            shot: ShotController::new(config.shot),
            settle: SettlingMonitor::new(config.settle),
            pockets: PocketResolver::new(&table, config.scoring),
            stop_ball: StopBallAction::new(config.stop_ball),
            balls: BallSet::new(Ball::cue(table.ball_radius())),
            score: 0,
            turn: 1,
            in_motion: false,
            input: InputQueue::new(),
            events: Vec::new(),
            contacts: Vec::new(),
            config,
            table,
            world,
            rng,
        };
        session.rack_balls()?;
        log::info!("Session ready: {} balls on the table", session.world.ball_count());
        Ok(session)
    }

    fn rack_balls(&mut self) -> Result<(), RackError> {
        let rack = self.racks.generate(&mut self.rng)?;
        let radius = self.table.ball_radius();

        self.world.clear_balls();
        self.balls = BallSet::new(Ball::cue(radius));
        self.world.insert_ball(BallId::Cue, rack.cue.position, radius);
        for racked in &rack.balls {
            self.world.insert_ball(racked.id, racked.position, radius);
            self.balls.insert(Ball::new(racked.id, radius));
        }
        Ok(())
    }

    /// Clear the table and start over: new rack, score 0, turn 1.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.shot.cancel();
        self.stop_ball.rearm();
        self.in_motion = false;
        self.score = 0;
        self.turn = 1;
        self.rack_balls()?;
        self.events.push(SessionEvent::Reset);
        log::info!("Game reset");
        Ok(())
    }

    // -- Input collaborator API --

    /// Start charging. Ignored while a shot is in flight.
    pub fn begin_aim(&mut self, pointer: Vec2) -> bool {
        if self.in_motion {
            self.shot.update_aim(pointer);
            return false;
        }
        self.shot.begin(pointer);
        true
    }

    pub fn update_aim(&mut self, pointer: Vec2) {
        self.shot.update_aim(pointer);
    }

    /// Fire the charged shot at the cue ball. On success the ball is in
    /// motion and the turn advances; on any error the controller is idle
    /// and nothing else changed.
    pub fn release_shot(&mut self) -> Result<Shot, ShotError> {
        if !self.shot.is_aiming() {
            return Err(ShotError::NotAiming);
        }
        let Some(cue_pos) = self.world.position(BallId::Cue) else {
            self.shot.cancel();
            log::warn!("Shot dropped: cue ball has no body");
            return Err(ShotError::MissingCueBall);
        };

        let shot = self.shot.release(cue_pos).map_err(|e| {
            log::warn!("Shot rejected: {}", e);
            e
        })?;

        self.world.set_velocity(BallId::Cue, shot.velocity);
        self.in_motion = true;
        self.turn += 1;
        self.stop_ball.rearm();

        let speed = shot.velocity.length();
        self.events.push(SessionEvent::ShotFired { power: shot.power, speed });
        log::info!("Turn {}: shot at power {:.0} ({:.0} px/s)", self.turn, shot.power, speed);
        Ok(shot)
    }

    pub fn cancel_aim(&mut self) {
        self.shot.cancel();
    }

    pub fn request_special_action(&mut self) -> StopOutcome {
        let outcome = self.stop_ball.try_stop(&mut self.world, self.in_motion);
        if outcome == StopOutcome::Stopped {
            self.events.push(SessionEvent::StopBall);
            log::info!("Cue ball stopped");
        }
        outcome
    }

    /// Apply one input event immediately.
    pub fn apply_input(&mut self, event: &InputEvent) -> Result<(), GameError> {
        match *event {
            InputEvent::BeginAim { x, y } => {
                self.begin_aim(Vec2::new(x, y));
            }
            InputEvent::UpdateAim { x, y } => self.update_aim(Vec2::new(x, y)),
            InputEvent::ReleaseShot => {
                self.release_shot()?;
            }
            InputEvent::CancelAim => self.cancel_aim(),
            InputEvent::SpecialAction => {
                self.request_special_action();
            }
            InputEvent::Reset => self.reset()?,
            InputEvent::KeyDown { key_code } => match key_code {
                keys::SPACE => {
                    self.request_special_action();
                }
                keys::ESCAPE => self.cancel_aim(),
                _ => {}
            },
        }
        Ok(())
    }

    /// Queue an event for the start of the next step.
    pub fn queue_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    // -- Per-frame pipeline --

    /// Advance one fixed step: queued input, power charge, physics, contact
    /// handling, clamping, settling, pocketing.
    pub fn tick(&mut self) -> Result<(), GameError> {
        for event in self.input.drain() {
            if let Err(e) = self.apply_input(&event) {
                if !e.is_recoverable() {
                    return Err(e);
                }
                log::debug!("Input {:?} ignored: {}", event, e);
            }
        }

        self.shot.charge();

        self.contacts.clear();
        self.world.step(self.config.fixed_dt, &mut self.contacts);
        self.handle_contacts();

        self.clamp_to_table();

        let settled = self
            .settle
            .apply(&mut self.world, self.balls.iter().map(|b| b.id));
        if settled && self.in_motion {
            self.in_motion = false;
            self.stop_ball.rearm();
            self.events.push(SessionEvent::Settled);
            log::debug!("Balls settled, ready for turn {}", self.turn);
        }

        let report = self.pockets.resolve(&mut self.world, &mut self.balls);
        self.score = self.score.saturating_add(report.score_delta);
        self.events
            .extend(report.events.into_iter().map(SessionEvent::from));
        Ok(())
    }

    /// Cap the speed of every ball involved in a new contact and emit a
    /// collision cue for the ones moving fast enough to be heard.
    fn handle_contacts(&mut self) {
        let tuning = self.config.contact;
        let contacts = std::mem::take(&mut self.contacts);
        for contact in &contacts {
            for ball in contact.balls() {
                let Some(vel) = self.world.velocity(ball) else {
                    continue;
                };
                let speed = vel.length();
                if speed > tuning.max_speed {
                    self.world.set_velocity(ball, vel * (tuning.max_speed / speed));
                }
                if speed > tuning.sound_threshold {
                    let volume = (speed / tuning.max_speed).min(1.0) * MAX_COLLISION_VOLUME;
                    self.events.push(SessionEvent::Collision { ball, speed, volume });
                }
            }
        }
        self.contacts = contacts;
    }

    fn clamp_to_table(&mut self) {
        for ball in self.balls.iter() {
            let Some(pos) = self.world.position(ball.id) else {
                continue;
            };
            if let Some(fixed) = self.table.clamp(pos, ball.radius) {
                log::warn!("Ball {} escaped to {:?}, clamped to {:?}", ball.id.number(), pos, fixed);
                self.world.set_position(ball.id, fixed);
            }
        }
    }

    // -- Presentation collaborator API --

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Presentation view carrying the events since the last drain.
    pub fn snapshot(&mut self) -> Snapshot {
        let events = self.drain_events();
        Snapshot::capture(self, events)
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn in_motion(&self) -> bool {
        self.in_motion
    }

    pub fn balls(&self) -> &BallSet {
        &self.balls
    }

    pub fn shot(&self) -> &ShotController {
        &self.shot
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kinematic::KinematicWorld;
    use crate::core::physics::{ContactBody, PhysicsHandle};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    type TestSession = GameSession<KinematicWorld, ChaCha8Rng>;

    fn session(seed: u64) -> TestSession {
        GameSession::new(
            TableConfig::default(),
            KinematicWorld::new(),
            ChaCha8Rng::seed_from_u64(seed),
        )
        .unwrap()
    }

    fn cue_pos(s: &TestSession) -> Vec2 {
        s.world().position(BallId::Cue).unwrap()
    }

    fn run_until_settled(s: &mut TestSession, max_ticks: usize) -> usize {
        for n in 0..max_ticks {
            s.tick().unwrap();
            if !s.in_motion() {
                return n + 1;
            }
        }
        panic!("balls still moving after {} ticks", max_ticks);
    }

    #[test]
    fn new_session_racks_all_balls() {
        let s = session(1);
        assert_eq!(s.world().ball_count(), 16);
        assert_eq!(s.balls().remaining(), 15);
        assert_eq!(s.score(), 0);
        assert_eq!(s.turn(), 1);
        assert!(!s.in_motion());
        assert_eq!(cue_pos(&s), Vec2::new(200.0, 200.0));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut config = TableConfig::default();
        config.table.ball_radius = 0.0;
        let err = GameSession::new(config, KinematicWorld::new(), ChaCha8Rng::seed_from_u64(0))
            .err()
            .unwrap();
        assert!(matches!(err, GameError::Config(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn same_seed_same_rack() {
        let a = session(99);
        let b = session(99);
        for ball in a.balls().iter() {
            assert_eq!(a.world().position(ball.id), b.world().position(ball.id));
        }
    }

    #[test]
    fn power_charges_once_per_tick() {
        let mut s = session(2);
        s.begin_aim(Vec2::new(300.0, 200.0));
        for _ in 0..10 {
            s.tick().unwrap();
        }
        assert!((s.shot().power() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn release_launches_cue_and_advances_turn() {
        let mut s = session(3);
        s.begin_aim(Vec2::new(200.0, 100.0));
        let shot = s.release_shot().unwrap();

        assert!(s.in_motion());
        assert_eq!(s.turn(), 2);
        assert_eq!(s.world().velocity(BallId::Cue), Some(shot.velocity));
        assert!(shot.velocity.y < 0.0);
        assert!(matches!(s.drain_events()[..], [SessionEvent::ShotFired { .. }]));
    }

    #[test]
    fn degenerate_aim_leaves_session_untouched() {
        let mut s = session(4);
        let cue = cue_pos(&s);
        s.begin_aim(cue);
        assert_eq!(s.release_shot(), Err(ShotError::DegenerateAim));

        assert!(!s.in_motion());
        assert_eq!(s.turn(), 1);
        assert_eq!(s.world().velocity(BallId::Cue), Some(Vec2::ZERO));
        assert!(!s.shot().is_aiming());
    }

    #[test]
    fn aiming_is_ignored_while_balls_move() {
        let mut s = session(5);
        s.begin_aim(Vec2::new(200.0, 100.0));
        s.release_shot().unwrap();

        assert!(!s.begin_aim(Vec2::new(300.0, 300.0)));
        assert!(!s.shot().is_aiming());
        assert_eq!(s.release_shot(), Err(ShotError::NotAiming));
        assert_eq!(s.turn(), 2);
    }

    #[test]
    fn settled_transition_fires_once() {
        let mut s = session(6);
        s.begin_aim(Vec2::new(200.0, 100.0));
        s.release_shot().unwrap();
        run_until_settled(&mut s, 600);

        for _ in 0..30 {
            s.tick().unwrap();
        }
        let settled = s
            .drain_events()
            .iter()
            .filter(|e| **e == SessionEvent::Settled)
            .count();
        assert_eq!(settled, 1);
        assert_eq!(s.world().velocity(BallId::Cue), Some(Vec2::ZERO));

        // Ready for the next shot
        assert!(s.begin_aim(Vec2::new(300.0, 100.0)));
    }

    #[test]
    fn object_ball_pocketed_during_tick() {
        let mut s = session(7);
        let side_pocket = Vec2::new(400.0, 15.0);
        // Clamped back to y = 20 first, still within the capture radius
        s.world_mut().set_position(BallId::Object(1), side_pocket);
        s.tick().unwrap();

        assert_eq!(s.score(), 10);
        assert!(!s.balls().contains(BallId::Object(1)));
        assert_eq!(s.world().ball_count(), 15);
        let events = s.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::Pocketed { ball: BallId::Object(1), pocket: 1, .. })));
    }

    #[test]
    fn scratch_respots_cue_and_costs_points() {
        let mut s = session(8);
        s.world_mut().set_position(BallId::Cue, Vec2::new(30.0, 370.0));
        s.world_mut().set_velocity(BallId::Cue, Vec2::new(-50.0, 50.0));
        s.tick().unwrap();

        assert_eq!(s.score(), -5);
        assert_eq!(cue_pos(&s), Vec2::new(200.0, 200.0));
        assert_eq!(s.world().velocity(BallId::Cue), Some(Vec2::ZERO));
        assert!(s.balls().contains(BallId::Cue));
    }

    #[test]
    fn escaped_ball_is_clamped_back() {
        let mut s = session(9);
        s.world_mut().set_position(BallId::Object(9), Vec2::new(-80.0, 200.0));
        s.tick().unwrap();
        assert_eq!(s.world().position(BallId::Object(9)), Some(Vec2::new(20.0, 200.0)));
    }

    #[test]
    fn contact_caps_speed_and_plays_sound() {
        let mut s = session(10);
        let id = BallId::Object(4);
        s.world_mut().set_velocity(id, Vec2::new(0.0, 2000.0));
        s.world_mut().script_contact(Contact {
            a: ContactBody::Ball(id),
            b: ContactBody::Cushion,
        });
        s.tick().unwrap();

        let speed = s.world().speed(id);
        assert!(speed <= 900.0 + 1e-3, "speed {} above cap", speed);
        let events = s.drain_events();
        let volume = events.iter().find_map(|e| match e {
            SessionEvent::Collision { ball, volume, .. } if *ball == id => Some(*volume),
            _ => None,
        });
        assert_eq!(volume, Some(MAX_COLLISION_VOLUME));
    }

    #[test]
    fn quiet_contact_has_no_sound() {
        let mut s = session(11);
        s.world_mut().script_contact(Contact {
            a: ContactBody::Ball(BallId::Object(2)),
            b: ContactBody::Ball(BallId::Object(3)),
        });
        s.tick().unwrap();
        assert!(s
            .drain_events()
            .iter()
            .all(|e| !matches!(e, SessionEvent::Collision { .. })));
    }

    #[test]
    fn stop_ball_once_per_turn_via_space_key() {
        let mut s = session(12);
        s.begin_aim(Vec2::new(200.0, 100.0));
        for _ in 0..20 {
            s.tick().unwrap();
        }
        s.release_shot().unwrap();
        s.tick().unwrap();

        s.apply_input(&InputEvent::KeyDown { key_code: keys::SPACE }).unwrap();
        assert_eq!(s.world().velocity(BallId::Cue), Some(Vec2::ZERO));

        s.world_mut().set_velocity(BallId::Cue, Vec2::new(100.0, 0.0));
        assert_eq!(s.request_special_action(), StopOutcome::AlreadyUsed);
        assert_eq!(s.world().velocity(BallId::Cue), Some(Vec2::new(100.0, 0.0)));

        let stops = s
            .drain_events()
            .iter()
            .filter(|e| **e == SessionEvent::StopBall)
            .count();
        assert_eq!(stops, 1);
    }

    fn fire_and_roll(s: &mut TestSession) {
        assert!(s.begin_aim(Vec2::new(200.0, 100.0)));
        for _ in 0..20 {
            s.tick().unwrap();
        }
        s.release_shot().unwrap();
        s.tick().unwrap();
        assert!(s.in_motion());
    }

    #[test]
    fn stop_ball_available_again_next_turn() {
        let mut s = session(16);
        fire_and_roll(&mut s);
        assert_eq!(s.request_special_action(), StopOutcome::Stopped);
        assert!(s.stop_ball.is_used());

        run_until_settled(&mut s, 600);
        assert!(!s.stop_ball.is_used());

        fire_and_roll(&mut s);
        assert_eq!(s.turn(), 3);
        assert_eq!(s.request_special_action(), StopOutcome::Stopped);
        assert_eq!(s.world().velocity(BallId::Cue), Some(Vec2::ZERO));
    }

    #[test]
    fn release_rearms_stop_ball() {
        let mut s = session(17);
        s.world_mut().set_velocity(BallId::Cue, Vec2::new(100.0, 0.0));
        assert_eq!(s.stop_ball.try_stop(&mut s.world, true), StopOutcome::Stopped);
        assert!(s.stop_ball.is_used());

        s.begin_aim(Vec2::new(200.0, 100.0));
        s.release_shot().unwrap();
        assert!(!s.stop_ball.is_used());
    }

    #[test]
    fn stop_ball_unavailable_between_shots() {
        let mut s = session(13);
        assert_eq!(s.request_special_action(), StopOutcome::NotInFlight);
    }

    #[test]
    fn queued_input_applies_on_next_tick() {
        let mut s = session(14);
        s.queue_input(InputEvent::BeginAim { x: 200.0, y: 100.0 });
        assert!(!s.shot().is_aiming());
        s.tick().unwrap();
        assert!(s.shot().is_aiming());

        s.queue_input(InputEvent::KeyDown { key_code: keys::ESCAPE });
        s.tick().unwrap();
        assert!(!s.shot().is_aiming());

        // Releasing with nothing charged is logged and skipped
        s.queue_input(InputEvent::ReleaseShot);
        s.tick().unwrap();
        assert_eq!(s.turn(), 1);
    }

    #[test]
    fn reset_restores_opening_state() {
        let mut s = session(15);
        s.world_mut().set_position(BallId::Object(6), Vec2::new(770.0, 30.0));
        s.begin_aim(Vec2::new(200.0, 100.0));
        s.release_shot().unwrap();
        s.tick().unwrap();
        assert_eq!(s.score(), 10);

        s.apply_input(&InputEvent::Reset).unwrap();

        assert_eq!(s.score(), 0);
        assert_eq!(s.turn(), 1);
        assert!(!s.in_motion());
        assert_eq!(s.balls().remaining(), 15);
        assert_eq!(s.world().ball_count(), 16);
        assert_eq!(cue_pos(&s), Vec2::new(200.0, 200.0));
        assert_eq!(s.world().velocity(BallId::Cue), Some(Vec2::ZERO));
        assert_eq!(s.drain_events().last(), Some(&SessionEvent::Reset));
    }

    #[cfg(feature = "physics")]
    #[test]
    fn break_shot_settles_on_rapier() {
        use crate::core::rapier::RapierWorld;

        let config = TableConfig::default();
        let world = RapierWorld::new(config.material);
        let mut s = GameSession::new(config, world, ChaCha8Rng::seed_from_u64(2024)).unwrap();

        s.begin_aim(Vec2::new(600.0, 200.0));
        for _ in 0..50 {
            s.tick().unwrap();
        }
        s.release_shot().unwrap();

        let mut ticks = 0;
        while s.in_motion() {
            s.tick().unwrap();
            ticks += 1;
            assert!(ticks < 3000, "break did not settle");
        }

        let mut expected = 0;
        for event in s.drain_events() {
            match event {
                SessionEvent::Pocketed { .. } => expected += 10,
                SessionEvent::Scratch { .. } => expected -= 5,
                _ => {}
            }
        }
        assert_eq!(s.score(), expected);
        assert_eq!(s.world().ball_count(), s.balls().remaining() + 1);
        for ball in s.balls().iter() {
            let pos = s.world().position(ball.id).unwrap();
            assert!(pos.x >= 0.0 && pos.x <= 800.0 && pos.y >= 0.0 && pos.y <= 400.0);
            let vel = s.world().velocity(ball.id).unwrap();
            assert!(vel.x.abs() < 9.0 && vel.y.abs() < 9.0);
        }
    }
}
