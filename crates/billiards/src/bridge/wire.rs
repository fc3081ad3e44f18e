//! Flat f32 frame buffer read by the browser side.
//! Must stay in sync with the TypeScript reader.
//!
//! Layout (all values f32):
//! ```text
//! [Header: 16 floats]
//! [Balls:  ball_count × 8 floats]
//! [Sounds: sound_count × 1 float]
//! [Events: event_count × 4 floats]
//! ```
//! Each section is exposed through its own pointer; the header carries the counts.

use bytemuck::{Pod, Zeroable};
use rand::Rng;

use crate::api::types::{BallId, GameEvent, SoundEvent};
use crate::core::physics::TableWorld;
use crate::game::session::{GameSession, SessionEvent};

pub const HEADER_FLOATS: usize = 16;

pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_BALL_COUNT: usize = 2;
pub const HEADER_SOUND_COUNT: usize = 3;
pub const HEADER_EVENT_COUNT: usize = 4;
pub const HEADER_SCORE: usize = 5;
pub const HEADER_TURN: usize = 6;
pub const HEADER_IN_MOTION: usize = 7;
pub const HEADER_AIMING: usize = 8;
pub const HEADER_POWER: usize = 9;
pub const HEADER_AIM_X: usize = 10;
pub const HEADER_AIM_Y: usize = 11;
pub const HEADER_TABLE_WIDTH: usize = 12;
pub const HEADER_TABLE_HEIGHT: usize = 13;

pub const PROTOCOL_VERSION: f32 = 1.0;

/// Event kinds in the `kind` field of a [`GameEvent`].
pub mod event_kind {
    pub const SHOT_FIRED: f32 = 1.0;
    pub const COLLISION: f32 = 2.0;
    pub const POCKETED: f32 = 3.0;
    pub const SCRATCH: f32 = 4.0;
    pub const STOP_BALL: f32 = 5.0;
    pub const SETTLED: f32 = 6.0;
    pub const RESET: f32 = 7.0;
}

/// Per-ball render data. 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BallInstance {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// 0 for the cue ball, 1-15 otherwise.
    pub number: f32,
    /// [`Category::code`](crate::api::types::Category::code).
    pub category: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl BallInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Sound cue for an event, if it has one.
pub fn sound_for(event: &SessionEvent) -> Option<SoundEvent> {
    match event {
        SessionEvent::Collision { .. } => Some(SoundEvent::COLLISION),
        SessionEvent::Pocketed { .. } => Some(SoundEvent::POCKET),
        SessionEvent::Scratch { .. } => Some(SoundEvent::SCRATCH),
        SessionEvent::StopBall => Some(SoundEvent::STOP_BALL),
        SessionEvent::ShotFired { .. } | SessionEvent::Settled | SessionEvent::Reset => None,
    }
}

/// Pack a session event into the 4-float wire form.
pub fn encode_event(event: &SessionEvent) -> GameEvent {
    let (kind, a, b, c) = match *event {
        SessionEvent::ShotFired { power, speed } => (event_kind::SHOT_FIRED, power, speed, 0.0),
        SessionEvent::Collision { ball, speed, volume } => {
            (event_kind::COLLISION, ball.number() as f32, speed, volume)
        }
        SessionEvent::Pocketed { ball, pocket, .. } => {
            (event_kind::POCKETED, ball.number() as f32, pocket as f32, 0.0)
        }
        SessionEvent::Scratch { pocket, .. } => {
            (event_kind::SCRATCH, BallId::Cue.number() as f32, pocket as f32, 0.0)
        }
        SessionEvent::StopBall => (event_kind::STOP_BALL, 0.0, 0.0, 0.0),
        SessionEvent::Settled => (event_kind::SETTLED, 0.0, 0.0, 0.0),
        SessionEvent::Reset => (event_kind::RESET, 0.0, 0.0, 0.0),
    };
    GameEvent { kind, a, b, c }
}

/// Reusable buffers for one presented frame.
pub struct FrameBuffer {
    header: [f32; HEADER_FLOATS],
    balls: Vec<BallInstance>,
    sounds: Vec<f32>,
    events: Vec<GameEvent>,
    frame: u32,
}

impl FrameBuffer {
    pub fn new() -> Self {
        let mut header = [0.0; HEADER_FLOATS];
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        Self {
            header,
            balls: Vec::with_capacity(BallId::OBJECT_COUNT + 1),
            sounds: Vec::with_capacity(16),
            events: Vec::with_capacity(16),
            frame: 0,
        }
    }

    /// Overwrite every section from the session state and this frame's events.
    pub fn write<W: TableWorld, R: Rng>(&mut self, session: &GameSession<W, R>, events: &[SessionEvent]) {
        self.frame = self.frame.wrapping_add(1);

        self.balls.clear();
        for ball in session.balls().iter() {
            let Some(pos) = session.world().position(ball.id) else {
                continue;
            };
            self.balls.push(BallInstance {
                x: pos.x,
                y: pos.y,
                radius: ball.radius,
                number: ball.id.number() as f32,
                category: ball.category.code(),
                r: ball.color.r,
                g: ball.color.g,
                b: ball.color.b,
            });
        }

        self.sounds.clear();
        self.sounds
            .extend(events.iter().filter_map(sound_for).map(|s| s.0 as f32));

        self.events.clear();
        self.events.extend(events.iter().map(encode_event));

        let shot = session.shot();
        let aim = shot.aim_point().unwrap_or_default();
        let h = &mut self.header;
        h[HEADER_FRAME_COUNTER] = self.frame as f32;
        h[HEADER_BALL_COUNT] = self.balls.len() as f32;
        h[HEADER_SOUND_COUNT] = self.sounds.len() as f32;
        h[HEADER_EVENT_COUNT] = self.events.len() as f32;
        h[HEADER_SCORE] = session.score() as f32;
        h[HEADER_TURN] = session.turn() as f32;
        h[HEADER_IN_MOTION] = if session.in_motion() { 1.0 } else { 0.0 };
        h[HEADER_AIMING] = if shot.is_aiming() { 1.0 } else { 0.0 };
        h[HEADER_POWER] = shot.power();
        h[HEADER_AIM_X] = aim.x;
        h[HEADER_AIM_Y] = aim.y;
        h[HEADER_TABLE_WIDTH] = session.table().width();
        h[HEADER_TABLE_HEIGHT] = session.table().height();
    }

    pub fn header(&self) -> &[f32] {
        &self.header
    }

    pub fn balls(&self) -> &[BallInstance] {
        &self.balls
    }

    pub fn sounds(&self) -> &[f32] {
        &self.sounds
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn balls_ptr(&self) -> *const f32 {
        bytemuck::cast_slice::<BallInstance, f32>(&self.balls).as_ptr()
    }

    pub fn sounds_ptr(&self) -> *const f32 {
        self.sounds.as_ptr()
    }

    pub fn events_ptr(&self) -> *const f32 {
        bytemuck::cast_slice::<GameEvent, f32>(&self.events).as_ptr()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::TableConfig;
    use crate::core::kinematic::KinematicWorld;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session() -> GameSession<KinematicWorld, ChaCha8Rng> {
        GameSession::new(
            TableConfig::default(),
            KinematicWorld::new(),
            ChaCha8Rng::seed_from_u64(5),
        )
        .unwrap()
    }

    #[test]
    fn ball_instance_is_32_bytes() {
        assert_eq!(std::mem::size_of::<BallInstance>(), BallInstance::STRIDE_BYTES);
    }

    #[test]
    fn pocket_event_encodes_ball_and_pocket() {
        let event = SessionEvent::Pocketed {
            ball: BallId::Object(11),
            pocket: 3,
            at: Vec2::new(30.0, 370.0),
        };
        assert_eq!(
            encode_event(&event),
            GameEvent { kind: event_kind::POCKETED, a: 11.0, b: 3.0, c: 0.0 }
        );
        assert_eq!(sound_for(&event), Some(SoundEvent::POCKET));
        assert_eq!(sound_for(&SessionEvent::Settled), None);
    }

    #[test]
    fn frame_buffer_mirrors_session() {
        let s = session();
        let events = [
            SessionEvent::Collision { ball: BallId::Object(2), speed: 300.0, volume: 0.1 },
            SessionEvent::Settled,
        ];
        let mut frame = FrameBuffer::new();
        frame.write(&s, &events);

        let header = frame.header();
        assert_eq!(header[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(header[HEADER_FRAME_COUNTER], 1.0);
        assert_eq!(header[HEADER_BALL_COUNT], 16.0);
        assert_eq!(header[HEADER_SOUND_COUNT], 1.0);
        assert_eq!(header[HEADER_EVENT_COUNT], 2.0);
        assert_eq!(header[HEADER_TURN], 1.0);

        let cue = frame.balls()[0];
        assert_eq!((cue.x, cue.y, cue.number), (200.0, 200.0, 0.0));
        assert_eq!(frame.sounds(), &[SoundEvent::COLLISION.0 as f32]);

        let flat: &[f32] = bytemuck::cast_slice(frame.balls());
        assert_eq!(flat.len(), 16 * BallInstance::FLOATS);
    }
}
