use billiards::{
    FrameBuffer, GameError, GameSession, InputEvent, SessionEvent, Snapshot, TableConfig,
    TableWorld,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Fixed timestep accumulator.
/// Turns variable browser frame times into whole session steps.
pub struct FrameClock {
    dt: f32,
    accumulator: f32,
    max_steps: u32,
}

impl FrameClock {
    pub fn new(dt: f32, max_steps: u32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        // A stalled tab would otherwise replay seconds of simulation at once
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Owns the session and the presentation buffers for one page.
///
/// wasm-bindgen cannot export generic structs, so `lib.rs` keeps one of
/// these in a `thread_local!` and exports free functions around it.
pub struct SessionRunner<W: TableWorld> {
    session: GameSession<W, ChaCha8Rng>,
    clock: FrameClock,
    frame: FrameBuffer,
    last_events: Vec<SessionEvent>,
}

impl<W: TableWorld> SessionRunner<W> {
    pub fn new(config: TableConfig, world: W, seed: u64) -> Result<Self, GameError> {
        let clock = FrameClock::new(config.fixed_dt, config.max_catch_up_steps);
        let session = GameSession::new(config, world, ChaCha8Rng::seed_from_u64(seed))?;

        let mut runner = Self {
            session,
            clock,
            frame: FrameBuffer::new(),
            last_events: Vec::new(),
        };
        runner.frame.write(&runner.session, &runner.last_events);
        Ok(runner)
    }

    /// Queue input for the next fixed step.
    pub fn push_input(&mut self, event: InputEvent) {
        self.session.queue_input(event);
    }

    /// Run one browser frame: as many fixed steps as `dt` covers, then
    /// rebuild the frame buffer. Returns the number of steps taken.
    pub fn tick(&mut self, dt: f32) -> Result<u32, GameError> {
        let steps = self.clock.accumulate(dt);
        for _ in 0..steps {
            self.session.tick()?;
        }

        self.last_events = self.session.drain_events();
        self.frame.write(&self.session, &self.last_events);
        Ok(steps)
    }

    /// JSON snapshot of the current state with the last frame's events.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        Snapshot::capture(&self.session, self.last_events.clone()).to_json()
    }

    // ---- Pointer accessors for the JS reader ----

    pub fn header_ptr(&self) -> *const f32 {
        self.frame.header_ptr()
    }

    pub fn header_len(&self) -> u32 {
        self.frame.header().len() as u32
    }

    pub fn balls_ptr(&self) -> *const f32 {
        self.frame.balls_ptr()
    }

    pub fn ball_count(&self) -> u32 {
        self.frame.balls().len() as u32
    }

    pub fn sounds_ptr(&self) -> *const f32 {
        self.frame.sounds_ptr()
    }

    pub fn sound_count(&self) -> u32 {
        self.frame.sounds().len() as u32
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.frame.events_ptr()
    }

    pub fn event_count(&self) -> u32 {
        self.frame.events().len() as u32
    }

    pub fn score(&self) -> i32 {
        self.session.score()
    }

    pub fn turn(&self) -> u32 {
        self.session.turn()
    }

    pub fn in_motion(&self) -> bool {
        self.session.in_motion()
    }
}
