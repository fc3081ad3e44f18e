/// Browser key codes the session reacts to.
pub mod keys {
    pub const ESCAPE: u32 = 27;
    pub const SPACE: u32 = 32;
}

/// Input the session understands, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Press-and-hold started: begin charging toward (x, y).
    BeginAim { x: f32, y: f32 },
    /// Pointer moved to (x, y).
    UpdateAim { x: f32, y: f32 },
    /// Pointer released: fire the charged shot.
    ReleaseShot,
    /// Drop the charge without firing.
    CancelAim,
    /// Stop the cue ball mid-shot.
    SpecialAction,
    /// Re-rack and zero the score.
    Reset,
    /// A raw key press, mapped to one of the above by the session.
    KeyDown { key_code: u32 },
}

/// Events collected between frames.
/// JS pushes into the queue; the session drains it at the start of each step.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
