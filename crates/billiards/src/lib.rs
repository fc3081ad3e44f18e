pub mod api;
pub mod core;
pub mod game;
pub mod input;
pub mod bridge;

// Re-export key types at crate root for convenience
pub use api::config::{
    ContactTuning, MaterialTuning, ScoringRules, SettleTuning, ShotTuning, StopBallTuning,
    TableConfig, TableSpec,
};
pub use api::error::{ConfigError, GameError, RackError, ShotError};
pub use api::types::{BallColor, BallId, Category, GameEvent, SoundEvent};
pub use bridge::snapshot::Snapshot;
pub use bridge::wire::{BallInstance, FrameBuffer};
pub use crate::core::kinematic::KinematicWorld;
pub use crate::core::physics::{Contact, ContactBody, PhysicsHandle, TableWorld};
pub use game::balls::{Ball, BallSet};
pub use game::pocket::{PocketEvent, PocketResolver};
pub use game::rack::{Rack, RackGenerator};
pub use game::session::{GameSession, SessionEvent};
pub use game::settle::SettlingMonitor;
pub use game::shot::{Shot, ShotController, ShotPhase};
pub use game::special::{StopBallAction, StopOutcome};
pub use game::table::{Pocket, Table};
pub use input::queue::{InputEvent, InputQueue};

#[cfg(feature = "physics")]
pub use crate::core::rapier::RapierWorld;

/// The physics backend used by the browser build: Rapier2D when the
/// `physics` feature is on, the collision-free integrator otherwise.
#[cfg(feature = "physics")]
pub type DefaultWorld = RapierWorld;
#[cfg(not(feature = "physics"))]
pub type DefaultWorld = KinematicWorld;

/// Build the default physics backend for `config`.
pub fn default_world(config: &TableConfig) -> DefaultWorld {
    #[cfg(feature = "physics")]
    {
        RapierWorld::new(config.material)
    }
    #[cfg(not(feature = "physics"))]
    {
        let _ = config;
        KinematicWorld::new()
    }
}
