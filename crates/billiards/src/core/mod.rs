pub mod kinematic;
pub mod physics;
#[cfg(feature = "physics")]
pub mod rapier;
