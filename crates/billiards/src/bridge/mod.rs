pub mod snapshot;
pub mod wire;
