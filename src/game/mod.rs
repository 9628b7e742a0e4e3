//! Pitch model: geometry, physics prediction and the agent's world state

pub mod formation;
pub mod frame;
pub mod geometry;
pub mod params;
pub mod physics;
pub mod snapshot;
pub mod world;

