//! Engine-agnostic arena simulation.
//!
//! The rigid-body solver and renderer are reached only through
//! [`engine::ArenaEngine`]; randomness only through [`spawn::Sampler`]. Everything
//! else (movement, AI, coin, population, lives and the per-tick driver) lives here
//! and is deterministic under a seeded sampler.

pub mod ai;
pub mod body;
pub mod coin;
pub mod engine;
pub mod lives;
pub mod movement;
pub mod population;
pub mod remote;
pub mod simulation;
pub mod spawn;

#[cfg(test)]
pub(crate) mod testing;

pub use arena_shared::config::{ArenaConfig, ContactPolicy};
pub use arena_shared::vec3::Vec3;
pub use body::KinematicBody;
pub use engine::{ArenaEngine, BodyKind};
pub use movement::{FrameInput, HeldKeys};
pub use simulation::{PlayerState, SimEvent, SimulationLoop};
pub use spawn::{Sampler, SeededSampler, SpawnRect};
