//! Capability surface the simulation needs from the physics/render engine.

use std::fmt::Debug;

use arena_shared::vec3::Vec3;

use crate::body::KinematicBody;

/// What the engine should build when asked to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// The locally controlled sphere (dynamic body)
    Player,
    /// An AI sphere (dynamic body); `index` is its stable display identity
    Ai { index: usize },
    /// The collectible (visual only, no collider)
    Coin,
}

/// Physics/render engine as seen by the simulation.
///
/// Handles may refer to bodies the engine has not materialised yet (or no
/// longer has); queries then return `None` and the simulation skips that
/// entity for the tick.
pub trait ArenaEngine {
    type Handle: Copy + Eq + Debug;

    /// Create a visual+physical entity at `at`.
    fn spawn(&mut self, kind: BodyKind, at: Vec3) -> Self::Handle;

    fn despawn(&mut self, handle: Self::Handle);

    fn body(&self, handle: Self::Handle) -> Option<KinematicBody>;

    fn position(&self, handle: Self::Handle) -> Option<Vec3> {
        self.body(handle).map(|b| b.position)
    }

    fn linear_velocity(&self, handle: Self::Handle) -> Option<Vec3> {
        self.body(handle).map(|b| b.velocity)
    }

    fn set_linear_velocity(&mut self, handle: Self::Handle, velocity: Vec3);

    /// Apply an instantaneous impulse at world point `at`.
    fn apply_impulse(&mut self, handle: Self::Handle, impulse: Vec3, at: Vec3);

    /// Cosmetic orientation, Euler radians.
    fn set_rotation(&mut self, handle: Self::Handle, rotation: Vec3);
}
