use arena_shared::config::ArenaConfig;
use arena_shared::vec3::{add, cross, flatten, horizontal_length, scale, try_normalize, Vec3};

use crate::engine::ArenaEngine;

/// Directional keys held during a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }

    /// Unit intent as (right, forward). Opposite keys cancel; `None` when
    /// nothing remains.
    pub fn intent(&self) -> Option<(f64, f64)> {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f64;
        let r = axis(self.right, self.left);
        let f = axis(self.forward, self.back);
        let len = (r * r + f * f).sqrt();
        if len == 0.0 {
            return None;
        }
        Some((r / len, f / len))
    }
}

/// Per-frame input handed to the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub keys: HeldKeys,
    /// Camera look direction in world space (need not be horizontal)
    pub camera_forward: Vec3,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            keys: HeldKeys::default(),
            camera_forward: Vec3::new(0.0, 0.0, -1.0),
        }
    }
}

/// Horizontal (forward, right) basis of the camera. A camera looking straight
/// up or down falls back to world -Z.
pub fn camera_basis(camera_forward: Vec3) -> (Vec3, Vec3) {
    let forward = try_normalize(flatten(camera_forward)).unwrap_or(Vec3::new(0.0, 0.0, -1.0));
    let right = cross(forward, Vec3::UP);
    (forward, right)
}

/// Rescale the XZ part of `velocity` to `max_speed` if it is faster.
/// Returns `None` when no clamp is needed.
pub fn clamp_horizontal(velocity: Vec3, max_speed: f64) -> Option<Vec3> {
    let speed = horizontal_length(velocity);
    if speed <= max_speed {
        return None;
    }
    let k = max_speed / speed;
    Some(Vec3::new(velocity.x * k, velocity.y, velocity.z * k))
}

pub struct MovementController {
    move_force: f64,
    max_speed: f64,
}

impl MovementController {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            move_force: config.move_force,
            max_speed: config.max_speed,
        }
    }

    /// World-space unit direction for the held keys, if any.
    pub fn world_direction(keys: &HeldKeys, camera_forward: Vec3) -> Option<Vec3> {
        let (r, f) = keys.intent()?;
        let (forward, right) = camera_basis(camera_forward);
        try_normalize(add(scale(right, r), scale(forward, f)))
    }

    /// Push the player along the held direction and enforce the speed cap.
    /// Returns whether an impulse was applied.
    pub fn apply<E: ArenaEngine>(
        &self,
        engine: &mut E,
        player: E::Handle,
        input: &FrameInput,
        dt: f64,
    ) -> bool {
        let Some(position) = engine.position(player) else {
            return false;
        };

        let mut pushed = false;
        if let Some(dir) = Self::world_direction(&input.keys, input.camera_forward) {
            engine.apply_impulse(player, scale(dir, self.move_force * dt), position);
            pushed = true;
        }

        if let Some(velocity) = engine.linear_velocity(player) {
            if let Some(clamped) = clamp_horizontal(velocity, self.max_speed) {
                engine.set_linear_velocity(player, clamped);
            }
        }
        pushed
    }
}
