use arena_shared::vec3::Vec3 as SimVec3;
use bevy::prelude::{EulerRot, Quat, Vec3};

/// Simulation space (f64) to Bevy world space (f32). Both are Y-up with the
/// same handedness, so this is only a precision change.
pub fn to_bevy(v: SimVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

pub fn to_sim(v: Vec3) -> SimVec3 {
    SimVec3::new(v.x as f64, v.y as f64, v.z as f64)
}

/// Euler XYZ radians, the representation carried by `KinematicBody`.
pub fn euler_from_quat(q: Quat) -> SimVec3 {
    let (x, y, z) = q.to_euler(EulerRot::XYZ);
    SimVec3::new(x as f64, y as f64, z as f64)
}

pub fn quat_from_euler(e: SimVec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, e.x as f32, e.y as f32, e.z as f32)
}
