use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;

use crate::constants::{
    CAMERA_DISTANCE, CAMERA_DRAG_SPEED, CAMERA_MAX_DISTANCE, CAMERA_MAX_PITCH,
    CAMERA_MIN_DISTANCE, CAMERA_MIN_PITCH, CAMERA_PITCH, CAMERA_YAW, CAMERA_ZOOM_SPEED,
};
use crate::coord::to_bevy;

use super::core::Settings;
use super::sim::ArenaSim;
use super::UpdateSet;

/// Pixel-unit scroll deltas per wheel notch.
const PIXELS_PER_LINE: f32 = 100.0;

pub struct CameraPlugin;

/// Orbit around the simulation's camera target. `yaw` is measured from +X
/// around the Y axis, `pitch` down from straight overhead.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub(crate) struct OrbitCamera {
    pub(crate) yaw: f32,
    pub(crate) pitch: f32,
    pub(crate) distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: CAMERA_YAW,
            pitch: CAMERA_PITCH,
            distance: CAMERA_DISTANCE,
        }
    }
}

impl OrbitCamera {
    fn offset(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.yaw.cos() * self.pitch.sin(),
            self.distance * self.pitch.cos(),
            self.distance * self.yaw.sin() * self.pitch.sin(),
        )
    }

    pub(crate) fn transform_for(&self, target: Vec3) -> Transform {
        Transform::from_translation(target + self.offset()).looking_at(target, Vec3::Y)
    }

    fn drag(&mut self, delta: Vec2) {
        self.yaw -= delta.x * CAMERA_DRAG_SPEED;
        self.pitch = (self.pitch - delta.y * CAMERA_DRAG_SPEED)
            .clamp(CAMERA_MIN_PITCH, CAMERA_MAX_PITCH);
    }

    fn zoom(&mut self, notches: f32) {
        self.distance = (self.distance - notches * CAMERA_ZOOM_SPEED)
            .clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
    }
}

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(Update, orbit_camera_system.in_set(UpdateSet::Visuals));
    }
}

fn setup_camera(mut commands: Commands, settings: Res<Settings>) {
    let orbit = OrbitCamera::default();
    commands.spawn((
        Camera3d::default(),
        Msaa::Sample4,
        Tonemapping::None,
        orbit,
        orbit.transform_for(to_bevy(settings.0.player_spawn)),
    ));
}

fn orbit_camera_system(
    arena: Option<Res<ArenaSim>>,
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mut q_camera: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    let Some(arena) = arena else {
        return;
    };
    let Ok((mut orbit, mut transform)) = q_camera.single_mut() else {
        return;
    };

    if buttons.pressed(MouseButton::Left) && motion.delta != Vec2::ZERO {
        orbit.drag(motion.delta);
    }
    if scroll.delta.y != 0.0 {
        let notches = match scroll.unit {
            MouseScrollUnit::Line => scroll.delta.y,
            MouseScrollUnit::Pixel => scroll.delta.y / PIXELS_PER_LINE,
        };
        orbit.zoom(notches);
    }

    *transform = orbit.transform_for(to_bevy(arena.sim.camera_target()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_orbit_sits_above_and_looks_at_target() {
        let target = Vec3::new(0.0, 4.0, 0.0);
        let t = OrbitCamera::default().transform_for(target);

        assert!(t.translation.y > target.y);
        assert!((t.translation.distance(target) - CAMERA_DISTANCE).abs() < 1e-3);
        let to_target = (target - t.translation).normalize();
        assert!(t.forward().dot(to_target) > 0.999);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.zoom(1000.0);
        assert_eq!(orbit.distance, CAMERA_MIN_DISTANCE);
        orbit.zoom(-1000.0);
        assert_eq!(orbit.distance, CAMERA_MAX_DISTANCE);
    }

    #[test]
    fn drag_never_flips_over_the_pole() {
        let mut orbit = OrbitCamera::default();
        orbit.drag(Vec2::new(0.0, 1e6));
        assert_eq!(orbit.pitch, CAMERA_MIN_PITCH);
        orbit.drag(Vec2::new(0.0, -1e6));
        assert_eq!(orbit.pitch, CAMERA_MAX_PITCH);
    }
}
