//! Scene layout, palette and client-side tunables.

/// Ground plane (square, centred on the origin).
pub const GROUND_SIZE: f32 = 40.0;
pub const GROUND_Y: f32 = -2.0;
/// Collider thickness below the visible ground surface.
pub const GROUND_THICKNESS: f32 = 0.5;

pub const WALL_HEIGHT: f32 = 3.0;
pub const WALL_THICKNESS: f32 = 0.5;
pub const WALL_CENTER_Y: f32 = -0.5;
pub const WALL_OFFSET: f32 = GROUND_SIZE / 2.0;

pub const COIN_THICKNESS: f32 = 0.15;

pub const GRAVITY_Y: f32 = -9.81;

/// Initial orbit: yaw/pitch in radians, distance in meters.
pub const CAMERA_YAW: f32 = std::f32::consts::PI / 2.5;
pub const CAMERA_PITCH: f32 = std::f32::consts::PI / 3.0;
pub const CAMERA_DISTANCE: f32 = 18.0;
pub const CAMERA_MIN_DISTANCE: f32 = 4.0;
pub const CAMERA_MAX_DISTANCE: f32 = 45.0;
pub const CAMERA_MIN_PITCH: f32 = 0.15;
pub const CAMERA_MAX_PITCH: f32 = 1.45;
pub const CAMERA_DRAG_SPEED: f32 = 0.005;
pub const CAMERA_ZOOM_SPEED: f32 = 1.0;

/// Seconds between local state pushes to the relay (20 Hz).
pub const NET_PUSH_INTERVAL: f64 = 0.05;

/// Cap on a single frame's dt fed to the simulation.
pub const MAX_FRAME_DT: f64 = 0.1;

#[derive(Clone, Copy)]
pub struct Colors;

impl Colors {
    pub const BACKGROUND: u32 = 0x000000;
    pub const GROUND: u32 = 0x3a3f47;
    pub const WALL: u32 = 0x6b7280;
    pub const PLAYER: u32 = 0xff8844;
    pub const PLAYER_INVINCIBLE: u32 = 0xffffff;
    pub const AI: u32 = 0x3399ff;
    pub const COIN: u32 = 0xffd700;
    pub const GHOST: u32 = 0x44ff88;
    pub const STATUS_CONNECTED: u32 = 0x44ff44;
    pub const STATUS_CONNECTING: u32 = 0xffaa00;
    pub const STATUS_DISCONNECTED: u32 = 0xff4444;
}

pub fn color_from_hex(rgb: u32) -> bevy::prelude::Color {
    let r = ((rgb >> 16) & 0xff) as f32 / 255.0;
    let g = ((rgb >> 8) & 0xff) as f32 / 255.0;
    let b = (rgb & 0xff) as f32 / 255.0;
    bevy::prelude::Color::srgb(r, g, b)
}
