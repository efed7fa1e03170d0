mod constants;
mod coord;
mod game;
mod shared;

use arena_shared::config::ArenaConfig;
use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};
use bevy_rapier3d::prelude::*;

use game::{
    ArenaPlugin, CameraPlugin, CorePlugin, HudPlugin, InputPlugin, NetworkPlugin, SimPlugin,
};

const DEFAULT_WS_URL: &str = "ws://127.0.0.1:3001/ws";

fn main() {
    let ws_url = std::env::var("ARENA_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());
    let config = ArenaConfig::default();
    if let Err(e) = config.validate() {
        eprintln!("Invalid arena config: {}", e);
        std::process::exit(1);
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Rolling Arena".to_string(),
                resolution: WindowResolution::new(1280, 800),
                present_mode: PresentMode::AutoVsync,
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(CorePlugin { ws_url, config })
        .add_plugins(ArenaPlugin)
        .add_plugins(CameraPlugin)
        .add_plugins(InputPlugin)
        .add_plugins(NetworkPlugin)
        .add_plugins(SimPlugin)
        .add_plugins(HudPlugin)
        .run();
}
