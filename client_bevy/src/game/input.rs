use arena_sim::HeldKeys;
use bevy::prelude::*;

use super::UpdateSet;

pub struct InputPlugin;

#[derive(Resource, Default)]
pub(crate) struct InputState {
    pub(crate) keys: HeldKeys,
    /// R pressed this frame.
    pub(crate) restart: bool,
}

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, input_system.in_set(UpdateSet::Input));
    }
}

fn input_system(mut input: ResMut<InputState>, keys: Res<ButtonInput<KeyCode>>) {
    input.keys = held_keys(&keys);
    input.restart = keys.just_pressed(KeyCode::KeyR);
}

/// WASD and the arrow keys are interchangeable.
fn held_keys(keys: &ButtonInput<KeyCode>) -> HeldKeys {
    HeldKeys {
        forward: keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]),
        back: keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]),
        left: keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]),
        right: keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]),
    }
}
