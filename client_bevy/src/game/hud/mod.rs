mod spawn;
mod systems;
mod types;

use bevy::prelude::*;

use super::UpdateSet;
use types::HudUiState;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HudUiState>()
            .add_systems(Startup, spawn::spawn_hud)
            .add_systems(
                Update,
                (
                    systems::toggle_rules_ui,
                    systems::update_rules_panel_ui,
                    systems::update_connection_ui,
                    systems::update_status_ui,
                    systems::update_players_ui,
                    systems::update_game_over_ui,
                )
                    .chain()
                    .in_set(UpdateSet::Visuals),
            );
    }
}
