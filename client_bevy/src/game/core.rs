use arena_shared::config::ArenaConfig;
use bevy::prelude::*;
use bevy_rapier3d::prelude::RapierConfiguration;

use crate::constants::{color_from_hex, Colors, GRAVITY_Y};
use crate::shared::connection::ServerConnection;

use super::input::InputState;
use super::network::NetworkState;

/// Frame ordering: input is sampled, relay traffic applied, the simulation
/// ticked, then visuals follow. Rapier steps afterwards in `PostUpdate`.
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub(crate) enum UpdateSet {
    Input,
    Network,
    Simulate,
    Visuals,
}

/// Tunables shared by the simulation and the scene builders.
#[derive(Resource, Clone, Copy)]
pub(crate) struct Settings(pub(crate) ArenaConfig);

pub struct CorePlugin {
    pub ws_url: String,
    pub config: ArenaConfig,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ServerConnection::new(self.ws_url.clone()))
            .insert_resource(Settings(self.config))
            .init_resource::<InputState>()
            .init_resource::<NetworkState>()
            .insert_resource(ClearColor(color_from_hex(Colors::BACKGROUND)))
            .configure_sets(
                Update,
                (
                    UpdateSet::Input,
                    UpdateSet::Network,
                    UpdateSet::Simulate,
                    UpdateSet::Visuals,
                )
                    .chain(),
            )
            .add_systems(Startup, configure_rapier_gravity);
    }
}

fn configure_rapier_gravity(mut q_config: Query<&mut RapierConfiguration>) {
    for mut cfg in &mut q_config {
        cfg.gravity = Vec3::new(0.0, GRAVITY_Y, 0.0);
    }
}
