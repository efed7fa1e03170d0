use std::collections::HashMap;

use arena_shared::config::ArenaConfig;
use arena_shared::protocol::{BodyState, ServerMsg};
use arena_sim::remote::{RemoteRoster, RosterChange};
use arena_sim::KinematicBody;
use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

use crate::constants::{color_from_hex, Colors, NET_PUSH_INTERVAL};
use crate::coord::{euler_from_quat, quat_from_euler, to_bevy, to_sim};
use crate::shared::connection::{ConnectionState, NetEvent, ServerConnection};

use super::core::Settings;
use super::engine::PlayerBody;
use super::UpdateSet;

/// Fraction of the remaining distance a ghost covers each frame.
const GHOST_SMOOTHING: f32 = 0.35;
const GHOST_ALPHA: f32 = 0.55;

pub struct NetworkPlugin;

#[derive(Resource, Default)]
pub(crate) struct NetworkState {
    pub(crate) roster: RemoteRoster,
    pub(crate) protocol_mismatch: bool,
    ghosts: HashMap<u32, Entity>,
    since_push: f64,
}

/// Visual stand-in for another participant. No collider: remote bodies are
/// not simulated locally.
#[derive(Component)]
pub(crate) struct Ghost {
    pub(crate) id: u32,
}

#[derive(Resource)]
pub(crate) struct GhostAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_ghost_assets)
            .add_systems(
                Update,
                (network_event_system, push_state_system)
                    .chain()
                    .in_set(UpdateSet::Network),
            )
            .add_systems(Update, ghost_follow_system.in_set(UpdateSet::Visuals));
    }
}

fn setup_ghost_assets(
    mut commands: Commands,
    settings: Res<Settings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config: &ArenaConfig = &settings.0;
    commands.insert_resource(GhostAssets {
        mesh: meshes.add(Sphere::new(config.player_radius as f32)),
        material: materials.add(StandardMaterial {
            base_color: color_from_hex(Colors::GHOST).with_alpha(GHOST_ALPHA),
            alpha_mode: AlphaMode::Blend,
            ..default()
        }),
    });
}

fn network_event_system(
    mut commands: Commands,
    mut conn: ResMut<ServerConnection>,
    mut net: ResMut<NetworkState>,
    assets: Res<GhostAssets>,
) {
    for evt in conn.poll_events() {
        match evt {
            NetEvent::Connected => {
                info!("WebSocket connected");
                conn.state = ConnectionState::Connected;
                net.protocol_mismatch = false;
                conn.protocol_mismatch = false;
            }
            NetEvent::Disconnected => {
                if conn.state == ConnectionState::Connected {
                    info!("WebSocket disconnected");
                }
                conn.state = ConnectionState::Disconnected;
                conn.self_id = None;
                net.roster.clear();
                despawn_all_ghosts(&mut commands, &mut net.ghosts);
            }
            NetEvent::ProtocolMismatch { server, client } => {
                warn!(server, client, "Relay protocol mismatch, staying offline");
                net.protocol_mismatch = true;
                conn.protocol_mismatch = true;
            }
            NetEvent::Message(msg) => {
                if let ServerMsg::Bootstrap(b) = &msg {
                    info!(
                        self_id = b.self_id,
                        players = b.players.len(),
                        "Joined relay session"
                    );
                    conn.self_id = Some(b.self_id);
                }
                let NetworkState { roster, ghosts, .. } = &mut *net;
                for change in roster.apply(&msg) {
                    apply_roster_change(&mut commands, roster, ghosts, &assets, change);
                }
            }
        }
    }
}

fn apply_roster_change(
    commands: &mut Commands,
    roster: &RemoteRoster,
    ghosts: &mut HashMap<u32, Entity>,
    assets: &GhostAssets,
    change: RosterChange,
) {
    match change {
        RosterChange::Reset => despawn_all_ghosts(commands, ghosts),
        RosterChange::Added(id) => {
            let Some(body) = roster.get(id) else {
                return;
            };
            if let Some(old) = ghosts.insert(id, spawn_ghost(commands, assets, id, body)) {
                commands.entity(old).despawn();
            }
        }
        // Picked up by ghost_follow_system.
        RosterChange::Updated(_) => {}
        RosterChange::Removed(id) => {
            if let Some(entity) = ghosts.remove(&id) {
                commands.entity(entity).despawn();
            }
        }
    }
}

fn spawn_ghost(
    commands: &mut Commands,
    assets: &GhostAssets,
    id: u32,
    body: &KinematicBody,
) -> Entity {
    commands
        .spawn((
            Name::new(format!("participant_{}", id)),
            Ghost { id },
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(assets.material.clone()),
            Transform::from_translation(to_bevy(body.position))
                .with_rotation(quat_from_euler(body.rotation)),
        ))
        .id()
}

fn despawn_all_ghosts(commands: &mut Commands, ghosts: &mut HashMap<u32, Entity>) {
    for (_, entity) in ghosts.drain() {
        commands.entity(entity).despawn();
    }
}

fn push_state_system(
    conn: Res<ServerConnection>,
    mut net: ResMut<NetworkState>,
    q_player: Query<(&Transform, &Velocity), With<PlayerBody>>,
    time: Res<Time>,
) {
    if conn.state != ConnectionState::Connected {
        net.since_push = 0.0;
        return;
    }
    net.since_push += time.delta_secs_f64();
    if net.since_push < NET_PUSH_INTERVAL {
        return;
    }
    net.since_push = 0.0;

    let Ok((transform, velocity)) = q_player.single() else {
        return;
    };
    conn.send_state(BodyState::from(KinematicBody {
        position: to_sim(transform.translation),
        velocity: to_sim(velocity.linvel),
        rotation: euler_from_quat(transform.rotation),
    }));
}

fn ghost_follow_system(
    net: Res<NetworkState>,
    mut q_ghosts: Query<(&Ghost, &mut Transform)>,
) {
    for (ghost, mut transform) in &mut q_ghosts {
        let Some(body) = net.roster.get(ghost.id) else {
            continue;
        };
        transform.translation = transform
            .translation
            .lerp(to_bevy(body.position), GHOST_SMOOTHING);
        transform.rotation = quat_from_euler(body.rotation);
    }
}
