use arena_sim::{FrameInput, SeededSampler, SimEvent, SimulationLoop};
use bevy::prelude::*;

use crate::constants::MAX_FRAME_DT;
use crate::coord::to_sim;

use super::camera::OrbitCamera;
use super::core::Settings;
use super::engine::{setup_sim_assets, BevyEngine, CoinVisual, PlayerBody, SimAssets};
use super::input::InputState;
use super::UpdateSet;

pub struct SimPlugin;

/// The local game: simulation state plus the sampler feeding its spawns.
#[derive(Resource)]
pub(crate) struct ArenaSim {
    pub(crate) sim: SimulationLoop<Entity>,
    sampler: SeededSampler,
}

impl ArenaSim {
    pub(crate) fn new(settings: &Settings, sampler: SeededSampler) -> Self {
        Self {
            sim: SimulationLoop::new(settings.0),
            sampler,
        }
    }
}

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (init_arena_sim, setup_sim_assets, start_sim).chain(),
        )
        .add_systems(
            Update,
            (tick_sim, tint_player)
                .chain()
                .in_set(UpdateSet::Simulate),
        );
    }
}

fn init_arena_sim(mut commands: Commands, settings: Res<Settings>) {
    commands.insert_resource(ArenaSim::new(&settings, SeededSampler::from_entropy()));
}

fn start_sim(mut arena: ResMut<ArenaSim>, mut engine: BevyEngine) {
    let ArenaSim { sim, sampler } = &mut *arena;
    sim.start(&mut engine, sampler);
    info!(ai = sim.ai().len(), "Arena started");
}

fn tick_sim(
    mut arena: ResMut<ArenaSim>,
    mut engine: BevyEngine,
    input: Res<InputState>,
    q_camera: Query<&Transform, (With<OrbitCamera>, Without<CoinVisual>)>,
    time: Res<Time>,
) {
    let ArenaSim { sim, sampler } = &mut *arena;

    if input.restart && sim.is_game_over() {
        sim.restart(&mut engine, sampler);
        return;
    }

    let camera_forward = q_camera
        .single()
        .map(|t| to_sim(*t.forward()))
        .unwrap_or(FrameInput::default().camera_forward);
    let frame = FrameInput {
        keys: input.keys,
        camera_forward,
    };
    let dt = time.delta_secs_f64().min(MAX_FRAME_DT);

    for event in sim.tick(&mut engine, sampler, &frame, dt) {
        match event {
            SimEvent::CoinCollected { score } => debug!(score, "Coin collected"),
            SimEvent::AiSpawned { index } => info!(index, "AI joined the arena"),
            SimEvent::LifeLost { lives } => info!(lives, "Life lost"),
            SimEvent::GameOver { final_score } => {
                info!(final_score, "Game over, press R to restart")
            }
        }
    }
}

fn tint_player(
    arena: Res<ArenaSim>,
    assets: Res<SimAssets>,
    mut q_player: Query<&mut MeshMaterial3d<StandardMaterial>, With<PlayerBody>>,
) {
    let wanted = if arena.sim.lives().is_invincible() {
        &assets.player_invincible_material
    } else {
        &assets.player_material
    };
    for mut material in &mut q_player {
        if material.0 != *wanted {
            material.0 = wanted.clone();
        }
    }
}
