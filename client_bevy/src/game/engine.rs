//! Rapier-backed implementation of the simulation's engine capability.

use std::f32::consts::FRAC_PI_2;

use arena_shared::config::ArenaConfig;
use arena_shared::vec3::Vec3 as SimVec3;
use arena_sim::{ArenaEngine, BodyKind, KinematicBody};
use bevy::ecs::system::{EntityCommands, SystemParam};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::constants::{color_from_hex, Colors, COIN_THICKNESS};
use crate::coord::{euler_from_quat, quat_from_euler, to_bevy, to_sim};

/// Every entity the simulation spawned.
#[derive(Component)]
pub(crate) struct SimBody;

#[derive(Component)]
pub(crate) struct PlayerBody;

/// Mass used to turn impulses into velocity changes.
#[derive(Component)]
pub(crate) struct BodyMass(pub(crate) f32);

/// The coin has no collider and is driven purely by the simulation.
#[derive(Component)]
pub(crate) struct CoinVisual;

const AI_PALETTE: [u32; 6] = [Colors::AI, 0x33ccff, 0x6677ff, 0x22aadd, 0x5599cc, 0x4466ee];

#[derive(Resource)]
pub(crate) struct SimAssets {
    player_mesh: Handle<Mesh>,
    ai_mesh: Handle<Mesh>,
    coin_mesh: Handle<Mesh>,
    pub(crate) player_material: Handle<StandardMaterial>,
    pub(crate) player_invincible_material: Handle<StandardMaterial>,
    ai_materials: Vec<Handle<StandardMaterial>>,
    coin_material: Handle<StandardMaterial>,
    player_radius: f32,
    ai_radius: f32,
    player_mass: f32,
    ai_mass: f32,
}

impl SimAssets {
    pub(crate) fn new(
        config: &ArenaConfig,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) -> Self {
        let material = |materials: &mut Assets<StandardMaterial>, rgb: u32| {
            materials.add(StandardMaterial {
                base_color: color_from_hex(rgb),
                perceptual_roughness: 0.6,
                ..default()
            })
        };

        Self {
            player_mesh: meshes.add(Sphere::new(config.player_radius as f32)),
            ai_mesh: meshes.add(Sphere::new(config.ai_radius as f32)),
            coin_mesh: meshes.add(Cylinder::new(config.coin_radius as f32, COIN_THICKNESS)),
            player_material: material(materials, Colors::PLAYER),
            player_invincible_material: material(materials, Colors::PLAYER_INVINCIBLE),
            ai_materials: AI_PALETTE
                .iter()
                .map(|rgb| material(materials, *rgb))
                .collect(),
            coin_material: materials.add(StandardMaterial {
                base_color: color_from_hex(Colors::COIN),
                metallic: 0.8,
                perceptual_roughness: 0.3,
                ..default()
            }),
            player_radius: config.player_radius as f32,
            ai_radius: config.ai_radius as f32,
            player_mass: config.player_mass as f32,
            ai_mass: config.ai_mass as f32,
        }
    }

    fn ai_material(&self, index: usize) -> Handle<StandardMaterial> {
        self.ai_materials
            .get(index % self.ai_materials.len().max(1))
            .cloned()
            .unwrap_or_default()
    }
}

pub(crate) fn setup_sim_assets(
    mut commands: Commands,
    settings: Res<crate::game::core::Settings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(SimAssets::new(&settings.0, &mut meshes, &mut materials));
}

/// The simulation's view of the ECS world for one system run.
///
/// Entities spawned through it only become visible to the queries after
/// commands are applied, so for the rest of that frame they report no body.
#[derive(SystemParam)]
pub(crate) struct BevyEngine<'w, 's> {
    commands: Commands<'w, 's>,
    bodies: Query<
        'w,
        's,
        (&'static Transform, &'static mut Velocity, &'static BodyMass),
        Without<CoinVisual>,
    >,
    coins: Query<'w, 's, &'static mut Transform, (With<CoinVisual>, Without<BodyMass>)>,
    assets: Res<'w, SimAssets>,
}

impl BevyEngine<'_, '_> {
    fn spawn_sphere(&mut self, kind: BodyKind, at: Vec3, radius: f32, mass: f32) -> EntityCommands<'_> {
        let (mesh, material, name) = match kind {
            BodyKind::Ai { index } => (
                self.assets.ai_mesh.clone(),
                self.assets.ai_material(index),
                format!("ai_{}", index),
            ),
            _ => (
                self.assets.player_mesh.clone(),
                self.assets.player_material.clone(),
                "player".to_string(),
            ),
        };
        self.commands.spawn((
            Name::new(name),
            SimBody,
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(at),
            RigidBody::Dynamic,
            Collider::ball(radius),
            ColliderMassProperties::Mass(mass),
            BodyMass(mass),
            Velocity::zero(),
            Friction::coefficient(0.5),
            Restitution::coefficient(0.3),
            Damping {
                linear_damping: 0.05,
                angular_damping: 0.2,
            },
        ))
    }
}

impl ArenaEngine for BevyEngine<'_, '_> {
    type Handle = Entity;

    fn spawn(&mut self, kind: BodyKind, at: SimVec3) -> Entity {
        let at = to_bevy(at);
        match kind {
            BodyKind::Player => {
                let (radius, mass) = (self.assets.player_radius, self.assets.player_mass);
                self.spawn_sphere(kind, at, radius, mass)
                    .insert(PlayerBody)
                    .id()
            }
            BodyKind::Ai { .. } => {
                let (radius, mass) = (self.assets.ai_radius, self.assets.ai_mass);
                self.spawn_sphere(kind, at, radius, mass).id()
            }
            BodyKind::Coin => {
                let mesh = self.assets.coin_mesh.clone();
                let material = self.assets.coin_material.clone();
                self.commands
                    .spawn((
                        Name::new("coin"),
                        SimBody,
                        CoinVisual,
                        Mesh3d(mesh),
                        MeshMaterial3d(material),
                        // Stand on edge from the first frame; spin follows via set_rotation.
                        Transform::from_translation(at)
                            .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
                    ))
                    .id()
            }
        }
    }

    fn despawn(&mut self, handle: Entity) {
        if let Ok(mut entity) = self.commands.get_entity(handle) {
            entity.despawn();
        }
    }

    fn body(&self, handle: Entity) -> Option<KinematicBody> {
        if let Ok((transform, velocity, _)) = self.bodies.get(handle) {
            return Some(KinematicBody {
                position: to_sim(transform.translation),
                velocity: to_sim(velocity.linvel),
                rotation: euler_from_quat(transform.rotation),
            });
        }
        self.coins.get(handle).ok().map(|transform| KinematicBody {
            position: to_sim(transform.translation),
            velocity: SimVec3::ZERO,
            rotation: euler_from_quat(transform.rotation),
        })
    }

    fn set_linear_velocity(&mut self, handle: Entity, velocity: SimVec3) {
        if let Ok((_, mut v, _)) = self.bodies.get_mut(handle) {
            v.linvel = to_bevy(velocity);
        }
    }

    /// Impulses go through the body's centre, so only linear velocity changes.
    fn apply_impulse(&mut self, handle: Entity, impulse: SimVec3, _at: SimVec3) {
        if let Ok((_, mut v, mass)) = self.bodies.get_mut(handle) {
            if mass.0 > 0.0 {
                v.linvel += to_bevy(impulse) / mass.0;
            }
        }
    }

    fn set_rotation(&mut self, handle: Entity, rotation: SimVec3) {
        if let Ok(mut transform) = self.coins.get_mut(handle) {
            transform.rotation = quat_from_euler(rotation);
        }
    }
}
