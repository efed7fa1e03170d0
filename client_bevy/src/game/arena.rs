use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::constants::{
    color_from_hex, Colors, GROUND_SIZE, GROUND_THICKNESS, GROUND_Y, WALL_CENTER_Y, WALL_HEIGHT,
    WALL_OFFSET, WALL_THICKNESS,
};

pub struct ArenaPlugin;

#[derive(Component)]
pub(crate) struct ArenaWall;

/// Axis-aligned box: centre and full size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Slab {
    pub(crate) center: Vec3,
    pub(crate) size: Vec3,
}

impl Slab {
    fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }
}

/// Ground collider, with its top face on the visible ground plane.
pub(crate) fn ground_slab() -> Slab {
    Slab {
        center: Vec3::new(0.0, GROUND_Y - GROUND_THICKNESS * 0.5, 0.0),
        size: Vec3::new(GROUND_SIZE, GROUND_THICKNESS, GROUND_SIZE),
    }
}

/// Four boundary walls in +Z, -Z, +X, -X order.
pub(crate) fn wall_slabs() -> [Slab; 4] {
    let along_x = Vec3::new(GROUND_SIZE, WALL_HEIGHT, WALL_THICKNESS);
    let along_z = Vec3::new(WALL_THICKNESS, WALL_HEIGHT, GROUND_SIZE);
    [
        Slab {
            center: Vec3::new(0.0, WALL_CENTER_Y, WALL_OFFSET),
            size: along_x,
        },
        Slab {
            center: Vec3::new(0.0, WALL_CENTER_Y, -WALL_OFFSET),
            size: along_x,
        },
        Slab {
            center: Vec3::new(WALL_OFFSET, WALL_CENTER_Y, 0.0),
            size: along_z,
        },
        Slab {
            center: Vec3::new(-WALL_OFFSET, WALL_CENTER_Y, 0.0),
            size: along_z,
        },
    ]
}

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 300.0,
            ..default()
        })
        .add_systems(Startup, (spawn_arena, spawn_lights));
    }
}

fn spawn_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let body = commands
        .spawn((
            Name::new("arena"),
            RigidBody::Fixed,
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    let ground = ground_slab();
    let ground_material = materials.add(StandardMaterial {
        base_color: color_from_hex(Colors::GROUND),
        perceptual_roughness: 0.9,
        ..default()
    });
    let ground_entity = commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::from_size(ground.size))),
            MeshMaterial3d(ground_material),
            Collider::cuboid(
                ground.half_extents().x,
                ground.half_extents().y,
                ground.half_extents().z,
            ),
            Friction::coefficient(0.8),
            Transform::from_translation(ground.center),
        ))
        .id();
    commands.entity(body).add_child(ground_entity);

    let wall_material = materials.add(StandardMaterial {
        base_color: color_from_hex(Colors::WALL),
        perceptual_roughness: 0.7,
        ..default()
    });
    for slab in wall_slabs() {
        let half = slab.half_extents();
        let wall = commands
            .spawn((
                ArenaWall,
                Mesh3d(meshes.add(Cuboid::from_size(slab.size))),
                MeshMaterial3d(wall_material.clone()),
                Collider::cuboid(half.x, half.y, half.z),
                Restitution::coefficient(0.4),
                Transform::from_translation(slab.center),
            ))
            .id();
        commands.entity(body).add_child(wall);
    }
}

fn spawn_lights(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -1.0, 0.4, 0.0)),
    ));
}
