use arena_shared::protocol::BodyState;
use arena_shared::vec3::Vec3;

/// Position, velocity and rotation (Euler, radians) of one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KinematicBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Vec3,
}

impl KinematicBody {
    /// A body at rest at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

impl From<BodyState> for KinematicBody {
    fn from(s: BodyState) -> Self {
        Self {
            position: Vec3::from_array(s.position),
            velocity: Vec3::from_array(s.velocity),
            rotation: Vec3::from_array(s.rotation),
        }
    }
}

impl From<KinematicBody> for BodyState {
    fn from(b: KinematicBody) -> Self {
        Self {
            position: b.position.to_array(),
            velocity: b.velocity.to_array(),
            rotation: b.rotation.to_array(),
        }
    }
}
