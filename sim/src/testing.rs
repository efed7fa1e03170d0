//! In-memory engine and scripted sampler used by the unit tests.

use std::collections::{HashMap, VecDeque};

use arena_shared::config::ArenaConfig;
use arena_shared::vec3::{add, scale, Vec3};

use crate::body::KinematicBody;
use crate::engine::{ArenaEngine, BodyKind};
use crate::spawn::Sampler;

#[derive(Debug, Clone)]
pub(crate) struct TestBody {
    pub kind: BodyKind,
    pub body: KinematicBody,
    pub mass: f64,
}

/// Bodies move only when a test says so; impulses change velocity at once.
pub(crate) struct TestEngine {
    next_handle: u32,
    pub bodies: HashMap<u32, TestBody>,
    /// Handles that exist but report no body (not materialised yet).
    pub hidden: Vec<u32>,
    pub impulses: Vec<(u32, Vec3)>,
    pub spawned: Vec<(u32, BodyKind, Vec3)>,
    pub despawned: Vec<u32>,
    player_mass: f64,
    ai_mass: f64,
}

impl TestEngine {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            next_handle: 1,
            bodies: HashMap::new(),
            hidden: Vec::new(),
            impulses: Vec::new(),
            spawned: Vec::new(),
            despawned: Vec::new(),
            player_mass: config.player_mass,
            ai_mass: config.ai_mass,
        }
    }

    pub fn count(&self, pred: impl Fn(BodyKind) -> bool) -> usize {
        self.bodies.values().filter(|b| pred(b.kind)).count()
    }

    pub fn coin_count(&self) -> usize {
        self.count(|k| k == BodyKind::Coin)
    }

    pub fn ai_count(&self) -> usize {
        self.count(|k| matches!(k, BodyKind::Ai { .. }))
    }

    pub fn set_position(&mut self, handle: u32, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.body.position = position;
        }
    }

    pub fn set_velocity(&mut self, handle: u32, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.body.velocity = velocity;
        }
    }

    pub fn velocity(&self, handle: u32) -> Vec3 {
        self.bodies[&handle].body.velocity
    }

    pub fn rotation(&self, handle: u32) -> Vec3 {
        self.bodies[&handle].body.rotation
    }
}

impl ArenaEngine for TestEngine {
    type Handle = u32;

    fn spawn(&mut self, kind: BodyKind, at: Vec3) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        let mass = match kind {
            BodyKind::Player => self.player_mass,
            BodyKind::Ai { .. } => self.ai_mass,
            BodyKind::Coin => 0.0,
        };
        self.bodies.insert(
            handle,
            TestBody {
                kind,
                body: KinematicBody::at(at),
                mass,
            },
        );
        self.spawned.push((handle, kind, at));
        handle
    }

    fn despawn(&mut self, handle: u32) {
        self.bodies.remove(&handle);
        self.despawned.push(handle);
    }

    fn body(&self, handle: u32) -> Option<KinematicBody> {
        if self.hidden.contains(&handle) {
            return None;
        }
        self.bodies.get(&handle).map(|b| b.body)
    }

    fn set_linear_velocity(&mut self, handle: u32, velocity: Vec3) {
        self.set_velocity(handle, velocity);
    }

    fn apply_impulse(&mut self, handle: u32, impulse: Vec3, _at: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            if b.mass > 0.0 {
                b.body.velocity = add(b.body.velocity, scale(impulse, 1.0 / b.mass));
            }
            self.impulses.push((handle, impulse));
        }
    }

    fn set_rotation(&mut self, handle: u32, rotation: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.body.rotation = rotation;
        }
    }
}

/// Replays scripted fractions of each requested range, then falls back to the
/// midpoint.
pub(crate) struct ScriptedSampler {
    fractions: VecDeque<f64>,
}

impl ScriptedSampler {
    pub fn new(fractions: &[f64]) -> Self {
        Self {
            fractions: fractions.iter().copied().collect(),
        }
    }

    pub fn midpoint() -> Self {
        Self::new(&[])
    }
}

impl Sampler for ScriptedSampler {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let f = self.fractions.pop_front().unwrap_or(0.5);
        lo + (hi - lo) * f
    }
}
