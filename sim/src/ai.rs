use arena_shared::config::ArenaConfig;
use arena_shared::vec3::Vec3;

use crate::engine::{ArenaEngine, BodyKind};
use crate::spawn::{Sampler, SpawnRect};

/// One AI sphere. `index` is stable for the entity's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiEntity<H> {
    pub index: usize,
    pub handle: H,
}

impl<H> AiEntity<H> {
    pub fn name(&self) -> String {
        format!("ai_{}", self.index)
    }
}

/// Nudges every AI body with an independent random horizontal impulse once
/// per interval. No pathing, no coordination.
pub struct AiController<H> {
    interval: f64,
    impulse_max: f64,
    accumulator: f64,
    entities: Vec<AiEntity<H>>,
}

impl<H: Copy> AiController<H> {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            interval: config.ai_impulse_interval,
            impulse_max: config.ai_impulse_max,
            accumulator: 0.0,
            entities: Vec::new(),
        }
    }

    pub fn entities(&self) -> &[AiEntity<H>] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Add one AI at a random point of `rect`, `height` above the origin.
    pub fn spawn<E, S>(
        &mut self,
        engine: &mut E,
        sampler: &mut S,
        rect: &SpawnRect,
        height: f64,
    ) -> AiEntity<H>
    where
        E: ArenaEngine<Handle = H>,
        S: Sampler,
    {
        let index = self.entities.len();
        let (x, z) = sampler.point_in(rect);
        let handle = engine.spawn(BodyKind::Ai { index }, Vec3::new(x, height, z));
        let entity = AiEntity { index, handle };
        self.entities.push(entity);
        entity
    }

    /// Advance the timer; when it passes the interval, reset it and kick every
    /// AI. Returns whether a kick round happened.
    pub fn tick<E, S>(&mut self, engine: &mut E, sampler: &mut S, dt: f64) -> bool
    where
        E: ArenaEngine<Handle = H>,
        S: Sampler,
    {
        self.accumulator += dt;
        if self.accumulator <= self.interval {
            return false;
        }
        self.accumulator = 0.0;

        for ai in &self.entities {
            let Some(position) = engine.position(ai.handle) else {
                continue;
            };
            let impulse = Vec3::new(
                sampler.uniform(-self.impulse_max, self.impulse_max),
                0.0,
                sampler.uniform(-self.impulse_max, self.impulse_max),
            );
            engine.apply_impulse(ai.handle, impulse, position);
        }
        true
    }

    /// Despawn every AI and reset the timer.
    pub fn clear<E>(&mut self, engine: &mut E)
    where
        E: ArenaEngine<Handle = H>,
    {
        for ai in self.entities.drain(..) {
            engine.despawn(ai.handle);
        }
        self.accumulator = 0.0;
    }
}
