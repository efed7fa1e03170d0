use arena_shared::config::ArenaConfig;
use tracing::debug;

use crate::ai::{AiController, AiEntity};
use crate::engine::ArenaEngine;
use crate::spawn::{Sampler, SpawnRect};

/// Score-driven difficulty: one extra AI each time the score crosses a
/// multiple of `points_per_ai`.
pub struct PopulationPolicy {
    points_per_ai: u32,
    rect: SpawnRect,
    height: f64,
}

impl PopulationPolicy {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            points_per_ai: config.points_per_ai.max(1),
            rect: SpawnRect::centered(config.ai_spawn_half_extent),
            height: config.ai_spawn_height,
        }
    }

    /// True when `new_score` reached a higher threshold band than `old_score`.
    /// A jump across several bands still yields a single spawn.
    pub fn should_spawn(&self, old_score: u32, new_score: u32) -> bool {
        new_score / self.points_per_ai > old_score / self.points_per_ai
    }

    /// Spawn the starting population.
    pub fn populate<E, S>(
        &self,
        count: usize,
        ai: &mut AiController<E::Handle>,
        engine: &mut E,
        sampler: &mut S,
    ) where
        E: ArenaEngine,
        S: Sampler,
    {
        for _ in 0..count {
            ai.spawn(engine, sampler, &self.rect, self.height);
        }
    }

    /// Apply the policy to one scoring event.
    pub fn on_score<E, S>(
        &self,
        old_score: u32,
        new_score: u32,
        ai: &mut AiController<E::Handle>,
        engine: &mut E,
        sampler: &mut S,
    ) -> Option<AiEntity<E::Handle>>
    where
        E: ArenaEngine,
        S: Sampler,
    {
        if !self.should_spawn(old_score, new_score) {
            return None;
        }
        let entity = ai.spawn(engine, sampler, &self.rect, self.height);
        debug!(index = entity.index, score = new_score, "AI population grew");
        Some(entity)
    }
}
