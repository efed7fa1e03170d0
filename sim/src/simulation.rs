use arena_shared::config::{ArenaConfig, ContactPolicy};
use arena_shared::vec3::{distance_squared, lerp, Vec3};
use tracing::{debug, info};

use crate::ai::AiController;
use crate::body::KinematicBody;
use crate::coin::CoinSpawner;
use crate::engine::{ArenaEngine, BodyKind};
use crate::lives::{ContactOutcome, LifeTracker};
use crate::movement::{FrameInput, MovementController};
use crate::population::PopulationPolicy;
use crate::spawn::Sampler;

/// Gameplay events surfaced to the UI, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    CoinCollected { score: u32 },
    AiSpawned { index: usize },
    LifeLost { lives: u8 },
    GameOver { final_score: u32 },
}

/// Read-only view of the local player for HUD and network push.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub body: Option<KinematicBody>,
    pub score: u32,
    pub lives: u8,
    pub invincible: bool,
    pub invincible_until: Option<f64>,
    pub game_over: bool,
    pub ai_count: usize,
}

/// Per-tick driver. Owns every gameplay entity it spawned and all timers.
pub struct SimulationLoop<H> {
    config: ArenaConfig,
    movement: MovementController,
    ai: AiController<H>,
    coin: CoinSpawner<H>,
    population: PopulationPolicy,
    lives: LifeTracker,
    player: Option<H>,
    score: u32,
    /// Simulation clock, seconds since start
    clock: f64,
    camera_target: Vec3,
}

impl<H: Copy + Eq + std::fmt::Debug> SimulationLoop<H> {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            movement: MovementController::new(&config),
            ai: AiController::new(&config),
            coin: CoinSpawner::new(&config),
            population: PopulationPolicy::new(&config),
            lives: LifeTracker::new(&config),
            player: None,
            score: 0,
            clock: 0.0,
            camera_target: config.player_spawn,
            config,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn player(&self) -> Option<H> {
        self.player
    }

    pub fn ai(&self) -> &AiController<H> {
        &self.ai
    }

    pub fn coin(&self) -> &CoinSpawner<H> {
        &self.coin
    }

    pub fn lives(&self) -> &LifeTracker {
        &self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn camera_target(&self) -> Vec3 {
        self.camera_target
    }

    pub fn is_game_over(&self) -> bool {
        self.lives.is_game_over()
    }

    /// Spawn the player, the initial AI set and the coin. Anything left from
    /// a previous round is torn down first.
    pub fn start<E, S>(&mut self, engine: &mut E, sampler: &mut S)
    where
        E: ArenaEngine<Handle = H>,
        S: Sampler,
    {
        self.teardown(engine);
        self.score = 0;
        self.clock = 0.0;
        self.lives.restart();
        self.camera_target = self.config.player_spawn;

        self.player = Some(engine.spawn(BodyKind::Player, self.config.player_spawn));
        self.population
            .populate(self.config.initial_ai_count, &mut self.ai, engine, sampler);
        self.coin.spawn(engine, sampler);
    }

    pub fn restart<E, S>(&mut self, engine: &mut E, sampler: &mut S)
    where
        E: ArenaEngine<Handle = H>,
        S: Sampler,
    {
        let previous = self.score;
        self.start(engine, sampler);
        info!(previous_score = previous, "Arena restarted");
    }

    fn teardown<E>(&mut self, engine: &mut E)
    where
        E: ArenaEngine<Handle = H>,
    {
        if let Some(player) = self.player.take() {
            engine.despawn(player);
        }
        self.ai.clear(engine);
        self.coin.clear(engine);
    }

    /// Advance one frame of `dt` seconds.
    pub fn tick<E, S>(
        &mut self,
        engine: &mut E,
        sampler: &mut S,
        input: &FrameInput,
        dt: f64,
    ) -> Vec<SimEvent>
    where
        E: ArenaEngine<Handle = H>,
        S: Sampler,
    {
        let mut events = Vec::new();
        self.clock += dt;
        self.lives.expire(self.clock);

        if self.lives.is_game_over() {
            return events;
        }
        let Some(player) = self.player else {
            return events;
        };

        self.movement.apply(engine, player, input, dt);
        self.ai.tick(engine, sampler, dt);

        let Some(player_pos) = engine.position(player) else {
            return events;
        };

        if self.coin.tick(engine, sampler, player_pos) {
            let old = self.score;
            self.score += 1;
            events.push(SimEvent::CoinCollected { score: self.score });
            if let Some(spawned) =
                self.population
                    .on_score(old, self.score, &mut self.ai, engine, sampler)
            {
                events.push(SimEvent::AiSpawned {
                    index: spawned.index,
                });
            }
        }

        self.evaluate_contacts(engine, player_pos, &mut events);

        self.camera_target = lerp(self.camera_target, player_pos, self.config.camera_follow);
        events
    }

    fn evaluate_contacts<E>(&mut self, engine: &E, player_pos: Vec3, events: &mut Vec<SimEvent>)
    where
        E: ArenaEngine<Handle = H>,
    {
        // Shield state as of tick start, used by EveryContact.
        let shielded = self.lives.is_invincible();

        for ai in self.ai.entities() {
            let Some(ai_pos) = engine.position(ai.handle) else {
                continue;
            };
            if distance_squared(player_pos, ai_pos) >= self.config.ai_contact_dist_sq {
                continue;
            }

            let outcome = match self.config.contact_policy {
                ContactPolicy::FirstContact => self.lives.on_contact(self.clock),
                ContactPolicy::EveryContact if shielded => ContactOutcome::Ignored,
                ContactPolicy::EveryContact => self.lives.damage(self.clock),
            };

            match outcome {
                ContactOutcome::Ignored => {}
                ContactOutcome::LifeLost { lives } => {
                    debug!(ai = ai.index, lives, "Player hit");
                    events.push(SimEvent::LifeLost { lives });
                }
                ContactOutcome::GameOver => {
                    info!(final_score = self.score, "Game over");
                    events.push(SimEvent::GameOver {
                        final_score: self.score,
                    });
                    break;
                }
            }
        }
    }

    pub fn snapshot<E>(&self, engine: &E) -> PlayerState
    where
        E: ArenaEngine<Handle = H>,
    {
        PlayerState {
            body: self.player.and_then(|p| engine.body(p)),
            score: self.score,
            lives: self.lives.lives(),
            invincible: self.lives.is_invincible(),
            invincible_until: self.lives.invincible_until(),
            game_over: self.lives.is_game_over(),
            ai_count: self.ai.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::HeldKeys;
    use crate::spawn::SeededSampler;
    use crate::testing::{ScriptedSampler, TestEngine};

    const DT: f64 = 1.0 / 60.0;

    fn started(config: ArenaConfig) -> (TestEngine, SimulationLoop<u32>, ScriptedSampler) {
        let mut engine = TestEngine::new(&config);
        let mut sampler = ScriptedSampler::midpoint();
        let mut sim = SimulationLoop::new(config);
        sim.start(&mut engine, &mut sampler);
        (engine, sim, sampler)
    }

    fn park_ais_far(engine: &mut TestEngine, sim: &SimulationLoop<u32>) {
        for (i, ai) in sim.ai().entities().iter().enumerate() {
            engine.set_position(ai.handle, Vec3::new(-15.0 + i as f64, 3.0, 15.0));
        }
    }

    fn move_player(engine: &mut TestEngine, sim: &SimulationLoop<u32>, to: Vec3) {
        engine.set_position(sim.player().unwrap(), to);
    }

    fn put_on_coin(engine: &mut TestEngine, sim: &SimulationLoop<u32>) {
        let at = sim.coin().coin().unwrap().body.position;
        move_player(engine, sim, at);
    }

    #[test]
    fn start_spawns_player_three_ais_and_one_coin() {
        let (engine, sim, _) = started(ArenaConfig::default());
        let snap = sim.snapshot(&engine);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.lives, 3);
        assert!(!snap.invincible);
        assert!(!snap.game_over);
        assert_eq!(snap.ai_count, 3);
        assert_eq!(engine.ai_count(), 3);
        assert_eq!(engine.coin_count(), 1);
        assert_eq!(snap.body.unwrap().position, Vec3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn third_coin_spawns_exactly_one_ai() {
        let (mut engine, mut sim, mut sampler) = started(ArenaConfig::default());
        park_ais_far(&mut engine, &sim);

        let mut all = Vec::new();
        for _ in 0..3 {
            put_on_coin(&mut engine, &sim);
            all.extend(sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT));
            park_ais_far(&mut engine, &sim);
        }

        assert_eq!(
            all,
            vec![
                SimEvent::CoinCollected { score: 1 },
                SimEvent::CoinCollected { score: 2 },
                SimEvent::CoinCollected { score: 3 },
                SimEvent::AiSpawned { index: 3 },
            ]
        );
        assert_eq!(sim.snapshot(&engine).ai_count, 4);
        assert_eq!(engine.coin_count(), 1);
    }

    #[test]
    fn exactly_one_coin_throughout_play() {
        let mut engine = TestEngine::new(&ArenaConfig::default());
        let mut sampler = SeededSampler::new(11);
        let mut sim = SimulationLoop::new(ArenaConfig::default());
        sim.start(&mut engine, &mut sampler);
        for i in 0..120 {
            if i % 7 == 0 {
                put_on_coin(&mut engine, &sim);
            }
            park_ais_far(&mut engine, &sim);
            sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
            assert_eq!(engine.coin_count(), 1);
        }
        assert!(sim.score() > 0);
    }

    #[test]
    fn contact_costs_a_life_then_shields() {
        let (mut engine, mut sim, mut sampler) = started(ArenaConfig::default());
        park_ais_far(&mut engine, &sim);
        let ai = sim.ai().entities()[0].handle;
        move_player(&mut engine, &sim, Vec3::new(0.0, 3.0, 10.0));
        engine.set_position(ai, Vec3::new(0.5, 3.0, 10.0));

        let events = sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
        assert_eq!(events, vec![SimEvent::LifeLost { lives: 2 }]);
        assert!(sim.snapshot(&engine).invincible);

        // Still touching for most of a second: no further damage.
        for _ in 0..55 {
            let events = sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
            assert!(events.is_empty());
        }
        assert_eq!(sim.lives().lives(), 2);

        // Past the deadline the shield drops and the next contact hits.
        let mut lost = Vec::new();
        for _ in 0..10 {
            lost.extend(sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT));
        }
        assert_eq!(lost, vec![SimEvent::LifeLost { lives: 1 }]);
    }

    #[test]
    fn last_life_ends_game_and_freezes_play() {
        let (mut engine, mut sim, mut sampler) = started(ArenaConfig::default());
        park_ais_far(&mut engine, &sim);
        let ai = sim.ai().entities()[0].handle;
        move_player(&mut engine, &sim, Vec3::new(0.0, 3.0, 10.0));
        engine.set_position(ai, Vec3::new(0.2, 3.0, 10.0));

        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT));
        }
        assert_eq!(
            events,
            vec![
                SimEvent::LifeLost { lives: 2 },
                SimEvent::LifeLost { lives: 1 },
                SimEvent::GameOver { final_score: 0 },
            ]
        );
        let snap = sim.snapshot(&engine);
        assert!(snap.game_over);
        assert_eq!(snap.lives, 0);

        // Nothing moves the player once the game is over.
        let impulses = engine.impulses.len();
        let input = FrameInput {
            keys: HeldKeys {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(sim.tick(&mut engine, &mut sampler, &input, DT).is_empty());
        assert_eq!(engine.impulses.len(), impulses);
    }

    fn two_ais_touching(policy: ContactPolicy) -> Vec<SimEvent> {
        let config = ArenaConfig {
            contact_policy: policy,
            ..ArenaConfig::default()
        };
        let (mut engine, mut sim, mut sampler) = started(config);
        park_ais_far(&mut engine, &sim);

        // Burn one life first so lives == 2 going in.
        let first = sim.ai().entities()[0].handle;
        let second = sim.ai().entities()[1].handle;
        move_player(&mut engine, &sim, Vec3::new(0.0, 3.0, 10.0));
        engine.set_position(first, Vec3::new(0.3, 3.0, 10.0));
        sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
        assert_eq!(sim.lives().lives(), 2);
        for _ in 0..70 {
            engine.set_position(first, Vec3::new(-15.0, 3.0, 15.0));
            sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
        }
        assert!(!sim.lives().is_invincible());

        engine.set_position(first, Vec3::new(0.3, 3.0, 10.0));
        engine.set_position(second, Vec3::new(-0.3, 3.0, 10.0));
        sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT)
    }

    #[test]
    fn first_contact_policy_costs_one_life_per_tick() {
        assert_eq!(
            two_ais_touching(ContactPolicy::FirstContact),
            vec![SimEvent::LifeLost { lives: 1 }]
        );
    }

    #[test]
    fn every_contact_policy_can_end_game_in_one_tick() {
        assert_eq!(
            two_ais_touching(ContactPolicy::EveryContact),
            vec![
                SimEvent::LifeLost { lives: 1 },
                SimEvent::GameOver { final_score: 0 },
            ]
        );
    }

    #[test]
    fn restart_resets_everything_and_is_idempotent() {
        let (mut engine, mut sim, mut sampler) = started(ArenaConfig::default());
        park_ais_far(&mut engine, &sim);
        for _ in 0..4 {
            put_on_coin(&mut engine, &sim);
            sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
            park_ais_far(&mut engine, &sim);
        }
        let ai = sim.ai().entities()[0].handle;
        move_player(&mut engine, &sim, Vec3::new(0.0, 3.0, 10.0));
        engine.set_position(ai, Vec3::new(0.0, 3.0, 10.0));
        sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
        assert_eq!(sim.snapshot(&engine).ai_count, 4);
        assert!(sim.lives().is_invincible());

        sim.restart(&mut engine, &mut sampler);
        sim.restart(&mut engine, &mut sampler);

        let snap = sim.snapshot(&engine);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.lives, 3);
        assert!(!snap.invincible);
        assert!(!snap.game_over);
        assert_eq!(snap.ai_count, 3);
        assert_eq!(engine.ai_count(), 3);
        assert_eq!(engine.coin_count(), 1);
        assert_eq!(engine.count(|k| k == BodyKind::Player), 1);
        assert_eq!(sim.clock(), 0.0);
        assert_eq!(sim.ai().accumulator(), 0.0);
    }

    #[test]
    fn restart_after_game_over_resumes_play() {
        let (mut engine, mut sim, mut sampler) = started(ArenaConfig::default());
        let ai = sim.ai().entities()[0].handle;
        for _ in 0..200 {
            move_player(&mut engine, &sim, Vec3::new(0.0, 3.0, 10.0));
            engine.set_position(ai, Vec3::new(0.0, 3.0, 10.0));
            sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
        }
        assert!(sim.is_game_over());

        sim.restart(&mut engine, &mut sampler);
        park_ais_far(&mut engine, &sim);
        put_on_coin(&mut engine, &sim);
        let events = sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
        assert_eq!(events, vec![SimEvent::CoinCollected { score: 1 }]);
    }

    #[test]
    fn camera_target_eases_towards_player() {
        let (mut engine, mut sim, mut sampler) = started(ArenaConfig::default());
        park_ais_far(&mut engine, &sim);
        move_player(&mut engine, &sim, Vec3::new(10.0, 4.0, 0.0));
        sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
        let target = sim.camera_target();
        assert!((target.x - 1.5).abs() < 1e-9);
        assert_eq!(target.y, 4.0);
    }

    #[test]
    fn missing_player_body_skips_tick_work() {
        let (mut engine, mut sim, mut sampler) = started(ArenaConfig::default());
        let player = sim.player().unwrap();
        put_on_coin(&mut engine, &sim);
        engine.hidden.push(player);
        let events = sim.tick(&mut engine, &mut sampler, &FrameInput::default(), DT);
        assert!(events.is_empty());
        assert_eq!(sim.score(), 0);
        assert!(sim.snapshot(&engine).body.is_none());
    }
}
