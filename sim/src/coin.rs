use std::f64::consts::FRAC_PI_2;

use arena_shared::config::ArenaConfig;
use arena_shared::vec3::{distance_squared, Vec3};

use crate::body::KinematicBody;
use crate::engine::{ArenaEngine, BodyKind};
use crate::spawn::{Sampler, SpawnRect};

/// The single live collectible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin<H> {
    pub handle: H,
    pub body: KinematicBody,
    /// Cosmetic spin phase, radians
    pub spin: f64,
}

impl<H> Coin<H> {
    /// Stood on edge, spun about the vertical axis.
    fn rotation(&self) -> Vec3 {
        Vec3::new(FRAC_PI_2, self.spin, 0.0)
    }
}

pub struct CoinSpawner<H> {
    coin: Option<Coin<H>>,
    rect: SpawnRect,
    height: f64,
    pickup_dist_sq: f64,
    spin_per_tick: f64,
}

impl<H: Copy> CoinSpawner<H> {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            coin: None,
            rect: SpawnRect::centered(config.coin_spawn_half_extent),
            height: config.coin_height,
            pickup_dist_sq: config.coin_pickup_dist_sq,
            spin_per_tick: config.coin_spin_per_tick,
        }
    }

    pub fn coin(&self) -> Option<&Coin<H>> {
        self.coin.as_ref()
    }

    /// Replace the current coin (if any) with a fresh one at a random point.
    pub fn spawn<E, S>(&mut self, engine: &mut E, sampler: &mut S) -> Vec3
    where
        E: ArenaEngine<Handle = H>,
        S: Sampler,
    {
        if let Some(old) = self.coin.take() {
            engine.despawn(old.handle);
        }
        let (x, z) = sampler.point_in(&self.rect);
        let position = Vec3::new(x, self.height, z);
        let handle = engine.spawn(BodyKind::Coin, position);
        let coin = Coin {
            handle,
            body: KinematicBody::at(position),
            spin: 0.0,
        };
        engine.set_rotation(handle, coin.rotation());
        self.coin = Some(coin);
        position
    }

    /// Returns true when the player picked the coin up this tick; the
    /// replacement already exists when this returns.
    pub fn tick<E, S>(&mut self, engine: &mut E, sampler: &mut S, player_pos: Vec3) -> bool
    where
        E: ArenaEngine<Handle = H>,
        S: Sampler,
    {
        let Some(position) = self.coin.as_ref().map(|c| c.body.position) else {
            return false;
        };

        if distance_squared(player_pos, position) < self.pickup_dist_sq {
            self.spawn(engine, sampler);
            return true;
        }

        if let Some(coin) = self.coin.as_mut() {
            coin.spin += self.spin_per_tick;
            coin.body.rotation = coin.rotation();
            engine.set_rotation(coin.handle, coin.body.rotation);
        }
        false
    }

    pub fn clear<E>(&mut self, engine: &mut E)
    where
        E: ArenaEngine<Handle = H>,
    {
        if let Some(old) = self.coin.take() {
            engine.despawn(old.handle);
        }
    }
}
