use crate::vec3::Vec3;

/// How several AI contacts detected in the same tick are charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPolicy {
    /// The first damaging contact arms invincibility immediately, so a single
    /// tick costs at most one life.
    #[default]
    FirstContact,
    /// Every qualifying contact is judged against the invincibility flag as it
    /// was at the start of the tick. Two contacts at two lives end the game.
    EveryContact,
}

/// Gameplay tuning for one arena.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaConfig {
    /// Impulse per second of held input
    pub move_force: f64,
    /// Horizontal speed cap (m/s)
    pub max_speed: f64,
    /// Seconds between AI impulse rounds
    pub ai_impulse_interval: f64,
    /// Per-axis bound of a random AI impulse
    pub ai_impulse_max: f64,
    pub initial_ai_count: usize,
    /// Score step that adds one AI
    pub points_per_ai: u32,
    pub initial_lives: u8,
    /// Seconds of invincibility after losing a life
    pub invincibility_duration: f64,
    /// Squared distance below which the coin is collected
    pub coin_pickup_dist_sq: f64,
    /// Squared distance below which an AI hurts the player
    pub ai_contact_dist_sq: f64,
    /// Radians of cosmetic coin spin per tick
    pub coin_spin_per_tick: f64,
    /// Camera target smoothing factor per tick
    pub camera_follow: f64,
    pub player_spawn: Vec3,
    pub ai_spawn_half_extent: f64,
    pub ai_spawn_height: f64,
    pub coin_spawn_half_extent: f64,
    pub coin_height: f64,
    pub player_mass: f64,
    pub ai_mass: f64,
    pub player_radius: f64,
    pub ai_radius: f64,
    pub coin_radius: f64,
    #[serde(default)]
    pub contact_policy: ContactPolicy,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            move_force: 6.0,
            max_speed: 10.0,
            ai_impulse_interval: 1.0,
            ai_impulse_max: 1.0,
            initial_ai_count: 3,
            points_per_ai: 3,
            initial_lives: 3,
            invincibility_duration: 1.0,
            coin_pickup_dist_sq: 0.9,
            ai_contact_dist_sq: 1.2,
            coin_spin_per_tick: 0.05,
            camera_follow: 0.15,
            player_spawn: Vec3::new(0.0, 4.0, 0.0),
            ai_spawn_half_extent: 5.0,
            ai_spawn_height: 3.0,
            coin_spawn_half_extent: 18.0, // walls sit at ±20
            coin_height: -1.85,
            player_mass: 1.0,
            ai_mass: 0.8,
            player_radius: 0.5,
            ai_radius: 0.4,
            coin_radius: 0.3,
            contact_policy: ContactPolicy::FirstContact,
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.move_force.is_finite() || self.move_force <= 0.0 {
            return Err("move_force must be finite and > 0".to_string());
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err("max_speed must be finite and > 0".to_string());
        }
        if !self.ai_impulse_interval.is_finite() || self.ai_impulse_interval <= 0.0 {
            return Err("ai_impulse_interval must be finite and > 0".to_string());
        }
        if !self.ai_impulse_max.is_finite() || self.ai_impulse_max < 0.0 {
            return Err("ai_impulse_max must be finite and >= 0".to_string());
        }
        if self.points_per_ai == 0 {
            return Err("points_per_ai must be >= 1".to_string());
        }
        if self.initial_lives == 0 {
            return Err("initial_lives must be >= 1".to_string());
        }
        if !self.invincibility_duration.is_finite() || self.invincibility_duration < 0.0 {
            return Err("invincibility_duration must be finite and >= 0".to_string());
        }
        if !self.coin_pickup_dist_sq.is_finite() || self.coin_pickup_dist_sq <= 0.0 {
            return Err("coin_pickup_dist_sq must be > 0".to_string());
        }
        if !self.ai_contact_dist_sq.is_finite() || self.ai_contact_dist_sq <= self.coin_pickup_dist_sq {
            return Err("ai_contact_dist_sq must be > coin_pickup_dist_sq".to_string());
        }
        if !(0.0..=1.0).contains(&self.camera_follow) {
            return Err("camera_follow must be within [0, 1]".to_string());
        }
        if self.ai_spawn_half_extent < 0.0 || self.coin_spawn_half_extent < 0.0 {
            return Err("spawn half extents must be >= 0".to_string());
        }
        if self.player_mass <= 0.0 || self.ai_mass <= 0.0 {
            return Err("body masses must be > 0".to_string());
        }
        Ok(())
    }
}
