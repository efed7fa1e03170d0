use arena_shared::config::ArenaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Alive { lives: u8, invincible: bool },
    GameOver,
}

/// Result of one AI contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Ignored,
    LifeLost { lives: u8 },
    GameOver,
}

/// Lives, game-over and the post-damage invincibility window.
///
/// Time is the simulation clock in seconds. Invincibility is a deadline:
/// only [`LifeTracker::expire`] clears it and only a damaging contact arms it.
pub struct LifeTracker {
    initial_lives: u8,
    lives: u8,
    invincibility_duration: f64,
    invincible_until: Option<f64>,
}

impl LifeTracker {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            initial_lives: config.initial_lives,
            lives: config.initial_lives,
            invincibility_duration: config.invincibility_duration,
            invincible_until: None,
        }
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_until.is_some()
    }

    pub fn invincible_until(&self) -> Option<f64> {
        self.invincible_until
    }

    pub fn state(&self) -> LifeState {
        if self.is_game_over() {
            LifeState::GameOver
        } else {
            LifeState::Alive {
                lives: self.lives,
                invincible: self.is_invincible(),
            }
        }
    }

    /// Drop invincibility once its deadline has passed. Returns true if it
    /// was cleared by this call.
    pub fn expire(&mut self, now: f64) -> bool {
        match self.invincible_until {
            Some(until) if now >= until => {
                self.invincible_until = None;
                true
            }
            _ => false,
        }
    }

    /// An AI touched the player.
    pub fn on_contact(&mut self, now: f64) -> ContactOutcome {
        if self.is_invincible() {
            return ContactOutcome::Ignored;
        }
        self.damage(now)
    }

    /// Charge a contact without consulting the current invincibility flag.
    /// The caller decides whether the player was shielded.
    pub fn damage(&mut self, now: f64) -> ContactOutcome {
        match self.lives {
            0 => ContactOutcome::Ignored,
            1 => {
                self.lives = 0;
                self.invincible_until = None;
                ContactOutcome::GameOver
            }
            _ => {
                self.lives -= 1;
                self.invincible_until = Some(now + self.invincibility_duration);
                ContactOutcome::LifeLost { lives: self.lives }
            }
        }
    }

    pub fn restart(&mut self) {
        self.lives = self.initial_lives;
        self.invincible_until = None;
    }
}
