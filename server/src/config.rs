use arena_shared::protocol::BodyState;
use arena_shared::vec3::{is_finite, Vec3};

/// Which update validator the session runs incoming states through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Relay every well-formed update verbatim
    #[default]
    Trust,
    /// Drop updates with non-finite or out-of-range components
    Bounds,
}

impl ValidationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trust" => Some(Self::Trust),
            "bounds" => Some(Self::Bounds),
            _ => None,
        }
    }
}

/// Relay server configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub listen_addr: String,
    pub max_connections: usize,
    /// Capacity of the command queue feeding the session task
    pub command_queue: usize,
    /// State given to a participant until its first update arrives
    pub spawn_position: Vec3,
    pub validation: ValidationMode,
    /// |component| limit for positions under `ValidationMode::Bounds`
    pub position_limit: f64,
    /// |component| limit for velocities under `ValidationMode::Bounds`
    pub velocity_limit: f64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".to_string(),
            max_connections: 256,
            command_queue: 256,
            spawn_position: Vec3::new(0.0, 4.0, 0.0),
            validation: ValidationMode::Trust,
            position_limit: 1000.0,
            velocity_limit: 200.0,
        }
    }
}

impl RelayConfig {
    /// Defaults overridden by `ARENA_LISTEN_ADDR`, `PORT`,
    /// `ARENA_MAX_CONNECTIONS` and `ARENA_VALIDATION`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("ARENA_LISTEN_ADDR") {
            if !addr.is_empty() {
                config.listen_addr = addr;
            }
        } else if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.listen_addr = format!("0.0.0.0:{}", port);
            }
        }

        if let Ok(val) = std::env::var("ARENA_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_connections = n;
            }
        }

        if let Ok(val) = std::env::var("ARENA_VALIDATION") {
            match ValidationMode::parse(&val) {
                Some(mode) => config.validation = mode,
                None => tracing::warn!("Unknown ARENA_VALIDATION {:?}, using trust", val),
            }
        }

        config
    }

    pub fn spawn_state(&self) -> BodyState {
        BodyState::spawn(self.spawn_position)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("listen_addr must not be empty".into());
        }
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".into());
        }
        if self.command_queue == 0 {
            return Err("command_queue must be > 0".into());
        }
        if !is_finite(self.spawn_position) {
            return Err("spawn_position must be finite".into());
        }
        if !self.position_limit.is_finite() || self.position_limit <= 0.0 {
            return Err(format!(
                "position_limit must be finite and > 0, got {}",
                self.position_limit
            ));
        }
        if !self.velocity_limit.is_finite() || self.velocity_limit <= 0.0 {
            return Err(format!(
                "velocity_limit must be finite and > 0, got {}",
                self.velocity_limit
            ));
        }
        Ok(())
    }
}
