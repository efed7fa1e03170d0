//! Pluggable checks applied to participant-authored state before relaying.

use arena_shared::protocol::BodyState;

use crate::config::{RelayConfig, ValidationMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(&'static str),
}

pub trait UpdateValidator: Send + Sync {
    fn validate(&self, state: &BodyState) -> Verdict;
}

/// Relays everything.
pub struct TrustAll;

impl UpdateValidator for TrustAll {
    fn validate(&self, _state: &BodyState) -> Verdict {
        Verdict::Accept
    }
}

/// Rejects non-finite values and components beyond fixed limits.
pub struct BoundsCheck {
    pub position_limit: f64,
    pub velocity_limit: f64,
}

impl UpdateValidator for BoundsCheck {
    fn validate(&self, state: &BodyState) -> Verdict {
        let mut all = state
            .position
            .iter()
            .chain(&state.velocity)
            .chain(&state.rotation);
        if all.any(|c| !c.is_finite()) {
            return Verdict::Reject("non-finite component");
        }
        if state.position.iter().any(|c| c.abs() > self.position_limit) {
            return Verdict::Reject("position out of range");
        }
        if state.velocity.iter().any(|c| c.abs() > self.velocity_limit) {
            return Verdict::Reject("velocity out of range");
        }
        Verdict::Accept
    }
}

pub fn from_config(config: &RelayConfig) -> Box<dyn UpdateValidator> {
    match config.validation {
        ValidationMode::Trust => Box::new(TrustAll),
        ValidationMode::Bounds => Box::new(BoundsCheck {
            position_limit: config.position_limit,
            velocity_limit: config.velocity_limit,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(position: [f64; 3], velocity: [f64; 3]) -> BodyState {
        BodyState {
            position,
            velocity,
            rotation: [0.0; 3],
        }
    }

    fn bounds() -> BoundsCheck {
        BoundsCheck {
            position_limit: 100.0,
            velocity_limit: 50.0,
        }
    }

    #[test]
    fn trust_all_accepts_anything() {
        let wild = state([1e12, f64::NAN, 0.0], [f64::INFINITY, 0.0, 0.0]);
        assert_eq!(TrustAll.validate(&wild), Verdict::Accept);
    }

    #[test]
    fn bounds_accepts_ordinary_state() {
        let s = state([10.0, -1.5, -19.0], [3.0, -9.8, 0.0]);
        assert_eq!(bounds().validate(&s), Verdict::Accept);
    }

    #[test]
    fn bounds_rejects_non_finite() {
        let mut s = state([0.0; 3], [0.0; 3]);
        s.rotation[1] = f64::NAN;
        assert_eq!(bounds().validate(&s), Verdict::Reject("non-finite component"));
    }

    #[test]
    fn bounds_rejects_out_of_range() {
        assert_eq!(
            bounds().validate(&state([0.0, 0.0, 101.0], [0.0; 3])),
            Verdict::Reject("position out of range")
        );
        assert_eq!(
            bounds().validate(&state([0.0; 3], [-51.0, 0.0, 0.0])),
            Verdict::Reject("velocity out of range")
        );
    }

    #[test]
    fn config_selects_validator() {
        let wild = state([1e9, 0.0, 0.0], [0.0; 3]);
        let trust = from_config(&RelayConfig::default());
        assert_eq!(trust.validate(&wild), Verdict::Accept);

        let config = RelayConfig {
            validation: ValidationMode::Bounds,
            ..Default::default()
        };
        assert!(matches!(
            from_config(&config).validate(&wild),
            Verdict::Reject(_)
        ));
    }
}
