use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::vec3::Vec3;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Kinematic state as carried on the wire. Participant-authored and relayed
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub rotation: [f64; 3],
}

impl BodyState {
    /// State assigned to a participant that has not reported yet.
    pub fn spawn(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            velocity: [0.0; 3],
            rotation: [0.0; 3],
        }
    }
}

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "bootstrap")]
    Bootstrap(BootstrapMsg),
    #[serde(rename = "player:join")]
    Join(JoinMsg),
    #[serde(rename = "player:state")]
    State(StateRelayMsg),
    #[serde(rename = "player:leave")]
    Leave(LeaveMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapMsg {
    pub protocol_version: u32,
    pub self_id: u32,
    /// Full roster including the receiving participant.
    #[serde(deserialize_with = "participant_keys::deserialize")]
    pub players: BTreeMap<u32, BodyState>,
}

/// JSON object keys are strings. Inside an internally tagged enum the content
/// is buffered first, and the buffered map no longer parses `"7"` as a `u32`,
/// so ids are read as strings and converted here.
mod participant_keys {
    use std::collections::BTreeMap;

    use serde::de::{Deserializer, Error};
    use serde::Deserialize;

    use super::BodyState;

    pub(super) fn deserialize<'de, D>(d: D) -> Result<BTreeMap<u32, BodyState>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, BodyState>::deserialize(d)?
            .into_iter()
            .map(|(key, state)| {
                key.parse::<u32>()
                    .map(|id| (id, state))
                    .map_err(|_| D::Error::custom(format!("invalid participant id {:?}", key)))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMsg {
    pub participant_id: u32,
    pub state: BodyState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRelayMsg {
    pub participant_id: u32,
    pub state: BodyState,
    /// Unix milliseconds at which the relay accepted the update
    #[serde(default)]
    pub updated_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveMsg {
    pub participant_id: u32,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "state:update")]
    StateUpdate(BodyState),
}
